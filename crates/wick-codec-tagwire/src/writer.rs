//! `TagWriter`：跨单一字节汇的帧式编码状态机。

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use wick_core::buffer::ReadableBuffer;
use wick_core::codec::{ByteSink, FieldInfo, FrameWriter, ListInfo, TextPolicy, WireKind};
use wick_core::{CoreError, Result, codes};

use crate::varint::put_uvarint;

/// 无标签的长度前缀写入：变长长度 + 原始字节。
///
/// # 设计背景（Why）
/// - 直接向池化缓冲铺设单个载荷（不经字段框架）是流水线的高频路径：长度前缀
///   让下游无需额外定界即可切出载荷；
/// - [`TagWriter`] 的文本与字节写入同样以本函数为底层铺设例程，保证两条路径
///   字节布局一致。
pub fn put_len_prefixed<S>(sink: &mut S, payload: &[u8]) -> Result<(), CoreError>
where
    S: ByteSink + ?Sized,
{
    put_uvarint(sink, payload.len() as u64)?;
    sink.write_all(payload)
}

/// 帧栈条目：字段帧或列表帧。列表元数据在 `begin_list` 处即被消费
/// （打包判定与容量预估），栈上仅需记住帧类别。
enum Frame {
    Field(FieldInfo),
    List,
}

/// 打包列表的暂存态：元素省略标签、连续铺设，闭合时统一补长度前缀。
struct PackedRun {
    field: FieldInfo,
    scratch: Vec<u8>,
}

/// `TagWriter` 是 [`FrameWriter`] 契约的默认实现。
///
/// # 设计动机（Why）
/// - 把"字段/列表配对、标签发射、打包布局"收敛为一个跨单一汇的同步状态机：
///   调用方按模式声明的顺序逐值写入，编码器保证线上布局合法；
/// - 汇类型以泛型注入：池化缓冲（零拷贝流水线）与 `Vec<u8>`（测试、快照）共用
///   同一实现。
///
/// # 核心机制（How）
/// - **帧栈**：`begin_field`/`begin_list` 压栈、`end_*` 弹栈并核对帧类别；
///   `begin_*` 本身不发射字节，配对失衡因此不会留下半帧输出；
/// - **标签发射**：原语写入时沿帧栈向内查找最近的字段帧，按"编号 << 3 | 线型"
///   构造标签；线型由实际调用的原语写入方法决定；
/// - **打包布局**：打包字段的列表把元素载荷写入内部暂存区，`end_list` 发射
///   "标签(长度前缀线型) + 字节数 + 载荷"；
/// - **中毒态**：结构性违规使 `poisoned` 置位，此后除 [`reset`](FrameWriter::reset)
///   外的操作一律以 [`codes::CODEC_POISONED`] 拒绝。
///
/// # 契约说明（What）
/// - **顺序保证**：字节按调用顺序发射（打包元素在其列表闭合处整体就位），不做
///   跨字段重排；
/// - **前置条件**：单线程驱动；汇的 `write_all` 要么全部成功要么报错；
/// - **后置条件**：`flush` 成功后此前发射的字节对介质可见。
pub struct TagWriter<S> {
    sink: S,
    frames: Vec<Frame>,
    packed: Option<PackedRun>,
    poisoned: bool,
    text_policy: TextPolicy,
}

impl<S> TagWriter<S>
where
    S: ByteSink,
{
    /// 以严格文本策略构造编码器。
    pub fn new(sink: S) -> Self {
        Self::with_text_policy(sink, TextPolicy::Strict)
    }

    /// 以显式文本策略构造编码器。
    pub fn with_text_policy(sink: S, text_policy: TextPolicy) -> Self {
        Self {
            sink,
            frames: Vec::new(),
            packed: None,
            poisoned: false,
            text_policy,
        }
    }

    /// 取回底层汇，消费编码器。
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// 返回底层汇的只读引用。
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 中毒态查询，供调用方在错误恢复前探测。
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn ensure_ready(&self) -> Result<(), CoreError> {
        if self.poisoned {
            return Err(CoreError::new(
                codes::CODEC_POISONED,
                "编码器已中毒，请先 reset",
            ));
        }
        Ok(())
    }

    /// 置位中毒态并返回结构性违规错误。
    fn poison(&mut self, message: &'static str) -> CoreError {
        self.poisoned = true;
        CoreError::new(codes::CODEC_UNBALANCED_FRAME, message)
    }

    /// 沿帧栈向内查找最近的字段帧。
    fn innermost_field(&self) -> Option<FieldInfo> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Field(field) => Some(*field),
            Frame::List => None,
        })
    }

    /// 发射"编号 << 3 | 线型"标签。
    fn put_tag(&mut self, field: FieldInfo, wire_type: u8) -> Result<(), CoreError> {
        let tag = (u64::from(field.number().get()) << 3) | u64::from(wire_type);
        put_uvarint(&mut self.sink, tag)
    }

    /// 变长载荷的统一写入路径：打包暂存或"标签 + 载荷"。
    fn put_varint_value(&mut self, value: u64) -> Result<(), CoreError> {
        self.ensure_ready()?;
        if let Some(run) = self.packed.as_mut() {
            return put_uvarint(&mut run.scratch, value);
        }
        let Some(field) = self.innermost_field() else {
            return Err(self.poison("原语写入必须发生在已打开的字段内"));
        };
        self.put_tag(field, WireKind::Varint.wire_type())?;
        put_uvarint(&mut self.sink, value)
    }

    /// 定长载荷的统一写入路径。
    fn put_fixed_value(&mut self, bytes: &[u8], kind: WireKind) -> Result<(), CoreError> {
        self.ensure_ready()?;
        if let Some(run) = self.packed.as_mut() {
            run.scratch.extend_from_slice(bytes);
            return Ok(());
        }
        let Some(field) = self.innermost_field() else {
            return Err(self.poison("原语写入必须发生在已打开的字段内"));
        };
        self.put_tag(field, kind.wire_type())?;
        self.sink.write_all(bytes)
    }

    /// 长度前缀载荷的统一写入路径；打包运行中不允许出现。
    fn put_len_delimited(&mut self, payload: &[u8]) -> Result<(), CoreError> {
        self.ensure_ready()?;
        if self.packed.is_some() {
            return Err(self.poison("打包列表内不允许长度前缀元素"));
        }
        let Some(field) = self.innermost_field() else {
            return Err(self.poison("原语写入必须发生在已打开的字段内"));
        };
        self.put_tag(field, WireKind::LengthDelimited.wire_type())?;
        put_len_prefixed(&mut self.sink, payload)
    }
}

impl<S> FrameWriter for TagWriter<S>
where
    S: ByteSink,
{
    fn begin_field(&mut self, field: FieldInfo) -> Result<(), CoreError> {
        self.ensure_ready()?;
        if self.packed.is_some() {
            return Err(self.poison("打包列表内不允许嵌套字段"));
        }
        self.frames.push(Frame::Field(field));
        Ok(())
    }

    fn end_field(&mut self) -> Result<(), CoreError> {
        self.ensure_ready()?;
        match self.frames.last() {
            Some(Frame::Field(_)) => {
                self.frames.pop();
                Ok(())
            }
            _ => Err(self.poison("end_field 没有匹配的 begin_field")),
        }
    }

    fn begin_list(&mut self, list: ListInfo) -> Result<(), CoreError> {
        self.ensure_ready()?;
        if self.packed.is_some() {
            return Err(self.poison("打包列表内不允许嵌套列表"));
        }
        let field = match self.frames.last() {
            Some(Frame::Field(field)) => *field,
            _ => return Err(self.poison("列表必须紧邻其所属字段打开")),
        };
        if field.is_packed() {
            if matches!(list.kind(), WireKind::LengthDelimited) {
                return Err(self.poison("打包布局仅支持数值元素"));
            }
            self.packed = Some(PackedRun {
                field,
                scratch: Vec::with_capacity(list.count().saturating_mul(2)),
            });
        }
        self.frames.push(Frame::List);
        Ok(())
    }

    fn end_list(&mut self) -> Result<(), CoreError> {
        self.ensure_ready()?;
        match self.frames.last() {
            Some(Frame::List) => {
                self.frames.pop();
            }
            _ => return Err(self.poison("end_list 没有匹配的 begin_list")),
        }
        if let Some(run) = self.packed.take() {
            // 打包列表闭合：此刻载荷字节数已知，统一补"标签 + 长度前缀"。
            self.put_tag(run.field, WireKind::LengthDelimited.wire_type())?;
            put_len_prefixed(&mut self.sink, &run.scratch)?;
        }
        Ok(())
    }

    fn write_int32(&mut self, value: i32) -> Result<(), CoreError> {
        // 负值按补码扩展到 64 位再编码，与 64 位变长域保持互换性。
        self.put_varint_value(i64::from(value) as u64)
    }

    fn write_uint32(&mut self, value: u32) -> Result<(), CoreError> {
        self.put_varint_value(u64::from(value))
    }

    fn write_sint32(&mut self, value: i32) -> Result<(), CoreError> {
        self.put_varint_value(u64::from(crate::varint::fold32(value)))
    }

    fn write_fixed32(&mut self, value: u32) -> Result<(), CoreError> {
        self.put_fixed_value(&value.to_le_bytes(), WireKind::Fixed32)
    }

    fn write_sfixed32(&mut self, value: i32) -> Result<(), CoreError> {
        self.put_fixed_value(&value.to_le_bytes(), WireKind::Fixed32)
    }

    fn write_int64(&mut self, value: i64) -> Result<(), CoreError> {
        self.put_varint_value(value as u64)
    }

    fn write_uint64(&mut self, value: u64) -> Result<(), CoreError> {
        self.put_varint_value(value)
    }

    fn write_sint64(&mut self, value: i64) -> Result<(), CoreError> {
        self.put_varint_value(crate::varint::fold64(value))
    }

    fn write_fixed64(&mut self, value: u64) -> Result<(), CoreError> {
        self.put_fixed_value(&value.to_le_bytes(), WireKind::Fixed64)
    }

    fn write_sfixed64(&mut self, value: i64) -> Result<(), CoreError> {
        self.put_fixed_value(&value.to_le_bytes(), WireKind::Fixed64)
    }

    fn write_bool(&mut self, value: bool) -> Result<(), CoreError> {
        self.put_varint_value(u64::from(value))
    }

    fn write_enum(&mut self, value: i32) -> Result<(), CoreError> {
        self.write_int32(value)
    }

    fn write_float(&mut self, value: f32) -> Result<(), CoreError> {
        self.put_fixed_value(&value.to_bits().to_le_bytes(), WireKind::Fixed32)
    }

    fn write_double(&mut self, value: f64) -> Result<(), CoreError> {
        self.put_fixed_value(&value.to_bits().to_le_bytes(), WireKind::Fixed64)
    }

    fn write_string(&mut self, value: &str) -> Result<(), CoreError> {
        self.put_len_delimited(value.as_bytes())
    }

    fn write_text(&mut self, value: &[u8]) -> Result<(), CoreError> {
        self.ensure_ready()?;
        // 先校验再发射：严格模式失败时不得落下任何字节。
        let normalized: Cow<'_, [u8]> = match self.text_policy {
            TextPolicy::Strict => {
                if core::str::from_utf8(value).is_err() {
                    return Err(CoreError::new(
                        codes::CODEC_INVALID_TEXT,
                        "文本载荷不是合法 UTF-8",
                    ));
                }
                Cow::Borrowed(value)
            }
            TextPolicy::Replace => match String::from_utf8_lossy(value) {
                Cow::Borrowed(valid) => Cow::Borrowed(valid.as_bytes()),
                Cow::Owned(replaced) => Cow::Owned(replaced.into_bytes()),
            },
        };
        self.put_len_delimited(&normalized)
    }

    fn write_bytes(&mut self, src: &dyn ReadableBuffer) -> Result<(), CoreError> {
        self.put_len_delimited(src.chunk())
    }

    fn flush(&mut self) -> Result<(), CoreError> {
        self.ensure_ready()?;
        self.sink.flush()
    }

    fn reset(&mut self) {
        self.frames.clear();
        self.packed = None;
        self.poisoned = false;
    }
}
