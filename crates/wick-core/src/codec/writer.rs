use crate::buffer::ReadableBuffer;
use crate::codec::fields::{FieldInfo, ListInfo};
use crate::{CoreError, sealed::Sealed};

/// 文本写入的严格性策略，在编码器构造时选定。
///
/// # 契约说明（What）
/// - `Strict`：载荷必须是合法 UTF-8，否则整次写入以
///   [`codes::CODEC_INVALID_TEXT`](crate::codes::CODEC_INVALID_TEXT) 失败且不向
///   汇发射任何字节；
/// - `Replace`：非法序列以 U+FFFD 替换后继续写入，长度前缀按替换后的字节数
///   计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPolicy {
    #[default]
    Strict,
    Replace,
}

/// `FrameWriter` 是帧式线格式编码器的公开契约：跨一个字节汇的状态机。
///
/// # 设计背景（Why）
/// - 对标 Protobuf 一类标签分隔线格式的写入器接口：字段/列表以 begin/end 括起，
///   原语写入一次一个值，汇端只需追加与冲刷；
/// - 对象安全：流水线需要以 `&mut dyn FrameWriter` 在组件间传递编码器，而不
///   关心底层汇的具体类型。
///
/// # 逻辑解析（How）
/// - **帧规则**：`begin_field`/`end_field` 与 `begin_list`/`end_list` 必须严格
///   配对，嵌套深度由实现追踪；列表必须位于已打开的字段内；
/// - **标签发射**：每个原语写入时携带最内层字段的标签；打包列表内省略标签，
///   元素连续铺设，`end_list` 统一补长度前缀；
/// - **失败语义**：配对失衡或字段外写原语立即以
///   [`codes::CODEC_UNBALANCED_FRAME`](crate::codes::CODEC_UNBALANCED_FRAME)
///   失败，此后编码器中毒，除 [`reset`](Self::reset) 外的一切操作以
///   [`codes::CODEC_POISONED`](crate::codes::CODEC_POISONED) 拒绝。
///
/// # 契约说明（What）
/// - **顺序保证**：字节按调用顺序发射，实现不得跨字段边界重排或合批；
/// - **原语失败面**：给定类型合法的输入，原语写入唯一的失败来源是帧规则违规
///   （以及 `Strict` 策略下的非法文本）；
/// - **冲刷**：[`flush`](Self::flush) 幂等；未闭合打包列表的暂存字节属于未完成
///   帧，不随冲刷外泄。
///
/// # 风险提示（Trade-offs）
/// - 汇不支持位置回写，打包列表的长度前缀依赖实现内部暂存；超大打包列表会在
///   暂存中累积，调用方应按批拆分。
pub trait FrameWriter: Sealed {
    /// 打开一个字段帧。
    fn begin_field(&mut self, field: FieldInfo) -> crate::Result<(), CoreError>;

    /// 闭合最近打开的字段帧。
    fn end_field(&mut self) -> crate::Result<(), CoreError>;

    /// 在当前字段内打开一个列表帧。
    fn begin_list(&mut self, list: ListInfo) -> crate::Result<(), CoreError>;

    /// 闭合最近打开的列表帧。
    fn end_list(&mut self) -> crate::Result<(), CoreError>;

    /// 写入补码扩展的变长 32 位有符号整数（负值恒为 10 字节）。
    fn write_int32(&mut self, value: i32) -> crate::Result<(), CoreError>;

    /// 写入变长 32 位无符号整数。
    fn write_uint32(&mut self, value: u32) -> crate::Result<(), CoreError>;

    /// 写入折叠（zigzag）变长 32 位有符号整数。
    fn write_sint32(&mut self, value: i32) -> crate::Result<(), CoreError>;

    /// 写入定长小端 32 位无符号整数。
    fn write_fixed32(&mut self, value: u32) -> crate::Result<(), CoreError>;

    /// 写入定长小端 32 位有符号整数（位模式与无符号一致）。
    fn write_sfixed32(&mut self, value: i32) -> crate::Result<(), CoreError>;

    /// 写入补码扩展的变长 64 位有符号整数。
    fn write_int64(&mut self, value: i64) -> crate::Result<(), CoreError>;

    /// 写入变长 64 位无符号整数。
    fn write_uint64(&mut self, value: u64) -> crate::Result<(), CoreError>;

    /// 写入折叠（zigzag）变长 64 位有符号整数。
    fn write_sint64(&mut self, value: i64) -> crate::Result<(), CoreError>;

    /// 写入定长小端 64 位无符号整数。
    fn write_fixed64(&mut self, value: u64) -> crate::Result<(), CoreError>;

    /// 写入定长小端 64 位有符号整数（位模式与无符号一致）。
    fn write_sfixed64(&mut self, value: i64) -> crate::Result<(), CoreError>;

    /// 写入单字节布尔值（0/1）。
    fn write_bool(&mut self, value: bool) -> crate::Result<(), CoreError>;

    /// 写入枚举整数值，线上等价于 `write_int32`。
    fn write_enum(&mut self, value: i32) -> crate::Result<(), CoreError>;

    /// 写入 IEEE-754 单精度浮点，位模式原样落地。
    fn write_float(&mut self, value: f32) -> crate::Result<(), CoreError>;

    /// 写入 IEEE-754 双精度浮点，位模式原样落地。
    fn write_double(&mut self, value: f64) -> crate::Result<(), CoreError>;

    /// 写入长度前缀文本；`&str` 恒为合法 UTF-8，属快速路径。
    fn write_string(&mut self, value: &str) -> crate::Result<(), CoreError>;

    /// 写入声明为文本的原始字节，按构造时的 [`TextPolicy`] 校验或替换。
    fn write_text(&mut self, value: &[u8]) -> crate::Result<(), CoreError>;

    /// 写入长度前缀的不透明字节，输入为零拷贝只读缓冲。
    fn write_bytes(&mut self, src: &dyn ReadableBuffer) -> crate::Result<(), CoreError>;

    /// 把内部暂存字节推向汇；幂等。
    fn flush(&mut self) -> crate::Result<(), CoreError>;

    /// 清除中毒态、帧栈与打包暂存；不触碰汇中已发射的字节。
    fn reset(&mut self);
}
