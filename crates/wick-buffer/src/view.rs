use bytes::Bytes;
use core::hash::{Hash, Hasher};

use wick_core::buffer::ReadableBuffer;
use wick_core::{BufferHandle, CoreError, codes};

use crate::pooled_buf::FrozenBuf;

/// `ViewKey` 是视图的结构化身份：`(句柄, 偏移, 长度)` 三元组。
///
/// # 设计背景（Why）
/// - 驱逐表需要"同一物理区间只有一个条目"：键必须表达物理身份而非内容。两个
///   字节相等的视图若来自不同租约（或同一租约的不同区间），就是不同的键。
/// - 以显式键类型替代临时的引用比较技巧：`Eq`/`Ord`/`Hash` 全部定义在三元组
///   结构上，可直接充当 `BTreeMap` 键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewKey {
    handle: BufferHandle,
    offset: usize,
    len: usize,
}

impl ViewKey {
    /// 返回视图所属的租约句柄。
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// 返回视图在缓冲内的起始偏移。
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 返回视图长度。
    pub fn len(&self) -> usize {
        self.len
    }

    /// 判断视图是否为空。
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// `BufView` 是冻结缓冲上的零拷贝只读窗口。
///
/// # 设计动机（Why）
/// - 编码器的不透明字节输入与驱逐表的键都需要"指向池化内存的一段区间、但不
///   拥有它"的值语义包装；
/// - 构造为常数时间、零复制：仅递增底层 `Bytes` 的引用计数并记录区间。
///
/// # 契约说明（What）
/// - [`wrap`](Self::wrap)：`offset + len` 不得越过冻结内容末尾，否则以
///   [`codes::BUFFER_OUT_OF_RANGE`] 失败且不产生部分状态；
/// - [`copy_to`](Self::copy_to)：唯一的内容复制操作，供需要让字节活得比缓冲
///   更久的调用方使用；
/// - **相等语义**：`Eq`/`Hash` 基于 [`ViewKey`]（物理身份），与内容无关；
/// - **有效性**：视图持有引用计数，内容读取在整个视图生命周期内安全；但池化
///   语义上，其有效期以所属租约的在借区间为准——租约释放后继续持有视图会阻止
///   内存复用。
///
/// # 风险提示（Trade-offs）
/// - 视图保留对整块缓冲的引用（而非再切片），使 `key()` 与 `wrap` 均为纯指针
///   运算；代价是窗口存活期间整块内存不可回收，这正是生命周期策略要管理的
///   对象。
#[derive(Debug, Clone)]
pub struct BufView {
    data: Bytes,
    key: ViewKey,
}

impl BufView {
    /// 在冻结缓冲上构造零拷贝窗口。
    pub fn wrap(frozen: &FrozenBuf, offset: usize, len: usize) -> wick_core::Result<Self, CoreError> {
        let end = offset.checked_add(len).ok_or_else(|| {
            CoreError::new(codes::BUFFER_OUT_OF_RANGE, "offset + len 溢出 usize")
        })?;
        if end > frozen.len() {
            return Err(CoreError::new(
                codes::BUFFER_OUT_OF_RANGE,
                "视图区间越过冻结内容末尾",
            ));
        }
        Ok(Self {
            data: frozen.share_data(),
            key: ViewKey {
                handle: frozen.handle(),
                offset,
                len,
            },
        })
    }

    /// 覆盖冻结缓冲全部内容的便捷构造。
    pub fn wrap_all(frozen: &FrozenBuf) -> Self {
        Self {
            data: frozen.share_data(),
            key: ViewKey {
                handle: frozen.handle(),
                offset: 0,
                len: frozen.len(),
            },
        }
    }

    /// 返回视图的结构化身份键。
    pub fn key(&self) -> ViewKey {
        self.key
    }

    /// 返回所属租约句柄。
    pub fn handle(&self) -> BufferHandle {
        self.key.handle
    }

    /// 返回视图长度。
    pub fn len(&self) -> usize {
        self.key.len
    }

    /// 判断视图是否为空。
    pub fn is_empty(&self) -> bool {
        self.key.len == 0
    }

    /// 以切片方式暴露窗口内容。
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.key.offset..self.key.offset + self.key.len]
    }

    /// 把窗口内容复制到目标切片的 `dst_offset` 起始处。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：`dst_offset + len() <= dst.len()`，否则以
    ///   [`codes::BUFFER_OUT_OF_RANGE`] 失败且不写入任何字节；
    /// - 这是视图上唯一的内容复制操作。
    pub fn copy_to(&self, dst: &mut [u8], dst_offset: usize) -> wick_core::Result<(), CoreError> {
        let end = dst_offset.checked_add(self.key.len).ok_or_else(|| {
            CoreError::new(codes::BUFFER_OUT_OF_RANGE, "dst_offset + len 溢出 usize")
        })?;
        if end > dst.len() {
            return Err(CoreError::new(
                codes::BUFFER_OUT_OF_RANGE,
                "目标切片空间不足",
            ));
        }
        dst[dst_offset..end].copy_from_slice(self.as_bytes());
        Ok(())
    }
}

impl PartialEq for BufView {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for BufView {}

impl Hash for BufView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl ReadableBuffer for BufView {
    fn remaining(&self) -> usize {
        self.key.len
    }

    fn chunk(&self) -> &[u8] {
        self.as_bytes()
    }
}
