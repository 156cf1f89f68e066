use alloc::sync::Arc;

use bytes::{Bytes, BytesMut};
use wick_core::buffer::ReadableBuffer;
use wick_core::codec::ByteSink;
use wick_core::{BufferHandle, CoreError};

use crate::pool::PoolInner;

/// `PooledBuf` 是池租出的可写缓冲：一次租约的写入阶段。
///
/// # 设计动机（Why）
/// - 写入与共享是两个阶段：写入阶段需要独占可变访问，共享阶段需要廉价克隆与
///   零拷贝切片。把两个阶段拆成两个类型（本类型与 [`FrozenBuf`]），让"冻结后
///   不可再写"成为类型层面的事实，而非运行时断言。
/// - 借助 `BytesMut` 的容量管理，追加写入无需调用方关心扩容细节。
///
/// # 架构关系（How）
/// - 持有池内部句柄：若调用方在冻结前放弃租约（直接 drop），`Drop` 钩子把内存
///   原样还给池，租约结束，不产生泄漏；
/// - [`freeze`](Self::freeze) 消费自身生成 [`FrozenBuf`]，此后释放决策由显式
///   `release` 或生命周期策略接管，`Drop` 钩子不再介入。
///
/// # 契约说明（What）
/// - **前置条件**：实例只能由 [`SlotBufferPool::acquire`](crate::SlotBufferPool::acquire)
///   构造；
/// - **后置条件**：`capacity() >=` 租借时声明的最小容量；写入遵守顺序追加语义；
///   每个实例恰好以"冻结"或"弃租归还"二者之一结束。
///
/// # 风险提示（Trade-offs）
/// - 追加超出当前容量时 `BytesMut` 会就地扩容，租约容量以冻结或归还时刻的
///   实际值为准；池统计按最终容量对账。
pub struct PooledBuf {
    inner: Option<BytesMut>,
    handle: BufferHandle,
    pool: Arc<PoolInner>,
}

impl core::fmt::Debug for PooledBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PooledBuf")
            .field("handle", &self.handle)
            .field("written", &self.written())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

impl PooledBuf {
    pub(crate) fn new(inner: BytesMut, handle: BufferHandle, pool: Arc<PoolInner>) -> Self {
        Self {
            inner: Some(inner),
            handle,
            pool,
        }
    }

    /// 返回租约句柄。
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// 返回当前总容量（含已写入字节）。
    pub fn capacity(&self) -> usize {
        self.buf().capacity()
    }

    /// 返回已写入的字节数。
    pub fn written(&self) -> usize {
        self.buf().len()
    }

    /// 返回剩余可写空间。
    pub fn remaining_mut(&self) -> usize {
        self.buf().capacity() - self.buf().len()
    }

    /// 将切片追加写入缓冲末尾。
    pub fn put_slice(&mut self, src: &[u8]) {
        self.buf_mut().extend_from_slice(src);
    }

    /// 清空已写内容但保留容量，便于重复使用。
    pub fn clear(&mut self) {
        self.buf_mut().clear();
    }

    /// 冻结缓冲区，进入只读共享阶段。
    ///
    /// # 契约说明（What）
    /// - **后置条件**：返回的 [`FrozenBuf`] 内容与已写入字节严格一致；本实例的
    ///   `Drop` 归还路径随之失效，释放决策移交给调用方选定的生命周期所有者。
    pub fn freeze(mut self) -> FrozenBuf {
        let buf = self.inner.take().expect("租约缓冲在冻结前必然存在");
        let capacity = buf.capacity();
        FrozenBuf {
            data: buf.freeze(),
            handle: self.handle,
            capacity,
        }
    }

    fn buf(&self) -> &BytesMut {
        self.inner.as_ref().expect("租约缓冲在归还前必然存在")
    }

    fn buf_mut(&mut self) -> &mut BytesMut {
        self.inner.as_mut().expect("租约缓冲在归还前必然存在")
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        // 冻结会取走 inner；仅当调用方在写入阶段放弃租约时才走弃租归还路径。
        if let Some(buf) = self.inner.take() {
            self.pool.reclaim_abandoned(self.handle, buf);
        }
    }
}

impl ByteSink for PooledBuf {
    fn write_all(&mut self, src: &[u8]) -> wick_core::Result<(), CoreError> {
        self.put_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> wick_core::Result<(), CoreError> {
        Ok(())
    }
}

/// `FrozenBuf` 是租约的只读共享阶段：内容不可变、克隆廉价。
///
/// # 设计动机（Why）
/// - 零拷贝共享要求同一块内存可被多个视图引用；`Bytes` 的引用计数恰好承载该
///   语义，克隆只递增计数，不复制内容。
/// - 归还（`release`）以本类型为消费单位：池据此在世代层面核对租约身份，并在
///   重获独占所有权时复用底层内存。
///
/// # 契约说明（What）
/// - `Clone` 产生同一租约的别名：所有克隆共享同一句柄，任意一份被成功释放后，
///   释放其余克隆将以
///   [`codes::POOL_DOUBLE_RELEASE`](wick_core::codes::POOL_DOUBLE_RELEASE) 失败；
/// - **后置条件**：释放之后内容仍可经存活视图读取（引用计数兜底），但该内存
///   不会再被池复用。
#[derive(Debug, Clone)]
pub struct FrozenBuf {
    data: Bytes,
    handle: BufferHandle,
    capacity: usize,
}

impl FrozenBuf {
    /// 返回租约句柄。
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// 返回内容长度。
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 判断内容是否为空。
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 以切片方式暴露全部内容。
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 返回冻结时刻记录的租约容量，供池统计对账。
    pub(crate) fn lease_capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn into_data(self) -> Bytes {
        self.data
    }

    pub(crate) fn share_data(&self) -> Bytes {
        self.data.clone()
    }
}

impl ReadableBuffer for FrozenBuf {
    fn remaining(&self) -> usize {
        self.data.len()
    }

    fn chunk(&self) -> &[u8] {
        &self.data
    }
}
