use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use bytes::BytesMut;
use spin::Mutex;

use wick_core::buffer::{BufferPool, PoolStatDimension, PoolStats};
use wick_core::{BufferHandle, CoreError, codes};

use crate::pooled_buf::{FrozenBuf, PooledBuf};

/// 池行为配置：只影响复用压力与分配频率，不影响正确性。
///
/// # 契约说明（What）
/// - `capacity_class`：容量等级，租借容量向上取整到该值的整数倍（页对齐形态的
///   简化），提高自由链表的命中率；
/// - `max_free_buffers`：自由链表保留的空闲缓冲上限，超出部分直接退役以控制
///   常驻内存；
/// - `max_leases`：在借租约数硬上限；`None`（默认）表示不设上限，`acquire`
///   永不因容量拒绝。
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub capacity_class: usize,
    pub max_free_buffers: usize,
    pub max_leases: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity_class: 4096,
            max_free_buffers: 64,
            max_leases: None,
        }
    }
}

/// `SlotBufferPool` 是基于槽位表与自由链表的缓冲池实现。
///
/// # 模块角色（Why）
/// - 作为 `wick-core::buffer::BufferPool` 的默认实现，为编码流水线提供统一的
///   缓冲来源；
/// - 槽位表为每次租借维护世代纪元：归还时核对 `(槽位, 世代)`，重复释放与陈旧
///   句柄在簿记层面即刻失败，这是在无自动可达性追踪的语言里对"弱引用回收"的
///   显式重写。
///
/// # 核心机制（How）
/// - 内部以 `spin::Mutex<PoolState>` 保护槽位表与在借计数，租借时优先复用容量
///   足够的空闲槽位，减少堆分配；
/// - `PoolMetrics` 以原子计数跟踪 `allocated_bytes`、`available_bytes`、
///   `active_leases` 等指标，支撑 `statistics` 快照；
/// - 归还时尝试 `Bytes::try_into_mut` 重获独占所有权：成功则内存进自由链表，
///   失败（仍有视图存活）则槽位退役，内存由引用计数在最后一个视图消亡时交还
///   分配器——池永远不会把仍被引用的内存重新租出。
///
/// # 契约说明（What）
/// - **线程安全**：所有共享状态均经 `spin::Mutex` 与原子计数保护，满足
///   `Send + Sync + 'static`；
/// - **前置条件**：`min_capacity` 表示真实需求；0 将按一个容量等级处理；
/// - **后置条件**：`acquire` 返回的缓冲满足 `capacity() >= min_capacity`；同一
///   租约的 `release` 恰好成功一次。
///
/// # 设计权衡（Trade-offs）
/// - 使用自旋锁而非 `std` 互斥量，以便在 `no_std`/线程数量有限的环境中仍能
///   工作；临界区内只做指针级操作，不做系统分配之外的重活；
/// - 自由链表查找为线性扫描，在容量等级归一化之后命中首个槽位的概率很高，
///   省去分级索引的复杂度。
#[derive(Clone, Default)]
pub struct SlotBufferPool {
    inner: Arc<PoolInner>,
}

impl SlotBufferPool {
    /// 创建默认配置的池实例。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以显式配置创建池实例。
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner::new(config)),
        }
    }

    /// 租借一个最少具备 `min_capacity` 可写空间的缓冲。
    ///
    /// # 契约说明（What）
    /// - **后置条件**：返回缓冲的容量不小于 `min_capacity`（向上取整到容量
    ///   等级）；
    /// - **异常处理**：仅当配置了 `max_leases` 且已达上限时以
    ///   [`codes::POOL_EXHAUSTED`] 失败，调用方可退避重试或调高上限。
    pub fn acquire(&self, min_capacity: usize) -> wick_core::Result<PooledBuf, CoreError> {
        let (buf, handle) = self.inner.acquire_slot(min_capacity)?;
        Ok(PooledBuf::new(buf, handle, self.inner.clone()))
    }

    /// 归还一个冻结缓冲，结束其租约。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：`frozen` 必须来自本池且其租约仍在借；
    /// - **异常处理**：重复释放或携带陈旧世代的句柄以
    ///   [`codes::POOL_DOUBLE_RELEASE`] 失败；该错误表明释放权属出现分叉，应
    ///   视为流水线级致命问题，而池自身的簿记保持一致。
    pub fn release(&self, frozen: FrozenBuf) -> wick_core::Result<(), CoreError> {
        self.inner.release_frozen(frozen)
    }

    /// 主动收缩自由链表，返回实际回收的字节数。
    pub fn shrink_to_fit(&self) -> wick_core::Result<usize, CoreError> {
        Ok(self.inner.shrink_free_list())
    }

    /// 返回池当前的统计快照。
    pub fn statistics(&self) -> wick_core::Result<PoolStats, CoreError> {
        Ok(self.inner.snapshot())
    }
}

impl BufferPool for SlotBufferPool {
    type Writable = PooledBuf;
    type Frozen = FrozenBuf;

    fn acquire(&self, min_capacity: usize) -> wick_core::Result<Self::Writable, CoreError> {
        SlotBufferPool::acquire(self, min_capacity)
    }

    fn release(&self, frozen: Self::Frozen) -> wick_core::Result<(), CoreError> {
        SlotBufferPool::release(self, frozen)
    }

    fn shrink_to_fit(&self) -> wick_core::Result<usize, CoreError> {
        SlotBufferPool::shrink_to_fit(self)
    }

    fn statistics(&self) -> wick_core::Result<PoolStats, CoreError> {
        SlotBufferPool::statistics(self)
    }
}

/// 槽位状态机：空置（无内存）、空闲（携带待复用内存）、在借。
enum SlotStatus {
    Vacant,
    Free(BytesMut),
    Leased,
}

struct Slot {
    generation: u32,
    status: SlotStatus,
}

struct PoolState {
    slots: Vec<Slot>,
    free_count: usize,
    leased: usize,
}

pub(crate) struct PoolInner {
    state: Mutex<PoolState>,
    metrics: PoolMetrics,
    config: PoolConfig,
}

impl Default for PoolInner {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl PoolInner {
    fn new(config: PoolConfig) -> Self {
        Self {
            state: Mutex::new(PoolState {
                slots: Vec::new(),
                free_count: 0,
                leased: 0,
            }),
            metrics: PoolMetrics::default(),
            config,
        }
    }

    /// 将请求容量向上取整到容量等级的整数倍。
    fn normalize_capacity(&self, min_capacity: usize) -> usize {
        let class = self.config.capacity_class.max(1);
        let wanted = min_capacity.max(1);
        wanted.div_ceil(class) * class
    }

    fn acquire_slot(
        &self,
        min_capacity: usize,
    ) -> wick_core::Result<(BytesMut, BufferHandle), CoreError> {
        let capacity = self.normalize_capacity(min_capacity);
        let mut guard = self.state.lock();
        let state = &mut *guard;

        // 优先复用容量足够的空闲槽位。
        let reuse = state.slots.iter().position(|slot| {
            matches!(&slot.status, SlotStatus::Free(buf) if buf.capacity() >= capacity)
        });
        if let Some(index) = reuse {
            let slot = &mut state.slots[index];
            let mut buf = match core::mem::replace(&mut slot.status, SlotStatus::Leased) {
                SlotStatus::Free(buf) => buf,
                _ => unreachable!("position 已保证槽位处于空闲态"),
            };
            buf.clear();
            slot.generation = next_generation(slot.generation);
            let handle = BufferHandle::new(index as u32, slot.generation);
            state.free_count -= 1;
            state.leased += 1;
            self.metrics.decrease_available(buf.capacity());
            self.metrics.increase_active_leases();
            return Ok((buf, handle));
        }

        if let Some(max) = self.config.max_leases
            && state.leased >= max
        {
            self.metrics.increase_failed_acquisitions();
            return Err(CoreError::new(
                codes::POOL_EXHAUSTED,
                "在借租约数已达上限，请退避重试或调高 max_leases",
            ));
        }

        // 分配新内存；复用空置槽位下标，否则追加新槽位。
        let buf = BytesMut::with_capacity(capacity);
        let actual = buf.capacity();
        let index = match state
            .slots
            .iter()
            .position(|slot| matches!(slot.status, SlotStatus::Vacant))
        {
            Some(index) => index,
            None => {
                state.slots.push(Slot {
                    generation: 0,
                    status: SlotStatus::Vacant,
                });
                state.slots.len() - 1
            }
        };
        let slot = &mut state.slots[index];
        slot.generation = next_generation(slot.generation);
        slot.status = SlotStatus::Leased;
        let handle = BufferHandle::new(index as u32, slot.generation);
        state.leased += 1;
        self.metrics.increase_on_new_allocation(actual);
        self.metrics.increase_active_leases();
        Ok((buf, handle))
    }

    fn release_frozen(&self, frozen: FrozenBuf) -> wick_core::Result<(), CoreError> {
        let handle = frozen.handle();
        let capacity = frozen.lease_capacity();
        let index = handle.index() as usize;
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let lease_is_current = state.slots.get(index).is_some_and(|slot| {
            slot.generation == handle.generation() && matches!(slot.status, SlotStatus::Leased)
        });
        if !lease_is_current {
            return Err(CoreError::new(
                codes::POOL_DOUBLE_RELEASE,
                "租约已结束或句柄世代陈旧，释放权属出现分叉",
            ));
        }

        match frozen.into_data().try_into_mut() {
            Ok(mut buf) => {
                // 重获独占所有权：内存可安全复用。
                buf.clear();
                if buf.capacity() == 0 {
                    // 空冻结缓冲可能退化为无分配表示，入链无意义。
                    state.slots[index].status = SlotStatus::Vacant;
                    self.metrics.decrease_on_loss(capacity);
                } else if state.free_count < self.config.max_free_buffers {
                    state.slots[index].status = SlotStatus::Free(buf);
                    state.free_count += 1;
                    self.metrics.increase_available(capacity);
                } else {
                    state.slots[index].status = SlotStatus::Vacant;
                    self.metrics.decrease_on_loss(capacity);
                }
            }
            Err(_) => {
                // 仍有视图引用该内存：槽位退役，内存由引用计数在视图消亡后交还。
                state.slots[index].status = SlotStatus::Vacant;
                self.metrics.decrease_on_loss(capacity);
            }
        }
        state.leased -= 1;
        self.metrics.decrease_active_leases();
        Ok(())
    }

    /// 弃租归还：调用方在冻结前放弃了可写租约。
    pub(crate) fn reclaim_abandoned(&self, handle: BufferHandle, mut buf: BytesMut) {
        let capacity = buf.capacity();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(slot) = state
            .slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .filter(|slot| matches!(slot.status, SlotStatus::Leased))
        else {
            // Drop 路径不得 panic；簿记不符时仅记账损耗。
            self.metrics.decrease_on_loss(capacity);
            return;
        };
        buf.clear();
        if state.free_count < self.config.max_free_buffers {
            slot.status = SlotStatus::Free(buf);
            state.free_count += 1;
            self.metrics.increase_available(capacity);
        } else {
            slot.status = SlotStatus::Vacant;
            self.metrics.decrease_on_loss(capacity);
        }
        state.leased -= 1;
        self.metrics.decrease_active_leases();
    }

    fn shrink_free_list(&self) -> usize {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut reclaimed = 0;
        for slot in state.slots.iter_mut() {
            if matches!(slot.status, SlotStatus::Free(_))
                && let SlotStatus::Free(buf) =
                    core::mem::replace(&mut slot.status, SlotStatus::Vacant)
            {
                reclaimed += buf.capacity();
            }
        }
        state.free_count = 0;
        self.metrics.decrease_on_shrink(reclaimed);
        reclaimed
    }

    fn snapshot(&self) -> PoolStats {
        let (slot_count, free_count) = {
            let state = self.state.lock();
            (state.slots.len(), state.free_count)
        };
        PoolStats {
            allocated_bytes: self.metrics.allocated_bytes.load(Ordering::Relaxed),
            resident_bytes: self.metrics.resident_bytes.load(Ordering::Relaxed),
            active_leases: self.metrics.active_leases.load(Ordering::Relaxed),
            available_bytes: self.metrics.available_bytes.load(Ordering::Relaxed),
            failed_acquisitions: self.metrics.failed_acquisitions.load(Ordering::Relaxed),
            custom_dimensions: vec![
                PoolStatDimension {
                    key: Cow::Borrowed("slot_count"),
                    value: slot_count,
                },
                PoolStatDimension {
                    key: Cow::Borrowed("slot_free_count"),
                    value: free_count,
                },
            ],
        }
    }
}

/// 世代自增；回绕时跳过 0，保证"世代 0 不存在合法租约"。
fn next_generation(current: u32) -> u32 {
    let next = current.wrapping_add(1);
    if next == 0 { 1 } else { next }
}

#[derive(Default)]
struct PoolMetrics {
    allocated_bytes: AtomicUsize,
    resident_bytes: AtomicUsize,
    available_bytes: AtomicUsize,
    active_leases: AtomicUsize,
    failed_acquisitions: AtomicU64,
}

impl PoolMetrics {
    fn increase_on_new_allocation(&self, capacity: usize) {
        self.allocated_bytes.fetch_add(capacity, Ordering::Relaxed);
        self.resident_bytes.fetch_add(capacity, Ordering::Relaxed);
    }

    fn increase_available(&self, capacity: usize) {
        self.available_bytes.fetch_add(capacity, Ordering::Relaxed);
    }

    fn decrease_available(&self, capacity: usize) {
        saturating_sub(&self.available_bytes, capacity);
    }

    fn decrease_on_loss(&self, capacity: usize) {
        saturating_sub(&self.allocated_bytes, capacity);
        saturating_sub(&self.resident_bytes, capacity);
    }

    fn decrease_on_shrink(&self, capacity: usize) {
        self.decrease_available(capacity);
        self.decrease_on_loss(capacity);
    }

    fn increase_active_leases(&self) {
        self.active_leases.fetch_add(1, Ordering::Relaxed);
    }

    fn decrease_active_leases(&self) {
        let _ = self
            .active_leases
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |prev| {
                Some(prev.saturating_sub(1))
            });
    }

    fn increase_failed_acquisitions(&self) {
        self.failed_acquisitions.fetch_add(1, Ordering::Relaxed);
    }
}

fn saturating_sub(target: &AtomicUsize, value: usize) {
    let _ = target.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_sub(value))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reusable_capacity_returns_to_pool() {
        let pool = SlotBufferPool::new();
        let mut buf = pool.acquire(64).expect("租借缓冲失败");
        assert!(buf.capacity() >= 64);
        buf.put_slice(&[1, 2, 3, 4]);
        pool.release(buf.freeze()).expect("归还失败");

        let snapshot = pool.statistics().expect("读取统计失败");
        assert!(snapshot.available_bytes >= 64);

        let second = pool.acquire(16).expect("复用缓冲失败");
        let after = pool.statistics().expect("读取统计失败");
        // 命中自由链表：总分配量不应因第二次租借增长。
        assert_eq!(after.allocated_bytes, snapshot.allocated_bytes);
        drop(second);
    }

    #[test]
    fn capacity_is_normalized_to_class() {
        let pool = SlotBufferPool::with_config(PoolConfig {
            capacity_class: 1024,
            ..PoolConfig::default()
        });
        let buf = pool.acquire(11).expect("租借缓冲失败");
        assert!(buf.capacity() >= 1024);
    }

    #[test]
    fn double_release_is_rejected_without_corrupting_state() {
        let pool = SlotBufferPool::new();
        let buf = pool.acquire(8).expect("租借缓冲失败");
        let frozen = buf.freeze();
        let alias = frozen.clone();
        pool.release(frozen).expect("首次归还必须成功");

        let err = pool.release(alias).expect_err("重复归还必须失败");
        assert_eq!(err.code(), codes::POOL_DOUBLE_RELEASE);

        // 簿记未被破坏：仍可正常租借与归还。
        let next = pool.acquire(8).expect("后续租借失败");
        pool.release(next.freeze()).expect("后续归还失败");
    }

    #[test]
    fn stale_generation_cannot_release_current_lease() {
        let pool = SlotBufferPool::with_config(PoolConfig {
            max_free_buffers: 1,
            ..PoolConfig::default()
        });
        let first = pool.acquire(8).expect("租借缓冲失败");
        let stale = first.freeze();
        let stale_alias = stale.clone();
        pool.release(stale).expect("首次归还必须成功");

        // 同一槽位被重新租出，世代已前进。
        let second = pool.acquire(8).expect("复用槽位失败");
        let err = pool
            .release(stale_alias)
            .expect_err("陈旧世代不得释放当前租约");
        assert_eq!(err.code(), codes::POOL_DOUBLE_RELEASE);
        pool.release(second.freeze()).expect("当前租约归还失败");
    }

    #[test]
    fn lease_ceiling_reports_exhaustion() {
        let pool = SlotBufferPool::with_config(PoolConfig {
            max_leases: Some(2),
            ..PoolConfig::default()
        });
        let a = pool.acquire(8).expect("第一份租约失败");
        let b = pool.acquire(8).expect("第二份租约失败");
        let err = pool.acquire(8).expect_err("超出上限必须失败");
        assert_eq!(err.code(), codes::POOL_EXHAUSTED);

        // 归还后容量恢复，租借可重试成功。
        pool.release(a.freeze()).expect("归还失败");
        let retry = pool.acquire(8).expect("退避后重试应成功");
        drop(retry);
        drop(b);

        let stats = pool.statistics().expect("读取统计失败");
        assert_eq!(stats.failed_acquisitions, 1);
    }

    #[test]
    fn aliased_release_retires_slot_instead_of_reusing_memory() {
        let pool = SlotBufferPool::new();
        let mut buf = pool.acquire(8).expect("租借缓冲失败");
        buf.put_slice(b"alias");
        let frozen = buf.freeze();
        let outstanding = frozen.clone();
        pool.release(frozen).expect("归还失败");

        // 内存仍被别名引用：不得进入自由链表。
        let stats = pool.statistics().expect("读取统计失败");
        assert_eq!(stats.available_bytes, 0);
        assert_eq!(stats.active_leases, 0);
        // 存活别名仍可读取内容，引用计数兜底内存安全。
        assert_eq!(outstanding.as_bytes(), b"alias");
    }

    #[test]
    fn shrink_drops_retained_free_memory() {
        let pool = SlotBufferPool::new();
        let buf = pool.acquire(128).expect("租借缓冲失败");
        pool.release(buf.freeze()).expect("归还失败");

        let before = pool.statistics().expect("读取统计失败");
        assert!(before.available_bytes >= 128);

        let reclaimed = pool.shrink_to_fit().expect("收缩失败");
        assert!(reclaimed >= 128);
        let after = pool.statistics().expect("读取统计失败");
        assert_eq!(after.available_bytes, 0);
    }
}
