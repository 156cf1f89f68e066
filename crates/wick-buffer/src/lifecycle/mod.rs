//! 释放权属的生命周期策略。
//!
//! # 模块架构（Why）
//! - 零拷贝共享只有在"恰好一个所有者做出释放决策"时才是安全的。本模块把该
//!   决策显式建模为一个小能力契约（登记视图 / 退役视图 / 排空），并提供两个
//!   互斥的具体实现：
//!   - [`ManualLifecycle`]：退役即归还，延迟最低、时序确定，但退役早于消费方
//!     读完即是权属错误，退役遗忘即是泄漏；
//!   - [`TrackedLifecycle`]：驱逐驱动的延迟归还——有界表持有视图与缓冲的绑定，
//!     容量压力、显式退役或排空触发归还，以非确定的释放时机换取"没有组件还
//!     可能需要该视图之前绝不归还"的保护。
//! - 策略在流水线构造期一次性选定，不是运行期可切换的带隐藏状态接口。
//!
//! # 设计总览（How）
//! - 两种策略都以 `(ViewKey -> FrozenBuf)` 映射记录在册视图：从映射中移出
//!   条目即获得唯一的归还资格（值按移动语义交出），并发驱逐与显式退役天然
//!   至多一次；
//! - 池側的世代核对是第二道防线：即使策略实现出错，重复归还也只会得到
//!   [`codes::POOL_DOUBLE_RELEASE`](wick_core::codes::POOL_DOUBLE_RELEASE)，
//!   不会破坏池簿记。
//!
//! # 契约说明（What）
//! - 同一批缓冲只能交给一个策略实例管理，且不得与直接的
//!   [`SlotBufferPool::release`](crate::SlotBufferPool::release) 调用混用；
//! - 流水线拆除时必须调用 [`ViewLifecycle::drain`] 排空在册缓冲，避免泄漏。

mod manual;
mod tracked;

pub use manual::ManualLifecycle;
pub use tracked::{TrackedConfig, TrackedLifecycle};

use wick_core::CoreError;

use crate::pooled_buf::FrozenBuf;
use crate::view::BufView;

/// `ViewLifecycle` 是释放权属的能力契约：登记视图、退役视图、排空。
///
/// # 契约说明（What）
/// - [`adopt`](Self::adopt)：把冻结缓冲纳入策略管理，返回其上的零拷贝视图；
///   自此释放决策归策略所有，调用方不得再直接向池归还该缓冲。重复登记同一
///   物理区间会在将来导致两次归还，因此以
///   [`codes::POOL_DOUBLE_RELEASE`](wick_core::codes::POOL_DOUBLE_RELEASE)
///   即刻拒绝；
/// - [`retire`](Self::retire)：宣告视图使用完毕；未登记或已退役的视图同样以
///   `pool.double_release` 失败；
/// - [`drain`](Self::drain)：归还所有仍在册的缓冲并返回归还数量，供流水线
///   拆除时兜底。
///
/// # 风险提示（Trade-offs）
/// - 契约不追踪视图的克隆：`BufView` 克隆共享同一身份键，任何一份都可用于
///   退役，但只有第一次退役成功。
pub trait ViewLifecycle: Send + Sync + 'static {
    /// 登记冻结缓冲上 `[offset, offset + len)` 的视图，移交释放决策权。
    fn adopt(
        &self,
        frozen: FrozenBuf,
        offset: usize,
        len: usize,
    ) -> wick_core::Result<BufView, CoreError>;

    /// 登记覆盖全部内容的视图。
    fn adopt_all(&self, frozen: FrozenBuf) -> wick_core::Result<BufView, CoreError> {
        let len = frozen.len();
        self.adopt(frozen, 0, len)
    }

    /// 宣告视图使用完毕。
    fn retire(&self, view: &BufView) -> wick_core::Result<(), CoreError>;

    /// 归还所有仍在册的缓冲，返回归还数量。
    fn drain(&self) -> wick_core::Result<usize, CoreError>;
}
