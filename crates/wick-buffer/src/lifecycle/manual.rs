use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use spin::Mutex;
use wick_core::{CoreError, codes};

use crate::lifecycle::ViewLifecycle;
use crate::pool::SlotBufferPool;
use crate::pooled_buf::FrozenBuf;
use crate::view::{BufView, ViewKey};

/// `ManualLifecycle` 实现显式归还策略：退役即归还。
///
/// # 设计动机（Why）
/// - 这是延迟最低、时序最确定的策略：调用方在消费完视图后立即退役，缓冲当场
///   回到池里，下一次租借即可复用；
/// - 代价是权属纪律完全由调用方承担：过早退役意味着消费方还没读完就失去了
///   复用保护（池不会再租出该内存，但流水线语义已破坏），遗忘退役则是泄漏。
///
/// # 结构设计（How）
/// - 在册表 `ViewKey -> FrozenBuf` 记录每个已登记视图对应的归还凭据；退役时
///   按移动语义移出条目并立即调用池的归还，表中不存在即说明权属分叉；
/// - [`drain`](ViewLifecycle::drain) 在拆除时清算：正常使用下在册表应为空，
///   非零返回值即是泄漏的量化证据。
pub struct ManualLifecycle {
    pool: SlotBufferPool,
    outstanding: Mutex<BTreeMap<ViewKey, FrozenBuf>>,
}

impl ManualLifecycle {
    /// 绑定目标池，创建手动策略实例。
    pub fn new(pool: SlotBufferPool) -> Self {
        Self {
            pool,
            outstanding: Mutex::new(BTreeMap::new()),
        }
    }

    /// 返回当前在册视图数量，供泄漏巡检。
    pub fn outstanding(&self) -> usize {
        self.outstanding.lock().len()
    }
}

impl ViewLifecycle for ManualLifecycle {
    fn adopt(
        &self,
        frozen: FrozenBuf,
        offset: usize,
        len: usize,
    ) -> wick_core::Result<BufView, CoreError> {
        let view = BufView::wrap(&frozen, offset, len)?;
        let mut outstanding = self.outstanding.lock();
        if outstanding.contains_key(&view.key()) {
            return Err(CoreError::new(
                codes::POOL_DOUBLE_RELEASE,
                "同一视图重复登记，将导致两次归还",
            ));
        }
        outstanding.insert(view.key(), frozen);
        Ok(view)
    }

    fn retire(&self, view: &BufView) -> wick_core::Result<(), CoreError> {
        let frozen = self.outstanding.lock().remove(&view.key());
        match frozen {
            Some(frozen) => self.pool.release(frozen),
            None => Err(CoreError::new(
                codes::POOL_DOUBLE_RELEASE,
                "视图未登记或已退役",
            )),
        }
    }

    fn drain(&self) -> wick_core::Result<usize, CoreError> {
        let drained: Vec<FrozenBuf> = {
            let mut outstanding = self.outstanding.lock();
            let map = core::mem::take(&mut *outstanding);
            map.into_values().collect()
        };
        let mut released = 0;
        let mut first_err = None;
        for frozen in drained {
            match self.pool.release(frozen) {
                Ok(()) => released += 1,
                Err(err) => {
                    if first_err.is_none() {
                        first_err = Some(err);
                    }
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(released),
        }
    }
}
