use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

use spin::Mutex;
use wick_core::{CoreError, codes};

use crate::lifecycle::ViewLifecycle;
use crate::pool::SlotBufferPool;
use crate::pooled_buf::FrozenBuf;
use crate::view::{BufView, ViewKey};

/// 驱逐表配置。
///
/// # 契约说明（What）
/// - `max_entries`：在册条目数上限；登记第 `max_entries + 1` 个视图时，按
///   先进先出顺序驱逐最老的条目并归还其缓冲。上限必须大于 0。
#[derive(Debug, Clone)]
pub struct TrackedConfig {
    pub max_entries: usize,
}

impl Default for TrackedConfig {
    fn default() -> Self {
        Self { max_entries: 1024 }
    }
}

/// `TrackedLifecycle` 实现驱逐驱动的延迟归还策略。
///
/// # 设计动机（Why）
/// - 当视图会被转交给其它组件、显式退役点难以确定时，手动策略的"过早退役"
///   风险不可接受。本策略把归还决策交给容量压力：只要表未满，缓冲就保持在册，
///   任何仍持有视图的组件都能继续读取；
/// - 这是一个缓存形态的决策——"没有组件还可能需要该视图之前不归还"——代价是
///   释放时机非确定、内存占用高于手动策略。
///
/// # 核心机制（How）
/// - 在册表 `ViewKey -> FrozenBuf` 加一条先进先出登记队列：容量超限时从队首
///   开始驱逐（跳过已显式退役的陈旧键）；
/// - 条目移除即获得唯一归还资格（值按移动语义交出），因此并发的"驱逐"与
///   "显式退役"对同一条目至多归还一次；池侧世代核对兜底，重复归还只会得到
///   [`codes::POOL_DOUBLE_RELEASE`]，绝不破坏池簿记；
/// - 归还调用在表锁之外执行，表锁临界区内只做映射操作。
///
/// # 契约说明（What）
/// - 拆除流水线前必须调用 [`drain`](ViewLifecycle::drain)，否则在册缓冲的
///   租约将保持在借状态（泄漏）；
/// - 在册期间显式向池归还同一缓冲属于权属分叉，后续驱逐会以
///   `pool.double_release` 暴露该错误。
pub struct TrackedLifecycle {
    pool: SlotBufferPool,
    config: TrackedConfig,
    table: Mutex<TableInner>,
}

struct TableInner {
    entries: BTreeMap<ViewKey, FrozenBuf>,
    order: VecDeque<ViewKey>,
}

impl TrackedLifecycle {
    /// 以默认配置绑定目标池。
    pub fn new(pool: SlotBufferPool) -> Self {
        Self::with_config(pool, TrackedConfig::default())
    }

    /// 以显式配置绑定目标池。
    pub fn with_config(pool: SlotBufferPool, config: TrackedConfig) -> Self {
        debug_assert!(config.max_entries > 0, "驱逐表上限必须大于 0");
        Self {
            pool,
            config,
            table: Mutex::new(TableInner {
                entries: BTreeMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// 返回当前在册条目数，供容量观测。
    pub fn tracked(&self) -> usize {
        self.table.lock().entries.len()
    }

    /// 归还一组被移出的条目；第一个错误在全部处理后上抛。
    fn release_evicted(
        &self,
        evicted: Vec<FrozenBuf>,
    ) -> wick_core::Result<usize, CoreError> {
        let mut released = 0;
        let mut first_err = None;
        for frozen in evicted {
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

impl ViewLifecycle for TrackedLifecycle {
    fn adopt(
        &self,
        frozen: FrozenBuf,
        offset: usize,
        len: usize,
    ) -> wick_core::Result<BufView, CoreError> {
        let view = BufView::wrap(&frozen, offset, len)?;
        let evicted: Vec<FrozenBuf> = {
            let mut table = self.table.lock();
            if table.entries.contains_key(&view.key()) {
                return Err(CoreError::new(
                    codes::POOL_DOUBLE_RELEASE,
                    "同一视图重复登记，将导致两次归还",
                ));
            }
            table.entries.insert(view.key(), frozen);
            table.order.push_back(view.key());

            let mut evicted = Vec::new();
            while table.entries.len() > self.config.max_entries {
                // 跳过已显式退役的陈旧键，直到移出一个在册条目。
                match table.order.pop_front() {
                    Some(key) => {
                        if let Some(frozen) = table.entries.remove(&key) {
                            evicted.push(frozen);
                        }
                    }
                    None => break,
                }
            }
            evicted
        };
        self.release_evicted(evicted)?;
        Ok(view)
    }

    fn retire(&self, view: &BufView) -> wick_core::Result<(), CoreError> {
        let frozen = self.table.lock().entries.remove(&view.key());
        match frozen {
            Some(frozen) => self.pool.release(frozen),
            None => Err(CoreError::new(
                codes::POOL_DOUBLE_RELEASE,
                "视图未登记、已退役或已被驱逐",
            )),
        }
    }

    fn drain(&self) -> wick_core::Result<usize, CoreError> {
        let drained: Vec<FrozenBuf> = {
            let mut table = self.table.lock();
            table.order.clear();
            let entries = core::mem::take(&mut table.entries);
            entries.into_values().collect()
        };
        self.release_evicted(drained)
    }
}
