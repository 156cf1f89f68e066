//! `pool_contract` 集成测试：验证 `SlotBufferPool` 在真实调用路径下的契约执行情况。
//!
//! # 测试目标（Why）
//! - 保障缓冲租借、归还、统计等核心流程能在 crate 公开 API 下正确协作；
//! - 通过外部 crate 视角模拟用户调用，避免依赖内部实现细节；
//! - 并发场景下验证"在借缓冲绝不重复租出"这一池安全性的根本承诺。
//!
//! # 结构安排（How）
//! - `concurrent_leases_never_alias`：多线程交错租借/归还，断言任意时刻不存在
//!   两个存活租约共享同一 `(槽位, 世代)` 身份；
//! - `concurrent_churn_preserves_payload`：以内容校验兜底别名检测——若同一块
//!   内存被同时租给两方，写入模式必然互相踩踏；
//! - 其余测试覆盖统计对账等全链路场景。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use wick_buffer::SlotBufferPool;

/// 验证并发租借绝不出现身份别名。
///
/// # 步骤说明（How）
/// 1. 8 个线程各执行 64 轮租借-写入-冻结-归还；
/// 2. 每次租借后把 `(槽位, 世代)` 插入全局存活集合，插入失败即意味着同一租约
///    被重复租出；
/// 3. 归还前先从集合移除，保证"从池的视角租约已结束"先于"内存可被复用"。
#[test]
fn concurrent_leases_never_alias() {
    let pool = SlotBufferPool::new();
    let live: Arc<Mutex<HashSet<(u32, u32)>>> = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            let live = live.clone();
            thread::spawn(move || {
                for round in 0..64u32 {
                    let mut buf = pool.acquire(64).expect("租借缓冲失败");
                    let id = (buf.handle().index(), buf.handle().generation());
                    assert!(
                        live.lock().expect("存活集合中毒").insert(id),
                        "同一租约被重复租出"
                    );
                    buf.put_slice(&round.to_le_bytes());
                    let frozen = buf.freeze();
                    assert!(
                        live.lock().expect("存活集合中毒").remove(&id),
                        "存活集合簿记失衡"
                    );
                    pool.release(frozen).expect("归还失败");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("工作线程异常退出");
    }

    let stats = pool.statistics().expect("读取统计失败");
    assert_eq!(stats.active_leases, 0, "全部归还后不应有在借租约");
    assert!(live.lock().expect("存活集合中毒").is_empty());
}

/// 以写入模式校验兜底别名检测：并发持有期间内容不得被第三方踩踏。
#[test]
fn concurrent_churn_preserves_payload() {
    let pool = SlotBufferPool::new();

    let handles: Vec<_> = (0..4)
        .map(|worker: u8| {
            let pool = pool.clone();
            thread::spawn(move || {
                for round in 0..32u8 {
                    let mut buf = pool.acquire(32).expect("租借缓冲失败");
                    let pattern = [worker, round, worker ^ round, 0xA5];
                    buf.put_slice(&pattern);
                    let frozen = buf.freeze();
                    assert_eq!(frozen.as_bytes(), &pattern, "在借期间内容被篡改");
                    pool.release(frozen).expect("归还失败");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("工作线程异常退出");
    }
}

/// 统计指标跨越完整生命周期保持一致。
#[test]
fn stats_track_allocation_lifecycle() {
    let pool = SlotBufferPool::new();
    let before = pool.statistics().expect("读取统计失败");
    assert_eq!(before.active_leases, 0);
    assert_eq!(before.allocated_bytes, 0);

    let buf = pool.acquire(256).expect("租借缓冲失败");
    let during = pool.statistics().expect("读取统计失败");
    assert_eq!(during.active_leases, 1);
    assert!(during.allocated_bytes >= 256);

    pool.release(buf.freeze()).expect("归还失败");
    let after = pool.statistics().expect("读取统计失败");
    assert_eq!(after.active_leases, 0);
    assert!(after.available_bytes >= 256);
}
