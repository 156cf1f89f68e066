//! `lifecycle_contract` 集成测试：验证两种释放策略对"恰好一次归还"的执行情况。
//!
//! # 测试目标（Why）
//! - 释放权属是池化零拷贝方案的正确性核心：无论显式退役、容量驱逐还是拆除
//!   排空，同一租约必须恰好归还一次；
//! - 驱逐表的陈旧键跳过、并发登记等路径都要在公开 API 下验证。
//!
//! # 结构安排（How）
//! - `manual_*`：手动策略的退役、重复退役与排空；
//! - `tracked_*`：驱逐表的容量压力驱逐、退役后驱逐不重复、排空与并发登记。

use std::sync::Arc;
use std::thread;

use wick_buffer::{
    ManualLifecycle, SlotBufferPool, TrackedConfig, TrackedLifecycle, ViewLifecycle,
};
use wick_core::codes;

/// 手动策略：退役立即归还，且恰好一次。
#[test]
fn manual_retire_releases_exactly_once() {
    let pool = SlotBufferPool::new();
    let strategy = ManualLifecycle::new(pool.clone());

    let mut buf = pool.acquire(16).expect("租借缓冲失败");
    buf.put_slice(b"hello world");
    let view = strategy.adopt_all(buf.freeze()).expect("登记视图失败");

    // 消费方把需要长期保留的字节拷出，随后显式退役。
    let mut scratch = [0u8; 16];
    view.copy_to(&mut scratch, 0).expect("拷贝失败");
    assert_eq!(&scratch[..11], b"hello world");

    strategy.retire(&view).expect("首次退役必须成功");
    let err = strategy.retire(&view).expect_err("重复退役必须失败");
    assert_eq!(err.code(), codes::POOL_DOUBLE_RELEASE);

    let stats = pool.statistics().expect("读取统计失败");
    assert_eq!(stats.active_leases, 0);
}

/// 手动策略：重复登记同一物理区间被即刻拒绝。
#[test]
fn manual_duplicate_adoption_is_rejected() {
    let pool = SlotBufferPool::new();
    let strategy = ManualLifecycle::new(pool.clone());

    let frozen = pool.acquire(8).expect("租借缓冲失败").freeze();
    let alias = frozen.clone();
    let view = strategy.adopt_all(frozen).expect("首次登记失败");

    let err = strategy
        .adopt_all(alias)
        .expect_err("同一区间重复登记必须失败");
    assert_eq!(err.code(), codes::POOL_DOUBLE_RELEASE);

    strategy.retire(&view).expect("退役失败");
}

/// 手动策略：排空清算遗留视图，防止拆除期泄漏。
#[test]
fn manual_drain_flushes_leftovers() {
    let pool = SlotBufferPool::new();
    let strategy = ManualLifecycle::new(pool.clone());

    for _ in 0..3 {
        let buf = pool.acquire(8).expect("租借缓冲失败");
        strategy.adopt_all(buf.freeze()).expect("登记视图失败");
    }
    assert_eq!(strategy.outstanding(), 3);

    let released = strategy.drain().expect("排空失败");
    assert_eq!(released, 3);
    assert_eq!(strategy.outstanding(), 0);
    assert_eq!(
        pool.statistics().expect("读取统计失败").active_leases,
        0
    );
}

/// 驱逐表：容量压力触发最老条目的归还，且恰好一次。
#[test]
fn tracked_eviction_releases_exactly_once() {
    let pool = SlotBufferPool::new();
    let strategy =
        TrackedLifecycle::with_config(pool.clone(), TrackedConfig { max_entries: 2 });

    let first = strategy
        .adopt_all(pool.acquire(8).expect("租借失败").freeze())
        .expect("登记失败");
    let second = strategy
        .adopt_all(pool.acquire(8).expect("租借失败").freeze())
        .expect("登记失败");
    assert_eq!(strategy.tracked(), 2);

    // 第三次登记驱逐最老的 first，其缓冲随即归还。
    let third = strategy
        .adopt_all(pool.acquire(8).expect("租借失败").freeze())
        .expect("登记失败");
    assert_eq!(strategy.tracked(), 2);
    assert_eq!(pool.statistics().expect("读取统计失败").active_leases, 2);

    // 已被驱逐的视图再退役：表中已无条目，归还不会发生第二次。
    let err = strategy.retire(&first).expect_err("驱逐后退役必须失败");
    assert_eq!(err.code(), codes::POOL_DOUBLE_RELEASE);

    strategy.retire(&second).expect("退役失败");
    strategy.retire(&third).expect("退役失败");
    assert_eq!(pool.statistics().expect("读取统计失败").active_leases, 0);
}

/// 驱逐表：显式退役留下的陈旧队列键被安全跳过。
#[test]
fn tracked_eviction_skips_retired_keys() {
    let pool = SlotBufferPool::new();
    let strategy =
        TrackedLifecycle::with_config(pool.clone(), TrackedConfig { max_entries: 2 });

    let a = strategy
        .adopt_all(pool.acquire(8).expect("租借失败").freeze())
        .expect("登记失败");
    let b = strategy
        .adopt_all(pool.acquire(8).expect("租借失败").freeze())
        .expect("登记失败");
    strategy.retire(&a).expect("退役失败");

    // a 的键仍滞留在登记队列中；后续驱逐必须跳过它并命中 b。
    let c = strategy
        .adopt_all(pool.acquire(8).expect("租借失败").freeze())
        .expect("登记失败");
    let d = strategy
        .adopt_all(pool.acquire(8).expect("租借失败").freeze())
        .expect("登记失败");
    assert_eq!(strategy.tracked(), 2);

    let err = strategy.retire(&b).expect_err("b 已被驱逐");
    assert_eq!(err.code(), codes::POOL_DOUBLE_RELEASE);

    strategy.retire(&c).expect("退役失败");
    strategy.retire(&d).expect("退役失败");
    assert_eq!(pool.statistics().expect("读取统计失败").active_leases, 0);
}

/// 驱逐表：拆除排空归还全部在册缓冲，幂等。
#[test]
fn tracked_drain_releases_everything() {
    let pool = SlotBufferPool::new();
    let strategy = TrackedLifecycle::new(pool.clone());

    for _ in 0..5 {
        let buf = pool.acquire(8).expect("租借失败");
        strategy.adopt_all(buf.freeze()).expect("登记失败");
    }
    assert_eq!(strategy.tracked(), 5);

    assert_eq!(strategy.drain().expect("排空失败"), 5);
    assert_eq!(strategy.drain().expect("重复排空应为空操作"), 0);
    assert_eq!(pool.statistics().expect("读取统计失败").active_leases, 0);
}

/// 驱逐表：并发登记下驱逐与归还保持恰好一次，池簿记始终一致。
///
/// # 步骤说明（How）
/// 1. 4 个线程向同一驱逐表（上限 8）各登记 64 个视图，容量压力持续触发驱逐；
/// 2. 任何一次重复归还都会使 `adopt` 返回 `pool.double_release` 并令测试失败；
/// 3. 结束后排空，断言在借租约归零。
#[test]
fn tracked_concurrent_adoption_stays_exactly_once() {
    let pool = SlotBufferPool::new();
    let strategy = Arc::new(TrackedLifecycle::with_config(
        pool.clone(),
        TrackedConfig { max_entries: 8 },
    ));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            let strategy = strategy.clone();
            thread::spawn(move || {
                for _ in 0..64 {
                    let mut buf = pool.acquire(32).expect("租借失败");
                    buf.put_slice(b"tracked");
                    strategy
                        .adopt_all(buf.freeze())
                        .expect("并发登记或驱逐出现重复归还");
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("工作线程异常退出");
    }

    strategy.drain().expect("排空失败");
    assert_eq!(pool.statistics().expect("读取统计失败").active_leases, 0);
}
