use criterion::{Criterion, black_box};
use std::{env, time::Duration};

use wick_buffer::{
    ManualLifecycle, SlotBufferPool, TrackedConfig, TrackedLifecycle, ViewLifecycle,
};

/// 对比两种释放策略在"租借 → 写入 → 冻结 → 登记 → 消费 → 归还"热路径上的成本。
///
/// # 设计背景（Why）
/// - 手动策略退役即归还，延迟确定；驱逐策略把归还推迟到容量压力，换取转交
///   视图时的安全性。二者的单次往返成本差异需要基准量化，指导流水线选型。
///
/// # 逻辑解析（How）
/// - 每轮迭代：租借缓冲、写入 "hello world"、冻结、经策略登记出视图、把字节
///   拷贝到暂存区（模拟消费方），随后由策略完成归还（手动：显式退役；驱逐：
///   容量压力自动驱逐）。
fn bench_manual_release(c: &mut Criterion) {
    let pool = SlotBufferPool::new();
    let strategy = ManualLifecycle::new(pool.clone());
    let mut scratch = [0u8; 100];

    c.bench_function("release_manual", |b| {
        b.iter(|| {
            let mut buf = pool.acquire(64).expect("租借失败");
            buf.put_slice(b"hello world");
            let view = strategy.adopt_all(buf.freeze()).expect("登记失败");
            view.copy_to(&mut scratch, 0).expect("拷贝失败");
            strategy.retire(&view).expect("退役失败");
            black_box(scratch[0])
        });
    });

    strategy.drain().expect("排空失败");
}

fn bench_tracked_release(c: &mut Criterion) {
    let pool = SlotBufferPool::new();
    let strategy =
        TrackedLifecycle::with_config(pool.clone(), TrackedConfig { max_entries: 1024 });
    let mut scratch = [0u8; 100];

    c.bench_function("release_tracked", |b| {
        b.iter(|| {
            let mut buf = pool.acquire(64).expect("租借失败");
            buf.put_slice(b"hello world");
            let view = strategy.adopt_all(buf.freeze()).expect("登记失败");
            view.copy_to(&mut scratch, 0).expect("拷贝失败");
            black_box(scratch[0])
        });
    });

    strategy.drain().expect("排空失败");
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_manual_release(&mut criterion);
    bench_tracked_release(&mut criterion);
    criterion.final_summary();
}
