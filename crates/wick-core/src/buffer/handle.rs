//! 租约标识：以 `(槽位, 世代)` 显式化缓冲的生命周期纪元。

/// `BufferHandle` 是一次缓冲租借的稳定身份。
///
/// # 设计背景（Why）
/// - 归还判定需要回答“这次释放对应的是当前租约，还是一个早已结束的租约”。
///   在缺乏自动可达性追踪的系统语言里，该判定以显式世代计数表达：槽位每次被
///   重新租出时世代自增，携带旧世代的句柄立刻失效。
/// - 视图的身份比较（而非内容比较）同样建立在该句柄之上：两个字节相等的视图
///   若来自不同租约，必须是不同的键。
///
/// # 契约说明（What）
/// - `index`：池内槽位下标，在池的生命周期内稳定；
/// - `generation`：租约纪元，从 1 起单调递增；
/// - **后置条件**：`Eq`/`Ord`/`Hash` 均为结构化比较，可直接用作映射键。
///
/// # 风险提示（Trade-offs）
/// - 世代使用 `u32`，以单槽位每秒千次的租借频率计算约 49 天回绕一次；池实现
///   在回绕时跳过 0 值，保证“世代 0 不存在合法租约”。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferHandle {
    index: u32,
    generation: u32,
}

impl BufferHandle {
    /// 由池实现构造句柄；`generation` 不得为 0。
    pub fn new(index: u32, generation: u32) -> Self {
        debug_assert!(generation != 0, "世代 0 保留给“从未租出”状态");
        Self { index, generation }
    }

    /// 返回槽位下标。
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 返回租约世代。
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_structurally() {
        let a = BufferHandle::new(3, 1);
        let b = BufferHandle::new(3, 1);
        let c = BufferHandle::new(3, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }
}
