//! 内部 sealed 模块用于控制外部扩展边界。
//!
//! # 设计背景（Why）
//! - `wick-core` 向外暴露多个可实现的 Trait，需要在 SemVer 框架下保持未来演进空间。
//! - 通过统一的 `Sealed` 标记，可以在不破坏公开 API 的情况下为 Trait 增加默认方法
//!   或强化约束。
//!
//! # 逻辑解析（How）
//! - 定义私有模块级 Trait `Sealed`，并对所有类型提供 blanket 实现。
//! - 对外可实现的 Trait 通过 `: crate::sealed::Sealed` 间接依赖该标记。
//! - 若未来需要限制实现者集合，可在此处收紧 blanket 实现条件，而无需修改公开
//!   Trait 的签名。
//!
//! # 契约说明（What）
//! - `Sealed` 无需调用方显式实现；任意类型默认满足该约束。
pub(crate) trait Sealed {}

impl<T: ?Sized> Sealed for T {}
