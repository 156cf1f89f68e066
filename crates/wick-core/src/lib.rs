#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "wick-core: 池化零拷贝缓冲与标签线格式编码的核心契约。"]
#![doc = ""]
#![doc = "== 职责边界 =="]
#![doc = "本 crate 只定义契约：错误域、缓冲读取与池化接口、线格式编码器状态机与字节汇。"]
#![doc = "具体实现分别由 `wick-buffer`（池与视图）与 `wick-codec-tagwire`（编码器）落地。"]
#![doc = ""]
#![doc = "== 内存分配依赖 =="]
#![doc = "`wick-core` 定位于 `no_std + alloc` 场景：契约依赖 [`alloc`] 中的 `Box`、`Vec`、`Cow`"]
#![doc = "等类型支撑对象安全与错误链。纯 `no_std`（无分配器）环境暂不支持。"]

extern crate alloc;

mod sealed;

pub mod buffer;
pub mod codec;
pub mod error;
pub mod prelude;

pub use buffer::{BufferHandle, BufferPool, PoolStatDimension, PoolStats, ReadableBuffer};
pub use codec::{ByteSink, FieldInfo, FrameWriter, ListInfo, TextPolicy, WireKind};
pub use error::{CoreError, ErrorCause, Result, codes};

use core::fmt;

/// `wick-core` 中所有错误必须实现的 `no_std` 基础 Trait。
///
/// # 设计背景（Why）
/// - `std::error::Error` 在 `no_std` 环境中不可用，需要一个对象安全、平台无关的
///   错误抽象来串联底层错误链。
/// - 该 Trait 作为所有错误类型的最小公共接口，帮助框架在 `alloc` 场景下完成跨模块
///   错误传递。
///
/// # 逻辑解析（How）
/// - 约束实现者提供 `Debug` 与 `Display`，便于日志与可观测性收集。
/// - `source` 递归返回链路上的上游错误，与 `std::error::Error::source` 语义一致，
///   从而兼容现有生态的错误处理约定。
///
/// # 契约说明（What）
/// - **前置条件**：实现类型必须是 `'static` 生命周期；若需包装进 [`ErrorCause`]，
///   还需满足 `Send + Sync`。
/// - **后置条件**：`source` 返回的引用生命周期受限于 `self`，以防悬垂引用。
///
/// # 设计取舍与风险（Trade-offs）
/// - 未引入 `Send + Sync` 约束，避免对 `no_std` 设备强加多余负担；需要线程安全时
///   请使用 [`ErrorCause`] 类型别名。
/// - 若底层错误不提供 `source`，错误链在此处终止，这是设计上允许的边界情况。
pub trait Error: fmt::Debug + fmt::Display + crate::sealed::Sealed {
    /// 返回当前错误的上游来源。
    fn source(&self) -> Option<&(dyn Error + 'static)>;
}

impl<E> Error for alloc::boxed::Box<E>
where
    E: Error + ?Sized,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        (**self).source()
    }
}
