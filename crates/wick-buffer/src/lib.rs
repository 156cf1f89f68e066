#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! `wick-buffer` 提供面向 `wick-core` 缓冲契约的具体实现。
//!
//! # 模块定位（Why）
//! - 为 `wick-core` 的抽象契约提供基于 `bytes::BytesMut`/`Bytes` 的高性能实现，
//!   支撑零拷贝流水线与编码器的内存池任务。
//! - 补足 `wick-core` 仅定义 trait、不落地实体的问题：槽位池、可写租约、冻结
//!   缓冲、零拷贝视图与两种释放策略都在此 crate 成形。
//!
//! # 设计概要（How）
//! - [`SlotBufferPool`]：自由链表 + 槽位表 + 世代纪元，归还判定在世代层面完成，
//!   重复释放不可能破坏簿记；
//! - [`PooledBuf`] 与 [`FrozenBuf`]：可写租约与冻结缓冲，写后冻结的转换沿用
//!   引用计数语义，池只在重获独占所有权时复用内存；
//! - [`BufView`]：按 `(句柄, 偏移, 长度)` 结构化比较的零拷贝视图，可直接充当
//!   映射键与编码器输入；
//! - [`lifecycle`] 提供释放权属的两种策略：显式手动归还与驱逐驱动的延迟归还，
//!   二者实现同一个能力契约，按流水线构造期一次性选定。
//!
//! # 命名约定（Consistency）
//! - 延续 `wick-core::buffer` 的术语；所有公开类型满足 `Send + Sync + 'static`，
//!   契合跨线程流水线的对象安全要求。

extern crate alloc;

pub mod lifecycle;
mod pool;
mod pooled_buf;
mod view;

pub use lifecycle::{ManualLifecycle, TrackedConfig, TrackedLifecycle, ViewLifecycle};
pub use pool::{PoolConfig, SlotBufferPool};
pub use pooled_buf::{FrozenBuf, PooledBuf};
pub use view::{BufView, ViewKey};
