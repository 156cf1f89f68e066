//! 缓冲契约模块。
//!
//! # 模块架构（Why）
//! - 将读取契约、租约标识与池化接口拆分为独立子模块，对齐 Netty、Tokio Bytes 等
//!   主流框架的职责分离实践。
//! - 契约层不落地任何内存策略：具体的槽位池、冻结缓冲与零拷贝视图由
//!   `wick-buffer` 实现，上层组件只依赖此处的抽象。
//!
//! # 设计总览（How）
//! - [`readable`] 定义对象安全的只读缓冲协议，供编码器以零拷贝方式消费视图；
//! - [`handle`] 定义租约标识：`(槽位, 世代)` 二元组，是显式化“弱引用可达性”的
//!   世代检查基石；
//! - [`pool`] 约束池化租借与归还接口，并提供统计快照结构。

pub mod handle;
pub mod pool;
pub mod readable;

pub use handle::BufferHandle;
pub use pool::{BufferPool, PoolStatDimension, PoolStats};
pub use readable::ReadableBuffer;
