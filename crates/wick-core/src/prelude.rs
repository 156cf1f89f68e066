//! # wick-core Prelude
//!
//! ## 教案级说明（Why）
//! - **统一导入面**：为上层 crate 提供稳定、浅路径的导入入口，避免业务代码出现
//!   大量 `wick_core::codec::fields::...` 等深层路径；
//! - **范围控制**：仅收录跨模块高频依赖的类型；统计快照等边缘类型仍建议使用
//!   明确命名空间。
//!
//! ## 收录内容（What）
//! - 错误体系：[`CoreError`]、[`Result`]、[`codes`]；
//! - 缓冲契约：[`BufferHandle`]、[`BufferPool`]、[`ReadableBuffer`]；
//! - 编码契约：[`FrameWriter`]、[`ByteSink`]、[`FieldInfo`]、[`ListInfo`]、
//!   [`WireKind`]、[`TextPolicy`]。

pub use crate::buffer::{BufferHandle, BufferPool, ReadableBuffer};
pub use crate::codec::{ByteSink, FieldInfo, FrameWriter, ListInfo, TextPolicy, WireKind};
pub use crate::error::{CoreError, Result, codes};
