//! 编码契约模块。
//!
//! # 模块架构（Why）
//! - 契约层只规定“写什么、以什么顺序写、失败如何表达”，不规定字节如何落地：
//!   varint/zigzag/定长小端等具体编码由 `wick-codec-tagwire` 实现。
//! - 拆分三个子模块对齐职责：[`fields`] 承载字段与列表元数据，[`sink`] 约束
//!   输出字节汇，[`writer`] 定义帧式写入状态机契约。
//!
//! # 设计总览（How）
//! - 编码器是同步的调用-返回状态机：一次一个值或一个帧，按调用顺序发射，
//!   不做跨字段重排或合批；
//! - 所有结构性违规（配对失衡、字段外写原语）当场失败并使编码器中毒，直到
//!   显式复位。

pub mod fields;
pub mod sink;
pub mod writer;

pub use fields::{FieldInfo, ListInfo, WireKind};
pub use sink::ByteSink;
pub use writer::{FrameWriter, TextPolicy};
