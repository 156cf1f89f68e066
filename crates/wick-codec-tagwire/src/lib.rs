#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # wick-codec-tagwire
//!
//! ## 教案目的（Why）
//! - **定位**：标签分隔变长线格式（tagwire）的帧式编码器，负责把字段与原语值
//!   按调用顺序序列化为紧凑字节流。
//! - **架构角色**：位于池化缓冲之上、消息/模式编译层之下——上游以
//!   `wick-core::ByteSink` 提供输出介质（池化缓冲、`Vec<u8>` 或任意追加式汇），
//!   本 crate 负责标签、变长整数与长度前缀的铺设。
//! - **设计策略**：交付完整的原语写入面（变长/折叠变长/定长/布尔/枚举/浮点/
//!   文本/不透明字节）、帧配对状态机与打包列表布局三项基线能力。
//!
//! ## 交互契约（What）
//! - **依赖输入**：实现 `wick-core` 的 [`FrameWriter`] 契约；不透明字节经
//!   `ReadableBuffer` 零拷贝接入，无中间复制。
//! - **输出职责**：
//!   1. [`TagWriter`] 跨单一字节汇维护帧状态机并发射字节；
//!   2. [`varint`] 模块提供变长整数与折叠（zigzag）原语的编码/解码函数；
//!   3. [`put_len_prefixed`] 提供无标签的长度前缀写入，供直接向池化缓冲铺设
//!      载荷的调用方使用。
//! - **前置条件**：每个编码器实例同一时刻只由一个线程驱动；汇只需追加与冲刷
//!   两种能力。
//!
//! ## 实现策略（How）
//! - **标签发射**：每个原语写入时携带最内层字段的标签（字段编号左移三位并入
//!   线型）；打包列表内省略标签，元素在内部暂存区连续铺设，`end_list` 统一补
//!   "标签 + 长度前缀"。
//! - **失败语义**：配对失衡与字段外写原语即刻失败并使编码器中毒；中毒后除
//!   `reset` 外一切操作被拒绝，保证不会发射半帧字节。
//!
//! ## 风险提示（Trade-offs）
//! - **打包暂存**：汇不支持位置回写，打包列表在闭合前整体驻留暂存区；超大
//!   列表应按批拆分；
//! - **文本策略**：严格模式在校验失败时整次写入不落一字节；替换模式按替换后
//!   字节数计算长度前缀，二者在构造时一次性选定。

extern crate alloc;

pub mod varint;
mod writer;

pub use writer::{TagWriter, put_len_prefixed};
