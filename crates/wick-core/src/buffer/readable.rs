use crate::sealed::Sealed;

/// `ReadableBuffer` 定义对象安全的只读缓冲契约。
///
/// # 设计背景（Why）
/// - **对标实践**：综合 Tokio `bytes::Buf`、Netty `ByteBuf`、gRPC C++ `Slice` 的
///   只读语义，抽象出编码器消费字节视图所需的最小读取面。
/// - **框架定位**：编码器的不透明字节写入（length-delimited bytes）需要一个统一
///   的零拷贝输入口径，避免在热路径中因具体视图类型不同而复制。
///
/// # 逻辑解析（How）
/// - `chunk` 暴露当前可读的连续字节块；本契约约定实现必须是单段连续内存，
///   因此 `chunk().len() == remaining()` 恒成立。
/// - 刻意不提供 `advance`/`split_to` 等游标推进操作：视图是不可变值，读取不
///   消耗内容，这也是它能充当映射键的前提。
///
/// # 契约说明（What）
/// - **前置条件**：实现必须保证线程安全或引用计数语义，以满足 `Send + Sync`；
/// - **后置条件**：在视图生命周期内，`chunk` 返回的切片内容保持不变。
///
/// # 风险提示（Trade-offs）
/// - 放弃多分片（rope）形态换取契约简单性；需要分片聚合的场景应在上游先行
///   扁平化。
pub trait ReadableBuffer: Send + Sync + 'static + Sealed {
    /// 返回可读字节总数。
    fn remaining(&self) -> usize;

    /// 返回当前可直接读取的连续字节块。
    fn chunk(&self) -> &[u8];

    /// 判断缓冲区是否为空。
    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
