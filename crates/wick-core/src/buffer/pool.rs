use crate::{CoreError, sealed::Sealed};
use alloc::borrow::Cow;
use alloc::vec::Vec;

/// `BufferPool` 规定缓冲区租借与归还的统一接口。
///
/// # 设计背景（Why）
/// - 综合 Netty `ByteBufAllocator`、Envoy `WatermarkBufferFactory`、Tokio
///   `BytesMut` 共享池实践，确保在高并发场景稳定控制内存峰值。
/// - 与常见分配器契约不同，本接口把**归还**也纳入契约：释放决策的归属是池化
///   零拷贝方案的核心，必须在类型层面可见，而非隐藏在 `Drop` 里。
///
/// # 逻辑解析（How）
/// - 采用关联类型的泛型层契约（而非对象层）：`release` 需要按值消费具体的冻结
///   缓冲类型以移交所有权，类型擦除会丢失这一语义。
/// - `acquire` 负责租借指定最小容量的可写缓冲，底层可采用 slab、分级自由链表
///   或 arena；`shrink_to_fit` 主动归还冗余容量；`statistics` 提供池化观测指标。
///
/// # 契约说明（What）
/// - **输入参数**：`min_capacity` 表示调用方当前写入批次最少需要的字节数；
/// - **返回值**：`acquire` 成功后返回的缓冲可写容量不小于 `min_capacity`；
///   `shrink_to_fit` 返回实际回收的字节数；
/// - **前置条件**：池实现必须线程安全；
/// - **后置条件**：同一租约的 `release` 恰好成功一次，重复释放必须以
///   [`codes::POOL_DOUBLE_RELEASE`](crate::codes::POOL_DOUBLE_RELEASE) 失败且
///   不得破坏池簿记。
///
/// # 设计考量（Trade-offs & Gotchas）
/// - **背压处理**：当配置了租约上限且已达上限时，`acquire` 以
///   [`codes::POOL_EXHAUSTED`](crate::codes::POOL_EXHAUSTED) 失败，该错误设计为
///   可重试；未配置上限时 `acquire` 不会无限期阻塞。
/// - **别名安全**：实现不得把仍被视图引用的内存重新租出；无法独占回收时应
///   让槽位退役，由引用计数兜底归还。
pub trait BufferPool: Send + Sync + 'static + Sealed {
    /// 可写缓冲类型（租约）。
    type Writable;
    /// 冻结后的只读缓冲类型，`release` 的消费单位。
    type Frozen;

    /// 租借一个最少具备 `min_capacity` 可写空间的缓冲区。
    fn acquire(&self, min_capacity: usize) -> crate::Result<Self::Writable, CoreError>;

    /// 归还一个冻结缓冲，结束其租约。
    fn release(&self, frozen: Self::Frozen) -> crate::Result<(), CoreError>;

    /// 主动收缩池内冗余内存，返回实际回收的字节数。
    fn shrink_to_fit(&self) -> crate::Result<usize, CoreError>;

    /// 返回池当前的核心统计指标快照。
    fn statistics(&self) -> crate::Result<PoolStats, CoreError>;
}

/// 池统计快照，帮助调用方观测内存行为并执行自适应调度。
///
/// # 设计背景（Why）
/// - 以明确字段呈现核心指标，并保留 `custom_dimensions` 承载实现特有的数据，
///   在保证可扩展性的同时提升类型安全与 IDE 可发现性。
///
/// # 契约说明（What）
/// - `allocated_bytes`：池向系统请求的总字节数，包含已借出与待命容量；
/// - `resident_bytes`：当前常驻内存，通常等于或小于 `allocated_bytes`；
/// - `active_leases`：正在被调用方持有的租约数量；
/// - `available_bytes`：无需再分配即可提供的剩余容量；
/// - `failed_acquisitions`：累计租借失败次数；
/// - `custom_dimensions`：实现自定义指标的有序列表，键建议使用 `snake_case`
///   并保持稳定。
/// - **后置条件**：返回的结构体代表调用瞬间的快照，不引用内部可变状态。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocated_bytes: usize,
    pub resident_bytes: usize,
    pub active_leases: usize,
    pub available_bytes: usize,
    pub failed_acquisitions: u64,
    pub custom_dimensions: Vec<PoolStatDimension>,
}

/// 扩展指标维度，用于承载实现者的定制数据。
///
/// # 契约说明（What）
/// - `key`：稳定的蛇形命名字符串，建议使用模块前缀（例如 `slot_free_count`）；
/// - `value`：非负整数值，可表示计数或容量。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolStatDimension {
    pub key: Cow<'static, str>,
    pub value: usize,
}
