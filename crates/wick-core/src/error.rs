//! 错误域：稳定错误码、核心错误载体与结果别名。
//!
//! # 模块架构（Why）
//! - 池、视图、编码器在不同层次产生的故障需要合流为统一的错误码，便于日志、指标
//!   与上层治理逻辑执行精确分类。
//! - 框架需兼容 `no_std + alloc` 场景，因此不依赖 `std::error::Error`，而是复用
//!   crate 根部定义的轻量 [`Error`](crate::Error) 抽象。
//!
//! # 设计总览（How）
//! - [`CoreError`] 以 `&'static str` 错误码 + 人类可读消息 + 可选根因的组合承载
//!   全部失败语义；
//! - [`codes`] 收录 `<领域>.<语义>` 约定下的稳定码值；
//! - [`Result`] 将默认错误参数绑定为 [`CoreError`]，减少签名噪声。

use crate::Error;
use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::fmt;

/// 线程安全的根因装箱别名，供跨层错误链使用。
pub type ErrorCause = Box<dyn Error + Send + Sync + 'static>;

/// 统一的结果别名，默认错误类型为 [`CoreError`]。
pub type Result<T, E = CoreError> = core::result::Result<T, E>;

/// `CoreError` 表示跨层共享的稳定错误域，是所有可观察错误的最终形态。
///
/// # 设计背景（Why）
/// - 池化缓冲与编码器的失败面窄而明确（耗尽、重复释放、越界、帧失衡、文本非法），
///   用稳定错误码表达可以让调用方依码值实施补救，而非解析消息字符串。
/// - 兼容 `no_std + alloc`：消息采用 `Cow<'static, str>`，静态文案零分配，动态
///   文案按需落堆。
///
/// # 逻辑解析（How）
/// - 构造时仅携带码值与消息；根因通过 [`with_cause`](Self::with_cause) 以 Builder
///   风格叠加，并经由 [`Error::source`] 暴露完整链路。
///
/// # 契约说明（What）
/// - **前置条件**：`code` 必须取自 [`codes`] 模块或遵循 `<领域>.<语义>` 约定；
/// - **后置条件**：返回值满足 `Send + Sync + 'static`，可安全跨线程传递。
///
/// # 设计取舍与风险（Trade-offs）
/// - 不内置重试分类矩阵：本域错误码数量有限，语义在各自定义处写明（例如
///   `pool.exhausted` 可重试、`pool.double_release` 应视为致命），由调用方决策。
#[derive(Debug)]
pub struct CoreError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<ErrorCause>,
}

impl CoreError {
    /// 构造核心错误。
    ///
    /// # 契约定义（What）
    /// - `code`：稳定错误码，调用方需保证其已在 [`codes`] 中备案或遵循命名约定；
    /// - `message`：面向排障人员的描述，可为 `&'static str` 或堆分配字符串；
    /// - **后置条件**：返回值不含根因，可稍后通过 [`with_cause`](Self::with_cause)
    ///   填充。
    ///
    /// # 示例（Examples）
    /// ```rust
    /// use wick_core::{CoreError, codes};
    ///
    /// let err = CoreError::new(codes::POOL_EXHAUSTED, "租约数已达上限");
    /// assert_eq!(err.code(), codes::POOL_EXHAUSTED);
    /// ```
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// 附带底层根因并返回新的核心错误。
    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 返回人类可读消息。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 返回底层根因（若存在）。
    pub fn cause(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => {
                let cause: &(dyn Error + 'static) = &**cause;
                Some(cause)
            }
            None => None,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause()
    }
}

/// 框架内置的错误码常量集合，确保可观测性系统具有稳定识别符。
///
/// # 设计背景（Why）
/// - 错误码遵循 `<领域>.<语义>` 命名约定，方便在跨组件日志中检索与聚合；
/// - 码值粒度对齐失败面的责任边界：`pool.*` 归属池化簿记，`buffer.*` 归属视图
///   构造，`codec.*` 归属编码器状态机。
///
/// # 契约说明（What）
/// - **使用前提**：错误码应封装进 [`CoreError`] 并携带完整上下文；
/// - **返回承诺**：调用方收到码值后可据此实施补救：`pool.exhausted` 退避重试，
///   `pool.double_release` 中止流水线，其余码值按调用处文档处理。
pub mod codes {
    /// 池租约数达到硬上限，调用方可退避或调高上限后重试。
    pub const POOL_EXHAUSTED: &str = "pool.exhausted";
    /// 同一租约第二次释放；池簿记已不可信，应视为致命编程错误。
    pub const POOL_DOUBLE_RELEASE: &str = "pool.double_release";
    /// 视图构造或拷贝越界；立即拒绝，不产生部分状态。
    pub const BUFFER_OUT_OF_RANGE: &str = "buffer.out_of_range";
    /// 编码器 begin/end 配对失衡，或在未打开字段时写入原语。
    pub const CODEC_UNBALANCED_FRAME: &str = "codec.unbalanced_frame";
    /// 编码器已进入中毒态，在 `reset` 之前拒绝一切操作。
    pub const CODEC_POISONED: &str = "codec.poisoned";
    /// 文本载荷不是合法 UTF-8，且当前策略为严格模式。
    pub const CODEC_INVALID_TEXT: &str = "codec.invalid_text";
}
