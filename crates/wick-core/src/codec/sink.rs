use crate::{CoreError, sealed::Sealed};
use alloc::vec::Vec;

/// `ByteSink` 是编码器唯一依赖的输出契约：追加写入 + 冲刷。
///
/// # 设计背景（Why）
/// - 编码器对传输介质零假设：内存缓冲、套接字、文件都只需提供“按顺序追加、
///   最终冲刷”两种能力；
/// - 将汇抽象为独立契约，使同一个编码器既能写入池化缓冲（零拷贝流水线），也
///   能写入 `Vec<u8>`（测试与快照场景）。
///
/// # 契约说明（What）
/// - `write_all`：把 `src` 的全部字节追加到汇的末尾；部分写入不可见——要么全部
///   成功，要么返回错误且不保证写入了多少；
/// - `flush`：把内部暂存的字节推到最终介质；幂等，空操作实现合法；
/// - **后置条件**：`flush` 成功返回后，此前所有 `write_all` 的字节对介质可见。
///
/// # 风险提示（Trade-offs）
/// - 契约不提供位置回写（seek），长度前缀必须由调用方在写入前算好；这是流式
///   编码器以暂存换前缀的根因。
pub trait ByteSink: Sealed {
    /// 追加写入全部字节。
    fn write_all(&mut self, src: &[u8]) -> crate::Result<(), CoreError>;

    /// 冲刷内部暂存，幂等。
    fn flush(&mut self) -> crate::Result<(), CoreError>;
}

impl ByteSink for Vec<u8> {
    fn write_all(&mut self, src: &[u8]) -> crate::Result<(), CoreError> {
        self.extend_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> crate::Result<(), CoreError> {
        Ok(())
    }
}

impl<S> ByteSink for &mut S
where
    S: ByteSink,
{
    fn write_all(&mut self, src: &[u8]) -> crate::Result<(), CoreError> {
        (**self).write_all(src)
    }

    fn flush(&mut self) -> crate::Result<(), CoreError> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn vec_sink_appends_in_order() {
        let mut sink = Vec::new();
        sink.write_all(&[1, 2]).expect("写入失败");
        sink.write_all(&[3]).expect("写入失败");
        sink.flush().expect("冲刷失败");
        sink.flush().expect("冲刷应幂等");
        assert_eq!(sink, vec![1, 2, 3]);
    }
}
