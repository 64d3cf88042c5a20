//! 统一错误类型定义.
//!
//! 所有 Dian crate 共用的错误类型, 支持跨模块传播.
//! `Eof` 表示输入正常耗尽, 由读取循环识别并正常收尾, 不视为失败.

use thiserror::Error;

/// Dian 统一错误类型
#[derive(Debug, Error)]
pub enum DianError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作 (如 H.264 的 ES 单元粒度)
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,
}

/// Dian 统一 Result 类型
pub type DianResult<T> = Result<T, DianError>;

impl DianError {
    /// 是否为正常的流末尾
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}
