//! 统一错误类型定义.
//!
//! 读写会话、上游编解码器接口与像素转换共用同一个错误类型.
//! 除了首次 seek 前的预读失败会被吞掉以外, 其余错误都原样返回给调用方,
//! 本层不做任何自动重试.

use thiserror::Error;

use crate::media_type::MediaType;

/// avio 统一错误类型
#[derive(Debug, Error)]
pub enum AvError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 上游解码失败 (不重试)
    #[error("解码错误: {0}")]
    Decode(String),

    /// 已到达流末尾
    ///
    /// 正常结束, 不是故障. 调用方应与其它错误区分处理.
    #[error("已到达流末尾")]
    Eof,

    /// 音频块声道数或分辨率与会话配置不符
    #[error("形状不匹配: 期望 {expected}, 实际 {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// 音频块采样类型与编码器要求不符
    #[error("类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// 底层 seek 失败
    #[error("定位失败: {0}")]
    Seek(String),

    /// 上游编码失败
    #[error("编码错误: {0}")]
    Encode(String),

    /// 输入或输出中没有指定类型的流
    #[error("未找到{0}流")]
    StreamNotFound(MediaType),

    /// 会话已关闭
    #[error("会话已关闭")]
    Closed,

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AvError {
    /// 是否为流末尾 (正常结束)
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

/// avio 统一 Result 类型
pub type AvResult<T> = Result<T, AvError>;
