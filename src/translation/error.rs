//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型，并区分可重试、不可重试与致命三类

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译服务错误
    #[error("翻译服务错误: {0}")]
    TranslationServiceError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 后端能力不支持
    #[error("后端不支持: {0}")]
    Unsupported(String),

    /// 重试次数用尽，运行必须终止
    #[error("maximum retries reached after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::TranslationServiceError(_) => true,
            TranslationError::ConfigError(_) => false,
            TranslationError::ParseError(_) => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::Unsupported(_) => false,
            TranslationError::RetriesExhausted { .. } => false,
        }
    }

    /// 致命错误会立刻终止整个批量运行
    pub fn is_fatal(&self) -> bool {
        matches!(self, TranslationError::RetriesExhausted { .. })
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        TranslationError::NetworkError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::ParseError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<url::ParseError> for TranslationError {
    fn from(error: url::ParseError) -> Self {
        TranslationError::ConfigError(format!("API地址无效: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
