//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持配置文件、环境变量和默认值

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 配置常量
pub mod constants {
    /// 默认源语言
    pub const DEFAULT_SOURCE_LANG: &str = "en";
    /// 默认目标语言
    pub const DEFAULT_TARGET_LANG: &str = "hi";

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "http://localhost:1188/translate";
    pub const API_URL_ENV: &str = "MIRROR_TRANSLATOR_API_URL";

    // 重试策略
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 2000;

    /// 承载可见文本、允许整体替换其文本内容的标签
    pub const TEXT_TAGS: &[&str] = &[
        "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "a", "li", "td", "th", "title",
    ];

    /// 按标签收集的可翻译属性
    pub const TRANSLATABLE_ATTRS: &[(&str, &str)] = &[("img", "alt"), ("input", "placeholder")];

    /// 遍历时整棵子树跳过的元素
    pub const SKIP_ELEMENTS: &[&str] = &["script", "style"];
}

/// 一次运行固定不变的语言对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// 翻译运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// 源语言代码
    pub source_lang: String,
    /// 目标语言代码
    pub target_lang: String,
    /// 翻译API地址
    pub api_url: String,
    /// 单次翻译的最大尝试次数，用尽即终止整个运行
    pub max_attempts: u32,
    /// 两次尝试之间的固定等待毫秒数
    pub retry_backoff_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: constants::DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl TranslationConfig {
    /// 用指定语言对构造默认配置
    pub fn default_with_pair(source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            ..Default::default()
        }
    }

    /// 从TOML配置文件读取
    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件 {} 失败: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// 加载配置：可选的配置文件加环境变量覆盖
    pub fn load(path: Option<&Path>) -> TranslationResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(api_url) = std::env::var(constants::API_URL_ENV) {
            config.api_url = api_url;
        }

        Ok(config)
    }

    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(&self.source_lang, &self.target_lang)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
