//! 翻译模块
//!
//! 提供完整的页面翻译功能，按职责拆分：
//! - **config**: 语言对与运行参数
//! - **error**: 统一的错误类型
//! - **filters**: 文本级别的可翻译性判断
//! - **collector**: 从DOM中选出可翻译节点
//! - **gateway**: 翻译后端封装与有界重试
//! - **apply**: 把译文按节点写回DOM

pub mod apply;
pub mod collector;
pub mod config;
pub mod error;
pub mod filters;
pub mod gateway;

pub use apply::apply_translations;
pub use collector::{TextCollector, TextUnit};
pub use config::{LanguagePair, TranslationConfig};
pub use error::{TranslationError, TranslationResult};
pub use filters::{is_numeric_badge, TargetScript, TextFilter};
pub use gateway::{DeeplxBackend, Gateway, RetryPolicy, TranslationBackend};
