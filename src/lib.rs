//! # Mirror Translator Library
//!
//! 一个用于翻译本地镜像网站的工具库。输入是一棵已经保存到磁盘上的HTML文件树，
//! 输出是逐页翻译后的同构文件树（或原地改写）。
//!
//! ## 模块组织
//!
//! - `core` - 单文档处理流程和运行选项
//! - `html` - DOM解析、节点操作与序列化
//! - `validate` - 损坏页面检测
//! - `sanitize` - 解析前的注释清理
//! - `translation` - 可翻译文本选择、翻译网关与回写
//! - `orchestrator` - 批量调度与断点续跑

pub mod core;
pub mod html;
pub mod orchestrator;
pub mod sanitize;
pub mod translation;
pub mod validate;

// Re-export commonly used items for convenience
pub use crate::core::{
    CorruptDisposition, DocumentOutcome, DocumentProcessor, MirrorError, MirrorOptions,
};
pub use crate::orchestrator::{Orchestrator, RunSummary};
pub use crate::translation::config::{LanguagePair, TranslationConfig};
pub use crate::translation::gateway::{DeeplxBackend, Gateway, RetryPolicy, TranslationBackend};
pub use crate::validate::{validate, CorruptReason, Verdict};
