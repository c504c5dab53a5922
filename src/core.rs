use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use markup5ever_rcdom::RcDom;

use crate::html::{html_to_dom, repair_doctype, serialize_document};
use crate::sanitize::strip_comments;
use crate::translation::apply::apply_translations;
use crate::translation::collector::TextCollector;
use crate::translation::config::TranslationConfig;
use crate::translation::filters::TextFilter;
use crate::translation::gateway::Gateway;
use crate::validate::{validate, CorruptReason, Verdict};

/// Represents errors that can occur while processing mirrored documents
///
/// Fatal errors stop the whole batch run; everything else is scoped to
/// the file that produced it.
#[derive(Debug)]
pub struct MirrorError {
    details: String,
    fatal: bool,
}

impl MirrorError {
    /// Creates a new MirrorError with the given message
    pub fn new(msg: &str) -> MirrorError {
        MirrorError {
            details: msg.to_string(),
            fatal: false,
        }
    }

    /// Creates an error that must terminate the batch run
    pub fn fatal(msg: &str) -> MirrorError {
        MirrorError {
            details: msg.to_string(),
            fatal: true,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for MirrorError {}

impl From<crate::translation::error::TranslationError> for MirrorError {
    fn from(error: crate::translation::error::TranslationError) -> Self {
        MirrorError {
            fatal: error.is_fatal(),
            details: error.to_string(),
        }
    }
}

/// 损坏页面的处置方式
///
/// 默认只跳过。删除是破坏性的，必须显式选择。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptDisposition {
    /// 原样留在输入树里，只记录日志
    #[default]
    Skip,
    /// 改名为 `<name>.html.corrupt` 挪到一边
    MoveAside,
    /// 从输入树中删除
    Delete,
}

/// Configuration options for a mirror translation run
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// 镜像文件树的根目录
    pub input_root: PathBuf,
    /// 输出根目录，None表示原地改写
    pub output_root: Option<PathBuf>,
    /// 损坏页面的处置方式
    pub corrupt: CorruptDisposition,
    /// 并行处理的工作线程数，1为顺序处理
    pub jobs: usize,
    /// 翻译配置
    pub translation: TranslationConfig,
}

impl MirrorOptions {
    pub fn new(input_root: PathBuf) -> Self {
        Self {
            input_root,
            output_root: None,
            corrupt: CorruptDisposition::default(),
            jobs: 1,
            translation: TranslationConfig::default(),
        }
    }
}

/// 单个文档处理完的结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// 翻译完成并已写出，附带替换的文本数
    Translated { units: usize },
    /// 页面不可用，未产生任何输出
    Corrupt(CorruptReason),
}

/// 文档处理器
///
/// 驱动单个文件的完整流程：判定、清理、选择、翻译、回写、落盘。
/// 落盘是唯一的提交点，写成功之前文档不算处理完。
pub struct DocumentProcessor<'a> {
    gateway: &'a Gateway,
    collector: TextCollector,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(gateway: &'a Gateway, target_lang: &str) -> Self {
        Self {
            gateway,
            collector: TextCollector::new(TextFilter::new(target_lang)),
        }
    }

    /// 处理一个镜像页面并写出到目标路径
    pub fn process(&self, input: &Path, target: &Path) -> Result<DocumentOutcome, MirrorError> {
        // 1. 判定页面是否可用
        if let Verdict::Corrupt(reason) = validate(input) {
            return Ok(DocumentOutcome::Corrupt(reason));
        }

        // 2. 读入原始标记并剥掉注释
        let raw = fs::read_to_string(input).map_err(|e| {
            MirrorError::new(&format!("failed to read {}: {}", input.display(), e))
        })?;
        let cleaned = strip_comments(&raw);

        // 3. 按后端能力选择整页或逐节点翻译
        let (html, units) = if self.gateway.supports_document() {
            self.translate_whole_document(&cleaned)?
        } else {
            self.translate_fragments(&cleaned)?
        };

        // 4. 写临时文件再原子改名，这是唯一的提交点
        write_atomic(target, html.as_bytes())?;

        Ok(DocumentOutcome::Translated { units })
    }

    fn translate_fragments(&self, cleaned: &str) -> Result<(String, usize), MirrorError> {
        let dom = html_to_dom(cleaned.as_bytes(), "utf-8");

        let units = self.collector.collect(&dom.document);
        let mut translations = Vec::with_capacity(units.len());
        for unit in &units {
            let translated = self.gateway.translate(&unit.text)?;
            tracing::debug!(original = %unit.text, translated = %translated, "translated fragment");
            translations.push(translated);
        }

        let replaced = apply_translations(&units, &translations);
        debug_assert_eq!(replaced, units.len());

        Ok((finalize(&dom), replaced))
    }

    fn translate_whole_document(&self, cleaned: &str) -> Result<(String, usize), MirrorError> {
        let translated = self.gateway.translate_document(cleaned)?;

        // 整页翻译可能连DOCTYPE一起翻掉，必须在重新解析前修好
        let repaired = repair_doctype(&translated);
        let dom = html_to_dom(repaired.as_bytes(), "utf-8");

        Ok((finalize(&dom), 1))
    }
}

/// 生成最终输出：规范缩进序列化加doctype修复
///
/// 两个步骤都幂等，重复调用不改变结果。
pub fn finalize(dom: &RcDom) -> String {
    repair_doctype(&serialize_document(dom))
}

/// 原子写入目标文件
///
/// 先写同目录下的临时文件，再改名到目标路径，半成品永远不会
/// 出现在目标位置。
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), MirrorError> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| {
        MirrorError::new(&format!("failed to create {}: {}", dir.display(), e))
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        MirrorError::new(&format!("failed to create temp file in {}: {}", dir.display(), e))
    })?;
    tmp.write_all(bytes).map_err(|e| {
        MirrorError::new(&format!("failed to write {}: {}", target.display(), e))
    })?;
    tmp.persist(target).map_err(|e| {
        MirrorError::new(&format!("failed to commit {}: {}", target.display(), e))
    })?;

    Ok(())
}
