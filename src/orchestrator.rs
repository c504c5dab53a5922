//! 批量调度模块
//!
//! 枚举镜像树下的全部页面，逐个跑完整流程。目标文件已存在的页面
//! 直接跳过，中断后重跑不会重做任何已完成的工作。重试用尽会停止
//! 派发新文件，已经提交的输出保持原样。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::core::{
    CorruptDisposition, DocumentOutcome, DocumentProcessor, MirrorError, MirrorOptions,
};
use crate::translation::gateway::Gateway;
use crate::validate::CorruptReason;

/// 一次运行的汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// 发现的页面总数
    pub files_found: usize,
    /// 翻译并写出的页面数
    pub translated: usize,
    /// 因目标已存在而跳过的页面数
    pub skipped_existing: usize,
    /// 判定损坏的页面数
    pub corrupt: usize,
    /// 处理失败的页面数
    pub failed: usize,
    /// 因运行终止而未开始的页面数
    pub not_started: usize,
}

enum FileResult {
    Translated,
    SkippedExisting,
    Corrupt,
    Failed,
    NotStarted,
    Fatal(MirrorError),
}

/// 批量调度器
pub struct Orchestrator {
    options: MirrorOptions,
    gateway: Gateway,
}

impl Orchestrator {
    pub fn new(options: MirrorOptions, gateway: Gateway) -> Self {
        Self { options, gateway }
    }

    /// 跑完整个镜像树
    ///
    /// 语言对在任何文件开始处理之前解析一次。顺序模式逐个处理，
    /// 并行模式用有界线程池，退避等待只阻塞持有该文件的线程。
    pub fn run(&self) -> Result<RunSummary, MirrorError> {
        self.gateway.prepare()?;

        let files = self.discover()?;
        tracing::info!(
            count = files.len(),
            root = %self.options.input_root.display(),
            "discovered mirrored pages"
        );

        let processor = DocumentProcessor::new(&self.gateway, &self.options.translation.target_lang);
        let fatal = AtomicBool::new(false);

        let results: Vec<FileResult> = if self.options.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.jobs)
                .build()
                .map_err(|e| MirrorError::new(&format!("failed to build worker pool: {}", e)))?;

            pool.install(|| {
                files
                    .par_iter()
                    .map(|file| self.process_one(&processor, file, &fatal))
                    .collect()
            })
        } else {
            files
                .iter()
                .map(|file| self.process_one(&processor, file, &fatal))
                .collect()
        };

        let mut summary = RunSummary {
            files_found: files.len(),
            ..Default::default()
        };
        let mut fatal_error = None;

        for result in results {
            match result {
                FileResult::Translated => summary.translated += 1,
                FileResult::SkippedExisting => summary.skipped_existing += 1,
                FileResult::Corrupt => summary.corrupt += 1,
                FileResult::Failed => summary.failed += 1,
                FileResult::NotStarted => summary.not_started += 1,
                FileResult::Fatal(e) => {
                    summary.failed += 1;
                    if fatal_error.is_none() {
                        fatal_error = Some(e);
                    }
                }
            }
        }

        tracing::info!(
            found = summary.files_found,
            translated = summary.translated,
            skipped = summary.skipped_existing,
            corrupt = summary.corrupt,
            failed = summary.failed,
            not_started = summary.not_started,
            "run complete"
        );

        match fatal_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// 递归发现镜像树下的全部HTML文件
    fn discover(&self) -> Result<Vec<PathBuf>, MirrorError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.options.input_root) {
            let entry = entry.map_err(|e| {
                MirrorError::new(&format!(
                    "failed to walk {}: {}",
                    self.options.input_root.display(),
                    e
                ))
            })?;

            if entry.file_type().is_file()
                && entry.path().extension().and_then(|ext| ext.to_str()) == Some("html")
            {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// 输入路径对应的输出路径
    ///
    /// 镜像模式下在输出根目录里保持相对结构，原地模式下就是输入
    /// 路径本身。
    fn target_for(&self, input: &Path) -> PathBuf {
        match &self.options.output_root {
            Some(root) => {
                let relative = input
                    .strip_prefix(&self.options.input_root)
                    .unwrap_or(input);
                root.join(relative)
            }
            None => input.to_path_buf(),
        }
    }

    fn process_one(
        &self,
        processor: &DocumentProcessor,
        input: &Path,
        fatal: &AtomicBool,
    ) -> FileResult {
        if fatal.load(Ordering::SeqCst) {
            return FileResult::NotStarted;
        }

        let target = self.target_for(input);

        // 目标已存在即视为已完成，绝不覆盖
        if self.options.output_root.is_some() && target.exists() {
            tracing::info!(file = %input.display(), "target exists, skipping");
            return FileResult::SkippedExisting;
        }

        match processor.process(input, &target) {
            Ok(DocumentOutcome::Translated { units }) => {
                tracing::info!(file = %input.display(), units, "translated");
                FileResult::Translated
            }
            Ok(DocumentOutcome::Corrupt(reason)) => {
                tracing::warn!(file = %input.display(), reason = %reason, "corrupt page");
                self.dispose(input, &reason);
                FileResult::Corrupt
            }
            Err(e) if e.is_fatal() => {
                fatal.store(true, Ordering::SeqCst);
                tracing::error!(file = %input.display(), error = %e, "fatal failure, stopping run");
                FileResult::Fatal(e)
            }
            Err(e) => {
                tracing::error!(file = %input.display(), error = %e, "processing failed");
                FileResult::Failed
            }
        }
    }

    /// 处置损坏的源文件
    fn dispose(&self, input: &Path, reason: &CorruptReason) {
        match self.options.corrupt {
            CorruptDisposition::Skip => {
                tracing::warn!(file = %input.display(), reason = %reason, "corrupt page left in place");
            }
            CorruptDisposition::MoveAside => {
                let aside = input.with_extension("html.corrupt");
                match std::fs::rename(input, &aside) {
                    Ok(()) => {
                        tracing::warn!(
                            file = %input.display(),
                            moved_to = %aside.display(),
                            reason = %reason,
                            "corrupt page moved aside"
                        );
                    }
                    Err(e) => {
                        tracing::error!(file = %input.display(), error = %e, "failed to move corrupt page");
                    }
                }
            }
            CorruptDisposition::Delete => match std::fs::remove_file(input) {
                Ok(()) => {
                    tracing::warn!(file = %input.display(), reason = %reason, "corrupt page deleted");
                }
                Err(e) => {
                    tracing::error!(file = %input.display(), error = %e, "failed to delete corrupt page");
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::config::{LanguagePair, TranslationConfig};
    use crate::translation::error::TranslationResult;
    use crate::translation::gateway::{RetryPolicy, TranslationBackend};
    use std::time::Duration;

    struct EchoBackend;

    impl TranslationBackend for EchoBackend {
        fn translate_fragment(&self, text: &str, _pair: &LanguagePair) -> TranslationResult<String> {
            Ok(format!("[hi] {}", text))
        }
    }

    fn test_orchestrator(input_root: PathBuf, output_root: Option<PathBuf>) -> Orchestrator {
        let mut options = MirrorOptions::new(input_root);
        options.output_root = output_root;
        options.translation = TranslationConfig::default_with_pair("en", "hi");

        let gateway = Gateway::new(
            Box::new(EchoBackend),
            LanguagePair::new("en", "hi"),
            RetryPolicy {
                max_attempts: 2,
                backoff: Duration::from_millis(0),
            },
        );

        Orchestrator::new(options, gateway)
    }

    #[test]
    fn test_discover_finds_nested_html_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>x</p>").unwrap();
        std::fs::write(dir.path().join("a/b/deep.html"), "<p>y</p>").unwrap();
        std::fs::write(dir.path().join("a/styles.css"), "p {}").unwrap();
        std::fs::write(dir.path().join("a/feed.xml"), "<rss/>").unwrap();

        let orchestrator = test_orchestrator(dir.path().to_path_buf(), None);
        let files = orchestrator.discover().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files
            .iter()
            .all(|f| f.extension().and_then(|ext| ext.to_str()) == Some("html")));
    }

    #[test]
    fn test_target_for_mirrors_relative_structure() {
        let orchestrator = test_orchestrator(
            PathBuf::from("/mirror/site"),
            Some(PathBuf::from("/out")),
        );
        assert_eq!(
            orchestrator.target_for(Path::new("/mirror/site/a/b/page.html")),
            PathBuf::from("/out/a/b/page.html")
        );
    }

    #[test]
    fn test_target_for_in_place_mode() {
        let orchestrator = test_orchestrator(PathBuf::from("/mirror/site"), None);
        assert_eq!(
            orchestrator.target_for(Path::new("/mirror/site/page.html")),
            PathBuf::from("/mirror/site/page.html")
        );
    }
}
