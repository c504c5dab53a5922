// 集成测试公共模块
//
// 提供测试辅助工具：脚本化的翻译后端、镜像目录夹具和DOM构建

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;

use mirror_translator::core::{CorruptDisposition, MirrorOptions};
use mirror_translator::orchestrator::Orchestrator;
use mirror_translator::translation::config::{LanguagePair, TranslationConfig};
use mirror_translator::translation::error::{TranslationError, TranslationResult};
use mirror_translator::translation::gateway::{Gateway, RetryPolicy, TranslationBackend};

/// 逐段翻译的脚本后端，译文带固定前缀，调用次数可查
pub struct StubBackend {
    pub calls: Arc<AtomicUsize>,
}

impl StubBackend {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl TranslationBackend for StubBackend {
    fn translate_fragment(&self, text: &str, _pair: &LanguagePair) -> TranslationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[hi] {}", text))
    }
}

/// 永远失败的后端，用来验证重试边界
pub struct FailingBackend {
    pub calls: Arc<AtomicUsize>,
}

impl FailingBackend {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl TranslationBackend for FailingBackend {
    fn translate_fragment(&self, _text: &str, _pair: &LanguagePair) -> TranslationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TranslationError::NetworkError("backend down".into()))
    }
}

/// 整页翻译的脚本后端，会像真实后端一样把DOCTYPE声明翻坏
pub struct DocumentStubBackend;

impl TranslationBackend for DocumentStubBackend {
    fn translate_fragment(&self, text: &str, _pair: &LanguagePair) -> TranslationResult<String> {
        Ok(format!("[hi] {}", text))
    }

    fn supports_document(&self) -> bool {
        true
    }

    fn translate_document(&self, html: &str, _pair: &LanguagePair) -> TranslationResult<String> {
        let translated = html.replace("Hello", "[hi] Hello");
        Ok(translated.replace(
            "<!DOCTYPE html>",
            mirror_translator::html::MANGLED_DOCTYPE,
        ))
    }
}

/// 镜像目录夹具
pub struct MirrorFixture {
    pub root: tempfile::TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl MirrorFixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("mirror");
        let output = root.path().join("translated");
        fs::create_dir_all(&input).unwrap();

        Self {
            root,
            input,
            output,
        }
    }

    /// 在镜像树里写一个页面，路径相对输入根目录
    pub fn write_page(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.input.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn output_path(&self, relative: &str) -> PathBuf {
        self.output.join(relative)
    }

    pub fn read_output(&self, relative: &str) -> String {
        fs::read_to_string(self.output_path(relative)).unwrap()
    }
}

/// 用默认参数组装一个调度器
pub fn build_orchestrator(
    fixture: &MirrorFixture,
    backend: Box<dyn TranslationBackend>,
    corrupt: CorruptDisposition,
) -> Orchestrator {
    build_orchestrator_with_policy(
        fixture,
        backend,
        corrupt,
        RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(0),
        },
        None,
    )
}

pub fn build_orchestrator_with_policy(
    fixture: &MirrorFixture,
    backend: Box<dyn TranslationBackend>,
    corrupt: CorruptDisposition,
    policy: RetryPolicy,
    sleeper: Option<Box<dyn Fn(Duration) + Send + Sync>>,
) -> Orchestrator {
    build_orchestrator_full(fixture, backend, corrupt, policy, sleeper, 1)
}

pub fn build_orchestrator_with_jobs(
    fixture: &MirrorFixture,
    backend: Box<dyn TranslationBackend>,
    jobs: usize,
) -> Orchestrator {
    build_orchestrator_full(
        fixture,
        backend,
        CorruptDisposition::Skip,
        RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(0),
        },
        None,
        jobs,
    )
}

fn build_orchestrator_full(
    fixture: &MirrorFixture,
    backend: Box<dyn TranslationBackend>,
    corrupt: CorruptDisposition,
    policy: RetryPolicy,
    sleeper: Option<Box<dyn Fn(Duration) + Send + Sync>>,
    jobs: usize,
) -> Orchestrator {
    let pair = LanguagePair::new("en", "hi");
    let gateway = match sleeper {
        Some(sleeper) => Gateway::with_sleeper(backend, pair, policy, sleeper),
        None => Gateway::new(backend, pair, policy),
    };

    let mut options = MirrorOptions::new(fixture.input.clone());
    options.output_root = Some(fixture.output.clone());
    options.corrupt = corrupt;
    options.jobs = jobs;
    options.translation = TranslationConfig::default_with_pair("en", "hi");

    Orchestrator::new(options, gateway)
}

/// 解析HTML字符串为DOM
pub fn create_test_dom(html: &str) -> RcDom {
    let mut input = std::io::Cursor::new(html);
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut input)
        .unwrap()
}

/// 简单的英文测试页面
pub fn simple_english_page() -> &'static str {
    "<!DOCTYPE html><html><head><title>Test Page</title></head>\
     <body><h1>Welcome to Test</h1><p>Hello</p>\
     <img alt=\"Course logo\"><input placeholder=\"Search\">\
     </body></html>"
}

pub fn read_bytes(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}
