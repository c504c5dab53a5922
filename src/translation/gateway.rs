//! 翻译网关模块
//!
//! 把一个外部翻译能力包装成统一接口：逐段翻译和整页翻译都从这里
//! 走，失败按固定间隔有界重试，重试用尽是致命错误，整个运行终止。

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::translation::config::{LanguagePair, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};

/// 外部翻译后端
///
/// 同一个trait同时描述逐段和整页两种能力，整页能力通过
/// `supports_document`声明，调用方据此选择流程。
pub trait TranslationBackend: Send + Sync {
    /// 解析并校验语言对，整个运行只调用一次
    fn prepare(&self, pair: &LanguagePair) -> TranslationResult<()> {
        let _ = pair;
        Ok(())
    }

    /// 翻译一段字面文本
    fn translate_fragment(&self, text: &str, pair: &LanguagePair) -> TranslationResult<String>;

    /// 是否支持整页翻译
    fn supports_document(&self) -> bool {
        false
    }

    /// 翻译整页标记文本
    fn translate_document(&self, html: &str, pair: &LanguagePair) -> TranslationResult<String> {
        let _ = (html, pair);
        Err(TranslationError::Unsupported(
            "document-level translation".to_string(),
        ))
    }
}

/// 重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 最大尝试次数（含第一次）
    pub max_attempts: u32,
    /// 两次尝试之间的固定等待
    pub backoff: Duration,
}

impl From<&TranslationConfig> for RetryPolicy {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff(),
        }
    }
}

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// 翻译网关
///
/// 持有后端、语言对和重试策略。等待函数在构造时注入，默认是线程
/// 休眠，测试里可以换成计数器。
pub struct Gateway {
    backend: Box<dyn TranslationBackend>,
    pair: LanguagePair,
    policy: RetryPolicy,
    sleeper: Sleeper,
}

impl Gateway {
    pub fn new(backend: Box<dyn TranslationBackend>, pair: LanguagePair, policy: RetryPolicy) -> Self {
        Self::with_sleeper(backend, pair, policy, Box::new(std::thread::sleep))
    }

    pub fn with_sleeper(
        backend: Box<dyn TranslationBackend>,
        pair: LanguagePair,
        policy: RetryPolicy,
        sleeper: Sleeper,
    ) -> Self {
        Self {
            backend,
            pair,
            policy,
            sleeper,
        }
    }

    /// 语言对解析，必须在任何翻译调用之前完成
    pub fn prepare(&self) -> TranslationResult<()> {
        self.backend.prepare(&self.pair)?;
        tracing::info!(pair = %self.pair, "language pair resolved");
        Ok(())
    }

    pub fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    pub fn supports_document(&self) -> bool {
        self.backend.supports_document()
    }

    /// 翻译一段文本
    ///
    /// 空白输入直接短路成空结果，不触碰后端。相同文本不做缓存，
    /// 每个节点各自请求。
    pub fn translate(&self, text: &str) -> TranslationResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        self.with_retry(|| self.backend.translate_fragment(text, &self.pair))
    }

    /// 整页翻译
    pub fn translate_document(&self, html: &str) -> TranslationResult<String> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }

        self.with_retry(|| self.backend.translate_document(html, &self.pair))
    }

    fn with_retry<F>(&self, op: F) -> TranslationResult<String>
    where
        F: Fn() -> TranslationResult<String>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match op() {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempt >= self.policy.max_attempts {
                        tracing::error!(
                            attempts = attempt,
                            error = %e,
                            "maximum retries reached"
                        );
                        return Err(TranslationError::RetriesExhausted { attempts: attempt });
                    }

                    tracing::warn!(
                        attempt,
                        max = self.policy.max_attempts,
                        backoff_ms = self.policy.backoff.as_millis() as u64,
                        error = %e,
                        "translation attempt failed, backing off"
                    );
                    (self.sleeper)(self.policy.backoff);
                }
            }
        }
    }
}

#[derive(Serialize)]
struct DeeplxRequest<'a> {
    text: &'a str,
    source_lang: &'a str,
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct DeeplxResponse {
    code: i64,
    #[serde(default)]
    data: String,
}

/// DeepLX风格的HTTP翻译后端
///
/// 请求体是 `{text, source_lang, target_lang}`，响应是
/// `{code, data}`，code为200时data是译文。
pub struct DeeplxBackend {
    client: reqwest::blocking::Client,
    endpoint: Url,
}

impl DeeplxBackend {
    pub fn new(api_url: &str) -> TranslationResult<Self> {
        let endpoint = Url::parse(api_url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, endpoint })
    }
}

impl TranslationBackend for DeeplxBackend {
    fn prepare(&self, pair: &LanguagePair) -> TranslationResult<()> {
        if pair.source.trim().is_empty() || pair.target.trim().is_empty() {
            return Err(TranslationError::ConfigError(format!(
                "语言对不完整: {}",
                pair
            )));
        }
        Ok(())
    }

    fn translate_fragment(&self, text: &str, pair: &LanguagePair) -> TranslationResult<String> {
        let source_lang = pair.source.to_uppercase();
        let target_lang = pair.target.to_uppercase();
        let request = DeeplxRequest {
            text,
            source_lang: &source_lang,
            target_lang: &target_lang,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::TranslationServiceError(format!(
                "API返回HTTP {}",
                status
            )));
        }

        let body: DeeplxResponse = response.json()?;
        if body.code != 200 {
            return Err(TranslationError::TranslationServiceError(format!(
                "API返回错误码 {}",
                body.code
            )));
        }

        Ok(body.data)
    }
}
