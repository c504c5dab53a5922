//! 损坏页面检测模块
//!
//! 镜像抓取下来的页面并不总是可用的输入。空文件、编码损坏的文件、
//! 伪装成页面的订阅源、以及反爬验证页都会在进入翻译流程前被挡下。
//! 本模块只负责判定，处置（跳过、挪走还是删除）由调度器决定。

use std::fmt;
use std::fs;
use std::path::Path;

use crate::html::{find_nodes, html_to_dom, node_text};

/// 反爬验证页在二级标题里固定出现的提示语
pub const CHALLENGE_PHRASE: &str = "Checking if the site connection is secure";

/// 页面不可用的具体原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptReason {
    /// 零字节文件
    Empty,
    /// 读取失败
    Unreadable(String),
    /// 字节流不是合法的UTF-8，无法按文本解析
    Unparseable,
    /// RSS/Atom订阅源伪装成了页面
    SyndicationFeed,
    /// 被反爬验证页拦截
    ChallengePage,
}

impl fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptReason::Empty => write!(f, "empty file"),
            CorruptReason::Unreadable(e) => write!(f, "unreadable: {}", e),
            CorruptReason::Unparseable => write!(f, "unparseable markup"),
            CorruptReason::SyndicationFeed => {
                write!(f, "is a syndication feed, not a page")
            }
            CorruptReason::ChallengePage => {
                write!(f, "blocked by an anti-bot challenge page")
            }
        }
    }
}

/// 检测结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Corrupt(CorruptReason),
}

impl Verdict {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Verdict::Corrupt(_))
    }
}

/// 判定一个缓存页面是否可用
///
/// 按固定顺序做检查，命中任何一条立即返回：
/// 空文件、读取失败、非UTF-8、订阅源、反爬验证页。
pub fn validate(path: &Path) -> Verdict {
    match fs::metadata(path) {
        Ok(metadata) => {
            if metadata.len() == 0 {
                return Verdict::Corrupt(CorruptReason::Empty);
            }
        }
        Err(e) => return Verdict::Corrupt(CorruptReason::Unreadable(e.to_string())),
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return Verdict::Corrupt(CorruptReason::Unreadable(e.to_string())),
    };

    // 宽容解析器对几乎任何输入都能建树，镜像数据里实际出现的
    // “解析失败”是编码损坏，与原始抓取器写坏文件的方式一致
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => return Verdict::Corrupt(CorruptReason::Unparseable),
    };

    let dom = html_to_dom(text.as_bytes(), "utf-8");

    // 订阅源的根元素会被宽容解析器挪进body，所以要整树查找
    if !find_nodes(&dom.document, "rss").is_empty()
        || !find_nodes(&dom.document, "feed").is_empty()
    {
        return Verdict::Corrupt(CorruptReason::SyndicationFeed);
    }

    if let Some(h2) = find_nodes(&dom.document, "h2").first() {
        if node_text(h2).contains(CHALLENGE_PHRASE) {
            return Verdict::Corrupt(CorruptReason::ChallengePage);
        }
    }

    Verdict::Ok
}
