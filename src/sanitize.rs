//! 解析前的注释清理模块
//!
//! 镜像页面里埋着大量抓取工具留下的注释，其中不乏被截断的脚本片段，
//! 全部在建树之前丢弃，翻译流程只面对可见内容。

use std::sync::OnceLock;

use regex::Regex;

static COMMENT_RE: OnceLock<Regex> = OnceLock::new();

/// 删除原始标记文本中的全部注释区段
///
/// 匹配是最小非贪婪的，跨行注释同样会被去掉。空输入原样返回。
pub fn strip_comments(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let re = COMMENT_RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
    re.replace_all(raw, "").into_owned()
}
