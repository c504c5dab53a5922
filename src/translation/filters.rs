//! 文本过滤器模块
//!
//! 判断一段字面文本是否值得送去翻译。标记、计数徽标和已经是目标
//! 文字的内容都被排除，这也是重复运行不会二次翻译的保障。

use std::sync::OnceLock;

use regex::Regex;

static BADGE_RE: OnceLock<Regex> = OnceLock::new();

/// 检查文本中是否出现数字徽标
///
/// 徽标是课程页上的注册数、评分数一类的短记号："50M"、"4,180"、
/// "1.5K"、"1200+"。带分组分隔符的纯数字同样算徽标。出现徽标的
/// 文本不是正文，整段放过。
pub fn is_numeric_badge(text: &str) -> bool {
    let re = BADGE_RE
        .get_or_init(|| Regex::new(r"\d+[,.]\d+[MKBP+]?|\d+[MKBP+]").unwrap());
    re.is_match(text)
}

/// 目标语言的文字系统
///
/// 用Unicode区块做"已经翻译过"的廉价判断：文本里只要出现目标
/// 文字就跳过，不依赖任何语言识别库。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScript {
    Devanagari,
    Han,
    Kana,
    Hangul,
    Cyrillic,
    Arabic,
    Greek,
    Hebrew,
    Thai,
}

impl TargetScript {
    /// 由语言代码解析出文字系统
    ///
    /// 与源语言共用拉丁字母的目标语言无法用区块区分，返回None，
    /// 此时幂等性完全由调度器的跳过规则承担。
    pub fn for_lang(code: &str) -> Option<TargetScript> {
        let code = code.to_ascii_lowercase();
        let base = code.split(['-', '_']).next().unwrap_or(&code);

        match base {
            "hi" | "mr" | "ne" | "sa" => Some(TargetScript::Devanagari),
            "zh" => Some(TargetScript::Han),
            "ja" => Some(TargetScript::Kana),
            "ko" => Some(TargetScript::Hangul),
            "ru" | "uk" | "bg" | "sr" => Some(TargetScript::Cyrillic),
            "ar" | "fa" | "ur" => Some(TargetScript::Arabic),
            "el" => Some(TargetScript::Greek),
            "he" | "yi" => Some(TargetScript::Hebrew),
            "th" => Some(TargetScript::Thai),
            _ => None,
        }
    }

    /// 字符是否落在该文字系统的区块内
    pub fn contains(&self, c: char) -> bool {
        match self {
            TargetScript::Devanagari => ('\u{0900}'..='\u{097f}').contains(&c),
            TargetScript::Han => ('\u{4e00}'..='\u{9fff}').contains(&c),
            TargetScript::Kana => ('\u{3040}'..='\u{30ff}').contains(&c),
            TargetScript::Hangul => ('\u{ac00}'..='\u{d7af}').contains(&c),
            TargetScript::Cyrillic => ('\u{0400}'..='\u{04ff}').contains(&c),
            TargetScript::Arabic => ('\u{0600}'..='\u{06ff}').contains(&c),
            TargetScript::Greek => ('\u{0370}'..='\u{03ff}').contains(&c),
            TargetScript::Hebrew => ('\u{0590}'..='\u{05ff}').contains(&c),
            TargetScript::Thai => ('\u{0e00}'..='\u{0e7f}').contains(&c),
        }
    }

    /// 文本中是否出现该文字系统的字符
    pub fn appears_in(&self, text: &str) -> bool {
        text.chars().any(|c| self.contains(c))
    }
}

/// 文本过滤器
pub struct TextFilter {
    target_script: Option<TargetScript>,
}

impl TextFilter {
    /// 按目标语言创建过滤器
    pub fn new(target_lang: &str) -> Self {
        Self {
            target_script: TargetScript::for_lang(target_lang),
        }
    }

    /// 判断文本是否需要翻译
    pub fn should_translate(&self, text: &str) -> bool {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return false;
        }

        // 没有任何字母的文本（纯数字、纯符号）没有可翻译内容
        if !trimmed.chars().any(|c| c.is_alphabetic()) {
            return false;
        }

        if is_numeric_badge(trimmed) {
            return false;
        }

        // 已经是目标文字的内容保持原样
        if let Some(script) = self.target_script {
            if script.appears_in(trimmed) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_badges_are_recognized() {
        assert!(is_numeric_badge("50M"));
        assert!(is_numeric_badge("4,180"));
        assert!(is_numeric_badge("1.5K"));
        assert!(is_numeric_badge("1200+"));
        assert!(is_numeric_badge("2.5B"));
    }

    #[test]
    fn test_plain_numbers_are_not_badges() {
        assert!(!is_numeric_badge("1200"));
        assert!(!is_numeric_badge("version 2"));
        assert!(!is_numeric_badge("no digits here"));
    }

    #[test]
    fn test_badge_anywhere_in_text_counts() {
        assert!(is_numeric_badge("Join 50M learners"));
    }

    #[test]
    fn test_should_translate_plain_english() {
        let filter = TextFilter::new("hi");
        assert!(filter.should_translate("Hello World"));
        assert!(filter.should_translate("  padded prose  "));
    }

    #[test]
    fn test_should_not_translate_empty_or_whitespace() {
        let filter = TextFilter::new("hi");
        assert!(!filter.should_translate(""));
        assert!(!filter.should_translate("   \n\t "));
    }

    #[test]
    fn test_should_not_translate_badges() {
        let filter = TextFilter::new("hi");
        assert!(!filter.should_translate("50M"));
        assert!(!filter.should_translate("4,180"));
        assert!(!filter.should_translate("1.5K"));
        assert!(!filter.should_translate("1200+"));
    }

    #[test]
    fn test_should_not_translate_symbols_or_digits() {
        let filter = TextFilter::new("hi");
        assert!(!filter.should_translate("—"));
        assert!(!filter.should_translate("1200"));
        assert!(!filter.should_translate("***"));
    }

    #[test]
    fn test_should_not_translate_target_script_text() {
        let filter = TextFilter::new("hi");
        assert!(!filter.should_translate("नमस्ते दुनिया"));
        assert!(!filter.should_translate("mixed नमस्ते text"));

        let filter = TextFilter::new("zh");
        assert!(!filter.should_translate("已经翻译"));
        assert!(filter.should_translate("नमस्ते"));
    }

    #[test]
    fn test_script_resolution_handles_region_codes() {
        assert_eq!(TargetScript::for_lang("zh-CN"), Some(TargetScript::Han));
        assert_eq!(TargetScript::for_lang("HI"), Some(TargetScript::Devanagari));
        assert_eq!(TargetScript::for_lang("fr"), None);
    }

    #[test]
    fn test_latin_target_disables_script_guard() {
        let filter = TextFilter::new("fr");
        assert!(filter.should_translate("Hello World"));
    }
}
