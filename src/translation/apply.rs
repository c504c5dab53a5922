//! 译文回写模块
//!
//! 把翻译结果按节点身份写回DOM。绝不做全文档字符串替换，相同的
//! 子串出现在别处也不会被波及。

use crate::html::{set_node_attr, set_text_contents};
use crate::translation::collector::TextUnit;

/// 把每个翻译结果写回它对应的位置
///
/// 条目和译文按下标一一对应。属性条目改写属性值，文本条目改写
/// 文本节点内容。返回实际替换的数量，正常情况下等于条目数。
pub fn apply_translations(units: &[TextUnit], translations: &[String]) -> usize {
    debug_assert_eq!(units.len(), translations.len());

    let mut replaced = 0;

    for (unit, translated) in units.iter().zip(translations.iter()) {
        match &unit.attr {
            Some(attr) => {
                set_node_attr(&unit.node, attr, Some(translated.clone()));
            }
            None => {
                set_text_contents(&unit.node, translated);
            }
        }
        replaced += 1;
    }

    replaced
}
