//! 可翻译节点收集模块
//!
//! 遍历解析后的DOM，选出文本可以整体替换的节点和带可翻译属性的
//! 元素。script和style子树在入口处整体剪掉，不逐节点过滤。

use markup5ever_rcdom::{Handle, NodeData};

use crate::html::get_node_attr;
use crate::translation::config::constants;
use crate::translation::filters::TextFilter;

/// 一个待翻译的位置
///
/// 要么指向一个文本节点（整体替换其内容），要么指向元素加属性名
/// （替换属性值）。句柄在文档树存活期间有效，收集时同时带出当时
/// 的字面文本。
#[derive(Debug, Clone)]
pub struct TextUnit {
    /// 被替换的节点：文本节点本身，或持有属性的元素
    pub node: Handle,
    /// 属性名，None表示替换文本内容
    pub attr: Option<String>,
    /// 选择时提取的源语言文本，保证非空且去除了首尾空白
    pub text: String,
}

impl TextUnit {
    fn content(node: Handle, text: String) -> Self {
        Self {
            node,
            attr: None,
            text,
        }
    }

    fn attribute(node: Handle, attr: &str, text: String) -> Self {
        Self {
            node,
            attr: Some(attr.to_string()),
            text,
        }
    }

    /// 判断是否为属性文本
    pub fn is_attribute(&self) -> bool {
        self.attr.is_some()
    }
}

/// DOM文本收集器
pub struct TextCollector {
    filter: TextFilter,
}

impl TextCollector {
    pub fn new(filter: TextFilter) -> Self {
        Self { filter }
    }

    /// 收集整棵树中的可翻译位置
    ///
    /// 同一段文字出现在不同节点时会各自成为独立条目，收集过程
    /// 不做任何去重。
    pub fn collect(&self, root: &Handle) -> Vec<TextUnit> {
        let mut units = Vec::new();
        self.walk(root, &mut units);
        units
    }

    fn walk(&self, node: &Handle, units: &mut Vec<TextUnit>) {
        if let NodeData::Element { ref name, .. } = node.data {
            let tag = name.local.as_ref();

            if constants::SKIP_ELEMENTS.contains(&tag) {
                return;
            }

            for (attr_tag, attr_name) in constants::TRANSLATABLE_ATTRS {
                if tag == *attr_tag {
                    if let Some(value) = get_node_attr(node, attr_name) {
                        if self.filter.should_translate(&value) {
                            units.push(TextUnit::attribute(
                                node.clone(),
                                attr_name,
                                value.trim().to_string(),
                            ));
                        }
                    }
                }
            }

            if constants::TEXT_TAGS.contains(&tag) {
                // 只接受恰好一个文本子节点的元素，文字被混合子节点
                // 打散的元素留给更深层的遍历去处理
                if let Some((text_node, text)) = sole_text_child(node) {
                    if self.filter.should_translate(&text) {
                        units.push(TextUnit::content(text_node, text.trim().to_string()));
                    }
                    return;
                }
            }
        }

        for child in node.children.borrow().iter() {
            self.walk(child, units);
        }
    }
}

fn sole_text_child(node: &Handle) -> Option<(Handle, String)> {
    let children = node.children.borrow();
    if children.len() != 1 {
        return None;
    }

    match children[0].data {
        NodeData::Text { ref contents } => Some((children[0].clone(), contents.borrow().to_string())),
        _ => None,
    }
}
