//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `serializer`: 规范化序列化与doctype修复

pub mod dom;
pub mod serializer;

pub use dom::{
    find_nodes, get_node_attr, get_node_name, html_to_dom, node_text, set_node_attr,
    set_text_contents,
};
pub use serializer::{repair_doctype, serialize_document, MANGLED_DOCTYPE};
