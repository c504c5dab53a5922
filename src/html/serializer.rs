use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 翻译整页时部分后端会把 DOCTYPE 关键字当作普通单词音译掉，
/// 留下的就是这个残缺声明。
pub const MANGLED_DOCTYPE: &str = "<!डॉक्टाइप html>";

const INDENT: &str = "  ";

// Elements that never carry a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

// Elements whose contents are reproduced verbatim, without reindentation
const VERBATIM_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

// Raw-text elements where entity escaping must not be applied
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// 将整棵 DOM 序列化为规范缩进形式
///
/// 输出是稳定的：对同一棵树重复序列化、或对序列化结果重新解析再序列化，
/// 得到的字节完全一致。
pub fn serialize_document(dom: &RcDom) -> String {
    let mut out = String::new();

    for child in dom.document.children.borrow().iter() {
        emit_node(child, 0, &mut out);
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }

    out
}

/// 修复被翻译后端破坏的文档类型声明
///
/// 残缺声明不存在时原样返回，重复调用安全。
pub fn repair_doctype(html: &str) -> String {
    if html.contains(MANGLED_DOCTYPE) {
        html.replace(MANGLED_DOCTYPE, "<!DOCTYPE html>")
    } else {
        html.to_string()
    }
}

fn emit_node(node: &Handle, depth: usize, out: &mut String) {
    match &node.data {
        NodeData::Doctype { ref name, .. } => {
            push_indent(depth, out);
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push_str(">\n");
        }
        NodeData::Text { ref contents } => {
            let text = contents.borrow();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                push_indent(depth, out);
                out.push_str(&escape_text(trimmed));
                out.push('\n');
            }
        }
        NodeData::Comment { ref contents } => {
            push_indent(depth, out);
            out.push_str("<!--");
            out.push_str(contents);
            out.push_str("-->\n");
        }
        NodeData::Element { ref name, .. } => {
            let tag = name.local.as_ref();

            push_indent(depth, out);
            push_open_tag(node, tag, out);

            if VOID_ELEMENTS.contains(&tag) {
                out.push('\n');
                return;
            }

            if VERBATIM_ELEMENTS.contains(&tag) {
                let escape = !RAW_TEXT_ELEMENTS.contains(&tag);
                for child in node.children.borrow().iter() {
                    emit_raw(child, escape, out);
                }
                push_close_tag(tag, out);
                out.push('\n');
                return;
            }

            let children = node.children.borrow();
            if let Some(text) = sole_text_child(&children) {
                out.push_str(&escape_text(text.trim()));
                push_close_tag(tag, out);
                out.push('\n');
                return;
            }

            if children.is_empty() {
                push_close_tag(tag, out);
                out.push('\n');
                return;
            }

            out.push('\n');
            for child in children.iter() {
                emit_node(child, depth + 1, out);
            }
            push_indent(depth, out);
            push_close_tag(tag, out);
            out.push('\n');
        }
        _ => {}
    }
}

// Verbatim subtrees keep their original whitespace untouched
fn emit_raw(node: &Handle, escape: bool, out: &mut String) {
    match &node.data {
        NodeData::Text { ref contents } => {
            let text = contents.borrow();
            if escape {
                out.push_str(&escape_text(&text));
            } else {
                out.push_str(&text);
            }
        }
        NodeData::Comment { ref contents } => {
            out.push_str("<!--");
            out.push_str(contents);
            out.push_str("-->");
        }
        NodeData::Element { ref name, .. } => {
            let tag = name.local.as_ref();
            push_open_tag(node, tag, out);
            if !VOID_ELEMENTS.contains(&tag) {
                for child in node.children.borrow().iter() {
                    emit_raw(child, escape, out);
                }
                push_close_tag(tag, out);
            }
        }
        _ => {}
    }
}

fn sole_text_child<'a>(children: &'a [Handle]) -> Option<std::cell::Ref<'a, html5ever::tendril::StrTendril>> {
    if children.len() != 1 {
        return None;
    }
    match children[0].data {
        NodeData::Text { ref contents } => Some(contents.borrow()),
        _ => None,
    }
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn push_open_tag(node: &Handle, tag: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);

    if let NodeData::Element { ref attrs, .. } = node.data {
        for attr in attrs.borrow().iter() {
            out.push(' ');
            out.push_str(attr.name.local.as_ref());
            out.push_str("=\"");
            out.push_str(&escape_attr(&attr.value));
            out.push('"');
        }
    }

    out.push('>');
}

fn push_close_tag(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::dom::html_to_dom;

    fn roundtrip(html: &str) -> String {
        serialize_document(&html_to_dom(html.as_bytes(), "utf-8"))
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let first = roundtrip(
            "<!DOCTYPE html><html><head><title>T</title></head>\
             <body><p>Hello <b>big</b> world</p><div><span>x</span></div></body></html>",
        );
        let second = roundtrip(&first);
        assert_eq!(first, second, "reserializing formatted output must not change it");
    }

    #[test]
    fn test_serialize_single_text_child_stays_inline() {
        let output = roundtrip("<html><head><title>My Page</title></head><body></body></html>");
        assert!(output.contains("<title>My Page</title>"));
    }

    #[test]
    fn test_serialize_keeps_script_contents_verbatim() {
        let output = roundtrip(
            "<html><body><script>if (a < b) { run(\"x\");\n  done(); }</script></body></html>",
        );
        assert!(output.contains("if (a < b) { run(\"x\");\n  done(); }"));

        let again = roundtrip(&output);
        assert_eq!(output, again);
    }

    #[test]
    fn test_serialize_void_elements_have_no_close_tag() {
        let output = roundtrip("<html><body><img alt=\"dog\"><br></body></html>");
        assert!(output.contains("<img alt=\"dog\">"));
        assert!(!output.contains("</img>"));
        assert!(!output.contains("</br>"));
    }

    #[test]
    fn test_serialize_escapes_text_and_attributes() {
        let output = roundtrip("<html><body><p title=\"a&quot;b\">1 &lt; 2 &amp; 3</p></body></html>");
        assert!(output.contains("1 &lt; 2 &amp; 3"));
        assert!(output.contains("title=\"a&quot;b\""));

        let again = roundtrip(&output);
        assert_eq!(output, again);
    }

    #[test]
    fn test_repair_doctype_replaces_mangled_token() {
        let broken = format!("{}\n<html>\n</html>\n", MANGLED_DOCTYPE);
        let repaired = repair_doctype(&broken);
        assert!(repaired.starts_with("<!DOCTYPE html>"));
        assert!(!repaired.contains(MANGLED_DOCTYPE));
    }

    #[test]
    fn test_repair_doctype_is_noop_without_token() {
        let clean = "<!DOCTYPE html>\n<html>\n</html>\n";
        assert_eq!(repair_doctype(clean), clean);
    }

    #[test]
    fn test_repair_doctype_is_idempotent() {
        let broken = format!("{}\n<html>\n</html>\n", MANGLED_DOCTYPE);
        let once = repair_doctype(&broken);
        let twice = repair_doctype(&once);
        assert_eq!(once, twice);
    }
}
