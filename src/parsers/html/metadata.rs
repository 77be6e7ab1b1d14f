//! Charset detection from `Content-Type` values and `<meta>` elements

use encoding_rs::Encoding;
use markup5ever_rcdom::{Handle, RcDom};

use super::dom::{get_child_node_by_name, get_node_attr, html_to_dom};

/// Splits a `Content-Type` value into media type and charset (empty when absent)
pub fn parse_content_type(content_type: &str) -> (String, String) {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_lowercase();
    let mut charset = String::new();

    for part in parts {
        let part = part.trim();
        if let Some(value) = part
            .strip_prefix("charset=")
            .or_else(|| part.strip_prefix("CHARSET="))
        {
            charset = value.trim_matches('"').to_string();
        }
    }

    (media_type, charset)
}

/// Charset declared by `<meta charset>` or `<meta http-equiv="content-type">`
pub fn get_charset(document: &Handle) -> Option<String> {
    let head = get_child_node_by_name(document, "html")
        .and_then(|html| get_child_node_by_name(&html, "head"))?;

    for meta_node in head.children.borrow().iter() {
        if let Some(charset) = get_node_attr(meta_node, "charset") {
            return Some(charset);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                let (_media_type, charset) = parse_content_type(&content);
                if !charset.is_empty() {
                    return Some(charset);
                }
            }
        }
    }

    None
}

/// Parses page bytes, honouring the transport charset first and the document's
/// own declaration second
pub fn page_to_dom(data: &[u8], transport_charset: Option<&str>) -> RcDom {
    let initial = transport_charset
        .filter(|label| Encoding::for_label(label.as_bytes()).is_some())
        .unwrap_or("utf-8");
    let dom = html_to_dom(data, initial);

    if transport_charset.is_none() {
        if let Some(declared) = get_charset(&dom.document) {
            if let Some(encoding) = Encoding::for_label(declared.as_bytes()) {
                if encoding != encoding_rs::UTF_8 {
                    tracing::debug!("Re-parsing document as {}", encoding.name());
                    return html_to_dom(data, encoding.name());
                }
            }
        }
    }

    dom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_elements_with_attr, text_content};

    #[test]
    fn test_parse_content_type() {
        assert_eq!(
            parse_content_type("text/html; charset=\"ISO-8859-1\""),
            ("text/html".to_string(), "ISO-8859-1".to_string())
        );
        assert_eq!(
            parse_content_type("application/json"),
            ("application/json".to_string(), String::new())
        );
    }

    #[test]
    fn test_declared_charset_is_honoured() {
        let mut page = b"<html><head><meta charset=\"windows-1252\"></head><body><p data-i18n=\"k\">caf"
            .to_vec();
        page.push(0xE9);
        page.extend_from_slice(b"</p></body></html>");

        let dom = page_to_dom(&page, None);
        let found = find_elements_with_attr(&dom.document, "data-i18n");
        assert_eq!(text_content(&found[0]), "café");
    }
}
