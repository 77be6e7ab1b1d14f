//! DOM parsing, queries and edits on `markup5ever_rcdom` trees

use std::rc::Weak;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::{create_element, NodeOrText, TreeSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Converts HTML bytes into a DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String = if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.to_string()
    } else {
        String::from_utf8_lossy(data).to_string()
    };

    parse_document(RcDom::default(), Default::default()).one(s)
}

/// Every element carrying `attr_name`, in document order
pub fn find_elements_with_attr(node: &Handle, attr_name: &str) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    collect_elements_with_attr(node, attr_name, &mut found_nodes);
    found_nodes
}

fn collect_elements_with_attr(node: &Handle, attr_name: &str, found_nodes: &mut Vec<Handle>) {
    if get_node_attr(node, attr_name).is_some() {
        found_nodes.push(node.clone());
    }

    for child_node in node.children.borrow().iter() {
        collect_elements_with_attr(child_node, attr_name, found_nodes);
    }
}

/// First element whose `id` attribute equals `id`
pub fn get_element_by_id(node: &Handle, id: &str) -> Option<Handle> {
    if get_node_attr(node, "id").as_deref() == Some(id) {
        return Some(node.clone());
    }

    node.children
        .borrow()
        .iter()
        .find_map(|child_node| get_element_by_id(child_node, id))
}

/// Gets a direct child element by tag name
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// Finds the `<body>` element of a parsed document
pub fn get_body(document: &Handle) -> Option<Handle> {
    get_child_node_by_name(document, "html").and_then(|html| get_child_node_by_name(&html, "body"))
}

/// Gets a node attribute value
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// Gets the node's tag name
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Parent of `child`, if it is attached to one
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    child.parent.set(weak);
    parent
}

/// True if `node` is `ancestor` or sits somewhere below it
pub fn is_inclusive_descendant(node: &Handle, ancestor: &Handle) -> bool {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if Handle::ptr_eq(&candidate, ancestor) {
            return true;
        }
        current = get_parent_node(&candidate);
    }
    false
}

/// Sets a node attribute; `None` removes it
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// Concatenated text of every descendant text node
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        text.push_str(&contents.borrow());
    }

    for child_node in node.children.borrow().iter() {
        collect_text(child_node, text);
    }
}

/// Creates a detached HTML element
pub fn create_html_element(dom: &RcDom, tag: &str, attrs: &[(&str, &str)]) -> Handle {
    create_element(
        dom,
        QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: format_tendril!("{}", value),
            })
            .collect(),
    )
}

/// Appends `child` as the last child of `parent`
pub fn append_child(dom: &RcDom, parent: &Handle, child: &Handle) {
    dom.append(parent, NodeOrText::AppendNode(child.clone()));
}

/// Appends a text node to `parent`
pub fn append_text(dom: &RcDom, parent: &Handle, text: &str) {
    dom.append(parent, NodeOrText::AppendText(StrTendril::from_slice(text)));
}

/// Detaches `node` from its parent
pub fn remove_node(dom: &RcDom, node: &Handle) {
    dom.remove_from_parent(node);
}

/// Replaces all children of `node` with a single text node
pub fn set_text_content(dom: &RcDom, node: &Handle, text: &str) {
    let children: Vec<Handle> = node.children.borrow().clone();
    for child in children.iter() {
        dom.remove_from_parent(child);
    }
    if !text.is_empty() {
        append_text(dom, node, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="root"><p data-i18n="a.b">Hello <b>there</b></p></div>
        <span data-i18n="c">World</span>
    </body></html>"#;

    #[test]
    fn test_find_elements_in_document_order() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let found = find_elements_with_attr(&dom.document, "data-i18n");
        let keys: Vec<String> = found
            .iter()
            .filter_map(|node| get_node_attr(node, "data-i18n"))
            .collect();
        assert_eq!(keys, vec!["a.b", "c"]);
    }

    #[test]
    fn test_text_content_includes_descendants() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let found = find_elements_with_attr(&dom.document, "data-i18n");
        assert_eq!(text_content(&found[0]), "Hello there");
    }

    #[test]
    fn test_parent_lookup_is_not_destructive() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let root = get_element_by_id(&dom.document, "root").unwrap();
        let paragraph = find_elements_with_attr(&dom.document, "data-i18n").remove(0);

        assert!(get_parent_node(&paragraph).is_some());
        assert!(get_parent_node(&paragraph).is_some());
        assert!(is_inclusive_descendant(&paragraph, &root));
        assert!(!is_inclusive_descendant(&root, &paragraph));
    }

    #[test]
    fn test_append_and_remove() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let body = get_body(&dom.document).unwrap();
        let span = create_html_element(&dom, "span", &[("data-i18n", "d")]);
        append_text(&dom, &span, "New");
        append_child(&dom, &body, &span);

        assert_eq!(find_elements_with_attr(&dom.document, "data-i18n").len(), 3);
        assert!(Handle::ptr_eq(&get_parent_node(&span).unwrap(), &body));

        remove_node(&dom, &span);
        assert_eq!(find_elements_with_attr(&dom.document, "data-i18n").len(), 2);
    }

    #[test]
    fn test_set_node_attr_adds_updates_and_removes() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let root = get_element_by_id(&dom.document, "root").unwrap();

        set_node_attr(&root, "title", Some("x".to_string()));
        assert_eq!(get_node_attr(&root, "title").as_deref(), Some("x"));
        set_node_attr(&root, "title", Some("y".to_string()));
        assert_eq!(get_node_attr(&root, "title").as_deref(), Some("y"));
        set_node_attr(&root, "title", None);
        assert_eq!(get_node_attr(&root, "title"), None);
    }
}
