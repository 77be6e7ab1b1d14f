//! HTML parsing and DOM manipulation
//!
//! - `dom`: parsing, queries, node creation and attachment
//! - `metadata`: charset detection
//! - `style`: inline `style` attribute editing
//! - `serializer`: DOM back to bytes

pub mod dom;
pub mod metadata;
pub mod serializer;
pub mod style;

pub use dom::{
    append_child, append_text, create_html_element, find_elements_with_attr, get_body,
    get_child_node_by_name, get_element_by_id, get_node_attr, get_node_name, get_parent_node,
    html_to_dom, is_inclusive_descendant, remove_node, set_node_attr, set_text_content,
    text_content,
};
pub use metadata::{get_charset, page_to_dom, parse_content_type};
pub use serializer::serialize_document;
pub use style::{get_style_property, remove_style_property, set_style_property};
