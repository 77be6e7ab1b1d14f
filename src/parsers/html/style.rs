//! Inline `style` attribute editing, the way `element.style.x = ...` behaves
//!
//! Declarations keep their original order; setting an existing property
//! replaces it in place, setting a new one appends it.

use cssparser::{Parser, ParserInput, Token};
use markup5ever_rcdom::Handle;

use super::dom::{get_node_attr, set_node_attr};

/// Reads one declaration from the inline style
pub fn get_style_property(node: &Handle, property: &str) -> Option<String> {
    let style = get_node_attr(node, "style")?;
    parse_declarations(&style)
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
        .map(|(_, value)| value)
}

/// Sets one declaration, keeping the rest of the inline style
pub fn set_style_property(node: &Handle, property: &str, value: &str) {
    let mut declarations = parse_declarations(&get_node_attr(node, "style").unwrap_or_default());

    match declarations
        .iter_mut()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
    {
        Some(declaration) => declaration.1 = value.to_string(),
        None => declarations.push((property.to_string(), value.to_string())),
    }

    write_declarations(node, &declarations);
}

/// Removes one declaration; an emptied `style` attribute is dropped entirely
pub fn remove_style_property(node: &Handle, property: &str) {
    let Some(style) = get_node_attr(node, "style") else {
        return;
    };

    let mut declarations = parse_declarations(&style);
    declarations.retain(|(name, _)| !name.eq_ignore_ascii_case(property));
    write_declarations(node, &declarations);
}

fn write_declarations(node: &Handle, declarations: &[(String, String)]) {
    if declarations.is_empty() {
        set_node_attr(node, "style", None);
    } else {
        set_node_attr(node, "style", Some(compose_declarations(declarations)));
    }
}

/// Splits an inline style at top-level semicolons; quoted strings, `url(...)`
/// and other blocks stay whole inside their declaration's value
fn parse_declarations(style: &str) -> Vec<(String, String)> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();
    let mut start = parser.position();

    loop {
        let end = parser.position();
        let separator = parser
            .next_including_whitespace_and_comments()
            .map(|token| matches!(token, Token::Semicolon));

        match separator {
            Ok(true) => {
                push_declaration(&mut declarations, parser.slice(start..end));
                start = parser.position();
            }
            Ok(false) => {}
            Err(_) => {
                push_declaration(&mut declarations, parser.slice_from(start));
                break;
            }
        }
    }

    declarations
}

fn push_declaration(declarations: &mut Vec<(String, String)>, declaration: &str) {
    let Some((name, value)) = declaration.split_once(':') else {
        return;
    };
    let name = name.trim();
    if !name.is_empty() {
        declarations.push((name.to_lowercase(), value.trim().to_string()));
    }
}

fn compose_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}
