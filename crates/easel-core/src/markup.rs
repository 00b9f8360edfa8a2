//! Parser for HTML-like embedding markup → `Fragment`.
//!
//! Built on `winnow` 0.7. Handles elements, quoted/unquoted/bare
//! attributes, self-closing and void elements, text and comments. That is
//! enough to validate a frame's markup and find its surface placeholder
//! before the host materializes it.

use crate::error::{EaselError, EaselResult};
use winnow::combinator::{alt, delimited};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Tag of the element that designates the drawing surface.
pub const PLACEHOLDER_TAG: &str = "canvas";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

// ─── Tree ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lowercased tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        lookup_attr(&self.attrs, name)
    }
}

/// A parsed markup fragment: a forest of top-level nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Element reached by following child indices from the top level.
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.nodes.get(*first)? {
            Node::Element(el) => el,
            Node::Text(_) => return None,
        };
        for &i in rest {
            current = match current.children.get(i)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(current)
    }
}

/// Location of the surface placeholder inside a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Child indices from the top level down to the placeholder.
    pub path: Vec<usize>,
    pub attrs: Vec<(String, String)>,
}

impl Placeholder {
    /// Path of the placeholder's parent element, or `None` at top level.
    pub fn parent_path(&self) -> Option<&[usize]> {
        match self.path.len() {
            0 | 1 => None,
            n => Some(&self.path[..n - 1]),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        lookup_attr(&self.attrs, name)
    }
}

fn lookup_attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

// ─── Entry points ────────────────────────────────────────────────────────

/// Parse a markup string into a `Fragment`.
///
/// # Errors
/// Returns a structure error for unbalanced or malformed tags.
pub fn parse_fragment(input: &str) -> EaselResult<Fragment> {
    let mut rest = input;
    let nodes = parse_nodes(&mut rest, None)?;
    Ok(Fragment { nodes })
}

/// Find the first `<canvas>` element, depth-first in document order.
///
/// # Errors
/// Returns a structure error if the fragment has no placeholder.
pub fn locate_placeholder(fragment: &Fragment) -> EaselResult<Placeholder> {
    let mut path = Vec::new();
    find_placeholder(&fragment.nodes, &mut path)
        .map(|el| Placeholder {
            path: path.clone(),
            attrs: el.attrs.clone(),
        })
        .ok_or_else(|| {
            EaselError::structure(format!("markup has no <{PLACEHOLDER_TAG}> placeholder"))
        })
}

/// Parse markup and locate its placeholder in one step.
pub fn parse_with_placeholder(input: &str) -> EaselResult<(Fragment, Placeholder)> {
    let fragment = parse_fragment(input)?;
    let placeholder = locate_placeholder(&fragment)?;
    Ok((fragment, placeholder))
}

fn find_placeholder<'a>(nodes: &'a [Node], path: &mut Vec<usize>) -> Option<&'a Element> {
    for (i, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else { continue };
        path.push(i);
        if el.tag == PLACEHOLDER_TAG {
            return Some(el);
        }
        if let Some(found) = find_placeholder(&el.children, path) {
            return Some(found);
        }
        path.pop();
    }
    None
}

// ─── Structure ───────────────────────────────────────────────────────────

fn parse_nodes(input: &mut &str, parent: Option<&str>) -> EaselResult<Vec<Node>> {
    let mut nodes = Vec::new();
    loop {
        if input.is_empty() {
            return match parent {
                Some(tag) => Err(EaselError::structure(format!("unclosed <{tag}> element"))),
                None => Ok(nodes),
            };
        }

        if input.starts_with("<!--") {
            skip_comment(input)?;
        } else if input.starts_with("</") {
            let tag = parse_closing_tag
                .parse_next(input)
                .map_err(|e| EaselError::structure(format!("closing tag parse error: {e}")))?;
            return match parent {
                Some(open) if open == tag => Ok(nodes),
                Some(open) => Err(EaselError::structure(format!(
                    "expected </{open}>, found </{tag}>"
                ))),
                None => Err(EaselError::structure(format!("unexpected </{tag}>"))),
            };
        } else if input.starts_with('<') {
            let (tag, attrs, self_closing) = parse_open_tag
                .parse_next(input)
                .map_err(|e| EaselError::structure(format!("element parse error: {e}")))?;
            let children = if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
                Vec::new()
            } else {
                parse_nodes(input, Some(&tag))?
            };
            nodes.push(Node::Element(Element {
                tag,
                attrs,
                children,
            }));
        } else {
            let text = take_till::<_, _, ContextError>(1.., '<')
                .parse_next(input)
                .map_err(|e| EaselError::structure(format!("text parse error: {e}")))?;
            if !text.trim().is_empty() {
                nodes.push(Node::Text(text.to_string()));
            }
        }
    }
}

fn skip_comment(input: &mut &str) -> EaselResult<()> {
    let body = &input[4..];
    match body.find("-->") {
        Some(end) => {
            *input = &body[end + 3..];
            Ok(())
        }
        None => Err(EaselError::structure("unterminated comment")),
    }
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn skip_ws(input: &mut &str) {
    *input = input.trim_start();
}

fn parse_name(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'
    })
    .map(|s: &str| s.to_ascii_lowercase())
    .parse_next(input)
}

fn parse_closing_tag(input: &mut &str) -> ModalResult<String> {
    let _ = "</".parse_next(input)?;
    let tag = parse_name.parse_next(input)?;
    skip_ws(input);
    let _ = '>'.parse_next(input)?;
    Ok(tag)
}

fn parse_open_tag(input: &mut &str) -> ModalResult<(String, Vec<(String, String)>, bool)> {
    let _ = '<'.parse_next(input)?;
    let tag = parse_name.parse_next(input)?;
    let mut attrs = Vec::new();
    loop {
        skip_ws(input);
        if let Some(rest) = input.strip_prefix("/>") {
            *input = rest;
            return Ok((tag, attrs, true));
        }
        if let Some(rest) = input.strip_prefix('>') {
            *input = rest;
            return Ok((tag, attrs, false));
        }
        attrs.push(parse_attribute.parse_next(input)?);
    }
}

fn parse_attribute(input: &mut &str) -> ModalResult<(String, String)> {
    let name: &str = take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'')
    })
    .parse_next(input)?;
    skip_ws(input);
    if !input.starts_with('=') {
        return Ok((name.to_ascii_lowercase(), String::new()));
    }
    let _ = '='.parse_next(input)?;
    skip_ws(input);
    let value: &str = alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
        take_while(1.., |c: char| {
            !c.is_whitespace() && !matches!(c, '>' | '"' | '\'')
        }),
    ))
    .parse_next(input)?;
    Ok((name.to_ascii_lowercase(), value.to_string()))
}

// ─── Tests ────────────────────────────────────────────────────────────────
