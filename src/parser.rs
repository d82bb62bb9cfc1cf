//! Template Parser - tokens to a small tree
//!
//! Recognized markers:
//! - `{{name}}` placeholder, or conditional opener when its closer follows in scope
//! - `{{/name}}` conditional closer
//! - `[SIGNATURE_SECTION]` ... `[/SIGNATURE_SECTION]` generated signature region
//!
//! Block names (openers that pair with a closer) are ASCII alphanumerics and
//! `_`. A placeholder key may be any text without braces, matched exactly
//! against the field values. `{{}}` and stray braces are literal text.
//! Markers that cannot be paired stay in the output verbatim and are reported
//! as diagnostics; parsing itself never fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const SIGNATURE_START: &str = "[SIGNATURE_SECTION]";
pub const SIGNATURE_END: &str = "[/SIGNATURE_SECTION]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind<'a> {
    Text,
    Open(&'a str),
    /// Key that can never open a block
    Key(&'a str),
    Close(&'a str),
    SignatureStart,
    SignatureEnd,
}

#[derive(Debug, Clone)]
struct Token<'a> {
    kind: TokenKind<'a>,
    raw: &'a str,
    offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Text { text: String },
    Placeholder { name: String },
    Conditional { name: String, children: Vec<Node> },
    Signature,
    /// Unpaired marker, emitted unchanged
    Verbatim { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnmatchedClose,
    UnclosedSignature,
    UnmatchedSignatureEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub kind: DiagnosticKind,
    pub marker: String,
    pub offset: usize,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            DiagnosticKind::UnmatchedClose => "closing tag without opener",
            DiagnosticKind::UnclosedSignature => "signature section never closed",
            DiagnosticKind::UnmatchedSignatureEnd => "signature end without start",
        };
        write!(f, "{} {} at byte {}", what, self.marker, self.offset)
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Malformed template: {}", join_diagnostics(.0))]
    Malformed(Vec<ParseDiagnostic>),
}

fn join_diagnostics(diagnostics: &[ParseDiagnostic]) -> String {
    diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTemplate {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedTemplate {
    pub fn is_well_formed(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Placeholder names in document order, including those inside conditionals.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = vec![];
        collect(&self.nodes, &mut |node| {
            if let Node::Placeholder { name } = node {
                names.push(name.as_str());
            }
        });
        names
    }

    pub fn conditionals(&self) -> Vec<&str> {
        let mut names = vec![];
        collect(&self.nodes, &mut |node| {
            if let Node::Conditional { name, .. } = node {
                names.push(name.as_str());
            }
        });
        names
    }

    pub fn signature_count(&self) -> usize {
        let mut count = 0;
        collect(&self.nodes, &mut |node| {
            if matches!(node, Node::Signature) {
                count += 1;
            }
        });
        count
    }
}

fn collect<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        visit(node);
        if let Node::Conditional { children, .. } = node {
            collect(children, visit);
        }
    }
}

fn is_name(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_key(candidate: &str) -> bool {
    !candidate.is_empty() && !candidate.contains(|c: char| c == '{' || c == '}')
}

fn flush_text<'a>(tokens: &mut Vec<Token<'a>>, source: &'a str, start: usize, end: usize) {
    if end > start {
        tokens.push(Token { kind: TokenKind::Text, raw: &source[start..end], offset: start });
    }
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let bytes = source.as_bytes();
    let mut tokens = vec![];
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        // Markers start with ASCII bytes, so `i` is always a char boundary here.
        let marker = match bytes[i] {
            b'{' if source[i..].starts_with("{{") => {
                source[i + 2..].find("}}").and_then(|end| {
                    let inner = &source[i + 2..i + 2 + end];
                    let len = end + 4;
                    match inner.strip_prefix('/') {
                        Some(name) if is_name(name) => Some((TokenKind::Close(name), len)),
                        None if is_name(inner) => Some((TokenKind::Open(inner), len)),
                        None if is_key(inner) => Some((TokenKind::Key(inner), len)),
                        _ => None,
                    }
                })
            }
            b'[' if source[i..].starts_with(SIGNATURE_START) => {
                Some((TokenKind::SignatureStart, SIGNATURE_START.len()))
            }
            b'[' if source[i..].starts_with(SIGNATURE_END) => {
                Some((TokenKind::SignatureEnd, SIGNATURE_END.len()))
            }
            _ => None,
        };

        match marker {
            Some((kind, len)) => {
                flush_text(&mut tokens, source, text_start, i);
                tokens.push(Token { kind, raw: &source[i..i + len], offset: i });
                i += len;
                text_start = i;
            }
            None => i += 1,
        }
    }
    flush_text(&mut tokens, source, text_start, bytes.len());
    tokens
}

fn push_text(nodes: &mut Vec<Node>, raw: &str) {
    if let Some(Node::Text { text }) = nodes.last_mut() {
        text.push_str(raw);
    } else {
        nodes.push(Node::Text { text: raw.to_string() });
    }
}

fn build_scope(tokens: &[Token<'_>], diagnostics: &mut Vec<ParseDiagnostic>) -> Vec<Node> {
    let mut nodes = vec![];
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match token.kind {
            TokenKind::Text => push_text(&mut nodes, token.raw),
            TokenKind::Open(name) => {
                // First matching closer in this scope wins
                let closer = tokens[i + 1..]
                    .iter()
                    .position(|t| t.kind == TokenKind::Close(name));
                if let Some(rel) = closer {
                    let end = i + 1 + rel;
                    let children = build_scope(&tokens[i + 1..end], diagnostics);
                    nodes.push(Node::Conditional { name: name.to_string(), children });
                    i = end + 1;
                    continue;
                }
                nodes.push(Node::Placeholder { name: name.to_string() });
            }
            TokenKind::Key(name) => nodes.push(Node::Placeholder { name: name.to_string() }),
            TokenKind::Close(_) => {
                diagnostics.push(ParseDiagnostic {
                    kind: DiagnosticKind::UnmatchedClose,
                    marker: token.raw.to_string(),
                    offset: token.offset,
                });
                nodes.push(Node::Verbatim { text: token.raw.to_string() });
            }
            TokenKind::SignatureStart => {
                let end = tokens[i + 1..]
                    .iter()
                    .position(|t| t.kind == TokenKind::SignatureEnd);
                if let Some(rel) = end {
                    nodes.push(Node::Signature);
                    i = i + 1 + rel + 1;
                    continue;
                }
                diagnostics.push(ParseDiagnostic {
                    kind: DiagnosticKind::UnclosedSignature,
                    marker: token.raw.to_string(),
                    offset: token.offset,
                });
                nodes.push(Node::Verbatim { text: token.raw.to_string() });
            }
            TokenKind::SignatureEnd => {
                diagnostics.push(ParseDiagnostic {
                    kind: DiagnosticKind::UnmatchedSignatureEnd,
                    marker: token.raw.to_string(),
                    offset: token.offset,
                });
                nodes.push(Node::Verbatim { text: token.raw.to_string() });
            }
        }
        i += 1;
    }

    nodes
}

/// Parse template text. Never fails; see [`ParsedTemplate::diagnostics`].
pub fn parse(source: &str) -> ParsedTemplate {
    let tokens = tokenize(source);
    let mut diagnostics = vec![];
    let nodes = build_scope(&tokens, &mut diagnostics);
    diagnostics.sort_by_key(|d| d.offset);
    ParsedTemplate { nodes, diagnostics }
}

/// Parse and reject any unpaired marker.
pub fn parse_strict(source: &str) -> Result<ParsedTemplate, TemplateError> {
    let parsed = parse(source);
    if parsed.is_well_formed() {
        Ok(parsed)
    } else {
        Err(TemplateError::Malformed(parsed.diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::Text { text: s.to_string() }
    }

    fn placeholder(s: &str) -> Node {
        Node::Placeholder { name: s.to_string() }
    }

    #[test]
    fn test_placeholder_and_text() {
        let parsed = parse("Hello {{name}}!");
        assert_eq!(parsed.nodes, vec![text("Hello "), placeholder("name"), text("!")]);
        assert!(parsed.is_well_formed());
    }

    #[test]
    fn test_conditional_block() {
        let parsed = parse("A{{flag}}B {{x}}{{/flag}}C");
        assert_eq!(
            parsed.nodes,
            vec![
                text("A"),
                Node::Conditional {
                    name: "flag".into(),
                    children: vec![text("B "), placeholder("x")],
                },
                text("C"),
            ]
        );
    }

    #[test]
    fn test_nested_conditionals() {
        let parsed = parse("{{a}}1{{b}}2{{/b}}3{{/a}}");
        assert_eq!(parsed.conditionals(), vec!["a", "b"]);
        assert!(parsed.is_well_formed());
    }

    #[test]
    fn test_mismatched_close_is_verbatim() {
        let parsed = parse("x{{/ghost}}y");
        assert_eq!(
            parsed.nodes,
            vec![text("x"), Node::Verbatim { text: "{{/ghost}}".into() }, text("y")]
        );
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::UnmatchedClose);
        assert_eq!(parsed.diagnostics[0].offset, 1);
    }

    #[test]
    fn test_crossed_blocks() {
        // `a` closes first, so `b` inside it is a plain placeholder and `{{/b}}` is stray
        let parsed = parse("{{a}}{{b}}{{/a}}{{/b}}");
        assert_eq!(parsed.placeholders(), vec!["b"]);
        assert_eq!(parsed.conditionals(), vec!["a"]);
        assert_eq!(parsed.diagnostics.len(), 1);
    }

    #[test]
    fn test_signature_section() {
        let parsed = parse("top[SIGNATURE_SECTION]old {{x}}[/SIGNATURE_SECTION]end");
        assert_eq!(parsed.nodes, vec![text("top"), Node::Signature, text("end")]);
        assert_eq!(parsed.signature_count(), 1);
    }

    #[test]
    fn test_unclosed_signature() {
        let parsed = parse("[SIGNATURE_SECTION] tail");
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::UnclosedSignature);
        assert!(parse_strict("[SIGNATURE_SECTION] tail").is_err());
    }

    #[test]
    fn test_empty_and_single_braces_are_text() {
        let parsed = parse("{{}} {single} {{/a-b}}");
        assert_eq!(parsed.nodes, vec![text("{{}} {single} {{/a-b}}")]);
        assert!(parsed.is_well_formed());
    }

    #[test]
    fn test_free_form_keys_are_placeholders() {
        let parsed = parse("{{start-date}}|{{ürünAdı}}|{{buyer name}}");
        assert_eq!(parsed.placeholders(), vec!["start-date", "ürünAdı", "buyer name"]);
    }

    #[test]
    fn test_free_form_key_never_opens_block() {
        let parsed = parse("{{a-b}}x{{/a-b}}");
        assert!(parsed.conditionals().is_empty());
        assert_eq!(parsed.nodes, vec![placeholder("a-b"), text("x{{/a-b}}")]);
    }

    #[test]
    fn test_triple_brace_and_unicode() {
        let parsed = parse("ş{{{name}}}ğ");
        assert_eq!(parsed.nodes, vec![text("ş{"), placeholder("name"), text("}ğ")]);
    }

    #[test]
    fn test_strict_error_message() {
        let err = parse_strict("a{{/b}}").unwrap_err();
        assert!(err.to_string().contains("closing tag without opener {{/b}}"));
    }
}
