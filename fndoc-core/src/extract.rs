//! Function extraction from Python source.
//!
//! The file is parsed with tree-sitter and the whole syntax tree is walked
//! breadth-first, collecting every `function_definition` node regardless of
//! nesting (module level, methods, closures defined with `def`, `async def`).
//! Source text is sliced from the input buffer by byte range, never
//! re-serialized.
//!
//! The concrete tree has wrapper nodes the Python AST does not
//! (`decorated_definition`, `block`, `else_clause`, `finally_clause`). The walk
//! looks through them, so a definition sits at the same depth as in `ast.walk`
//! and units come out in the same order.
//!
//! The grammar also accepts Python 2 `print` and `exec` statements; those are
//! rejected like any other syntax error.

use std::collections::VecDeque;
use std::path::Path;

use tracing::{debug, error};
use tree_sitter::{Node, Parser};

use crate::contract::{ExtractError, SourceUnit};

const FUNCTION_NODE: &str = "function_definition";
/// Wrappers without a counterpart level in the Python AST.
const TRANSPARENT_NODES: [&str; 4] = [
    "decorated_definition",
    "block",
    "else_clause",
    "finally_clause",
];
/// Python 2 statements the grammar still parses.
const LEGACY_STATEMENTS: [&str; 2] = ["print_statement", "exec_statement"];

/// Read and extract a source file from disk.
pub fn extract_file(path: &Path) -> Result<Vec<SourceUnit>, ExtractError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read source file");
        ExtractError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    extract_units(&source, &file_name)
}

/// Extract all function units from `source`, in breadth-first discovery order.
///
/// Fails for the whole file when the tree contains a syntax error; no
/// partial result is returned.
pub fn extract_units(source: &str, file_name: &str) -> Result<Vec<SourceUnit>, ExtractError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ExtractError::Grammar(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or_else(|| ExtractError::Parse {
        file: file_name.to_string(),
        line: 1,
    })?;
    let root = tree.root_node();
    let bad_line = if root.has_error() {
        Some(first_error_line(root).unwrap_or(1))
    } else {
        first_legacy_statement_line(root)
    };
    if let Some(line) = bad_line {
        error!(file = file_name, line, "Source file does not parse");
        return Err(ExtractError::Parse {
            file: file_name.to_string(),
            line,
        });
    }

    let bytes = source.as_bytes();
    let mut units = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if node.kind() == FUNCTION_NODE {
            if let Some(unit) = unit_from_node(node, source, bytes) {
                units.push(unit);
            }
        }
        queue_children(node, &mut queue);
    }

    debug!(file = file_name, units = units.len(), "Extracted function units");
    Ok(units)
}

/// Queue the children of `node`, replacing each wrapper node by its own children.
fn queue_children<'tree>(node: Node<'tree>, queue: &mut VecDeque<Node<'tree>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if TRANSPARENT_NODES.contains(&child.kind()) {
            queue_children(child, queue);
        } else {
            queue.push_back(child);
        }
    }
}

fn unit_from_node(node: Node<'_>, source: &str, bytes: &[u8]) -> Option<SourceUnit> {
    let name = node.child_by_field_name("name")?.utf8_text(bytes).ok()?;
    let span = node.byte_range();
    let existing_doc = node
        .child_by_field_name("body")
        .and_then(|body| docstring_literal(body, bytes))
        .map(|raw| clean_docstring(&raw))
        .unwrap_or_default();

    Some(SourceUnit {
        name: name.to_string(),
        existing_doc,
        source_text: source[span.clone()].to_string(),
        span,
    })
}

/// Raw content of the docstring, when the first statement of `body` is a plain string literal.
fn docstring_literal(body: Node<'_>, bytes: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let mut inner = first.walk();
    let expr = first.named_children(&mut inner).next()?;
    match expr.kind() {
        "string" => string_body(expr.utf8_text(bytes).ok()?),
        "concatenated_string" => {
            let mut parts = expr.walk();
            let pieces = expr
                .named_children(&mut parts)
                .map(|part| part.utf8_text(bytes).ok().and_then(string_body))
                .collect::<Option<Vec<_>>>()?;
            Some(pieces.concat())
        }
        _ => None,
    }
}

/// Strip prefix and quotes from a string literal. Bytes and f-strings are not docstrings.
fn string_body(literal: &str) -> Option<String> {
    let quote_at = literal.find(['"', '\''])?;
    let prefix = literal[..quote_at].to_ascii_lowercase();
    if prefix.contains('b') || prefix.contains('f') {
        return None;
    }
    let raw = prefix.contains('r');
    let quoted = &literal[quote_at..];
    for delim in ["\"\"\"", "'''", "\"", "'"] {
        if quoted.len() >= 2 * delim.len() && quoted.starts_with(delim) && quoted.ends_with(delim)
        {
            let body = &quoted[delim.len()..quoted.len() - delim.len()];
            return Some(if raw { body.to_string() } else { unescape(body) });
        }
    }
    None
}

/// Decode the backslash escapes of a non-raw string literal. Unknown escapes
/// and `\N{...}` names are kept verbatim.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => {
                        out.push(decoded);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

/// Clean a docstring the way `inspect.cleandoc` does.
fn clean_docstring(raw: &str) -> String {
    let expanded: Vec<String> = raw.lines().map(expand_tabs).collect();
    let mut lines: Vec<&str> = expanded.iter().map(String::as_str).collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines.remove(0).trim_start().to_string());
    for line in lines {
        let cut = margin.min(indent_width(line));
        cleaned.push(line[cut..].to_string());
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    cleaned.join("\n")
}

/// Tabs to the next multiple of eight columns, like `str.expandtabs`.
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - column % 8;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Line of the first Python 2 statement in document order.
fn first_legacy_statement_line(root: Node<'_>) -> Option<usize> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if LEGACY_STATEMENTS.contains(&node.kind()) {
            return Some(node.start_position().row + 1);
        }
        if cursor.goto_first_child() || cursor.goto_next_sibling() {
            continue;
        }
        loop {
            if !cursor.goto_parent() {
                return None;
            }
            if cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

fn first_error_line(root: Node<'_>) -> Option<usize> {
    let mut queue = VecDeque::from([root]);
    let mut best: Option<usize> = None;
    while let Some(node) = queue.pop_front() {
        if node.is_error() || node.is_missing() {
            let row = node.start_position().row + 1;
            best = Some(best.map_or(row, |b| b.min(row)));
            continue;
        }
        if node.has_error() {
            let mut cursor = node.walk();
            queue.extend(node.children(&mut cursor));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleandoc_removes_common_indentation() {
        let raw = "Summary line.\n\n        Details here.\n          indented more\n    ";
        assert_eq!(
            clean_docstring(raw),
            "Summary line.\n\nDetails here.\n  indented more"
        );
    }

    #[test]
    fn cleandoc_drops_leading_blank_lines() {
        assert_eq!(clean_docstring("\n    Only body.\n    "), "Only body.");
    }

    #[test]
    fn string_body_handles_prefixes_and_quotes() {
        assert_eq!(string_body(r#""""doc""""#).as_deref(), Some("doc"));
        assert_eq!(string_body("r'raw'").as_deref(), Some("raw"));
        assert_eq!(string_body("b'bytes'"), None);
        assert_eq!(string_body("f\"{x}\""), None);
    }

    #[test]
    fn string_body_decodes_escapes_unless_raw() {
        assert_eq!(
            string_body(r#""""Say \"hi\".""""#).as_deref(),
            Some("Say \"hi\".")
        );
        assert_eq!(string_body(r"'tab\there\x41\101'").as_deref(), Some("tab\thereAA"));
        assert_eq!(
            string_body(r"'keep \d and \N{DASH}'").as_deref(),
            Some(r"keep \d and \N{DASH}")
        );
        assert_eq!(string_body(r"r'raw \n'").as_deref(), Some(r"raw \n"));
    }
}
