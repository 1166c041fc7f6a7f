//! Render the folder of per-module Markdown files into one PDF manual.

use std::path::{Path, PathBuf};

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use thiserror::Error;
use tracing::{error, info};

use crate::artifact::list_files_with_extension;
use crate::pdf::{write_pdf, Block, PdfError};

pub const MANUAL_TITLE: &str = "Function Documentation";

#[derive(Debug, Error)]
pub enum ManualError {
    #[error("no .md files found in {}", dir.display())]
    NoInput { dir: PathBuf },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render manual: {0}")]
    Pdf(#[from] PdfError),
}

/// Render every `.md` file of `input_dir` into `output_pdf`. Returns the number of files.
pub fn render_manual(input_dir: &Path, output_pdf: &Path) -> Result<usize, ManualError> {
    let files = list_files_with_extension(input_dir, "md").map_err(|e| ManualError::Io {
        path: input_dir.to_path_buf(),
        source: e,
    })?;
    if files.is_empty() {
        error!(dir = %input_dir.display(), "[MANUAL][ERROR] No .md files found");
        return Err(ManualError::NoInput {
            dir: input_dir.to_path_buf(),
        });
    }

    let mut blocks = Vec::new();
    for (index, path) in files.iter().enumerate() {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(file = %filename, "[MANUAL] Processing");
        blocks.push(Block::Heading(format!("File: {filename}")));

        match std::fs::read_to_string(path) {
            Ok(markdown) => blocks.extend(markdown_to_blocks(&markdown)),
            Err(e) => {
                error!(file = %filename, error = %e, "[MANUAL][ERROR] Could not read file");
                blocks.push(Block::Body(format!("Error processing {filename}: {e}")));
            }
        }
        if index + 1 < files.len() {
            blocks.push(Block::PageBreak);
        }
    }

    write_pdf(output_pdf, MANUAL_TITLE, &blocks)?;
    info!(path = %output_pdf.display(), files = files.len(), "[MANUAL] Created PDF manual");
    Ok(files.len())
}

/// Markdown to layout blocks via the comrak AST.
///
/// Level 1 headings become headings, deeper ones subheadings. Inline markup
/// is flattened to its text, so emphasis markers and link targets disappear
/// while code spans keep their literal content. Thematic breaks and raw HTML
/// are dropped.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &comrak_options());
    let mut blocks = Vec::new();
    for child in root.children() {
        collect_blocks(child, &mut blocks);
    }
    blocks
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
}

fn collect_blocks<'a>(node: &'a AstNode<'a>, blocks: &mut Vec<Block>) {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Heading(heading) => {
            let text = inline_text(node);
            if heading.level == 1 {
                blocks.push(Block::Heading(text));
            } else {
                blocks.push(Block::Subheading(text));
            }
        }
        NodeValue::Paragraph => {
            let text = inline_text(node);
            if !text.trim().is_empty() {
                blocks.push(Block::Body(text));
            }
        }
        NodeValue::CodeBlock(code) => {
            blocks.push(Block::Code(code.literal.trim_end_matches('\n').to_string()));
        }
        NodeValue::Item(_) => {
            let text = node
                .children()
                .map(inline_text)
                .filter(|t| !t.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            blocks.push(Block::Body(format!("\u{2022} {text}")));
        }
        NodeValue::Table(_) => {
            let rows = node
                .children()
                .map(|row| {
                    row.children()
                        .map(inline_text)
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .collect::<Vec<_>>()
                .join("\n");
            blocks.push(Block::Body(rows));
        }
        NodeValue::ThematicBreak | NodeValue::HtmlBlock(_) => {}
        _ => {
            for child in node.children() {
                collect_blocks(child, blocks);
            }
        }
    }
}

/// Plain text of `node` and its inline descendants.
fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    push_inline_text(node, &mut text);
    text
}

fn push_inline_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push('\n'),
        NodeValue::HtmlInline(_) => {}
        _ => {
            for child in node.children() {
                push_inline_text(child, out);
            }
        }
    }
}
