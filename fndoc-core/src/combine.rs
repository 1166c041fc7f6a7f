//! Merge the per-module Markdown artifacts into one combined manual.
//!
//! Files are taken in lexicographic file-name order. Each is introduced by a
//! heading derived from its file name and separated from the next by
//! [`PAGE_BREAK`]. A file that cannot be read is replaced by an inline error
//! block; the remaining files are still combined.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::artifact::{list_files_with_extension, write_artifact};

/// Horizontal rule plus a page-break directive understood by pandoc-style converters.
pub const PAGE_BREAK: &str = "\n\n---\n\n\\newpage\n\n";

pub const DEFAULT_TITLE: &str = "Project: CRUD Functionality Documentation";

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("no .md files found in {}", dir.display())]
    NoInput { dir: PathBuf },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The combined manual and what went into it.
#[derive(Debug)]
pub struct CombinedDoc {
    pub markdown: String,
    /// File names in the order they were combined.
    pub files: Vec<String>,
    /// `(file name, error text)` for files that could not be read.
    pub failures: Vec<(String, String)>,
}

/// Combine every `.md` file of `input_dir` under a `# {title}` heading.
pub fn combine_markdown(input_dir: &Path, title: &str) -> Result<CombinedDoc, CombineError> {
    let md_files = list_files_with_extension(input_dir, "md").map_err(|e| CombineError::Io {
        path: input_dir.to_path_buf(),
        source: e,
    })?;
    if md_files.is_empty() {
        error!(dir = %input_dir.display(), "[COMBINE][ERROR] No .md files found");
        return Err(CombineError::NoInput {
            dir: input_dir.to_path_buf(),
        });
    }
    info!(files = md_files.len(), dir = %input_dir.display(), "[COMBINE] Found Markdown files");

    let mut markdown = format!("# {title}\n\n");
    let mut files = Vec::with_capacity(md_files.len());
    let mut failures = Vec::new();
    let last = md_files.len() - 1;

    for (index, path) in md_files.iter().enumerate() {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(file = %filename, "[COMBINE] Processing");

        match std::fs::read_to_string(path) {
            Ok(content) => {
                markdown.push_str(&format!("\n\n# {}\n\n", derive_title(&filename)));
                markdown.push_str(content.trim());
            }
            Err(e) => {
                error!(file = %filename, error = %e, "[COMBINE][ERROR] Could not read file");
                markdown.push_str(&format!("\n\n## Error processing {filename}\n{e}\n\n"));
                failures.push((filename.clone(), e.to_string()));
            }
        }
        if index < last {
            markdown.push_str(PAGE_BREAK);
        }
        files.push(filename);
    }

    Ok(CombinedDoc {
        markdown,
        files,
        failures,
    })
}

/// Combine `input_dir` and write the result to `output_file`.
pub fn write_combined(
    input_dir: &Path,
    output_file: &Path,
    title: &str,
) -> Result<CombinedDoc, CombineError> {
    let combined = combine_markdown(input_dir, title)?;
    write_artifact(output_file, combined.markdown.as_bytes()).map_err(|e| {
        error!(path = %output_file.display(), error = %e, "[COMBINE][ERROR] Could not write combined file");
        CombineError::Io {
            path: output_file.to_path_buf(),
            source: e,
        }
    })?;
    info!(
        path = %output_file.display(),
        files = combined.files.len(),
        "[COMBINE] Combined documentation saved"
    );
    Ok(combined)
}

/// `user_crud_doc.md` → `User Crud Doc`.
pub fn derive_title(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    title_case(&stem.replace('_', " "))
}

/// Upper-case every letter that follows a non-letter, lower-case all others.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
