//! # contract: shared data model, the generation interface and stage errors
//!
//! Every pipeline stage (extract, prompt, document, combine, report, manual)
//! exchanges the plain data types defined here. The external text-generation
//! service is reached only through the [`Generator`] trait so that the real
//! HTTP client and test mocks are interchangeable.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockGenerator` is exported when
//!   the `test-export-mocks` feature is on (default) so the CLI crate and
//!   integration tests can drive the pipeline deterministically.

use std::ops::Range;
use std::path::PathBuf;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

/// One function-like definition found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Declared function name.
    pub name: String,
    /// Cleaned docstring, or the empty string when the function has none.
    pub existing_doc: String,
    /// Verbatim text of the definition, `def` through the end of the body.
    pub source_text: String,
    /// Byte range of `source_text` inside the file it was extracted from.
    pub span: Range<usize>,
}

/// Documentation produced by the generation service for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDoc {
    pub unit_name: String,
    pub body: String,
}

/// All generated documentation for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDoc {
    /// File stem of the source file, e.g. `user_crud`.
    pub module_name: String,
    /// File name of the source file, e.g. `user_crud.py`.
    pub source_file: String,
    pub sections: Vec<GeneratedDoc>,
}

impl ModuleDoc {
    pub fn new(module_name: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            source_file: source_file.into(),
            sections: Vec::new(),
        }
    }

    /// Markdown artifact: a title line, then one subsection per unit closed by a rule.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# Documentation for {}\n\n", self.source_file);
        for section in &self.sections {
            out.push_str(&format!("## Function: `{}`\n\n", section.unit_name));
            out.push_str(&section.body);
            out.push_str("\n\n---\n\n");
        }
        out
    }

    /// Name of the artifact written for this module.
    pub fn artifact_name(&self) -> String {
        format!("{}_doc.md", self.module_name)
    }
}

/// Trait for the external text-generation service: prompt in, text out.
///
/// Implementors make exactly one service call per invocation and return the
/// answer with surrounding whitespace removed.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Send one prompt and wait for the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// The source file could not be turned into units.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file} is not valid Python source (first error on line {line})")]
    Parse { file: String, line: usize },
    #[error("python grammar could not be loaded: {0}")]
    Grammar(String),
}

/// Placeholder substitution failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("template does not contain the {{{0}}} placeholder")]
    MissingPlaceholder(String),
    #[error("template refers to unknown field {{{0}}}")]
    UnknownField(String),
    #[error("unbalanced brace at byte {offset} of the template")]
    UnbalancedBrace { offset: usize },
}

/// A prompt could not be built.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read prompt template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("prompt template {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// The generation service call failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured for the generation service")]
    MissingCredential,
    #[error("request to the generation service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation service response could not be decoded: {0}")]
    Decode(String),
    #[error("generation service returned no text ({reason})")]
    EmptyResponse { reason: String },
}
