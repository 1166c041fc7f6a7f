//! Per-unit documentation pipeline: extract → prompt → generate → write.
//!
//! For every source file in the input directory this module extracts the
//! function units, asks the [`Generator`] for documentation of each unit in
//! extraction order, and writes one Markdown artifact per file.
//!
//! # Failure boundary
//! The boundary is the file. Anything that fails while handling one file
//! (extraction, prompt template, a generation call, the write) stops the
//! remaining units of that file, is logged and recorded in the
//! [`DocumentReport`], and the next file is processed. Only setup failures
//! (listing the input directory, no input files, creating the output
//! directory, an unreadable function template) end the run.
//!
//! Files are processed one at a time and every generation call is awaited
//! before the next one is issued.
//!
//! # Navigation
//! - Main entrypoint: [`document_sources`]
//! - Single file: [`document_file`]

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::artifact::{list_files_with_extension, write_artifact};
use crate::contract::{
    ExtractError, GeneratedDoc, GenerationError, Generator, ModuleDoc, PromptError,
};
use crate::extract::extract_file;
use crate::prompt::PromptBuilder;

/// Inputs of one documentation run.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_path: PathBuf,
    /// Extension of source files, without the dot.
    pub extension: String,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("no .{extension} files found in {}", dir.display())]
    NoInput { dir: PathBuf, extension: String },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("generation failed for function `{unit}`: {source}")]
    Generation {
        unit: String,
        #[source]
        source: GenerationError,
    },
}

/// Result of one run over the input directory.
#[derive(Debug, Default)]
pub struct DocumentReport {
    pub modules: Vec<ModuleReport>,
    /// Source files without any function definition.
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl DocumentReport {
    pub fn files_seen(&self) -> usize {
        self.modules.len() + self.skipped.len() + self.failures.len()
    }
}

#[derive(Debug)]
pub struct ModuleReport {
    pub module_name: String,
    pub source_path: PathBuf,
    pub artifact_path: PathBuf,
    pub units: usize,
}

#[derive(Debug)]
pub struct FileFailure {
    pub source_path: PathBuf,
    pub error: String,
}

/// What happened to one source file.
#[derive(Debug)]
pub enum FileOutcome {
    Written(ModuleReport),
    NoUnits,
}

/// Document every source file in `config.input_dir`.
pub async fn document_sources<G>(
    config: &DocumentConfig,
    generator: &G,
) -> Result<DocumentReport, DocumentError>
where
    G: Generator + ?Sized,
{
    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        "[DOCS] Starting documentation run"
    );

    let sources = list_files_with_extension(&config.input_dir, &config.extension).map_err(|e| {
        error!(error = ?e, dir = %config.input_dir.display(), "[DOCS][ERROR] Cannot list input directory");
        DocumentError::Io {
            path: config.input_dir.clone(),
            source: e,
        }
    })?;
    if sources.is_empty() {
        warn!(dir = %config.input_dir.display(), extension = %config.extension, "[DOCS] No source files found");
        return Err(DocumentError::NoInput {
            dir: config.input_dir.clone(),
            extension: config.extension.clone(),
        });
    }

    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        error!(error = ?e, dir = %config.output_dir.display(), "[DOCS][ERROR] Cannot create output directory");
        DocumentError::Io {
            path: config.output_dir.clone(),
            source: e,
        }
    })?;

    info!(files = sources.len(), "[DOCS] Found source files to process");
    let builder = PromptBuilder::for_functions(&config.template_path);
    // Checked once here; each unit still re-reads the file.
    builder.load_template().map_err(|e| {
        error!(error = %e, "[DOCS][ERROR] Function prompt template unavailable");
        e
    })?;
    let mut report = DocumentReport::default();

    for source_path in sources {
        info!(file = %source_path.display(), "[DOCS] Processing source file");
        match document_file(&source_path, &config.output_dir, &builder, generator).await {
            Ok(FileOutcome::Written(module)) => {
                info!(
                    file = %source_path.display(),
                    artifact = %module.artifact_path.display(),
                    units = module.units,
                    "[DOCS] Documentation saved"
                );
                report.modules.push(module);
            }
            Ok(FileOutcome::NoUnits) => {
                info!(file = %source_path.display(), "[DOCS] No functions found, skipping file");
                report.skipped.push(source_path);
            }
            Err(e) => {
                error!(file = %source_path.display(), error = %e, "[DOCS][ERROR] Failed to document file");
                report.failures.push(FileFailure {
                    source_path,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        written = report.modules.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "[DOCS] Documentation run complete"
    );
    Ok(report)
}

/// Document a single source file into `output_dir`.
///
/// Nothing is written for a file without functions, or when any unit fails.
pub async fn document_file<G>(
    source_path: &Path,
    output_dir: &Path,
    builder: &PromptBuilder,
    generator: &G,
) -> Result<FileOutcome, DocumentError>
where
    G: Generator + ?Sized,
{
    let units = extract_file(source_path)?;
    if units.is_empty() {
        return Ok(FileOutcome::NoUnits);
    }

    let source_file = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let module_name = source_path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file.clone());
    let mut module = ModuleDoc::new(module_name, source_file);

    for unit in &units {
        info!(function = %unit.name, "[DOCS] Generating docs for function");
        let prompt = builder.build(&unit.source_text)?;
        let body = generator
            .generate(&prompt)
            .await
            .map_err(|e| DocumentError::Generation {
                unit: unit.name.clone(),
                source: e,
            })?;
        debug!(function = %unit.name, doc_len = body.len(), "[DOCS] Generated documentation");
        module.sections.push(GeneratedDoc {
            unit_name: unit.name.clone(),
            body,
        });
    }

    let artifact_path = output_dir.join(module.artifact_name());
    write_artifact(&artifact_path, module.to_markdown().as_bytes()).map_err(|e| {
        DocumentError::Io {
            path: artifact_path.clone(),
            source: e,
        }
    })?;

    Ok(FileOutcome::Written(ModuleReport {
        module_name: module.module_name,
        source_path: source_path.to_path_buf(),
        artifact_path,
        units: units.len(),
    }))
}
