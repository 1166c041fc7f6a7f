//! Software requirements report: module docs → requirements text → paginated PDF.
//!
//! The report is built in three steps so each can be tested on its own:
//! 1. [`read_module_docs`] loads the per-module Markdown artifacts.
//! 2. [`synthesize_requirements`] asks the [`Generator`] for requirements text
//!    per module (one call per module, module-level failure isolation).
//! 3. [`build_report`] assembles the [`ReportModel`]; [`report_blocks`] turns it
//!    into layout blocks for [`crate::pdf`].
//!
//! Table-of-contents page numbers are estimates: front matter starts at page
//! 3, the first module at page 6, and each module is assumed to take two
//! pages. Nothing corrects them after layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::artifact::list_files_with_extension;
use crate::combine::title_case;
use crate::config::ProjectSettings;
use crate::contract::Generator;
use crate::pdf::{write_pdf, Block, PdfError};
use crate::prompt::PromptBuilder;

pub const DOCUMENT_TITLE: &str = "Software Requirements Specification";

const FRONT_MATTER_FIRST_PAGE: u32 = 3;
const FIRST_MODULE_PAGE: u32 = 6;
const PAGES_PER_MODULE: u32 = 2;
/// Introduction, System Overview, Functional Requirements.
const FRONT_MATTER_SECTIONS: usize = 3;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no documentation files found in {}", dir.display())]
    NoInput { dir: PathBuf },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render report: {0}")]
    Pdf(#[from] PdfError),
}

/// Everything the report needs besides the module texts.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub docs_dir: PathBuf,
    pub output_file: PathBuf,
    pub template_path: PathBuf,
    /// Recorded in the appendix.
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportModel {
    pub title_page: TitlePage,
    pub toc_entries: Vec<TocEntry>,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitlePage {
    pub title: String,
    pub project_name: String,
    pub date: String,
    /// Label/value rows of the document information table.
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub label: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub heading: String,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    Subheading(String),
    Body(String),
}

/// Requirements text for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequirements {
    pub module: String,
    pub text: String,
}

/// Outcome of [`generate_report`].
#[derive(Debug)]
pub struct ReportOutcome {
    pub output_file: PathBuf,
    pub modules: usize,
    /// `(module, error text)` for modules whose requirements could not be generated.
    pub failures: Vec<(String, String)>,
}

/// Load every `.md` artifact in `dir`, keyed by module name.
pub fn read_module_docs(dir: &Path) -> Result<BTreeMap<String, String>, ReportError> {
    let files = list_files_with_extension(dir, "md").map_err(|e| ReportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    if files.is_empty() {
        error!(dir = %dir.display(), "[REPORT][ERROR] No documentation files found");
        return Err(ReportError::NoInput {
            dir: dir.to_path_buf(),
        });
    }

    let mut docs = BTreeMap::new();
    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let module = module_name_from_file(&file_name);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                info!(module = %module, "[REPORT] Loaded documentation");
                docs.insert(module, text);
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "[REPORT][ERROR] Could not read documentation file");
            }
        }
    }
    Ok(docs)
}

/// `user_crud_doc.md` → `user_crud`. Other file names are kept whole so
/// `a.md` and `a_doc.md` stay distinct modules.
fn module_name_from_file(file_name: &str) -> String {
    file_name
        .strip_suffix("_doc.md")
        .unwrap_or(file_name)
        .to_string()
}

/// Ask the generator for requirements text per module, in module-name order.
///
/// A failing module gets an inline error text instead of aborting the report.
pub async fn synthesize_requirements<G>(
    docs: &BTreeMap<String, String>,
    builder: &PromptBuilder,
    generator: &G,
) -> (Vec<ModuleRequirements>, Vec<(String, String)>)
where
    G: Generator + ?Sized,
{
    let mut modules = Vec::with_capacity(docs.len());
    let mut failures = Vec::new();

    for (module, function_docs) in docs {
        info!(module = %module, "[REPORT] Processing module");
        let result = match builder.build(function_docs) {
            Ok(prompt) => generator.generate(&prompt).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                error!(module = %module, error = %e, "[REPORT][ERROR] Error generating requirements content");
                failures.push((module.clone(), e.clone()));
                format!("Error generating content for this module: {e}")
            }
        };
        modules.push(ModuleRequirements {
            module: module.clone(),
            text,
        });
    }
    (modules, failures)
}

/// Split free text into paragraphs on blank lines. A paragraph wholly wrapped
/// in `**` becomes a subheading.
pub fn split_paragraphs(text: &str) -> Vec<Paragraph> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.len() > 4 && p.starts_with("**") && p.ends_with("**") {
                Paragraph::Subheading(p.replace("**", "").trim().to_string())
            } else {
                Paragraph::Body(p.to_string())
            }
        })
        .collect()
}

/// Table of contents for `modules`, with estimated page numbers.
pub fn table_of_contents(modules: &[String]) -> Vec<TocEntry> {
    let mut entries: Vec<TocEntry> = ["Introduction", "System Overview", "Functional Requirements"]
        .iter()
        .enumerate()
        .map(|(i, label)| TocEntry {
            label: format!("{}. {label}", i + 1),
            page: FRONT_MATTER_FIRST_PAGE + i as u32,
        })
        .collect();

    let mut page = FIRST_MODULE_PAGE;
    for (i, module) in modules.iter().enumerate() {
        entries.push(TocEntry {
            label: format!("{}. {}", FRONT_MATTER_SECTIONS + 1 + i, module_heading(module)),
            page,
        });
        page += PAGES_PER_MODULE;
    }

    let next = FRONT_MATTER_SECTIONS + modules.len() + 1;
    entries.push(TocEntry {
        label: format!("{next}. Non-Functional Requirements"),
        page,
    });
    entries.push(TocEntry {
        label: format!("{}. Appendices", next + 1),
        page: page + 1,
    });
    entries
}

fn module_heading(module: &str) -> String {
    format!("{} Module Requirements", title_case(&module.replace('_', " ")))
}

/// Assemble the full report model.
pub fn build_report(
    project: &ProjectSettings,
    date: NaiveDate,
    model_name: &str,
    modules: &[ModuleRequirements],
) -> ReportModel {
    let date = date.format("%B %d, %Y").to_string();
    let title_page = TitlePage {
        title: DOCUMENT_TITLE.to_string(),
        project_name: project.name.clone(),
        date: date.clone(),
        metadata: vec![
            ("Document Version:".to_string(), "1.0".to_string()),
            ("Date:".to_string(), date),
            ("Company:".to_string(), project.company.clone()),
            ("Document Type:".to_string(), DOCUMENT_TITLE.to_string()),
            ("Status:".to_string(), "Draft".to_string()),
        ],
    };

    let names: Vec<String> = modules.iter().map(|m| m.module.clone()).collect();
    let toc_entries = table_of_contents(&names);
    let mut labels = toc_entries.iter().map(|e| e.label.clone());
    let mut next_label = || labels.next().unwrap_or_default();

    let mut sections = vec![
        ReportSection {
            heading: next_label(),
            paragraphs: introduction(&project.name),
        },
        ReportSection {
            heading: next_label(),
            paragraphs: vec![Paragraph::Body(format!(
                "The {} is designed to provide robust data management capabilities through a \
                 well-structured CRUD interface. The system ensures data integrity, implements \
                 proper error handling, and maintains security standards throughout all operations.",
                project.name
            ))],
        },
        ReportSection {
            heading: next_label(),
            paragraphs: vec![Paragraph::Body(
                "The following sections detail the functional requirements for each module of the \
                 system, derived from the analysis of its functions and business logic."
                    .to_string(),
            )],
        },
    ];
    for module in modules {
        sections.push(ReportSection {
            heading: next_label(),
            paragraphs: split_paragraphs(&module.text),
        });
    }
    sections.push(ReportSection {
        heading: next_label(),
        paragraphs: non_functional_requirements(),
    });
    sections.push(ReportSection {
        heading: next_label(),
        paragraphs: appendices(&names, model_name),
    });

    ReportModel {
        title_page,
        toc_entries,
        sections,
    }
}

fn introduction(project_name: &str) -> Vec<Paragraph> {
    vec![
        Paragraph::Body(format!(
            "This Software Requirements Specification (SRS) document describes the functional and \
             non-functional requirements for the {project_name}. This document serves as the \
             foundation for system design, development, testing, and maintenance activities."
        )),
        Paragraph::Body(
            "The system provides CRUD (Create, Read, Update, Delete) operations for managing the \
             data entities of the application domain."
                .to_string(),
        ),
        Paragraph::Subheading("1.1 Purpose".to_string()),
        Paragraph::Body(
            "The purpose of this document is to provide a detailed description of the requirements \
             for the system, including functional requirements, interface requirements, performance \
             requirements, and other non-functional requirements."
                .to_string(),
        ),
        Paragraph::Subheading("1.2 Scope".to_string()),
        Paragraph::Body(
            "This SRS covers all functional modules of the system, including data management \
             operations, business logic implementation, error handling, and security considerations."
                .to_string(),
        ),
    ]
}

fn non_functional_requirements() -> Vec<Paragraph> {
    let groups: [(&str, &[&str]); 4] = [
        (
            "Performance Requirements",
            &[
                "Response time for CRUD operations should not exceed 2 seconds under normal load",
                "The system should handle concurrent users efficiently",
                "Database queries should be optimized for performance",
            ],
        ),
        (
            "Security Requirements",
            &[
                "All input data must be validated and sanitized",
                "Authentication is required for all CRUD operations",
                "An audit trail is kept for all data modifications",
                "Sensitive information is encrypted",
            ],
        ),
        (
            "Reliability Requirements",
            &[
                "System availability should be 99.9%",
                "Proper error handling and recovery mechanisms",
                "Data backup and recovery procedures",
            ],
        ),
        (
            "Usability Requirements",
            &[
                "Intuitive user interface design",
                "Clear error messages and user feedback",
                "Comprehensive user documentation",
            ],
        ),
    ];

    groups
        .iter()
        .flat_map(|(title, items)| {
            let bullets = items
                .iter()
                .map(|item| format!("\u{2022} {item}"))
                .collect::<Vec<_>>()
                .join("\n");
            [
                Paragraph::Subheading(title.to_string()),
                Paragraph::Body(bullets),
            ]
        })
        .collect()
}

fn appendices(modules: &[String], model_name: &str) -> Vec<Paragraph> {
    let inventory = if modules.is_empty() {
        "No modules were documented.".to_string()
    } else {
        modules
            .iter()
            .map(|m| format!("\u{2022} {m}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    vec![
        Paragraph::Subheading("A. Module Inventory".to_string()),
        Paragraph::Body(inventory),
        Paragraph::Subheading("B. Generation Notes".to_string()),
        Paragraph::Body(format!(
            "Module requirements were generated with the {model_name} model from the \
             per-function documentation of each module. Page numbers in the table of contents \
             are estimates."
        )),
    ]
}

/// Layout blocks for the report, one page per front-matter part and per section.
pub fn report_blocks(model: &ReportModel) -> Vec<Block> {
    let page = &model.title_page;
    let mut blocks = vec![
        Block::Spacer(144.0),
        Block::Title(page.title.clone()),
        Block::Spacer(36.0),
        Block::Heading(page.project_name.clone()),
        Block::Spacer(72.0),
        Block::Table(page.metadata.clone()),
        Block::PageBreak,
        Block::Heading("Table of Contents".to_string()),
        Block::Spacer(14.0),
    ];

    let mut toc = vec![("Section".to_string(), "Page".to_string())];
    toc.extend(
        model
            .toc_entries
            .iter()
            .map(|e| (e.label.clone(), e.page.to_string())),
    );
    blocks.push(Block::Table(toc));
    blocks.push(Block::PageBreak);

    for section in &model.sections {
        blocks.push(Block::Heading(section.heading.clone()));
        for paragraph in &section.paragraphs {
            match paragraph {
                Paragraph::Subheading(text) => blocks.push(Block::Subheading(text.clone())),
                Paragraph::Body(text) => blocks.push(Block::Body(text.clone())),
            }
        }
        blocks.push(Block::PageBreak);
    }
    blocks
}

/// Read the module docs, synthesize requirements and write the PDF report.
pub async fn generate_report<G>(
    config: &ReportConfig,
    project: &ProjectSettings,
    date: NaiveDate,
    generator: &G,
) -> Result<ReportOutcome, ReportError>
where
    G: Generator + ?Sized,
{
    info!(docs_dir = %config.docs_dir.display(), "[REPORT] Starting SRS document generation");
    let docs = read_module_docs(&config.docs_dir)?;
    if docs.is_empty() {
        warn!(dir = %config.docs_dir.display(), "[REPORT] No documentation file could be read");
    }

    let builder = PromptBuilder::for_requirements(&config.template_path);
    let (modules, failures) = synthesize_requirements(&docs, &builder, generator).await;
    let model = build_report(project, date, &config.model_name, &modules);
    write_pdf(&config.output_file, DOCUMENT_TITLE, &report_blocks(&model))?;

    info!(
        path = %config.output_file.display(),
        modules = modules.len(),
        failed = failures.len(),
        "[REPORT] SRS document generated"
    );
    Ok(ReportOutcome {
        output_file: config.output_file.clone(),
        modules: modules.len(),
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_name_strips_doc_suffix() {
        assert_eq!(module_name_from_file("user_crud_doc.md"), "user_crud");
        assert_eq!(module_name_from_file("notes.md"), "notes.md");
    }

    #[test]
    fn bold_only_paragraph_is_subheading() {
        let paragraphs = split_paragraphs("**Functional Requirements**\n\nThe system shall work.\n\n\n");
        assert_eq!(
            paragraphs,
            vec![
                Paragraph::Subheading("Functional Requirements".to_string()),
                Paragraph::Body("The system shall work.".to_string()),
            ]
        );
    }
}
