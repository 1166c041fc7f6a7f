/// # fndoc CLI Interface (Module)
///
/// Command parsing and orchestration for the `fndoc` binary. Each subcommand
/// maps to one pipeline entry point of [`fndoc-core`]; this module only
/// loads settings, builds the generation client and reports outcomes.
///
/// ## How To Use
/// - From the command line: `fndoc --help`.
/// - Programmatically or from integration tests: call [`run`] with a constructed [`Cli`].
///
/// [`fndoc-core`]: ../../fndoc_core/
use crate::load_config::load_config;
use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use fndoc_core::combine::write_combined;
use fndoc_core::config::Settings;
use fndoc_core::document::{document_sources, DocumentConfig};
use fndoc_core::gemini::GeminiClient;
use fndoc_core::manual::render_manual;
use fndoc_core::report::{generate_report, ReportConfig};
use std::path::PathBuf;

/// CLI for fndoc: generate function documentation and requirements reports from source code.
#[derive(Parser)]
#[clap(
    name = "fndoc",
    version,
    about = "Generate per-function documentation, a combined manual and an SRS report from Python sources"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Document every function of every source file, one Markdown file per source file
    Document,
    /// Combine the per-module Markdown files into one Markdown manual
    Combine,
    /// Render the per-module Markdown files into a PDF manual
    Manual,
    /// Synthesize per-module requirements and write the SRS PDF
    Report {
        /// Output PDF path, overrides `paths.report_output`
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Run document, combine and report in order
    All,
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");
    let settings = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Document => run_document(&settings).await,
        Commands::Combine => run_combine(&settings),
        Commands::Manual => run_manual(&settings),
        Commands::Report { output } => run_report(&settings, output).await,
        Commands::All => {
            run_document(&settings).await?;
            run_combine(&settings)?;
            run_report(&settings, None).await
        }
    }
}

fn generation_client(settings: &Settings) -> Result<GeminiClient> {
    GeminiClient::from_settings(&settings.generation).map_err(|e| {
        tracing::error!(error = %e, "Generation client unavailable");
        anyhow::anyhow!("{e}; set GEMINI_API_KEY in the environment or .env")
    })
}

async fn run_document(settings: &Settings) -> Result<()> {
    tracing::info!(command = "document", "Starting documentation generation");
    let client = generation_client(settings)?;
    let config = DocumentConfig {
        input_dir: settings.paths.input_dir.clone(),
        output_dir: settings.paths.output_dir.clone(),
        template_path: settings.paths.function_template.clone(),
        extension: settings.paths.source_extension.clone(),
    };

    let report = document_sources(&config, &client).await.map_err(|e| {
        tracing::error!(command = "document", error = %e, "Documentation run failed");
        anyhow::Error::new(e)
    })?;
    tracing::info!(
        command = "document",
        written = report.modules.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "Documentation complete"
    );

    if !report.failures.is_empty() && report.failures.len() == report.files_seen() {
        return Err(anyhow::anyhow!(
            "every source file failed ({} files)",
            report.failures.len()
        ));
    }
    Ok(())
}

fn run_combine(settings: &Settings) -> Result<()> {
    tracing::info!(command = "combine", "Combining module documentation");
    let combined = write_combined(
        &settings.paths.output_dir,
        &settings.paths.combined_output,
        &settings.project.combined_title,
    )?;
    tracing::info!(
        command = "combine",
        files = combined.files.len(),
        failed = combined.failures.len(),
        output = %settings.paths.combined_output.display(),
        "Combine complete"
    );
    Ok(())
}

fn run_manual(settings: &Settings) -> Result<()> {
    tracing::info!(command = "manual", "Rendering PDF manual");
    let files = render_manual(&settings.paths.output_dir, &settings.paths.manual_output)?;
    tracing::info!(
        command = "manual",
        files,
        output = %settings.paths.manual_output.display(),
        "Manual complete"
    );
    Ok(())
}

async fn run_report(settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    tracing::info!(command = "report", "Starting SRS report generation");
    let client = generation_client(settings)?;
    let config = ReportConfig {
        docs_dir: settings.paths.output_dir.clone(),
        output_file: output.unwrap_or_else(|| settings.paths.report_output.clone()),
        template_path: settings.paths.requirements_template.clone(),
        model_name: client.model().to_string(),
    };

    let outcome = generate_report(&config, &settings.project, Local::now().date_naive(), &client)
        .await
        .map_err(|e| {
            tracing::error!(command = "report", error = %e, "Report generation failed");
            anyhow::Error::new(e)
        })?;
    tracing::info!(
        command = "report",
        output = %outcome.output_file.display(),
        modules = outcome.modules,
        failed = outcome.failures.len(),
        "Report complete"
    );
    Ok(())
}
