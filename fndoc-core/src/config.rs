use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Run-wide configuration. Built once at startup and passed by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub project: ProjectSettings,
    pub generation: GenerationSettings,
}

impl Settings {
    pub fn trace_loaded(&self) {
        info!(
            input_dir = %self.paths.input_dir.display(),
            output_dir = %self.paths.output_dir.display(),
            model = %self.generation.model,
            api_key_set = self.generation.api_key.is_some(),
            project = %self.project.name,
            "Loaded Settings"
        );
        debug!(paths = ?self.paths, project = ?self.project, "Settings loaded (full debug)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory holding the source files to document.
    pub input_dir: PathBuf,
    /// Directory receiving one `<module>_doc.md` per source file.
    pub output_dir: PathBuf,
    pub function_template: PathBuf,
    pub requirements_template: PathBuf,
    pub combined_output: PathBuf,
    pub manual_output: PathBuf,
    pub report_output: PathBuf,
    /// Extension of source files, without the dot.
    pub source_extension: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("crud"),
            output_dir: PathBuf::from("crud_docs"),
            function_template: PathBuf::from("templates/prompt_template.txt"),
            requirements_template: PathBuf::from("templates/srs_prompt_template.txt"),
            combined_output: PathBuf::from("combined_crud_docs.md"),
            manual_output: PathBuf::from("crud_documentation.pdf"),
            report_output: PathBuf::from("SRS_Document.pdf"),
            source_extension: "py".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub name: String,
    pub company: String,
    /// Top-level title of the combined Markdown manual.
    pub combined_title: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            name: "CRUD Application System".to_string(),
            company: "Your Company Name".to_string(),
            combined_title: "Project: CRUD Functionality Documentation".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: String,
    pub base_url: String,
    /// Only ever injected from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
