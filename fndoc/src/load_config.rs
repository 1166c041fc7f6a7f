/// `load_config` module: loads the optional YAML settings file and applies environment overrides.
///
/// This is the only place where user-supplied YAML is parsed. Every key is
/// optional; missing keys keep the defaults from [`Settings::default`].
///
/// # Environment
/// - `GEMINI_API_KEY`: API key of the generation service. Never read from YAML.
/// - `MODEL_NAME`: overrides `generation.model`.
/// - `PROJECT_NAME`, `COMPANY_NAME`: override the `project` section.
///
/// # Errors
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use anyhow::{Context, Result};
use fndoc_core::config::Settings;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "MODEL_NAME";
pub const PROJECT_ENV: &str = "PROJECT_NAME";
pub const COMPANY_ENV: &str = "COMPANY_NAME";

/// Load settings from `path` (or defaults when `None`) and apply the environment.
pub fn load_config(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            info!("No config file given, using default settings");
            Settings::default()
        }
    };
    apply_env(&mut settings);
    settings.trace_loaded();
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings> {
    info!(config_path = ?path, "Loading configuration from file");
    let content = fs::read_to_string(path)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    match serde_yaml::from_str::<Settings>(&content) {
        Ok(settings) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(settings)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn apply_env(settings: &mut Settings) {
    if let Some(key) = non_empty_env(API_KEY_ENV) {
        settings.generation.api_key = Some(key);
    }
    if let Some(model) = non_empty_env(MODEL_ENV) {
        settings.generation.model = model;
    }
    if let Some(name) = non_empty_env(PROJECT_ENV) {
        settings.project.name = name;
    }
    if let Some(company) = non_empty_env(COMPANY_ENV) {
        settings.project.company = company;
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
