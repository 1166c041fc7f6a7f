//! Prompt templates with a single named placeholder.
//!
//! Templates are plain text files using `str.format`-style braces: `{{` and
//! `}}` are literal braces, `{name}` is a field. Exactly one field name is
//! accepted per template. The template file is read again on every
//! [`PromptBuilder::build`] call so operators can edit it between runs.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::contract::{FormatError, PromptError};

/// Placeholder used by per-function prompts.
pub const CODE_PLACEHOLDER: &str = "code";
/// Placeholder used by per-module requirements prompts.
pub const FUNCTION_DOCS_PLACEHOLDER: &str = "function_docs";

/// Used when the requirements template file does not exist.
pub const DEFAULT_REQUIREMENTS_TEMPLATE: &str = "\
Analyze the following function documentation and write a Software Requirements Specification (SRS) section for the module it describes.

Function Documentation:
{function_docs}

Provide:
1. **Functional Requirements**: clear, testable requirements in \"The system shall...\" form
2. **Business Logic**: the business rules the functions implement
3. **Input/Output Specifications**: parameters and return values
4. **Error Handling**: expected error conditions and responses
5. **Performance Requirements**: any performance considerations
6. **Security Considerations**: authentication, authorization and data validation needs

Write in a professional SRS register suitable for stakeholders, developers and testers.
";

/// Builds prompts from a template file bound at construction.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template_path: PathBuf,
    placeholder: &'static str,
    fallback: Option<&'static str>,
}

impl PromptBuilder {
    /// Per-function prompts: `{code}`, the template file is required.
    pub fn for_functions(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            placeholder: CODE_PLACEHOLDER,
            fallback: None,
        }
    }

    /// Per-module requirements prompts: `{function_docs}`, falls back to
    /// [`DEFAULT_REQUIREMENTS_TEMPLATE`] when the file does not exist.
    pub fn for_requirements(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            placeholder: FUNCTION_DOCS_PLACEHOLDER,
            fallback: Some(DEFAULT_REQUIREMENTS_TEMPLATE),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    /// Read the template from disk (no caching).
    pub fn load_template(&self) -> Result<Cow<'static, str>, PromptError> {
        match std::fs::read_to_string(&self.template_path) {
            Ok(text) => Ok(Cow::Owned(text)),
            Err(e) => match self.fallback {
                Some(default) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(
                        path = %self.template_path.display(),
                        "Prompt template not found, using built-in default"
                    );
                    Ok(Cow::Borrowed(default))
                }
                _ => Err(PromptError::Template {
                    path: self.template_path.clone(),
                    source: e,
                }),
            },
        }
    }

    /// Load the template and substitute `value` into its placeholder.
    pub fn build(&self, value: &str) -> Result<String, PromptError> {
        let template = self.load_template()?;
        let prompt =
            render_template(&template, self.placeholder, value).map_err(|e| PromptError::Format {
                path: self.template_path.clone(),
                source: e,
            })?;
        debug!(
            template = %self.template_path.display(),
            prompt_len = prompt.len(),
            "Built prompt"
        );
        Ok(prompt)
    }
}

/// Substitute `value` for every `{placeholder}` in `template`.
pub fn render_template(template: &str, placeholder: &str, value: &str) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + value.len());
    let mut seen = false;
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let consumed = if tail.starts_with("{{") {
            out.push('{');
            2
        } else if tail.starts_with("}}") {
            out.push('}');
            2
        } else if tail.starts_with('}') {
            return Err(FormatError::UnbalancedBrace {
                offset: offset + pos,
            });
        } else {
            let close = tail.find('}').ok_or(FormatError::UnbalancedBrace {
                offset: offset + pos,
            })?;
            let field = &tail[1..close];
            if field.contains('{') {
                return Err(FormatError::UnbalancedBrace {
                    offset: offset + pos,
                });
            }
            if field != placeholder {
                return Err(FormatError::UnknownField(field.to_string()));
            }
            seen = true;
            out.push_str(value);
            close + 1
        };
        offset += pos + consumed;
        rest = &rest[pos + consumed..];
    }
    out.push_str(rest);

    if seen {
        Ok(out)
    } else {
        Err(FormatError::MissingPlaceholder(placeholder.to_string()))
    }
}
