//! [`Generator`] implementation backed by the Gemini `generateContent` REST endpoint.
//!
//! One blocking round trip per prompt: no timeout, no retry, no batching.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::GenerationSettings;
use crate::contract::{GenerationError, Generator};

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from settings; the API key must be present.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let api_key = match settings.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                error!("GEMINI_API_KEY missing, cannot construct generation client");
                return Err(GenerationError::MissingCredential);
            }
        };
        info!(
            model = %settings.model,
            base_url = %settings.base_url,
            "Initialised Gemini generation client"
        );
        Ok(Self::new(&settings.base_url, &settings.model, api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.endpoint();
        debug!(url = %url, prompt_len = prompt.len(), "Calling generation service");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, url = %url, "Generation request failed");
                GenerationError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(status = %status, url = %url, "Generation service returned error. Response body: {body}");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response_text(&body)?;
        debug!(response_len = text.len(), "Generation service answered");
        Ok(text)
    }
}

/// Decode a `generateContent` response body into trimmed text.
pub fn response_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;

    let candidate = match parsed.candidates.into_iter().next() {
        Some(c) => c,
        None => {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(GenerationError::EmptyResponse { reason });
        }
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty content".to_string());
        return Err(GenerationError::EmptyResponse { reason });
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
