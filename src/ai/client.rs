use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::http_client::generation_client;
use super::TextGenerator;
use crate::config::AiSettings;
use crate::error::AiError;
use crate::storage::{SharedStore, API_KEY_KEY};

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

/// API request body
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

/// API response body
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// API error response
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Gemini `generateContent` client
///
/// The API key is resolved on every request so a key saved in Settings takes
/// effect without rebuilding the client.
pub struct GeminiClient {
    client: &'static Client,
    settings: AiSettings,
    store: SharedStore,
}

impl GeminiClient {
    pub fn new(settings: AiSettings, store: SharedStore) -> Self {
        Self {
            client: generation_client(),
            settings,
            store,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// Stored key first, then the configured fallback
    fn api_key(&self) -> Result<String, AiError> {
        let stored = match self.store.get(API_KEY_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to read stored API key");
                None
            }
        };

        stored
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.settings.fallback_key.clone())
            .ok_or(AiError::MissingApiKey)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key()?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let text = extract_text(&body)?;
        debug!(
            model = %self.settings.model,
            prompt_chars = prompt.len(),
            reply_chars = text.len(),
            "Generated text"
        );
        Ok(text)
    }
}

/// Map a failed response onto an error kind the UI can explain
fn classify_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    let lowered = message.to_lowercase();

    if status == 401 || status == 403 || message.contains("API_KEY") || lowered.contains("api key")
    {
        AiError::InvalidApiKey(message)
    } else if status == 404 {
        AiError::ModelNotFound(message)
    } else if status == 429 || lowered.contains("quota") {
        AiError::QuotaExceeded(message)
    } else {
        AiError::Api { status, message }
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: &str) -> Result<String, AiError> {
    let response: GenerateResponse = serde_json::from_str(body).map_err(|e| AiError::Api {
        status: 200,
        message: format!("Failed to parse response: {}", e),
    })?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text.to_string())
}
