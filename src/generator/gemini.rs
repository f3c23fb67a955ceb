use serde::Deserialize;

use crate::config::ApiKey;
use crate::error::GenerationError;
use crate::generator::GenerativeModel;

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Offered as completions in the settings model field.
pub const KNOWN_MODELS: &[&str] = &[
    "models/gemini-2.5-flash",
    "models/gemini-2.5-flash-lite",
    "models/gemini-2.5-pro",
    "models/gemini-2.0-flash",
    "models/gemini-2.0-flash-lite",
];

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// `gemini-2.5-flash` and `models/gemini-2.5-flash` name the same model.
pub fn normalize_model(model: &str) -> String {
    let trimmed = model.trim().trim_matches('/');
    if trimmed.starts_with("models/") || trimmed.starts_with("tunedModels/") {
        trimmed.to_string()
    } else {
        format!("models/{trimmed}")
    }
}

pub struct GeminiClient {
    api_key: ApiKey,
    model: String,
    endpoint: String,
    #[cfg(feature = "network")]
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// The HTTP client carries no timeout; a request waits as long as the service does.
    pub fn new(api_key: ApiKey, model: &str, endpoint: &str) -> Result<Self, GenerationError> {
        #[cfg(feature = "network")]
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()?;

        Ok(Self {
            api_key,
            model: normalize_model(model),
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            #[cfg(feature = "network")]
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        })
    }

    fn extract_text(body: &[u8]) -> Result<String, GenerationError> {
        let response: GenerateResponse = serde_json::from_slice(body)?;
        response.first_text().ok_or(GenerationError::EmptyResponse)
    }
}

impl GenerativeModel for GeminiClient {
    #[cfg(feature = "network")]
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&Self::request_body(prompt))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.model, "generation request failed");
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes()?;
        Self::extract_text(&bytes)
    }

    #[cfg(not(feature = "network"))]
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Offline)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
