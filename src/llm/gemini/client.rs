//! Gemini client implementation

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::llm::core::{
    error::LlmError,
    provider::LlmProvider,
    types::{GenerateRequest, GenerateResponse},
};

use super::mapper::{from_gemini_response, to_gemini_request};
use super::types::GenerateContentResponse;

/// Root of the public Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini model identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 1.5 Flash
    Gemini15Flash,
    /// Gemini 2.5 Flash
    Gemini25Flash,
    /// Gemini 2.5 Pro
    Gemini25Pro,
    /// Any other model id accepted by the endpoint
    Other(String),
}

impl GeminiModel {
    /// Get the model identifier string
    pub fn as_str(&self) -> &str {
        match self {
            GeminiModel::Gemini15Flash => "gemini-1.5-flash",
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
            GeminiModel::Gemini25Pro => "gemini-2.5-pro",
            GeminiModel::Other(id) => id,
        }
    }
}

impl From<&str> for GeminiModel {
    fn from(id: &str) -> Self {
        match id {
            "gemini-1.5-flash" => GeminiModel::Gemini15Flash,
            "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
            "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
            other => GeminiModel::Other(other.to_string()),
        }
    }
}

/// Client for the Gemini generateContent endpoint, authenticated by API key
pub struct GeminiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Key sent in the `x-goog-api-key` header
    api_key: String,
    /// Endpoint root, without trailing slash
    base_url: String,
    /// Model to use
    model: GeminiModel,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: GeminiModel) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| {
                LlmError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    /// Point the client at a different endpoint root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &GeminiModel {
        &self.model
    }

    /// Build the endpoint URL for generateContent
    fn build_endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str()
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let gemini_request = to_gemini_request(request);

        let url = self.build_endpoint_url();
        debug!(model = self.model.as_str(), "calling Gemini generateContent");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        // Check status
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(LlmError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let gemini_response: GenerateContentResponse = serde_json::from_str(&body)?;
        from_gemini_response(gemini_response)
    }
}
