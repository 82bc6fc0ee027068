//! Wire client for the generative-language provider.
//!
//! One attempt per call, no retry/backoff; timeouts are left to reqwest.
//! Errors stay beneath the [`WritingGateway`](super::WritingGateway) trait -
//! the degradation policies in `gateway` convert them to inert values.

use async_trait::async_trait;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider response missing expected fields")]
    MalformedResponse,
}

/// One generation request. `response_schema` switches the provider into
/// structured-output mode (JSON matching the schema).
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub response_schema: Option<Value>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait GenerateClient: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GatewayError>;
}

/// Production client speaking the `generateContent` JSON contract.
pub struct HttpGenerateClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpGenerateClient {
    pub fn new(http: reqwest::Client, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body(request: &GenerateRequest) -> Value {
        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max) = request.max_output_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max));
        }
        if let Some(schema) = &request.response_schema {
            generation_config.insert("responseMimeType".to_string(), json!("application/json"));
            generation_config.insert("responseSchema".to_string(), schema.clone());
        }

        let mut body = json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
        });
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }
        body
    }

    fn extract_text(payload: &Value) -> Option<String> {
        payload
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
            .map(ToString::to_string)
    }
}

#[async_trait]
impl GenerateClient for HttpGenerateClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&Self::build_body(&request))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Self::extract_text(&payload).ok_or(GatewayError::MalformedResponse)
    }
}
