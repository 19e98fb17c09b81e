//! Completion endpoint seam and its Gemini implementation.
//!
//! The relay posts the whole transcript on every round; the endpoint is
//! stateless. Any transport failure, non-2xx status or body without a first
//! candidate text is reported as an error and handled uniformly by the
//! caller.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use adiwiyata_core::models::chat::ChatTurn;
use tracing::{debug, info};

use crate::error::GeminiError;
use crate::wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Something that turns a transcript into the next model reply.
///
/// Methods return boxed futures for dyn compatibility.
pub trait CompletionClient: Send + Sync {
    /// Send the full transcript and return the raw reply text.
    fn generate<'a>(&'a self, contents: &'a [ChatTurn]) -> BoxFuture<'a, Result<String, GeminiError>>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeminiError::Config(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Post `contents` to `generateContent` and extract the reply text.
    pub async fn generate_content(&self, contents: &[ChatTurn]) -> Result<String, GeminiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GeminiError::Config("Gemini API key not provided".to_string()))?;

        debug!(model = %self.config.model, turns = contents.len(), "sending transcript");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&GenerateContentRequest { contents })
            .send()
            .await
            .map_err(|e| GeminiError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeminiError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(GeminiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::ResponseParse(e.to_string()))?;

        let text = parsed
            .first_text()
            .ok_or_else(|| GeminiError::ResponseParse("no text in first candidate".to_string()))?
            .to_string();

        info!(model = %self.config.model, reply_len = text.len(), "completion received");

        Ok(text)
    }
}

impl CompletionClient for GeminiClient {
    fn generate<'a>(&'a self, contents: &'a [ChatTurn]) -> BoxFuture<'a, Result<String, GeminiError>> {
        Box::pin(self.generate_content(contents))
    }
}
