// src/rag_client.rs
use crate::models::chat::{BackendChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Response timeout for the RAG server. A slow answer generation run can
/// legitimately take tens of seconds, but never more than this.
pub const RESPONSE_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Could not connect to the AI server on {0}. Check that it is running.")]
    Connect(String),
    #[error("The AI server did not respond within {0} seconds.")]
    Timeout(u64),
    #[error("AI server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response from the AI server: {0}")]
    InvalidBody(String),
    #[error("Request to the AI server failed: {0}")]
    Request(String),
}

/// Seam over the AI backend so the chat service can be exercised against
/// a scripted backend in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &BackendChatRequest) -> Result<ChatResponse, RagError>;
}

/// HTTP client for the Python RAG server that generates the actual answers.
#[derive(Debug, Clone)]
pub struct RagClient {
    client: Client,
    base_url: String,
}

impl RagClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(RESPONSE_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, err: reqwest::Error) -> RagError {
        if err.is_timeout() {
            RagError::Timeout(RESPONSE_TIMEOUT_SECS)
        } else if err.is_connect() {
            RagError::Connect(self.base_url.clone())
        } else if err.is_decode() {
            RagError::InvalidBody(err.to_string())
        } else {
            RagError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl ChatBackend for RagClient {
    async fn chat(&self, request: &BackendChatRequest) -> Result<ChatResponse, RagError> {
        let url = format!("{}/chat", self.base_url);
        info!(
            "📤 Forwarding question to RAG server: {} (room: {})",
            url, request.session_id
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ RAG server HTTP error {}: {}", status, body);
            return Err(RagError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let answer: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::InvalidBody(e.to_string()))?;

        info!(
            "✅ RAG server answered: {} chars, {} source(s)",
            answer.answer.len(),
            answer.sources.len()
        );
        Ok(answer)
    }
}
