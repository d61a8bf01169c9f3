//! HTTP client for the scheduling assistant API.

use calchat_core::ClientConfig;
use calchat_models::{
    ChatRequest, ChatResponse, ClearSessionResponse, HealthResponse, SessionsResponse,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Errors that can occur while talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error ({0}): {1}")]
    Status(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for API calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Client for `/health`, `/chat`, and `/sessions`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /health`
    pub async fn health_check(&self) -> Result<HealthResponse> {
        let url = self.config.endpoint(&["health"]);
        let response = self.send(self.client.get(url)).await?;
        decode(response).await
    }

    /// `POST /chat`
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.config.endpoint(&["chat"]);
        debug!(session_id = %request.session_id, "Sending chat message");
        trace!(message = %request.message, "Chat request body");

        let response = self.send(self.client.post(url).json(request)).await?;
        let response: ChatResponse = decode(response).await?;

        debug!(
            session_id = %response.session_id,
            tool_results = response.tool_results.len(),
            "Chat response received"
        );
        Ok(response)
    }

    /// `GET /sessions`
    pub async fn sessions(&self) -> Result<Vec<String>> {
        let url = self.config.endpoint(&["sessions"]);
        let response = self.send(self.client.get(url)).await?;
        let response: SessionsResponse = decode(response).await?;
        Ok(response.sessions)
    }

    /// `DELETE /sessions/{id}`
    pub async fn clear_session(&self, session_id: &str) -> Result<ClearSessionResponse> {
        let url: Url = self.config.endpoint(&["sessions", session_id]);
        let response = self.send(self.client.delete(url)).await?;
        decode(response).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response".to_string());
            return Err(ApiError::Status(status.as_u16(), body));
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| ApiError::ParseError(e.to_string()))
}
