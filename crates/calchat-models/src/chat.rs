//! Request and response bodies of the scheduling assistant HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
        }
    }
}

/// Response of `POST /chat`.
///
/// Tool results stay as raw JSON so that each one can be rendered even when
/// it does not fit the expected envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub tool_results: Vec<Value>,

    #[serde(default)]
    pub session_id: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /sessions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<String>,
}

/// Response of `DELETE /sessions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearSessionResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sessions_response() {
        let response: SessionsResponse =
            serde_json::from_value(json!({"sessions": ["session_1", "session_2"]})).unwrap();
        assert_eq!(response.sessions, vec!["session_1", "session_2"]);

        let response: SessionsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.sessions.is_empty());
    }

    #[test]
    fn test_chat_response_defaults() {
        let response: ChatResponse = serde_json::from_value(json!({
            "session_id": "session_1"
        }))
        .unwrap();
        assert!(response.message.is_empty());
        assert!(response.tool_results.is_empty());
    }

    #[test]
    fn test_chat_response_keeps_raw_tool_results() {
        let response: ChatResponse = serde_json::from_value(json!({
            "message": "",
            "tool_results": [{"error": "boom"}, "not an envelope"],
            "session_id": "session_1"
        }))
        .unwrap();
        assert_eq!(response.tool_results.len(), 2);
        assert_eq!(response.tool_results[1], json!("not an envelope"));
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest::new("hi", "session_1");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"message": "hi", "session_id": "session_1"})
        );
    }
}
