//! Conversation state owned by the interactive client.
//!
//! A [`ChatSession`] holds the transcript, the in-flight flag, and the error
//! banner for one backend session. It performs no I/O; the caller sends the
//! request and feeds the outcome back in.

use calchat_models::{ChatRequest, ChatResponse, UserInfo};
use chrono::Utc;
use tracing::debug;

use crate::formatter::ResultFormatter;

/// Reply shown when the backend returns neither text nor tool results.
pub const NO_RESPONSE_TEXT: &str = "No response received from server";

/// Bot reply added when a chat request fails.
pub const SEND_FAILURE_TEXT: &str =
    "Sorry, I encountered an error while processing your message. Server is not available at the moment";

/// Banner set when a chat request fails.
pub const SEND_FAILURE_BANNER: &str = "Failed to send message. Please check your connection.";

/// Banner set when the startup health check fails.
pub const CONNECT_FAILURE_BANNER: &str = "Failed to connect to the API server.";

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
}

/// Generates a session id of the form `session_<unix millis>`.
pub fn new_session_id() -> String {
    format!("session_{}", Utc::now().timestamp_millis())
}

/// Prefixes a user message with the identity block the backend expects.
pub fn compose_outgoing(user: &UserInfo, text: &str) -> String {
    format!(
        "User info: Name: {}, Email: {}, Timezone: {}\n\nUser message: {}",
        user.name, user.email, user.timezone, text
    )
}

/// State of one conversation with the backend.
#[derive(Debug, Clone)]
pub struct ChatSession {
    session_id: String,
    messages: Vec<ChatMessage>,
    next_id: u64,
    loading: bool,
    error: Option<String>,
}

impl ChatSession {
    /// Starts a session with a fresh id.
    pub fn new() -> Self {
        Self::with_id(new_session_id())
    }

    /// Starts a session with a known id.
    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            next_id: 1,
            loading: false,
            error: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current error banner, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, banner: impl Into<String>) {
        self.error = Some(banner.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Input is accepted only when idle and no error banner is showing.
    pub fn can_send(&self) -> bool {
        !self.loading && self.error.is_none()
    }

    /// Records the user's message and marks a request as in flight.
    ///
    /// Returns the request body to send, with the identity block prepended.
    pub fn begin_send(&mut self, user: &UserInfo, text: &str) -> ChatRequest {
        self.push(Sender::User, text.to_string());
        self.loading = true;
        self.error = None;
        ChatRequest::new(compose_outgoing(user, text), self.session_id.clone())
    }

    /// Records the backend's reply.
    ///
    /// The reply text is the response message if there is one, otherwise
    /// the rendered tool results, otherwise a fixed notice.
    pub fn apply_response(
        &mut self,
        response: &ChatResponse,
        formatter: &ResultFormatter,
    ) -> &ChatMessage {
        if !response.session_id.is_empty() && response.session_id != self.session_id {
            debug!(
                ours = %self.session_id,
                theirs = %response.session_id,
                "Backend answered for a different session id"
            );
        }

        let text = if !response.message.is_empty() {
            response.message.clone()
        } else if !response.tool_results.is_empty() {
            formatter.format_all(&response.tool_results)
        } else {
            NO_RESPONSE_TEXT.to_string()
        };

        self.loading = false;
        self.push(Sender::Bot, text)
    }

    /// Records a failed request: apology reply plus error banner.
    pub fn apply_failure(&mut self) -> &ChatMessage {
        self.loading = false;
        self.error = Some(SEND_FAILURE_BANNER.to_string());
        self.push(Sender::Bot, SEND_FAILURE_TEXT.to_string())
    }

    /// Drops the transcript and starts over under a new session id.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn push(&mut self, sender: Sender, text: String) -> &ChatMessage {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage { id, text, sender });
        &self.messages[self.messages.len() - 1]
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
