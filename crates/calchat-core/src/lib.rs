//! Calchat Core - rendering and conversation state for the Calchat client.
//!
//! - **formatter**: Render backend tool results as markdown
//! - **datetime**: Locale-style date and time rendering
//! - **config**: Client configuration from flags and environment
//! - **session**: Transcript, loading flag, and error banner of a chat

pub mod config;
pub mod datetime;
pub mod formatter;
pub mod session;

pub use config::{default_timezone, ClientConfig, ConfigError, DEFAULT_API_URL};
pub use datetime::{DateFormatter, DisplayZone, ZoneParseError, INVALID_DATE};
pub use formatter::{format_tool_result_as_markdown, ResultFormatter, TOOL_RESULT_SEPARATOR};
pub use session::{
    compose_outgoing, new_session_id, ChatMessage, ChatSession, Sender, CONNECT_FAILURE_BANNER,
    NO_RESPONSE_TEXT, SEND_FAILURE_BANNER, SEND_FAILURE_TEXT,
};
