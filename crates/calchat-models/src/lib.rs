//! Data models for Calchat.
//!
//! This crate provides the wire and domain types shared by the formatter and
//! the command-line client: the tool-result envelope returned by the
//! scheduling backend, the per-code typed payloads, and the chat API types.

pub mod booking;
pub mod chat;
pub mod outcome;
pub mod tool_result;
pub mod user;

// Re-export main types
pub use booking::{
    Attendee, AvailabilityData, AvailabilityDay, BookingData, CancellationError,
    CancellationFailedResult, CancelledBookingResult, EventData, RecordId, TimeSlot,
};
pub use chat::{ChatRequest, ChatResponse, ClearSessionResponse, HealthResponse, SessionsResponse};
pub use outcome::{codes, ToolOutcome};
pub use tool_result::{ResultEnvelope, ToolPayload, ToolResult};
pub use user::{UserInfo, UserInfoError};
