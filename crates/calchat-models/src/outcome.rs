//! Per-code typed payloads.
//!
//! The backend vocabulary of codes can grow, so decoding is total: unknown
//! codes and payloads whose shape contradicts their code both land in
//! [`ToolOutcome::Unrecognized`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::booking::{
    AvailabilityData, BookingData, CancellationFailedResult, CancelledBookingResult, EventData,
};

/// Code tags understood by the formatter.
pub mod codes {
    pub const ALL_MATCHED: &str = "all_matched";
    pub const LIST_BOOKINGS_SUCCESS: &str = "list_all_cal_bookings_success";
    pub const LIST_BOOKINGS_EMPTY: &str = "list_all_cal_bookings_empty";
    pub const BOOKING_CANCELLED: &str = "booking_found_and_cancelled";
    pub const BOOKING_NOT_FOUND: &str = "booking_not_found";
    pub const CANCELLATION_FAILED: &str = "booking_cancellation_failed";
    pub const API_REQUEST_FAILED: &str = "calcom_api_request_failed";
    pub const SLOTS_REQUEST_FAILED: &str = "slots_request_failed";
    pub const NO_MATCH: &str = "no_match";
    pub const AVAILABILITY_NO_EXACT_MATCH: &str = "availability_no_exact_match";
    pub const UNEXPECTED_RESPONSE_FORMAT: &str = "unexpected_response_format";
}

/// Semantic outcome of a tool invocation with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// A booking was created.
    AllMatched(BookingData),
    /// The user's bookings, in backend order.
    BookingsListed(Vec<BookingData>),
    /// The user has no bookings.
    BookingsEmpty,
    /// A booking was cancelled.
    BookingCancelled(CancelledBookingResult),
    /// The booking to act on was not found; existing bookings are offered.
    BookingNotFound(Vec<BookingData>),
    /// A booking was found but cancelling it failed.
    CancellationFailed(CancellationFailedResult),
    /// An upstream Cal.com request failed.
    ApiRequestFailed,
    /// An availability query failed.
    SlotsRequestFailed,
    /// No event type matched; candidate event types are offered.
    NoMatch(Vec<EventData>),
    /// The requested slot is taken; alternatives are offered by date.
    AvailabilityNoExactMatch(AvailabilityData),
    /// Any other code, or data that does not fit its code.
    Unrecognized { code: String, data: Value },
}

impl ToolOutcome {
    /// Decodes `data` according to `code`. Never fails.
    pub fn decode(code: &str, data: &Value) -> Self {
        let decoded = match code {
            codes::ALL_MATCHED => object(data).map(Self::AllMatched),
            codes::LIST_BOOKINGS_SUCCESS => list(data).map(Self::BookingsListed),
            codes::LIST_BOOKINGS_EMPTY => Ok(Self::BookingsEmpty),
            codes::BOOKING_CANCELLED => object(data).map(Self::BookingCancelled),
            codes::BOOKING_NOT_FOUND => list(data).map(Self::BookingNotFound),
            codes::CANCELLATION_FAILED => object(data).map(Self::CancellationFailed),
            codes::API_REQUEST_FAILED => Ok(Self::ApiRequestFailed),
            codes::SLOTS_REQUEST_FAILED => Ok(Self::SlotsRequestFailed),
            codes::NO_MATCH => list(data).map(Self::NoMatch),
            codes::AVAILABILITY_NO_EXACT_MATCH => match data {
                Value::Object(_) => serde_json::from_value(data.clone()),
                _ => Ok(AvailabilityData::default()),
            }
            .map(Self::AvailabilityNoExactMatch),
            _ => return Self::unrecognized(code, data),
        };

        decoded.unwrap_or_else(|_| Self::unrecognized(code, data))
    }

    fn unrecognized(code: &str, data: &Value) -> Self {
        Self::Unrecognized {
            code: code.to_string(),
            data: data.clone(),
        }
    }

    /// Returns true if the payload fell through to the raw dump.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized { .. })
    }
}

/// Decodes a single object payload; `null` decodes as an empty record.
fn object<T: DeserializeOwned + Default>(data: &Value) -> serde_json::Result<T> {
    match data {
        Value::Null => Ok(T::default()),
        _ => serde_json::from_value(data.clone()),
    }
}

/// Decodes a list payload; anything that is not an array is an empty list.
fn list<T: DeserializeOwned>(data: &Value) -> serde_json::Result<Vec<T>> {
    match data {
        Value::Array(_) => serde_json::from_value(data.clone()),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_all_matched() {
        let outcome = ToolOutcome::decode(
            codes::ALL_MATCHED,
            &json!({"title": "Intro", "id": 12, "uid": "u1", "start": "2024-01-01T10:00:00Z"}),
        );
        match outcome {
            ToolOutcome::AllMatched(booking) => {
                assert_eq!(booking.title.as_deref(), Some("Intro"));
                assert_eq!(booking.uid.as_deref(), Some("u1"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_decode_list_non_array_is_empty() {
        assert_eq!(
            ToolOutcome::decode(codes::LIST_BOOKINGS_SUCCESS, &json!({"oops": true})),
            ToolOutcome::BookingsListed(vec![])
        );
        assert_eq!(
            ToolOutcome::decode(codes::BOOKING_NOT_FOUND, &Value::Null),
            ToolOutcome::BookingNotFound(vec![])
        );
    }

    #[test]
    fn test_decode_shape_mismatch_is_unrecognized() {
        let data = json!({"title": 42});
        let outcome = ToolOutcome::decode(codes::ALL_MATCHED, &data);
        assert_eq!(
            outcome,
            ToolOutcome::Unrecognized {
                code: codes::ALL_MATCHED.into(),
                data
            }
        );
    }

    #[test]
    fn test_decode_unknown_code() {
        let outcome = ToolOutcome::decode("some_future_code", &json!([1, 2]));
        assert!(outcome.is_unrecognized());

        let outcome = ToolOutcome::decode(codes::UNEXPECTED_RESPONSE_FORMAT, &json!("raw"));
        assert!(outcome.is_unrecognized());
    }

    #[test]
    fn test_decode_cancellation_failed() {
        let outcome = ToolOutcome::decode(
            codes::CANCELLATION_FAILED,
            &json!({
                "found_booking": {"title": "Sync", "id": "b1"},
                "cancellation_error": {"message": "Too late"}
            }),
        );
        match outcome {
            ToolOutcome::CancellationFailed(result) => {
                assert_eq!(result.found_booking.display_title(), "Sync");
                assert_eq!(result.cancellation_error.message.as_deref(), Some("Too late"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_decode_availability_non_object_is_empty() {
        assert_eq!(
            ToolOutcome::decode(codes::AVAILABILITY_NO_EXACT_MATCH, &json!([])),
            ToolOutcome::AvailabilityNoExactMatch(AvailabilityData::default())
        );
    }
}
