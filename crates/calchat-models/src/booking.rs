//! Booking, event type, and availability entities.
//!
//! Every field the backend may leave out is optional so that a partially
//! populated payload still decodes and renders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Base URL of the booking detail page.
pub const BOOKING_URL_BASE: &str = "https://app.cal.com/booking/";

/// Identifier that the backend sends either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A booking attendee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default)]
    pub name: Option<String>,
}

/// One scheduled event.
///
/// Two naming conventions for the time range coexist: booking creation
/// reports `start`/`end`, while listing and cancellation report
/// `startTime`/`endTime`. They are kept apart on purpose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

impl BookingData {
    /// Creates a booking with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Title to display, falling back to a placeholder.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled booking")
    }

    /// Detail page link, if the booking carries a uid.
    pub fn detail_url(&self) -> Option<String> {
        self.uid
            .as_deref()
            .map(|uid| format!("{}{}", BOOKING_URL_BASE, uid))
    }

    /// Attendee names joined by ", ", or `None` when nobody has a name.
    pub fn attendee_names(&self) -> Option<String> {
        let names: Vec<&str> = self
            .attendees
            .iter()
            .flatten()
            .filter_map(|a| a.name.as_deref())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    }
}

/// Payload of `booking_found_and_cancelled`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancelledBookingResult {
    #[serde(default)]
    pub cancelled_booking: BookingData,
}

/// Nested error reported when cancellation fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancellationError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of `booking_cancellation_failed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancellationFailedResult {
    #[serde(default)]
    pub found_booking: BookingData,

    #[serde(default)]
    pub cancellation_error: CancellationError,
}

/// A bookable event type offered when a request matched nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventData {
    pub title: Option<String>,
    pub id: Option<RecordId>,
    pub slug: Option<String>,
}

/// A free slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(default)]
    pub start: Option<String>,
}

impl TimeSlot {
    pub fn starting_at(start: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
        }
    }
}

/// Slots offered for one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityDay {
    /// Date key as sent by the backend (`YYYY-MM-DD`).
    pub date: String,
    pub slots: Vec<TimeSlot>,
}

/// Alternative slots keyed by date, in the order the backend sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AvailabilityData {
    pub days: Vec<AvailabilityDay>,
}

impl TryFrom<Map<String, Value>> for AvailabilityData {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut days = Vec::with_capacity(map.len());
        for (date, slots) in map {
            // A day whose slot list is not an array offers nothing.
            let slots = match slots {
                Value::Array(_) => serde_json::from_value(slots)?,
                _ => Vec::new(),
            };
            days.push(AvailabilityDay { date, slots });
        }
        Ok(Self { days })
    }
}

impl From<AvailabilityData> for Map<String, Value> {
    fn from(data: AvailabilityData) -> Self {
        data.days
            .into_iter()
            .map(|day| {
                let slots = day
                    .slots
                    .into_iter()
                    .map(|slot| match slot.start {
                        Some(start) => serde_json::json!({ "start": start }),
                        None => serde_json::json!({}),
                    })
                    .collect();
                (day.date, Value::Array(slots))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_accepts_number_and_string() {
        let n: RecordId = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(n.to_string(), "7");

        let s: RecordId = serde_json::from_value(json!("bk_42")).unwrap();
        assert_eq!(s.to_string(), "bk_42");

        assert!(serde_json::from_value::<RecordId>(json!(true)).is_err());
    }

    #[test]
    fn test_booking_keeps_both_time_conventions() {
        let booking: BookingData = serde_json::from_value(json!({
            "title": "Sync",
            "start": "2024-01-01T10:00:00Z",
            "startTime": "2024-01-02T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(booking.start.as_deref(), Some("2024-01-01T10:00:00Z"));
        assert_eq!(booking.start_time.as_deref(), Some("2024-01-02T10:00:00Z"));
        assert!(booking.end.is_none());
        assert!(booking.end_time.is_none());
    }

    #[test]
    fn test_booking_detail_url() {
        let mut booking = BookingData::titled("Sync");
        assert_eq!(booking.detail_url(), None);

        booking.uid = Some("abc".into());
        assert_eq!(
            booking.detail_url().as_deref(),
            Some("https://app.cal.com/booking/abc")
        );
    }

    #[test]
    fn test_attendee_names() {
        let booking: BookingData = serde_json::from_value(json!({
            "attendees": [{"name": "Ana"}, {}, {"name": "Bo"}]
        }))
        .unwrap();
        assert_eq!(booking.attendee_names().as_deref(), Some("Ana, Bo"));

        let empty: BookingData = serde_json::from_value(json!({ "attendees": [] })).unwrap();
        assert_eq!(empty.attendee_names(), None);
        assert_eq!(BookingData::default().attendee_names(), None);
    }

    #[test]
    fn test_display_title_placeholder() {
        assert_eq!(BookingData::default().display_title(), "Untitled booking");
        assert_eq!(BookingData::titled("Standup").display_title(), "Standup");
    }

    #[test]
    fn test_availability_preserves_key_order() {
        let data: AvailabilityData = serde_json::from_value(json!({
            "2024-03-05": [{"start": "2024-03-05T09:00:00Z"}],
            "2024-03-01": [{"start": "2024-03-01T14:00:00Z"}, {"start": "2024-03-01T15:00:00Z"}],
            "2024-03-03": "none"
        }))
        .unwrap();

        let dates: Vec<&str> = data.days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-05", "2024-03-01", "2024-03-03"]);
        assert_eq!(data.days[1].slots.len(), 2);
        assert!(data.days[2].slots.is_empty());
    }

    #[test]
    fn test_availability_serializes_back_to_map() {
        let data = AvailabilityData {
            days: vec![AvailabilityDay {
                date: "2024-03-01".into(),
                slots: vec![TimeSlot::starting_at("2024-03-01T14:00:00Z")],
            }],
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            json!({"2024-03-01": [{"start": "2024-03-01T14:00:00Z"}]})
        );
    }
}
