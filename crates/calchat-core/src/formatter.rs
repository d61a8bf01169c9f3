//! Renders backend tool results as markdown.
//!
//! Rendering is total: an error string short-circuits everything, a
//! malformed envelope becomes a debug dump, and an unknown code (or data
//! that does not fit its code) becomes a labelled raw dump.

use calchat_models::{
    codes, AvailabilityData, BookingData, CancellationFailedResult, CancelledBookingResult,
    EventData, ToolOutcome, ToolResult,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::datetime::DateFormatter;

/// Separator placed between consecutive tool results in one reply.
pub const TOOL_RESULT_SEPARATOR: &str = "\n\n---\n\n";

const NO_BOOKINGS_DEFAULT: &str = "You currently have no Cal.com bookings.";
const CREATE_BOOKING_TIP: &str =
    "\u{1F4A1} *Tip: You can create a new booking by asking me to schedule an event for you!*";

/// Formats a tool result with the default (UTC) date formatter.
pub fn format_tool_result_as_markdown(tool_result: &ToolResult) -> String {
    ResultFormatter::default().format(tool_result)
}

/// Markdown renderer for tool results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultFormatter {
    dates: DateFormatter,
}

impl ResultFormatter {
    pub fn new(dates: DateFormatter) -> Self {
        Self { dates }
    }

    pub fn dates(&self) -> &DateFormatter {
        &self.dates
    }

    /// Renders one tool result.
    pub fn format(&self, tool_result: &ToolResult) -> String {
        if let Some(error) = tool_result.error_message() {
            return format_error(error);
        }

        let Some(payload) = tool_result.inner() else {
            debug!("Tool result has no inner payload, dumping envelope");
            return format_debug(&to_pretty_json(tool_result));
        };

        debug!(code = %payload.code, "Formatting tool result");
        let code = payload.code.as_str();
        let message = payload.message.as_str();

        match payload.outcome() {
            ToolOutcome::AllMatched(booking) => self.format_all_matched(&booking),
            ToolOutcome::BookingsListed(bookings) => self.format_bookings_list(&bookings),
            ToolOutcome::BookingsEmpty => format_bookings_empty(message),
            ToolOutcome::BookingCancelled(result) => self.format_booking_cancelled(&result, message),
            ToolOutcome::BookingNotFound(bookings) => self.format_booking_not_found(&bookings, message),
            ToolOutcome::CancellationFailed(result) => {
                self.format_cancellation_failed(&result, message)
            }
            ToolOutcome::ApiRequestFailed | ToolOutcome::SlotsRequestFailed => {
                format_error(message)
            }
            ToolOutcome::NoMatch(events) => format_no_match(&events, message),
            ToolOutcome::AvailabilityNoExactMatch(availability) => {
                self.format_availability(&availability, message)
            }
            ToolOutcome::Unrecognized { code: _, data } => {
                if is_known_code(code) {
                    warn!(code = %code, "Tool data does not match its code, rendering raw");
                }
                format_default(code, message, &data)
            }
        }
    }

    /// Renders arbitrary JSON that is expected to be a tool result.
    ///
    /// A value that does not decode as an envelope, or lacks the inner
    /// payload, is dumped exactly as received.
    pub fn format_value(&self, value: &Value) -> String {
        let tool_result = match serde_json::from_value::<ToolResult>(value.clone()) {
            Ok(tool_result) => tool_result,
            Err(e) => {
                warn!(error = %e, "Tool result is not a valid envelope, dumping raw value");
                return format_debug(&to_pretty_json(value));
            }
        };

        if tool_result.error_message().is_none() && tool_result.inner().is_none() {
            return format_debug(&to_pretty_json(value));
        }
        self.format(&tool_result)
    }

    /// Renders several tool results as one reply.
    pub fn format_all(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|value| self.format_value(value))
            .collect::<Vec<_>>()
            .join(TOOL_RESULT_SEPARATOR)
    }

    fn format_all_matched(&self, booking: &BookingData) -> String {
        let mut markdown = format!(
            "\u{2705} I've created the event for you!\n\n**Event Details:**\n{}",
            self.summary_lines(booking, booking.start.as_deref(), booking.end.as_deref())
        );
        if let Some(url) = booking.detail_url() {
            markdown.push_str(&format!("\n\n[View Booking Details]({})", url));
        }
        markdown
    }

    fn format_bookings_list(&self, bookings: &[BookingData]) -> String {
        let mut markdown = String::from("\u{1F4C5} **Your Cal.com Bookings:**\n\n");

        if bookings.is_empty() {
            markdown.push_str("No bookings found.");
            return markdown;
        }

        for booking in bookings {
            markdown.push_str(&format!("**{}**\n", booking.display_title()));

            if let Some(status) = booking.status.as_deref() {
                markdown.push_str(&format!("- {} Status: {}\n", status_emoji(status), status));
            }

            let attendees = booking
                .attendee_names()
                .unwrap_or_else(|| "No attendees".to_string());
            markdown.push_str(&format!("- \u{1F465} Attendees: {}\n", attendees));

            if let Some(id) = &booking.id {
                markdown.push_str(&format!("- \u{1F194} Booking ID: `{}`\n", id));
            }
            if let Some(start) = non_empty(booking.start_time.as_deref()) {
                markdown.push_str(&format!("- \u{1F550} Start: **{}**\n", self.dates.date_time(start)));
            }
            if let Some(end) = non_empty(booking.end_time.as_deref()) {
                markdown.push_str(&format!("- \u{1F550} End: **{}**\n", self.dates.date_time(end)));
            }
            if let Some(url) = booking.detail_url() {
                markdown.push_str(&format!("- [View Booking Details]({})\n", url));
            }
            markdown.push('\n');
        }

        markdown
    }

    fn format_booking_cancelled(&self, result: &CancelledBookingResult, message: &str) -> String {
        let booking = &result.cancelled_booking;
        format!(
            "\u{2705} **Booking Cancelled Successfully!**\n\n**Cancelled Event Details:**\n{}\n\n{}",
            self.summary_lines(booking, booking.start_time.as_deref(), booking.end_time.as_deref()),
            message
        )
    }

    fn format_booking_not_found(&self, bookings: &[BookingData], message: &str) -> String {
        let mut markdown = format!("\u{274C} **{}**\n\n", message);

        if bookings.is_empty() {
            markdown.push_str("No existing bookings found.");
            return markdown;
        }

        markdown.push_str("**Your existing bookings:**\n");
        for (index, booking) in bookings.iter().enumerate() {
            markdown.push_str(&format!("**{}. {}**\n", index + 1, booking.display_title()));
            markdown.push_str(&format!(
                "- \u{1F550} Start: {}\n",
                self.dates.date_time_opt(booking.start_time.as_deref())
            ));
            if let Some(end) = non_empty(booking.end_time.as_deref()) {
                markdown.push_str(&format!("- \u{1F550} End: {}\n", self.dates.date_time(end)));
            }
            if let Some(url) = booking.detail_url() {
                markdown.push_str(&format!("- [View Booking]({})\n", url));
            }
            markdown.push('\n');
        }

        markdown
    }

    fn format_cancellation_failed(&self, result: &CancellationFailedResult, message: &str) -> String {
        let booking = &result.found_booking;
        let mut markdown = format!(
            "\u{274C} **Cancellation Failed**\n\n{}\n\n**Found Booking:**\n{}",
            message,
            self.summary_lines(booking, booking.start_time.as_deref(), booking.end_time.as_deref())
        );
        if let Some(reason) = result.cancellation_error.message.as_deref() {
            markdown.push_str(&format!("\n\n**Error:** {}", reason));
        }
        markdown
    }

    fn format_availability(&self, availability: &AvailabilityData, message: &str) -> String {
        let mut markdown = format!("\u{23F0} {}\n\n**Alternative Time Slots:**\n", message);

        for day in &availability.days {
            markdown.push_str(&format!("\n**{}:**\n", self.dates.long_date(&day.date)));
            for slot in &day.slots {
                let time = self.dates.time_of_day(slot.start.as_deref().unwrap_or_default());
                markdown.push_str(&format!("- {}\n", time));
            }
        }

        markdown
    }

    /// Title, start, end, and id lines of a booking summary.
    ///
    /// Start and end are always shown; a missing value renders as an
    /// invalid date. The id line is dropped when there is no id.
    fn summary_lines(&self, booking: &BookingData, start: Option<&str>, end: Option<&str>) -> String {
        let mut lines = vec![
            format!("- **Title:** {}", booking.display_title()),
            format!("- **Start:** {}", self.dates.date_time_opt(start)),
            format!("- **End:** {}", self.dates.date_time_opt(end)),
        ];
        if let Some(id) = &booking.id {
            lines.push(format!("- **Booking ID:** {}", id));
        }
        lines.join("\n")
    }
}

fn format_error(message: &str) -> String {
    format!("\u{274C} **Error:** {}", message)
}

fn format_debug(json: &str) -> String {
    format!("**Debug:**\n```json\n{}\n```", json)
}

fn format_bookings_empty(message: &str) -> String {
    let message = if message.is_empty() {
        NO_BOOKINGS_DEFAULT
    } else {
        message
    };
    format!(
        "\u{1F4C5} **No Bookings Found**\n\n{}\n\n{}",
        message, CREATE_BOOKING_TIP
    )
}

fn format_no_match(events: &[EventData], message: &str) -> String {
    let bullets: Vec<String> = events.iter().map(event_bullet).collect();
    format!(
        "\u{274C} {}\n\n**Available Events:**\n{}",
        message,
        bullets.join("\n")
    )
}

fn event_bullet(event: &EventData) -> String {
    let title = event.title.as_deref().unwrap_or("Untitled event");

    let mut details = Vec::new();
    if let Some(id) = &event.id {
        details.push(format!("ID: {}", id));
    }
    if let Some(slug) = event.slug.as_deref() {
        details.push(format!("Slug: {}", slug));
    }

    if details.is_empty() {
        format!("- **{}**", title)
    } else {
        format!("- **{}** ({})", title, details.join(", "))
    }
}

fn format_default(code: &str, message: &str, data: &Value) -> String {
    format!(
        "**Tool Result:**\n- **Code:** {}\n- **Message:** {}\n\n**Data:**\n```json\n{}\n```",
        code,
        message,
        to_pretty_json(data)
    )
}

fn status_emoji(status: &str) -> &'static str {
    match status {
        "accepted" => "\u{2705}",
        "pending" => "\u{23F3}",
        _ => "\u{2753}",
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn is_known_code(code: &str) -> bool {
    matches!(
        code,
        codes::ALL_MATCHED
            | codes::LIST_BOOKINGS_SUCCESS
            | codes::BOOKING_CANCELLED
            | codes::BOOKING_NOT_FOUND
            | codes::CANCELLATION_FAILED
            | codes::NO_MATCH
            | codes::AVAILABILITY_NO_EXACT_MATCH
    )
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("\"<unserializable: {}>\"", e))
}
