//! End-to-end rendering of chat responses shaped like the assistant backend's.

use calchat_core::{ChatSession, ResultFormatter, Sender, INVALID_DATE};
use calchat_models::{ChatResponse, UserInfo};

fn user() -> UserInfo {
    UserInfo::new("Ana", "ana@example.com", "UTC")
}

fn reply_for(body: &str) -> String {
    let response: ChatResponse = serde_json::from_str(body).unwrap();
    let mut session = ChatSession::with_id("session_1700000000000");
    session.begin_send(&user(), "what's on my calendar?");
    let reply = session.apply_response(&response, &ResultFormatter::default());
    assert_eq!(reply.sender, Sender::Bot);
    reply.text.clone()
}

#[test]
fn test_list_bookings_tool_result() {
    let text = reply_for(
        r#"{
            "message": "",
            "session_id": "session_1700000000000",
            "tool_results": [{
                "tool": "list_all_cal_bookings",
                "args": {"user_email": "ana@example.com"},
                "result": {
                    "status": "success",
                    "result": {
                        "code": "list_all_cal_bookings_success",
                        "message": "Successfully retrived a list of bookings relevant to ana@example.com",
                        "data": [{
                            "uid": "q8Zt1",
                            "id": 3141,
                            "title": "Design review",
                            "startTime": "2024-07-09T13:00:00.000Z",
                            "endTime": "2024-07-09T13:45:00.000Z",
                            "status": "accepted",
                            "attendees": [
                                {"name": "Ana", "email": "ana@example.com", "timeZone": "UTC"},
                                {"name": "Bo", "email": "bo@example.com", "timeZone": "UTC"}
                            ]
                        }]
                    }
                }
            }]
        }"#,
    );

    assert!(text.starts_with("\u{1F4C5} **Your Cal.com Bookings:**"));
    assert!(text.contains("**Design review**"));
    assert!(text.contains("- \u{1F465} Attendees: Ana, Bo"));
    assert!(text.contains("- \u{1F194} Booking ID: `3141`"));
    assert!(text.contains("- \u{1F550} Start: **7/9/2024, 1:00:00 PM**"));
    assert!(text.contains("- \u{1F550} End: **7/9/2024, 1:45:00 PM**"));
    assert!(text.contains("https://app.cal.com/booking/q8Zt1"));
}

#[test]
fn test_tool_error_and_unknown_code_in_one_reply() {
    let text = reply_for(
        r#"{
            "message": "",
            "session_id": "session_1700000000000",
            "tool_results": [
                {"tool": "cancel_user_booking", "args": {}, "error": "Cal.com API key missing"},
                {
                    "tool": "find_event_id_by_name",
                    "args": {"event_name": "intro"},
                    "result": {
                        "status": "success",
                        "result": {"code": "found_match", "message": "Found intro", "data": {"id": 5}}
                    }
                }
            ]
        }"#,
    );

    let parts: Vec<&str> = text.split("\n\n---\n\n").collect();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], "\u{274C} **Error:** Cal.com API key missing");
    assert!(parts[1].contains("- **Code:** found_match"));
    assert!(parts[1].contains("- **Message:** Found intro"));
    assert!(parts[1].contains("\"id\": 5"));
}

#[test]
fn test_null_dates_from_backend() {
    let text = reply_for(
        r#"{
            "message": "",
            "session_id": "session_1700000000000",
            "tool_results": [{
                "tool": "cancel_user_booking",
                "args": {},
                "result": {
                    "status": "error",
                    "result": {
                        "code": "booking_not_found",
                        "message": "No matching booking found for 'sync' at 2024-01-01T10:00:00",
                        "data": [{"uid": "u1", "title": "Weekly", "startTime": null, "endTime": null}]
                    }
                }
            }]
        }"#,
    );

    assert!(text.contains("**1. Weekly**"));
    assert!(text.contains(&format!("- \u{1F550} Start: {}", INVALID_DATE)));
    assert!(!text.contains("End:"));
    assert!(text.contains("[View Booking](https://app.cal.com/booking/u1)"));
}

#[test]
fn test_envelope_without_inner_result_is_dumped() {
    let text = reply_for(
        r#"{
            "message": "",
            "session_id": "session_1700000000000",
            "tool_results": [{"tool": "get_weather", "args": {"city": "Lisbon"}, "result": {"temp": 21}}]
        }"#,
    );

    assert!(text.starts_with("**Debug:**\n```json\n"));
    assert!(text.contains("\"tool\": \"get_weather\""));
    assert!(text.contains("\"temp\": 21"));
    assert!(text.ends_with("\n```"));
}
