//! Locale-style date rendering for booking times.
//!
//! Output follows the en-US conventions of the web client the backend was
//! built for. Inputs that cannot be parsed render as [`INVALID_DATE`]
//! instead of failing the whole render.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Rendering of a missing or malformed date.
pub const INVALID_DATE: &str = "Invalid Date";

/// `1/1/2024, 10:00:00 AM`
const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// `02:00 PM`
const TIME_OF_DAY_FORMAT: &str = "%I:%M %p";

/// `Friday, March 1, 2024`
const LONG_DATE_FORMAT: &str = "%A, %B %-d, %Y";

/// Offset-less datetime layouts, interpreted in the display zone.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Error returned when a display zone string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid display zone '{0}': expected utc, local, or an offset like +02:00")]
pub struct ZoneParseError(String);

/// Time zone that rendered times are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Utc,
    /// The zone of the machine running the client.
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    fn convert(self, dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            Self::Utc => dt.with_timezone(&Utc).fixed_offset(),
            Self::Local => dt.with_timezone(&Local).fixed_offset(),
            Self::Fixed(offset) => dt.with_timezone(&offset),
        }
    }

    fn localize(self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Utc => Some(naive.and_utc().fixed_offset()),
            Self::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Self::Fixed(offset) => offset.from_local_datetime(&naive).single(),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "utc" | "z" | "gmt" => return Ok(Self::Utc),
            "local" => return Ok(Self::Local),
            _ => {}
        }

        parse_offset(trimmed)
            .map(Self::Fixed)
            .ok_or_else(|| ZoneParseError(s.to_string()))
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => write!(f, "utc"),
            Self::Local => write!(f, "local"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Parses `+HH`, `+HHMM`, or `+HH:MM` (and the `-` forms).
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Renders backend date strings for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFormatter {
    zone: DisplayZone,
}

impl DateFormatter {
    pub fn new(zone: DisplayZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }

    /// Parses an ISO-8601 date or datetime into the display zone.
    ///
    /// Datetimes carrying an offset are converted; offset-less datetimes are
    /// taken as display-zone wall time; bare dates are UTC midnight.
    pub fn parse(&self, input: &str) -> Option<DateTime<FixedOffset>> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(self.zone.convert(dt));
        }

        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        {
            return self.zone.localize(naive);
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| self.zone.convert(midnight.and_utc().fixed_offset()))
    }

    /// Full date and time, e.g. `1/1/2024, 10:00:00 AM`.
    pub fn date_time(&self, input: &str) -> String {
        self.render(input, DATE_TIME_FORMAT)
    }

    /// Like [`date_time`](Self::date_time) but treats a missing value as invalid.
    pub fn date_time_opt(&self, input: Option<&str>) -> String {
        self.date_time(input.unwrap_or_default())
    }

    /// Two-digit hour and minute, e.g. `02:00 PM`.
    pub fn time_of_day(&self, input: &str) -> String {
        self.render(input, TIME_OF_DAY_FORMAT)
    }

    /// Calendar heading for a `YYYY-MM-DD` key, e.g. `Friday, March 1, 2024`.
    ///
    /// The key names a calendar day, so it is not shifted into the display zone.
    pub fn long_date(&self, date_key: &str) -> String {
        NaiveDate::parse_from_str(date_key.trim(), "%Y-%m-%d")
            .map(|date| date.format(LONG_DATE_FORMAT).to_string())
            .unwrap_or_else(|_| INVALID_DATE.to_string())
    }

    fn render(&self, input: &str, format: &str) -> String {
        self.parse(input)
            .map(|dt| dt.format(format).to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> DateFormatter {
        DateFormatter::default()
    }

    #[test]
    fn test_date_time_utc() {
        assert_eq!(utc().date_time("2024-01-01T10:00:00Z"), "1/1/2024, 10:00:00 AM");
        assert_eq!(utc().date_time("2024-12-31T23:05:09Z"), "12/31/2024, 11:05:09 PM");
        assert_eq!(utc().date_time("2024-06-15T00:30:00Z"), "6/15/2024, 12:30:00 AM");
    }

    #[test]
    fn test_date_time_converts_offsets() {
        assert_eq!(
            utc().date_time("2024-01-01T10:00:00+02:00"),
            "1/1/2024, 8:00:00 AM"
        );

        let paris = DateFormatter::new("+01:00".parse().unwrap());
        assert_eq!(paris.date_time("2024-01-01T23:30:00Z"), "1/2/2024, 12:30:00 AM");
    }

    #[test]
    fn test_naive_datetime_is_wall_time() {
        let tokyo = DateFormatter::new("+09:00".parse().unwrap());
        assert_eq!(tokyo.date_time("2024-01-01T10:00:00"), "1/1/2024, 10:00:00 AM");
        assert_eq!(tokyo.date_time("2024-01-01T10:00:00.000"), "1/1/2024, 10:00:00 AM");
    }

    #[test]
    fn test_bare_date_is_utc_midnight() {
        assert_eq!(utc().date_time("2024-03-01"), "3/1/2024, 12:00:00 AM");

        let new_york = DateFormatter::new("-05:00".parse().unwrap());
        assert_eq!(new_york.date_time("2024-03-01"), "2/29/2024, 7:00:00 PM");
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(utc().date_time(""), INVALID_DATE);
        assert_eq!(utc().date_time("   "), INVALID_DATE);
        assert_eq!(utc().date_time("next tuesday"), INVALID_DATE);
        assert_eq!(utc().date_time_opt(None), INVALID_DATE);
        assert_eq!(utc().time_of_day("2024-13-45T99:00:00Z"), INVALID_DATE);
        assert_eq!(utc().long_date("soon"), INVALID_DATE);
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(utc().time_of_day("2024-03-01T14:00:00Z"), "02:00 PM");
        assert_eq!(utc().time_of_day("2024-03-01T09:30:00.000Z"), "09:30 AM");
    }

    #[test]
    fn test_long_date() {
        assert_eq!(utc().long_date("2024-03-01"), "Friday, March 1, 2024");

        // Calendar keys are not shifted by the display zone.
        let new_york = DateFormatter::new("-05:00".parse().unwrap());
        assert_eq!(new_york.long_date("2024-03-01"), "Friday, March 1, 2024");
    }

    #[test]
    fn test_parse_display_zone() {
        assert_eq!("UTC".parse::<DisplayZone>(), Ok(DisplayZone::Utc));
        assert_eq!("local".parse::<DisplayZone>(), Ok(DisplayZone::Local));
        assert_eq!(
            "+05:30".parse::<DisplayZone>(),
            Ok(DisplayZone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()))
        );
        assert_eq!(
            "-0800".parse::<DisplayZone>(),
            Ok(DisplayZone::Fixed(FixedOffset::west_opt(8 * 3600).unwrap()))
        );
        assert!("Europe/Paris".parse::<DisplayZone>().is_err());
        assert!("+24:00".parse::<DisplayZone>().is_err());
        assert!("+1".parse::<DisplayZone>().is_err());
    }

    #[test]
    fn test_display_zone_display() {
        assert_eq!(DisplayZone::Utc.to_string(), "utc");
        assert_eq!("+02:00".parse::<DisplayZone>().unwrap().to_string(), "+02:00");
    }
}
