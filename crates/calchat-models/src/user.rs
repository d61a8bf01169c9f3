//! Identity the user supplies before chatting.
//!
//! The fields are passed to the backend as plain text; nothing here
//! authenticates anyone.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timezones offered when prompting for one.
pub const COMMON_TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Australia/Sydney",
    "UTC",
];

/// Validation failures for [`UserInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserInfoError {
    #[error("Name is required")]
    MissingName,

    #[error("Email is required")]
    MissingEmail,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Timezone is required")]
    MissingTimezone,
}

/// Name, email, and timezone of the person chatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub timezone: String,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

impl UserInfo {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timezone: timezone.into(),
        }
    }

    /// Checks a name on its own.
    pub fn check_name(name: &str) -> Result<(), UserInfoError> {
        if name.trim().is_empty() {
            return Err(UserInfoError::MissingName);
        }
        Ok(())
    }

    /// Checks an email on its own.
    pub fn check_email(email: &str) -> Result<(), UserInfoError> {
        if email.trim().is_empty() {
            return Err(UserInfoError::MissingEmail);
        }
        if !email_regex().is_match(email) {
            return Err(UserInfoError::InvalidEmail);
        }
        Ok(())
    }

    /// Checks a timezone on its own.
    pub fn check_timezone(timezone: &str) -> Result<(), UserInfoError> {
        if timezone.trim().is_empty() {
            return Err(UserInfoError::MissingTimezone);
        }
        Ok(())
    }

    /// Returns every field error, in form order.
    pub fn validate(&self) -> Result<(), Vec<UserInfoError>> {
        let errors: Vec<UserInfoError> = [
            Self::check_name(&self.name),
            Self::check_email(&self.email),
            Self::check_timezone(&self.timezone),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.name, self.email, self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user() {
        let user = UserInfo::new("Ana Lima", "ana@example.com", "Europe/Paris");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_all_fields_missing() {
        let user = UserInfo::new("  ", "", "");
        assert_eq!(
            user.validate().unwrap_err(),
            vec![
                UserInfoError::MissingName,
                UserInfoError::MissingEmail,
                UserInfoError::MissingTimezone
            ]
        );
    }

    #[test]
    fn test_invalid_email() {
        for email in ["ana", "ana@example", "ana @example.com", "@example.com"] {
            assert_eq!(
                UserInfo::check_email(email),
                Err(UserInfoError::InvalidEmail),
                "{} should be rejected",
                email
            );
        }
        assert_eq!(
            UserInfoError::InvalidEmail.to_string(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn test_display() {
        let user = UserInfo::new("Ana", "ana@example.com", "UTC");
        assert_eq!(user.to_string(), "Ana <ana@example.com> (UTC)");
    }
}
