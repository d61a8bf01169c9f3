//! Client configuration.
//!
//! Settings come from flags or environment variables (optionally loaded
//! from `.env.local`). Nothing is written back to disk.
//!
//! # Environment Variables
//!
//! - `CALCHAT_API_URL`: Base URL of the assistant API
//! - `CALCHAT_DISPLAY_ZONE`: Zone for rendered times (`utc`, `local`, `+02:00`)
//! - `CALCHAT_USER_NAME`, `CALCHAT_USER_EMAIL`, `CALCHAT_USER_TIMEZONE`:
//!   identity sent along with each message

use thiserror::Error;
use url::Url;

use crate::datetime::{DateFormatter, DisplayZone, ZoneParseError};
use crate::formatter::ResultFormatter;

/// Environment variable for the API base URL.
pub const API_URL_ENV: &str = "CALCHAT_API_URL";

/// Environment variable for the display zone.
pub const DISPLAY_ZONE_ENV: &str = "CALCHAT_DISPLAY_ZONE";

/// Environment variable for the user's name.
pub const USER_NAME_ENV: &str = "CALCHAT_USER_NAME";

/// Environment variable for the user's email.
pub const USER_EMAIL_ENV: &str = "CALCHAT_USER_EMAIL";

/// Environment variable for the user's timezone.
pub const USER_TIMEZONE_ENV: &str = "CALCHAT_USER_TIMEZONE";

/// Optional dotenv file read at startup.
pub const ENV_FILE: &str = ".env.local";

/// API the web client talks to by default.
pub const DEFAULT_API_URL: &str = "http://localhost:3020/api";

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported API URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error(transparent)]
    InvalidZone(#[from] ZoneParseError),
}

/// Result type for configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Where the API lives and how to render its results.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    api_base_url: Url,
    display_zone: DisplayZone,
}

impl ClientConfig {
    /// Creates a configuration, validating the base URL.
    pub fn new(api_url: &str, display_zone: DisplayZone) -> Result<Self> {
        let api_base_url = Url::parse(api_url.trim()).map_err(|source| ConfigError::InvalidApiUrl {
            url: api_url.to_string(),
            source,
        })?;

        match api_base_url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        Ok(Self {
            api_base_url,
            display_zone,
        })
    }

    /// Builds a configuration from `CALCHAT_API_URL` and `CALCHAT_DISPLAY_ZONE`.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let display_zone = match std::env::var(DISPLAY_ZONE_ENV) {
            Ok(zone) => zone.parse()?,
            Err(_) => DisplayZone::default(),
        };
        Self::new(&api_url, display_zone)
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    pub fn display_zone(&self) -> DisplayZone {
        self.display_zone
    }

    /// URL of an API endpoint below the base, e.g. `endpoint(&["sessions", id])`.
    ///
    /// Segments are percent-encoded, so ids cannot escape their path slot.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base_url.clone();
        // http(s) URLs always have a path, checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Formatter rendering times in the configured zone.
    pub fn formatter(&self) -> ResultFormatter {
        ResultFormatter::new(DateFormatter::new(self.display_zone))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            display_zone: DisplayZone::default(),
        }
    }
}

/// Timezone to suggest for the user: `TZ` if set, otherwise `UTC`.
pub fn default_timezone() -> String {
    std::env::var("TZ")
        .ok()
        .map(|tz| tz.trim().trim_start_matches(':').to_string())
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| "UTC".to_string())
}
