//! Command-line interface definition using clap.

use std::path::PathBuf;

use calchat_core::config::{
    API_URL_ENV, DISPLAY_ZONE_ENV, USER_EMAIL_ENV, USER_NAME_ENV, USER_TIMEZONE_ENV,
};
use calchat_core::{ClientConfig, ConfigError, DisplayZone, DEFAULT_API_URL};
use calchat_models::UserInfo;
use clap::{Parser, Subcommand};

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.1.0 (abc1234, 2026-01-29)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Calchat - chat with your Cal.com scheduling assistant
#[derive(Parser, Debug)]
#[command(name = "calchat")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL of the assistant API
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Zone for rendered times: utc, local, or an offset like +02:00
    #[arg(long, env = DISPLAY_ZONE_ENV, default_value = "local", global = true)]
    pub zone: DisplayZone,

    /// Your name, sent along with each message
    #[arg(long, env = USER_NAME_ENV, global = true)]
    pub name: Option<String>,

    /// Your email, sent along with each message
    #[arg(long, env = USER_EMAIL_ENV, global = true)]
    pub email: Option<String>,

    /// Your timezone (e.g. Europe/Paris), sent along with each message
    #[arg(long, env = USER_TIMEZONE_ENV, global = true)]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive chat (default)
    Repl,

    /// Send a single message and print the reply
    Chat {
        /// Message to send
        #[arg(required = true)]
        message: String,

        /// Continue an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Check that the API is reachable
    Health,

    /// List sessions known to the API
    Sessions,

    /// Clear a session on the API
    Clear {
        /// Session ID
        #[arg(required = true)]
        session_id: String,
    },

    /// Render tool-result JSON from a file ("-" for stdin) as markdown
    Render {
        /// Path to a JSON file holding one tool result or an array of them
        #[arg(required = true)]
        input: PathBuf,
    },
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Builds the client configuration from flags.
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::new(&self.api_url, self.zone)
    }

    /// Identity from flags; fields not given are left empty.
    pub fn user_info(&self) -> UserInfo {
        UserInfo::new(
            self.name.clone().unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
            self.timezone.clone().unwrap_or_default(),
        )
    }
}
