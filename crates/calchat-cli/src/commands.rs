//! Handlers for one-shot CLI subcommands.

use std::io::Read;
use std::path::Path;

use calchat_core::{ChatSession, ClientConfig, ResultFormatter};
use calchat_models::UserInfo;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cli::Commands;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands, config: &ClientConfig, user: UserInfo) -> Result<()> {
    match command {
        Commands::Render { input } => cmd_render(&input, &config.formatter()),
        Commands::Repl => {
            // REPL is handled separately in main
            Ok(())
        }
        command => {
            let runtime = tokio::runtime::Runtime::new()?;
            let api = ApiClient::new(config.clone());
            runtime.block_on(execute_remote(command, &api, user))
        }
    }
}

async fn execute_remote(command: Commands, api: &ApiClient, user: UserInfo) -> Result<()> {
    match command {
        Commands::Chat { message, session } => cmd_chat(api, &user, &message, session).await,
        Commands::Health => cmd_health(api).await,
        Commands::Sessions => cmd_sessions(api).await,
        Commands::Clear { session_id } => cmd_clear(api, &session_id).await,
        Commands::Repl | Commands::Render { .. } => Ok(()),
    }
}

async fn cmd_chat(
    api: &ApiClient,
    user: &UserInfo,
    message: &str,
    session_id: Option<String>,
) -> Result<()> {
    if let Err(errors) = user.validate() {
        let reasons: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(format!(
            "{} (set --name, --email and --timezone or the CALCHAT_USER_* variables)",
            reasons.join(", ")
        )
        .into());
    }

    let mut session = match session_id {
        Some(id) => ChatSession::with_id(id),
        None => ChatSession::new(),
    };
    let formatter = api.config().formatter();

    let request = session.begin_send(user, message);
    match api.chat(&request).await {
        Ok(response) => {
            let reply = session.apply_response(&response, &formatter);
            println!("{}", reply.text);
            info!(session_id = %session.session_id(), "Chat session");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Chat request failed");
            let reply = session.apply_failure();
            println!("{}", reply.text);
            Err(e.into())
        }
    }
}

async fn cmd_health(api: &ApiClient) -> Result<()> {
    let health = api.health_check().await?;
    println!("[ok] {} - {}", health.status, health.message);
    Ok(())
}

async fn cmd_sessions(api: &ApiClient) -> Result<()> {
    let sessions = api.sessions().await?;
    if sessions.is_empty() {
        println!("No sessions.");
        return Ok(());
    }

    println!("Sessions:");
    for id in sessions {
        println!("  {}", id);
    }
    Ok(())
}

async fn cmd_clear(api: &ApiClient, session_id: &str) -> Result<()> {
    let response = api.clear_session(session_id).await?;
    if response.message.is_empty() {
        println!("Cleared session {}", session_id);
    } else {
        println!("{}", response.message);
    }
    Ok(())
}

fn cmd_render(input: &Path, formatter: &ResultFormatter) -> Result<()> {
    println!("{}", render_input(input, formatter)?);
    Ok(())
}

/// Renders tool-result JSON read from `input` ("-" reads stdin).
///
/// A top-level array is treated as the tool results of one reply.
pub fn render_input(input: &Path, formatter: &ResultFormatter) -> Result<String> {
    let raw = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?
    };

    Ok(render_json(&raw, formatter)?)
}

/// Renders tool-result JSON text.
pub fn render_json(raw: &str, formatter: &ResultFormatter) -> serde_json::Result<String> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(match value {
        Value::Array(results) => formatter.format_all(&results),
        single => formatter.format_value(&single),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_single() {
        let markdown = render_json(r#"{"error": "nope"}"#, &ResultFormatter::default()).unwrap();
        assert_eq!(markdown, "\u{274C} **Error:** nope");
    }

    #[test]
    fn test_render_json_array() {
        let markdown = render_json(
            r#"[{"error": "a"}, {"result": {"result": {"code": "calcom_api_request_failed", "message": "b"}}}]"#,
            &ResultFormatter::default(),
        )
        .unwrap();
        assert_eq!(markdown, "\u{274C} **Error:** a\n\n---\n\n\u{274C} **Error:** b");
    }

    #[test]
    fn test_render_json_rejects_invalid_json() {
        assert!(render_json("{not json", &ResultFormatter::default()).is_err());
    }
}
