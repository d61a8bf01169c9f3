//! Calchat CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use calchat_cli::cli::{Cli, Commands};
use calchat_cli::commands;
use calchat_cli::repl::Repl;
use calchat_core::config::ENV_FILE;
use calchat_core::ClientConfig;
use calchat_models::UserInfo;

fn main() {
    // Load .env.local if it exists (for CALCHAT_API_URL etc.)
    let _ = dotenvy::from_filename(ENV_FILE);

    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    let result = match cli.config() {
        Ok(config) => {
            let user = cli.user_info();
            match cli.command {
                Some(Commands::Repl) | None => run_repl(config, user),
                Some(cmd) => commands::execute(cmd, &config, user),
            }
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_repl(config: ClientConfig, user: UserInfo) -> commands::Result<()> {
    let mut repl = Repl::new(config, user)?;
    repl.run()?;
    Ok(())
}
