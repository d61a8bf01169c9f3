//! Interactive REPL (Read-Eval-Print Loop) for chatting with the assistant.

use std::io::{self, Write};

use calchat_core::{
    default_timezone, ChatSession, ClientConfig, ResultFormatter, Sender, CONNECT_FAILURE_BANNER,
};
use calchat_models::user::COMMON_TIMEZONES;
use calchat_models::{UserInfo, UserInfoError};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{debug, info, warn};

use crate::api::ApiClient;

/// Result type for REPL operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Help information for a command.
pub struct CommandHelp {
    /// Command name (e.g., "clear").
    pub name: &'static str,
    /// Command aliases (e.g., ["q"]).
    pub aliases: &'static [&'static str],
    /// Brief one-line description.
    pub brief: &'static str,
    /// Detailed description.
    pub description: &'static str,
}

/// Static help entries for all commands.
static COMMAND_HELP: &[CommandHelp] = &[
    CommandHelp {
        name: "help",
        aliases: &["h", "?"],
        brief: "Show help",
        description: "Shows all commands, or details for one command: /help <command>.",
    },
    CommandHelp {
        name: "profile",
        aliases: &["me"],
        brief: "Show your name, email, and timezone",
        description: "Shows the identity sent to the assistant with every message.",
    },
    CommandHelp {
        name: "logout",
        aliases: &[],
        brief: "Forget your identity and start over",
        description: "Clears your name, email, and timezone and the current conversation, then asks for them again.",
    },
    CommandHelp {
        name: "new",
        aliases: &["n"],
        brief: "Start a new conversation",
        description: "Drops the local transcript and continues under a new session id. The old session stays on the server.",
    },
    CommandHelp {
        name: "clear",
        aliases: &[],
        brief: "Clear this conversation on the server",
        description: "Asks the server to forget the current session, then starts a new conversation.",
    },
    CommandHelp {
        name: "sessions",
        aliases: &[],
        brief: "List sessions known to the server",
        description: "Lists the server's session ids. The current session is marked with *.",
    },
    CommandHelp {
        name: "health",
        aliases: &[],
        brief: "Check the API connection",
        description: "Checks that the API answers. A successful check clears the error banner so you can chat again.",
    },
    CommandHelp {
        name: "history",
        aliases: &["log"],
        brief: "Show this conversation",
        description: "Prints every message of the current conversation in order.",
    },
    CommandHelp {
        name: "quit",
        aliases: &["q", "exit"],
        brief: "Exit the REPL",
        description: "Exits Calchat. Nothing is saved.",
    },
];

/// Tab completion for slash commands.
struct CommandCompleter;

impl CommandCompleter {
    const COMMANDS: &'static [&'static str] = &[
        "/clear", "/health", "/help", "/history", "/logout", "/new", "/profile", "/quit",
        "/sessions",
    ];
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let prefix = &line[..pos];
        let matches: Vec<Pair> = Self::COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Slash commands available in the REPL.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Show help (optionally for a specific command)
    Help(Option<String>),
    /// Show identity
    Profile,
    /// Forget identity and conversation
    Logout,
    /// New local conversation
    New,
    /// Clear the conversation on the server
    Clear,
    /// List server sessions
    Sessions,
    /// Check the API connection
    Health,
    /// Print the transcript
    History,
    /// Quit the REPL
    Quit,
    /// Unknown command
    Unknown(String),
    /// Plain text to send to the assistant
    Text(String),
}

impl ReplCommand {
    /// Parses input into a REPL command.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        let Some(stripped) = input.strip_prefix('/') else {
            return ReplCommand::Text(input.to_string());
        };

        let parts: Vec<&str> = stripped.splitn(2, ' ').collect();
        let cmd = parts[0].to_lowercase();
        let arg = parts
            .get(1)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => ReplCommand::Help(arg),
            "profile" | "me" => ReplCommand::Profile,
            "logout" => ReplCommand::Logout,
            "new" | "n" => ReplCommand::New,
            "clear" => ReplCommand::Clear,
            "sessions" => ReplCommand::Sessions,
            "health" => ReplCommand::Health,
            "history" | "log" => ReplCommand::History,
            "quit" | "q" | "exit" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(cmd),
        }
    }
}

/// Interactive chat session.
pub struct Repl {
    editor: Editor<CommandCompleter, DefaultHistory>,
    api: ApiClient,
    formatter: ResultFormatter,
    session: ChatSession,
    user: Option<UserInfo>,
    prefill: UserInfo,
    runtime: tokio::runtime::Runtime,
}

impl Repl {
    /// Creates a REPL. `prefill` carries identity fields given on the command line.
    pub fn new(config: ClientConfig, prefill: UserInfo) -> Result<Self> {
        let rl_config = rustyline::Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(CommandCompleter));

        // Create tokio runtime for async operations
        let runtime = tokio::runtime::Runtime::new()?;

        Ok(Self {
            editor,
            formatter: config.formatter(),
            api: ApiClient::new(config),
            session: ChatSession::new(),
            user: None,
            prefill,
            runtime,
        })
    }

    /// Runs the REPL until the user quits.
    pub fn run(&mut self) -> Result<()> {
        println!("Calchat v{}", env!("CARGO_PKG_VERSION"));
        println!("Cal.com Scheduling Assistant - type /help for commands, /quit to exit");
        println!();

        if !self.ensure_user()? {
            println!("Goodbye!");
            return Ok(());
        }
        self.check_connection(false);

        loop {
            let prompt = self.prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(&line)?;

                    let cmd = ReplCommand::parse(&line);
                    debug!(?cmd, "Parsed command");

                    match self.handle_command(cmd) {
                        Ok(true) => break, // Quit requested
                        Ok(false) => {}    // Continue
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    // Don't exit on Ctrl+C, just clear line
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Returns the prompt string.
    fn prompt(&self) -> String {
        match &self.user {
            Some(user) if self.session.error().is_some() => format!("{} [offline]> ", user.name),
            Some(user) => format!("{}> ", user.name),
            None => "calchat> ".to_string(),
        }
    }

    /// Handles a REPL command. Returns Ok(true) if should quit.
    fn handle_command(&mut self, cmd: ReplCommand) -> Result<bool> {
        match cmd {
            ReplCommand::Help(topic) => print_help(topic.as_deref()),
            ReplCommand::Profile => match &self.user {
                Some(user) => {
                    println!("Name:     {}", user.name);
                    println!("Email:    {}", user.email);
                    println!("Timezone: {}", user.timezone);
                    println!("Session:  {}", self.session.session_id());
                }
                None => println!("No profile set."),
            },
            ReplCommand::Logout => {
                info!("Logging out");
                self.user = None;
                self.prefill = UserInfo::default();
                self.session.reset();
                if !self.ensure_user()? {
                    return Ok(true);
                }
            }
            ReplCommand::New => {
                self.session.reset();
                println!("Started new conversation ({})", self.session.session_id());
            }
            ReplCommand::Clear => {
                let session_id = self.session.session_id().to_string();
                let response = self.runtime.block_on(self.api.clear_session(&session_id))?;
                if !response.message.is_empty() {
                    println!("{}", response.message);
                }
                self.session.reset();
                println!("Started new conversation ({})", self.session.session_id());
            }
            ReplCommand::Sessions => {
                let sessions = self.runtime.block_on(self.api.sessions())?;
                if sessions.is_empty() {
                    println!("No sessions.");
                }
                for id in sessions {
                    let marker = if id == self.session.session_id() { "*" } else { " " };
                    println!("{} {}", marker, id);
                }
            }
            ReplCommand::Health => self.check_connection(true),
            ReplCommand::History => self.print_history(),
            ReplCommand::Quit => return Ok(true),
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: /{}. Type /help for available commands.", cmd);
            }
            ReplCommand::Text(text) => self.handle_chat(&text)?,
        }

        Ok(false)
    }

    /// Sends a message to the assistant and prints the reply.
    fn handle_chat(&mut self, text: &str) -> Result<()> {
        let Some(user) = self.user.clone() else {
            println!("No profile set. Use /logout to enter your details.");
            return Ok(());
        };

        if let Some(banner) = self.session.error() {
            println!("{}", banner);
            println!("Run /health to reconnect.");
            return Ok(());
        }

        let request = self.session.begin_send(&user, text);

        print!("Thinking...");
        io::stdout().flush()?;

        let result = self.runtime.block_on(self.api.chat(&request));

        // Clear "Thinking..." line
        print!("\r            \r");
        io::stdout().flush()?;

        let reply = match result {
            Ok(response) => self.session.apply_response(&response, &self.formatter),
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                self.session.apply_failure()
            }
        };
        println!("{}", reply.text);
        println!();

        if let Some(banner) = self.session.error() {
            println!("[!] {}", banner);
        }
        Ok(())
    }

    /// Runs a health check, setting or clearing the error banner.
    fn check_connection(&mut self, verbose: bool) {
        match self.runtime.block_on(self.api.health_check()) {
            Ok(health) => {
                debug!(status = %health.status, "API connection ok");
                self.session.clear_error();
                if verbose {
                    println!("[ok] {} - {}", health.status, health.message);
                }
            }
            Err(e) => {
                warn!(error = %e, "API connection failed");
                self.session.set_error(CONNECT_FAILURE_BANNER);
                println!("[!] {}", CONNECT_FAILURE_BANNER);
                if verbose {
                    println!("    {}", e);
                }
            }
        }
    }

    fn print_history(&self) {
        let messages = self.session.messages();
        if messages.is_empty() {
            println!("Start a conversation...");
            return;
        }
        for message in messages {
            let who = match message.sender {
                Sender::User => "You",
                Sender::Bot => "Assistant",
            };
            println!("{}:\n{}\n", who, message.text);
        }
    }

    /// Collects and validates identity. Returns false if input ended.
    fn ensure_user(&mut self) -> Result<bool> {
        let candidate = self.prefill.clone();
        if candidate.validate().is_ok() {
            println!("Chatting as {}", candidate);
            self.user = Some(candidate);
            return Ok(true);
        }

        println!("Please provide your information to get started.");

        let Some(name) = self.ask("Full name", &candidate.name, UserInfo::check_name)? else {
            return Ok(false);
        };
        let Some(email) = self.ask("Email address", &candidate.email, UserInfo::check_email)? else {
            return Ok(false);
        };

        println!("Common timezones: {}", COMMON_TIMEZONES.join(", "));
        let timezone_default = if candidate.timezone.is_empty() {
            default_timezone()
        } else {
            candidate.timezone.clone()
        };
        let Some(timezone) = self.ask("Timezone", &timezone_default, UserInfo::check_timezone)? else {
            return Ok(false);
        };

        let user = UserInfo::new(name.trim(), email.trim(), timezone.trim());
        info!(user = %user, "Profile set");
        println!();
        self.user = Some(user);
        Ok(true)
    }

    /// Prompts for one field until it passes `check`. `None` on EOF.
    fn ask(
        &mut self,
        label: &str,
        initial: &str,
        check: fn(&str) -> std::result::Result<(), UserInfoError>,
    ) -> Result<Option<String>> {
        loop {
            let prompt = format!("{}: ", label);
            match self.editor.readline_with_initial(&prompt, (initial, "")) {
                Ok(value) => match check(value.trim()) {
                    Ok(()) => return Ok(Some(value)),
                    Err(e) => println!("  {}", e),
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn find_command_help(name: &str) -> Option<&'static CommandHelp> {
    let name_lower = name.trim_start_matches('/').to_lowercase();
    COMMAND_HELP
        .iter()
        .find(|h| h.name == name_lower || h.aliases.contains(&name_lower.as_str()))
}

/// Prints help information.
fn print_help(topic: Option<&str>) {
    match topic {
        Some(cmd) => {
            if let Some(help) = find_command_help(cmd) {
                println!("/{} - {}", help.name, help.brief);
                if !help.aliases.is_empty() {
                    println!("Aliases: {}", help.aliases.join(", "));
                }
                println!();
                println!("{}", help.description);
            } else {
                println!(
                    "Unknown command: {}. Type /help for available commands.",
                    cmd
                );
            }
        }
        None => {
            println!("Calchat - Cal.com Scheduling Assistant");
            println!();
            println!("Type a message to talk to the assistant, e.g.:");
            println!("    book a 30 minute call with bo@example.com tomorrow at 3pm");
            println!("    show my bookings");
            println!("    cancel my design review on Friday");
            println!();
            println!("COMMANDS:");
            for help in COMMAND_HELP {
                println!("    /{:<12} {}", help.name, help.brief);
            }
            println!();
            println!("Type /help <command> for details on a specific command.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        assert_eq!(
            ReplCommand::parse("  show my bookings  "),
            ReplCommand::Text("show my bookings".to_string())
        );
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(ReplCommand::parse("/help"), ReplCommand::Help(None));
        assert_eq!(ReplCommand::parse("/?"), ReplCommand::Help(None));
        assert_eq!(
            ReplCommand::parse("/h clear"),
            ReplCommand::Help(Some("clear".to_string()))
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(ReplCommand::parse("/me"), ReplCommand::Profile);
        assert_eq!(ReplCommand::parse("/n"), ReplCommand::New);
        assert_eq!(ReplCommand::parse("/log"), ReplCommand::History);
        assert_eq!(ReplCommand::parse("/q"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/EXIT"), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(ReplCommand::parse("/clear"), ReplCommand::Clear);
        assert_eq!(ReplCommand::parse("/sessions"), ReplCommand::Sessions);
        assert_eq!(ReplCommand::parse("/health"), ReplCommand::Health);
        assert_eq!(ReplCommand::parse("/logout"), ReplCommand::Logout);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            ReplCommand::parse("/book tomorrow"),
            ReplCommand::Unknown("book".to_string())
        );
    }

    #[test]
    fn test_find_command_help() {
        assert_eq!(find_command_help("quit").unwrap().name, "quit");
        assert_eq!(find_command_help("/exit").unwrap().name, "quit");
        assert_eq!(find_command_help("ME").unwrap().name, "profile");
        assert!(find_command_help("connect").is_none());
    }

    #[test]
    fn test_completer_commands_have_help() {
        for cmd in CommandCompleter::COMMANDS {
            assert!(
                find_command_help(cmd).is_some(),
                "{} is missing a help entry",
                cmd
            );
        }
    }
}
