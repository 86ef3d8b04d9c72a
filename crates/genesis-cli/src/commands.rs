//! Slash commands for interactive mode

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Clear the transcript and the latest run
    Clear,
    /// Re-check backend connectivity
    Retry,
    /// Show a message to the user (not sent to the backend)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command. Returns `None` for ordinary input.
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let command = input.trim().strip_prefix('/')?;
    let command = command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),
        "clear" | "c" => CommandResult::Clear,
        "retry" | "r" => CommandResult::Retry,
        "quit" | "exit" | "q" => CommandResult::Exit,
        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /clear, /c           Clear the conversation and pipeline panels
  /retry, /r           Check whether the backend is reachable again
  /quit, /exit, /q     Exit genesis

Anything else is sent to the backend as a question."#
        .to_string()
}
