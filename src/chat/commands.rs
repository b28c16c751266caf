//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to move between screens and control the session without
//! sending anything to the backend.

/// A parsed chat command.
///
/// These commands control the session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Go to the login form.
    Login,

    /// Go to the registration form.
    Register,

    /// Enter the chat without logging in.
    Guest,

    /// Clear the stored token and return to the login form.
    Logout,

    /// Reprint every turn of the current conversation.
    History,

    /// Show the backend URL, login state and conversation size.
    Status,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as regular input.
///
/// # Examples
///
/// ```
/// # use querent::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/logout").is_some());
/// assert!(parse_command("What is 2+2?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "login" => ChatCommand::Login,
        "register" | "signup" => ChatCommand::Register,
        "guest" => ChatCommand::Guest,
        "logout" => ChatCommand::Logout,
        "history" => ChatCommand::History,
        "status" | "whoami" => ChatCommand::Status,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "" => ChatCommand::Invalid("Empty command; type /help for a list".to_string()),
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    if let Some(argument) = argument
        && !matches!(result, ChatCommand::Invalid(_))
    {
        return Some(ChatCommand::Invalid(format!(
            "/{command} takes no arguments (got '{argument}')"
        )));
    }

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /login                 Go to the login form
  /register              Go to the registration form
  /guest                 Chat without logging in
  /logout                Forget the stored session token
  /history               Reprint the conversation so far
  /status                Show backend, login state and turn count
  /help                  Show this help message
  /quit                  Exit"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_navigation() {
        assert_eq!(parse_command("/login"), Some(ChatCommand::Login));
        assert_eq!(parse_command("/REGISTER"), Some(ChatCommand::Register));
        assert_eq!(parse_command("/signup"), Some(ChatCommand::Register));
        assert_eq!(parse_command("/guest"), Some(ChatCommand::Guest));
        assert_eq!(parse_command("/logout"), Some(ChatCommand::Logout));
    }

    #[test]
    fn parse_status_and_history() {
        assert_eq!(parse_command("/status"), Some(ChatCommand::Status));
        assert_eq!(parse_command("/whoami"), Some(ChatCommand::Status));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn arguments_are_rejected() {
        assert!(matches!(
            parse_command("/logout now"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("takes no arguments")
        ));
    }

    #[test]
    fn unknown_and_empty() {
        assert_eq!(
            parse_command("/model x"),
            Some(ChatCommand::Invalid("Unknown command: /model".to_string()))
        );
        assert!(matches!(parse_command("/"), Some(ChatCommand::Invalid(_))));
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("What is 2+2?"), None);
        assert_eq!(parse_command("a/b"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/login"));
        assert!(help.contains("/logout"));
    }
}
