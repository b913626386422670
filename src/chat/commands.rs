//! Slash command parsing for the chat application.
//!
//! Lines that are not commands are appended to the draft.  Pasted code often
//! starts lines with `/` (`// comment`, `/* ... */`, `/usr/bin/env`), so only
//! a slash followed by a plain alphabetic word is treated as a command.
//! While a draft is open, a line like `/tmp` that names no known command is
//! kept as draft text; see [`parse_draft_line`].

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Submit the current draft for review.
    Send,

    /// Throw away the current draft.
    Discard,

    /// Go back to the API key prompt.
    ChangeKey,

    /// Copy a message to the clipboard.
    /// `None` copies the latest assistant message.
    Copy(Option<usize>),

    /// Print the whole transcript again.
    History,

    /// Change the model.
    Model(String),

    /// Display session status.
    Status,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// A slash word that names no command.
    Unknown(String),

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be appended to the draft.
///
/// # Examples
///
/// ```
/// # use codereview::chat::parse_command;
/// assert!(parse_command("/send").is_some());
/// assert!(parse_command("/copy 3").is_some());
/// assert!(parse_command("// a code comment").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next()?;
    if command != "?" && (command.is_empty() || !command.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return None;
    }
    let command = command.to_lowercase();
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "send" | "s" => ChatCommand::Send,
        "discard" | "reset" => ChatCommand::Discard,
        "key" => ChatCommand::ChangeKey,
        "copy" | "c" => match argument {
            None => ChatCommand::Copy(None),
            Some(arg) => match arg.parse::<usize>() {
                Ok(index) => ChatCommand::Copy(Some(index)),
                Err(_) => ChatCommand::Invalid("/copy expects a message number".to_string()),
            },
        },
        "history" => ChatCommand::History,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "status" | "stats" => ChatCommand::Status,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Unknown(command),
    };

    Some(result)
}

/// Parses a line typed at the chat prompt.
///
/// Same as [`parse_command`], except that with a draft open an unknown
/// `/word` line is returned as `None` so it lands in the draft.
pub fn parse_draft_line(input: &str, draft_open: bool) -> Option<ChatCommand> {
    match parse_command(input)? {
        ChatCommand::Unknown(_) if draft_open => None,
        cmd => Some(cmd),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Paste or type code; each line is added to the draft.
Available commands:
  /send                  Submit the draft for review
  /discard               Throw away the draft
  /copy [n]              Copy message n (default: latest review)
  /history               Show the whole transcript
  /key                   Change the API key
  /model <name>          Change the model (e.g., /model gemini-2.5-flash)
  /status                Show session status
  /help                  Show this help message
  /quit                  Exit
A /word line that is not a command is kept as code once a draft is open."#
}
