//! Admin commands (/start, /status, /stop).

/// Prefix that marks a message as a command.
pub const COMMAND_PREFIX: char = '/';

/// Parsed admin directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Bind the current chat as the destination (`/start`).
    Bind,
    /// Clear the binding (`/stop`).
    Unbind,
    /// Report the binding to the sender privately (`/status`).
    Status,
    /// Anything else, including commands addressed to another bot.
    Unknown(String),
}

impl AdminCommand {
    /// Parse a command message.
    ///
    /// Returns `None` if `text` does not start with the command prefix.
    /// Telegram's `/command@botname` form is accepted when `botname` is
    /// `bot_username` (case-insensitive).
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let body = text.trim_start().strip_prefix(COMMAND_PREFIX)?;
        let word = body.split_whitespace().next().unwrap_or("");

        let (name, target) = match word.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (word, None),
        };

        if let Some(target) = target {
            let addressed_to_us =
                bot_username.is_some_and(|bot| bot.eq_ignore_ascii_case(target));
            if !addressed_to_us {
                return Some(Self::Unknown(word.to_string()));
            }
        }

        let command = match name.to_lowercase().as_str() {
            "start" => Self::Bind,
            "stop" => Self::Unbind,
            "status" => Self::Status,
            _ => Self::Unknown(name.to_string()),
        };
        Some(command)
    }
}
