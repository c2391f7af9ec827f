//! Inline commands recognised in the client input stream

use tracing::{debug, info};

/// Commands a client may issue instead of sending content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/join`: announce the connection on the console
    Join,
}

impl Command {
    /// Look up trimmed text in the command table
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "/join" => Some(Command::Join),
            _ => None,
        }
    }
}

/// Whether a raw line is a command rather than content
pub fn is_command(line: &str) -> bool {
    line.trim().starts_with('/')
}

/// Act on a command line from `origin`.
///
/// Unknown commands are dropped without reply; the return value is only
/// informational.
pub fn interpret(origin: &str, text: &str) -> Option<Command> {
    let command = Command::parse(text.trim());
    match command {
        Some(Command::Join) => info!("User {} joined the chat.", origin),
        None => debug!(origin = %origin, command = %text.trim(), "Ignoring unknown command"),
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join() {
        assert_eq!(Command::parse("/join"), Some(Command::Join));
    }

    #[test]
    fn test_parse_requires_exact_match() {
        assert_eq!(Command::parse("/joinx"), None);
        assert_eq!(Command::parse("/join now"), None);
        assert_eq!(Command::parse("/JOIN"), None);
        assert_eq!(Command::parse("join"), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn test_is_command_ignores_surrounding_whitespace() {
        assert!(is_command("/join\n"));
        assert!(is_command("   /join  \r\n"));
        assert!(is_command("/whatever\n"));
        assert!(!is_command("hello /join\n"));
        assert!(!is_command("\n"));
        assert!(!is_command(""));
    }

    #[test]
    fn test_interpret_trims_input() {
        assert_eq!(interpret("1.2.3.4:5", "  /join \n"), Some(Command::Join));
        assert_eq!(interpret("1.2.3.4:5", "/leave"), None);
    }
}
