//! Interactive session commands

use std::path::PathBuf;

/// A line typed at the `pmi>` prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Help,
    Exit,
    History,
    Clear,
    /// `show <n|name>`; an empty key shows the latest analysis
    Show(String),
    Export(Option<PathBuf>),
    Analyze(String),
}

impl SessionCommand {
    /// Parse a prompt line without any session history. Blank lines yield
    /// `None`.
    pub fn parse(input: &str) -> Option<Self> {
        Self::parse_with(input, |_| false)
    }

    /// Parse a prompt line. `is_known` tells whether a name is in the session
    /// history, which is what makes `show <name>` a command rather than a
    /// product description such as "show me trending AI tools".
    ///
    /// Keywords only count when they are the whole line or lead it with an
    /// argument, so "Clear" the product still has to be typed as
    /// "analyze Clear".
    pub fn parse_with(input: &str, is_known: impl Fn(&str) -> bool) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let (keyword, rest) = match input.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (input, ""),
        };

        let command = match (keyword.to_lowercase().as_str(), rest.is_empty()) {
            ("help" | "?", true) => Self::Help,
            ("exit" | "quit" | "q", true) => Self::Exit,
            ("history", true) => Self::History,
            ("clear", true) => Self::Clear,
            ("show", true) => Self::Show(String::new()),
            ("show", false) if rest.parse::<usize>().is_ok() || is_known(rest) => {
                Self::Show(rest.to_string())
            }
            ("export", true) => Self::Export(None),
            ("export", false) => Self::Export(Some(PathBuf::from(rest))),
            ("analyze", false) => Self::Analyze(rest.to_string()),
            _ => Self::Analyze(input.to_string()),
        };

        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input() {
        assert_eq!(SessionCommand::parse(""), None);
        assert_eq!(SessionCommand::parse("   \t"), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(SessionCommand::parse("help"), Some(SessionCommand::Help));
        assert_eq!(SessionCommand::parse(" QUIT "), Some(SessionCommand::Exit));
        assert_eq!(SessionCommand::parse("exit"), Some(SessionCommand::Exit));
        assert_eq!(SessionCommand::parse("history"), Some(SessionCommand::History));
        assert_eq!(SessionCommand::parse("clear"), Some(SessionCommand::Clear));
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            SessionCommand::parse("show 2"),
            Some(SessionCommand::Show("2".to_string()))
        );
        assert_eq!(SessionCommand::parse("show"), Some(SessionCommand::Show(String::new())));
        assert_eq!(
            SessionCommand::parse("export ./reports"),
            Some(SessionCommand::Export(Some(PathBuf::from("./reports"))))
        );
        assert_eq!(SessionCommand::parse("export"), Some(SessionCommand::Export(None)));
        assert_eq!(
            SessionCommand::parse("analyze Clear"),
            Some(SessionCommand::Analyze("Clear".to_string()))
        );
    }

    #[test]
    fn test_show_needs_a_number_or_known_name() {
        let known = |name: &str| name.eq_ignore_ascii_case("notion ai");

        assert_eq!(
            SessionCommand::parse_with("show Notion AI", known),
            Some(SessionCommand::Show("Notion AI".to_string()))
        );
        assert_eq!(
            SessionCommand::parse_with("show 3", known),
            Some(SessionCommand::Show("3".to_string()))
        );
        assert_eq!(
            SessionCommand::parse_with("show me trending AI tools", known),
            Some(SessionCommand::Analyze("show me trending AI tools".to_string()))
        );
        assert_eq!(
            SessionCommand::parse("Showpad sales enablement"),
            Some(SessionCommand::Analyze("Showpad sales enablement".to_string()))
        );
    }

    #[test]
    fn test_everything_else_is_a_product() {
        assert_eq!(
            SessionCommand::parse("Notion AI"),
            Some(SessionCommand::Analyze("Notion AI".to_string()))
        );
        assert_eq!(
            SessionCommand::parse("help desk copilot for Zendesk"),
            Some(SessionCommand::Analyze("help desk copilot for Zendesk".to_string()))
        );
    }
}
