//! Terminal line input.
//!
//! The binary treats every line typed on stdin as user activity. A few words
//! are also commands: they answer the prompt or quit.

use tracing::trace;

use super::ActivityKind;
use crate::prompt::PromptAction;

/// Parsed meaning of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalInput {
    /// Plain activity of the given kind.
    Activity(ActivityKind),
    /// An answer to the session prompt (also counts as a key press).
    Answer(PromptAction),
    /// Leave the program.
    Quit,
}

impl TerminalInput {
    /// The activity kind this input represents, if any.
    pub fn activity(self) -> Option<ActivityKind> {
        match self {
            Self::Activity(kind) => Some(kind),
            Self::Answer(_) => Some(ActivityKind::KeyPress),
            Self::Quit => None,
        }
    }
}

/// Parse a single line read from the terminal.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Unknown text is a key press.
pub fn parse_line(line: &str) -> TerminalInput {
    let word = line.trim().to_ascii_lowercase();

    let input = match word.as_str() {
        "click" => TerminalInput::Activity(ActivityKind::Click),
        "scroll" => TerminalInput::Activity(ActivityKind::Scroll),
        "move" | "mouse" => TerminalInput::Activity(ActivityKind::PointerMove),
        "stay" | "s" => TerminalInput::Answer(PromptAction::Stay),
        "logout" | "l" => TerminalInput::Answer(PromptAction::Logout),
        "quit" | "q" | "exit" => TerminalInput::Quit,
        _ => TerminalInput::Activity(ActivityKind::KeyPress),
    };

    trace!("Parsed terminal line {:?} as {:?}", line.trim_end(), input);
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_activity_words() {
        assert_eq!(
            parse_line("click"),
            TerminalInput::Activity(ActivityKind::Click)
        );
        assert_eq!(
            parse_line("scroll\n"),
            TerminalInput::Activity(ActivityKind::Scroll)
        );
        assert_eq!(
            parse_line("  move "),
            TerminalInput::Activity(ActivityKind::PointerMove)
        );
    }

    #[test]
    fn test_parse_answers() {
        assert_eq!(parse_line("stay"), TerminalInput::Answer(PromptAction::Stay));
        assert_eq!(parse_line("S"), TerminalInput::Answer(PromptAction::Stay));
        assert_eq!(
            parse_line("Logout"),
            TerminalInput::Answer(PromptAction::Logout)
        );
        assert_eq!(parse_line("l"), TerminalInput::Answer(PromptAction::Logout));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_line("q"), TerminalInput::Quit);
        assert_eq!(parse_line("quit"), TerminalInput::Quit);
        assert_eq!(parse_line("exit\n"), TerminalInput::Quit);
    }

    #[test]
    fn test_anything_else_is_a_key_press() {
        assert_eq!(
            parse_line("hello there"),
            TerminalInput::Activity(ActivityKind::KeyPress)
        );
        assert_eq!(
            parse_line(""),
            TerminalInput::Activity(ActivityKind::KeyPress)
        );
    }

    #[test]
    fn test_answers_count_as_activity() {
        assert_eq!(
            parse_line("stay").activity(),
            Some(ActivityKind::KeyPress)
        );
        assert_eq!(parse_line("click").activity(), Some(ActivityKind::Click));
        assert_eq!(parse_line("quit").activity(), None);
    }
}
