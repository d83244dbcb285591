//! Error types for the command system
//!
//! Every error here is local to one command. [`GrammarError`] is the only
//! one that is fatal, and it can only occur while building the executor.

use serde::Serialize;
use thiserror::Error;

use bim_model::{ElementId, ModelError};
use bim_settings::SettingError;

/// Result type for command operations
pub type CmdResult<T = ()> = Result<T, CmdError>;

/// Coarse classification of a failed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    UnknownCommand,
    MissingArgument,
    LevelResolution,
    ElementReference,
    Handler,
}

/// Errors that can occur during command dispatch and execution
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CmdError {
    /// Command parsing failed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Command not found in registry
    #[error("unknown command '{name}'{}", did_you_mean(.suggestions))]
    UnknownCommand {
        name: String,
        suggestions: Vec<String>,
    },

    /// Required parameter absent
    #[error("missing required parameter '{param}'\nusage: {usage}")]
    MissingArgument { param: String, usage: String },

    /// Parameter present but unusable
    #[error("invalid value for '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Named or active level does not exist
    #[error(transparent)]
    LevelResolution(#[from] LevelError),

    /// Referenced element does not exist
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// Referenced element has the wrong kind
    #[error("{id} is not a {expected}")]
    WrongElementKind { id: ElementId, expected: &'static str },

    /// Domain failure inside a handler (invalid geometry, ...)
    #[error("{0}")]
    Handler(String),

    /// The model rejected the computed change
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// A setting could not be read or changed
    #[error("setting error: {0}")]
    Setting(#[from] SettingError),
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; did you mean {}?", suggestions.join(", "))
    }
}

impl CmdError {
    /// Create an invalid argument error
    pub fn invalid_arg(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CmdError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a handler error
    pub fn handler(msg: impl Into<String>) -> Self {
        CmdError::Handler(msg.into())
    }

    /// Create a missing argument error
    pub fn missing(param: impl Into<String>, usage: impl Into<String>) -> Self {
        CmdError::MissingArgument {
            param: param.into(),
            usage: usage.into(),
        }
    }

    /// Classification used in [`CommandResult`](crate::CommandResult)
    pub fn kind(&self) -> ErrorKind {
        match self {
            CmdError::Parse(ParseError::UnresolvedReference { .. }) => ErrorKind::ElementReference,
            CmdError::Parse(_) => ErrorKind::Parse,
            CmdError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            CmdError::MissingArgument { .. } => ErrorKind::MissingArgument,
            CmdError::LevelResolution(_) => ErrorKind::LevelResolution,
            CmdError::ElementNotFound(_) | CmdError::WrongElementKind { .. } => {
                ErrorKind::ElementReference
            }
            CmdError::InvalidArgument { .. }
            | CmdError::Handler(_)
            | CmdError::Model(_)
            | CmdError::Setting(_) => ErrorKind::Handler,
        }
    }
}

/// Errors that can occur during lexing and parsing
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Character that cannot start any token
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },

    /// Unterminated string
    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    /// Token does not fit the grammar here
    #[error("expected {} at position {position}, found {found}", .expected.join(" or "))]
    Expected {
        expected: Vec<String>,
        found: String,
        position: usize,
    },

    /// Number suffix that is neither a length nor an angle unit
    #[error("unknown unit '{unit}' at position {position}")]
    UnknownUnit { unit: String, position: usize },

    /// Invalid number format
    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    /// The same parameter was given twice (flag and positional, or flag repeated)
    #[error("parameter '{0}' given more than once")]
    DuplicateArgument(String),

    /// `$last` / `$selected` could not be resolved
    #[error("cannot resolve ${variable}: {reason}")]
    UnresolvedReference { variable: String, reason: String },

    /// Empty command
    #[error("empty command")]
    EmptyCommand,
}

impl ParseError {
    /// Byte offset of the offending input, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedChar { position, .. }
            | ParseError::Expected { position, .. }
            | ParseError::UnknownUnit { position, .. }
            | ParseError::InvalidNumber { position, .. } => Some(*position),
            ParseError::UnterminatedString(position) => Some(*position),
            _ => None,
        }
    }
}

/// Level lookup failure
#[derive(Debug, Error, Clone, PartialEq)]
#[error("level '{requested}' not found; available levels: {available}")]
pub struct LevelError {
    pub requested: String,
    /// Comma separated level names, or `(none)`
    pub available: String,
}

/// Grammar validation failure
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GrammarError {
    /// The designated root rule is not defined
    #[error("root rule '{0}' is not defined")]
    MissingRoot(String),

    /// Rules reference undefined non-terminals
    #[error("undefined rules: {}", list_undefined(.0))]
    UndefinedRules(Vec<(String, String)>),
}

fn list_undefined(missing: &[(String, String)]) -> String {
    missing
        .iter()
        .map(|(rule, name)| format!("{} (referenced by {})", name, rule))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CmdError::UnknownCommand {
            name: "wal".to_string(),
            suggestions: vec!["wall".to_string()],
        };
        assert_eq!(err.to_string(), "unknown command 'wal'; did you mean wall?");

        let err = CmdError::UnknownCommand {
            name: "zzz".to_string(),
            suggestions: vec![],
        };
        assert_eq!(err.to_string(), "unknown command 'zzz'");

        let err = CmdError::missing("start", "wall <start> <end>");
        assert!(err.to_string().starts_with("missing required parameter 'start'"));
    }

    #[test]
    fn test_parse_error() {
        let err = ParseError::Expected {
            expected: vec!["<point>".to_string(), "\"--end\"".to_string()],
            found: "end of input".to_string(),
            position: 9,
        };
        assert_eq!(
            err.to_string(),
            "expected <point> or \"--end\" at position 9, found end of input"
        );
        assert_eq!(err.position(), Some(9));
    }

    #[test]
    fn test_error_kind() {
        let err = CmdError::from(ParseError::UnresolvedReference {
            variable: "last".to_string(),
            reason: "nothing has been created yet".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::ElementReference);
        assert_eq!(CmdError::from(ParseError::EmptyCommand).kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_level_error() {
        let err = LevelError {
            requested: "Roof Deck".to_string(),
            available: "(none)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "level 'Roof Deck' not found; available levels: (none)"
        );
    }
}
