//! BIM Command Engine
//!
//! This crate provides the command language used to build and edit a
//! [`bim_model::Model`] interactively.
//!
//! # Overview
//!
//! One line of text goes through the lexer, a parser driven by a declarative
//! grammar, the dispatcher and a command handler. Handlers compute a
//! [`bim_model::Delta`] which the executor applies through the undo manager,
//! so every successful mutation can be undone and redone. Supported syntax:
//! - Positional and `--flag` arguments, interchangeably
//! - Points as `x,y` or `(x, y)`, lengths and angles with unit suffixes
//! - Element ids (`wall-3`) and the variables `$last` and `$selected`
//! - Context-aware Tab completion with cycling
//!
//! # Example
//!
//! ```rust
//! use bim_cmd::CommandExecutor;
//! use bim_settings::Settings;
//!
//! let mut executor = CommandExecutor::new(Settings::new()).unwrap();
//!
//! let result = executor.execute("wall 0,0 5,0 --height 2.7");
//! assert!(result.success);
//! assert!(executor.execute("door $last --offset 2.5").success);
//!
//! executor.execute("undo");
//! assert_eq!(executor.model().len(), 1);
//! ```
//!
//! # Architecture
//!
//! The engine consists of several components:
//!
//! - **Lexer**: `nom` combinators turning text into [`Token`]s
//! - **Grammar**: named [`Rule`]s built from the registry, validated at startup
//! - **Parser**: interprets the grammar into a [`ParsedCommand`]
//! - **CommandRegistry**: maps command names and aliases to implementations
//! - **Level resolver**: picks the target level of element-creating commands
//! - **UndoManager**: bounded undo and redo stacks of reversible operations
//! - **Autocomplete**: Tab completion over commands, flags and values
//! - **CommandExecutor**: ties it together and owns the model

mod args;
mod command;
pub mod commands;
mod completion;
mod error;
mod executor;
mod grammar;
mod history;
mod level;
mod lexer;
mod parser;
mod undo;
mod units;

// Re-export main types
pub use args::{ArgValue, ParamKind, ParamSpec, ParsedCommand};
pub use command::{Command, CommandContext, CommandRegistry, Effect, Outcome, Session};
pub use completion::{
    completions, Autocomplete, CompletionContext, CompletionState, Completions, TabAction,
    DEFAULT_DOUBLE_TAB,
};
pub use error::{CmdError, CmdResult, ErrorKind, GrammarError, LevelError, ParseError};
pub use executor::{CommandExecutor, CommandResult};
pub use grammar::{Grammar, Rule, Shape, Terminal, ROOT_RULE};
pub use history::{CommandHistory, HistoryEntry};
pub use level::{available_levels, resolve_level};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse_command, ParseContext};
pub use undo::{Operation, UndoManager};
pub use units::{angle_factor, length_factor};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::args::{ArgValue, ParamKind, ParamSpec, ParsedCommand};
    pub use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
    pub use crate::error::{CmdError, CmdResult};
    pub use crate::executor::{CommandExecutor, CommandResult};
    pub use crate::parser::parse_command;
}
