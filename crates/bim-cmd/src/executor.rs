//! Command executor
//!
//! Owns the model, the session and the undo history, and is the only place
//! where the model is mutated. One line is parsed, dispatched and applied to
//! completion before the next is accepted.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;

use bim_model::{Change, Delta, ElementId, Level, Model};
use bim_settings::{id, Settings};

use crate::args::{ParamSpec, ParsedCommand};
use crate::command::{CommandContext, CommandRegistry, Effect, Session};
use crate::completion::{Autocomplete, CompletionContext, Completions, TabAction};
use crate::error::{CmdError, CmdResult, ErrorKind, GrammarError, LevelError, ParseError};
use crate::grammar::Grammar;
use crate::history::CommandHistory;
use crate::level::resolve_level;
use crate::parser::{parse_command, ParseContext};
use crate::undo::{Operation, UndoManager};

/// Maximum number of "did you mean" suggestions
const MAX_SUGGESTIONS: usize = 3;

/// Minimum similarity for a suggestion
const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Outcome of one command, as reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Classification of the failure, for callers that branch on it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn failure(err: &CmdError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            data: None,
            error: Some(err.kind()),
        }
    }
}

/// Command executor
///
/// Manages parsing, dispatch, undo/redo, input history and completion.
pub struct CommandExecutor {
    registry: CommandRegistry,
    grammar: Grammar,
    model: Model,
    session: Session,
    settings: Settings,
    undo: UndoManager,
    history: CommandHistory,
    completion: Autocomplete,
}

impl CommandExecutor {
    /// Create an executor with the built-in commands
    ///
    /// Fails only if the grammar built from the registry is not closed.
    pub fn new(settings: Settings) -> Result<Self, GrammarError> {
        Self::with_registry(CommandRegistry::with_builtins(), settings)
    }

    /// Create an executor over a custom registry
    pub fn with_registry(registry: CommandRegistry, settings: Settings) -> Result<Self, GrammarError> {
        let grammar = Grammar::from_registry(&registry);
        grammar.validate()?;

        let mut model = Model::new();
        let level_name = settings.get_string(id::initial_level);
        let level = Level::new(
            model.id_allocator().next_level(),
            level_name.as_str(),
            0.0,
            settings.get_float(id::default_level_height),
        );
        if let Err(e) = model.apply(&Delta::from(vec![Change::AddLevel(level)])) {
            log::warn!("could not create initial level '{}': {}", level_name, e);
        }

        let mut executor = Self {
            registry,
            grammar,
            model,
            session: Session::new(level_name),
            settings,
            undo: UndoManager::default(),
            history: CommandHistory::new(),
            completion: Autocomplete::default(),
        };
        executor.sync_settings();
        log::debug!(
            "executor ready with {} commands",
            executor.registry.len()
        );
        Ok(executor)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// Canonical grammar text, root rule first
    pub fn describe_grammar(&self) -> String {
        self.grammar.to_display_form()
    }

    // =========================================================================
    // Parsing and dispatch
    // =========================================================================

    /// Session facts for the parser; references to removed elements are dropped
    pub fn parse_context(&self) -> ParseContext {
        let live = |id: Option<ElementId>| id.filter(|id| self.model.contains(*id));
        ParseContext {
            last_created: live(self.session.last_created),
            selected: live(self.session.selection),
            length_unit: self.settings.get_string(id::length_unit),
        }
    }

    /// Parse one line without executing it
    pub fn parse(&self, text: &str) -> Result<ParsedCommand, ParseError> {
        parse_command(text, &self.grammar, &self.parse_context())
    }

    /// Validate and run a parsed command
    pub fn dispatch(&mut self, cmd: &ParsedCommand) -> CommandResult {
        match self.try_dispatch(cmd) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{} failed: {}", cmd.name, e);
                CommandResult::failure(&e)
            }
        }
    }

    fn try_dispatch(&mut self, cmd: &ParsedCommand) -> CmdResult<CommandResult> {
        let Some(handler) = self.registry.get(&cmd.name) else {
            return Err(CmdError::UnknownCommand {
                name: cmd.name.clone(),
                suggestions: self.suggest(&cmd.name),
            });
        };

        let cmd = bind_positional(cmd, handler.params())?;
        handler.validate(&cmd)?;

        let outcome = {
            let mut ctx = CommandContext {
                model: &self.model,
                session: &mut self.session,
                settings: &mut self.settings,
                registry: &self.registry,
                grammar: &self.grammar,
                history: &self.history,
                undo_depth: (self.undo.undo_depth(), self.undo.redo_depth()),
            };
            handler.execute(&mut ctx, &cmd)?
        };

        let message = match outcome.effect {
            Effect::None => outcome.message,
            Effect::Apply(delta) if delta.is_empty() => outcome.message,
            Effect::Apply(delta) => {
                let created = delta.added().last();
                let op = Operation::new(delta, outcome.message.clone());
                self.undo.execute(&mut self.model, op)?;
                if created.is_some() {
                    self.session.last_created = created;
                }
                outcome.message
            }
            Effect::Undo => self.apply_undo()?,
            Effect::Redo => self.apply_redo()?,
        };

        self.sync_settings();
        Ok(CommandResult {
            success: true,
            message,
            data: outcome.data,
            error: None,
        })
    }

    /// Parse and dispatch one line, recording it in the input history
    ///
    /// Blank lines and `#` comments succeed without doing anything.
    pub fn execute(&mut self, line: &str) -> CommandResult {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return CommandResult::ok("");
        }
        if self.settings.get_bool(id::echo_commands) {
            log::info!("bim> {}", line);
        }

        let result = match self.parse(line) {
            Ok(cmd) => self.dispatch(&cmd),
            Err(e) => {
                log::warn!("parse error: {}", e);
                CommandResult::failure(&CmdError::Parse(e))
            }
        };
        self.history.push(line, result.success);
        self.completion.reset();
        result
    }

    /// Revert the last operation; an empty stack is a successful no-op
    pub fn undo(&mut self) -> CommandResult {
        match self.apply_undo() {
            Ok(message) => CommandResult::ok(message),
            Err(e) => CommandResult::failure(&e),
        }
    }

    /// Re-apply the last undone operation; an empty stack is a successful no-op
    pub fn redo(&mut self) -> CommandResult {
        match self.apply_redo() {
            Ok(message) => CommandResult::ok(message),
            Err(e) => CommandResult::failure(&e),
        }
    }

    fn apply_undo(&mut self) -> CmdResult<String> {
        Ok(match self.undo.undo(&mut self.model)? {
            Some(op) => format!("Undone: {}", op.description()),
            None => "Nothing to undo".to_string(),
        })
    }

    fn apply_redo(&mut self) -> CmdResult<String> {
        Ok(match self.undo.redo(&mut self.model)? {
            Some(op) => format!("Redone: {}", op.description()),
            None => "Nothing to redo".to_string(),
        })
    }

    /// Resolve a level name, or the active level
    pub fn resolve_level(&self, name: Option<&str>) -> Result<Level, LevelError> {
        resolve_level(&self.model, &self.session.active_level, name)
    }

    /// Push limits from the settings into the undo manager and history
    fn sync_settings(&mut self) {
        self.undo
            .set_limit(self.settings.get_int(id::undo_limit).max(1) as usize);
        self.history
            .set_max_size(self.settings.get_int(id::history_limit).max(1) as usize);
        self.completion.set_double_tab(Duration::from_millis(
            self.settings.get_int(id::double_tab_ms).max(0) as u64,
        ));
    }

    /// Close matches for an unknown command name
    fn suggest(&self, name: &str) -> Vec<String> {
        let name = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .registry
            .names()
            .chain(self.registry.aliases())
            .filter_map(|candidate| {
                let ratio = rapidfuzz::fuzz::ratio(name.chars(), candidate.chars());
                let prefix = !name.is_empty() && candidate.starts_with(name.as_str());
                if prefix {
                    Some((ratio.max(SUGGESTION_THRESHOLD), candidate))
                } else if ratio >= SUGGESTION_THRESHOLD {
                    Some((ratio, candidate))
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    // =========================================================================
    // Completion
    // =========================================================================

    fn completion_context(&self) -> CompletionContext<'_> {
        CompletionContext {
            registry: &self.registry,
            model: &self.model,
        }
    }

    pub fn handle_tab(&mut self, input: &str) -> Option<String> {
        let ctx = CompletionContext {
            registry: &self.registry,
            model: &self.model,
        };
        self.completion.handle_tab(input, ctx)
    }

    pub fn press_tab(&mut self, input: &str, now: Instant) -> TabAction {
        let ctx = CompletionContext {
            registry: &self.registry,
            model: &self.model,
        };
        self.completion.press_tab(input, now, ctx)
    }

    pub fn show_all_matches(&self, input: &str) -> Vec<String> {
        self.completion
            .show_all_matches(input, self.completion_context())
    }

    pub fn completions(&self, input: &str) -> Completions {
        crate::completion::completions(input, self.completion_context())
    }

    /// Forget completion cycling after an edit
    pub fn reset_completion(&mut self) {
        self.completion.reset();
    }
}

/// Move positional values of a hand-built command onto its positional
/// parameters, in order, skipping parameters already given by name
fn bind_positional<'c>(cmd: &'c ParsedCommand, params: &[ParamSpec]) -> CmdResult<Cow<'c, ParsedCommand>> {
    if cmd.positional.is_empty() {
        return Ok(Cow::Borrowed(cmd));
    }
    let mut bound = cmd.clone();
    let mut free = params
        .iter()
        .filter(|p| p.positional && !cmd.has(p.name));
    for value in bound.positional.drain(..) {
        let param = free.next().ok_or_else(|| {
            CmdError::invalid_arg(cmd.name.as_str(), format!("unexpected argument '{}'", value))
        })?;
        bound.flags.insert(param.name.to_string(), value);
    }
    Ok(Cow::Owned(bound))
}
