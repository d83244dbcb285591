//! Command trait and registry
//!
//! Defines the interface for commands and the registry that maps names to
//! implementations. Handlers never mutate the model directly: they return an
//! [`Outcome`] whose [`Effect`] the executor applies through the undo manager.

use std::sync::Arc;

use ahash::AHashMap;
use serde_json::Value;

use bim_model::{Delta, Element, ElementId, ElementKind, IdAllocator, Level, Model};
use bim_settings::Settings;

use crate::args::{ParamSpec, ParsedCommand};
use crate::error::{CmdError, CmdResult};
use crate::grammar::Grammar;
use crate::history::CommandHistory;
use crate::level::resolve_level;

/// Per-session state that is not part of the model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    /// Level used when a command gives no `--level`
    pub active_level: String,
    pub selection: Option<ElementId>,
    /// Last element added by a successful command
    pub last_created: Option<ElementId>,
}

impl Session {
    pub fn new(active_level: impl Into<String>) -> Self {
        Self {
            active_level: active_level.into(),
            ..Default::default()
        }
    }
}

/// What the executor should do after a handler returns
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Effect {
    /// Read-only command
    #[default]
    None,
    /// Apply the delta and record it for undo
    Apply(Delta),
    Undo,
    Redo,
}

/// Result of a successful handler
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub message: String,
    pub data: Option<Value>,
    pub effect: Effect,
}

impl Outcome {
    /// Read-only result with a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Mutating result
    pub fn apply(message: impl Into<String>, delta: Delta) -> Self {
        Self {
            message: message.into(),
            data: None,
            effect: Effect::Apply(delta),
        }
    }

    /// Attach a structured payload (builder pattern)
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_mutating(&self) -> bool {
        matches!(self.effect, Effect::Apply(_))
    }
}

/// Command execution context
///
/// Gives handlers a consistent read-only view of the model plus the
/// session state they are allowed to change.
pub struct CommandContext<'a> {
    pub model: &'a Model,
    pub session: &'a mut Session,
    pub settings: &'a mut Settings,
    pub registry: &'a CommandRegistry,
    pub grammar: &'a Grammar,
    pub history: &'a CommandHistory,
    /// Undo and redo stack depths
    pub undo_depth: (usize, usize),
}

impl<'a> CommandContext<'a> {
    /// Resolve `explicit` or the active level
    pub fn level(&self, explicit: Option<&str>) -> CmdResult<Level> {
        Ok(resolve_level(self.model, &self.session.active_level, explicit)?)
    }

    /// Look up a referenced element
    pub fn element(&self, id: ElementId) -> CmdResult<&'a Element> {
        self.model.get(id).ok_or(CmdError::ElementNotFound(id))
    }

    /// Look up a referenced element and check its kind
    pub fn element_of(&self, id: ElementId, kind: ElementKind) -> CmdResult<&'a Element> {
        let element = self.element(id)?;
        if element.kind() != kind {
            return Err(CmdError::WrongElementKind {
                id,
                expected: kind.as_str(),
            });
        }
        Ok(element)
    }

    /// Fresh id allocator for the change being computed
    pub fn ids(&self) -> IdAllocator {
        self.model.id_allocator()
    }
}

/// Trait for command implementations
///
/// Commands receive a context with a view of the model and the parsed
/// arguments, and return an [`Outcome`] or an error. A failing command has
/// no effect on the model.
pub trait Command: Send + Sync {
    /// Get the command name
    fn name(&self) -> &str;

    /// One-line description
    fn description(&self) -> &str;

    /// Parameters, positional ones in order
    fn params(&self) -> &[ParamSpec] {
        &[]
    }

    /// Get list of command aliases
    fn aliases(&self) -> &[&str] {
        &[]
    }

    fn examples(&self) -> &[&str] {
        &[]
    }

    /// Usage line derived from the parameters
    fn usage(&self) -> String {
        let mut out = self.name().to_string();
        for p in self.params().iter().filter(|p| p.positional) {
            if p.required {
                out.push_str(&format!(" <{}>", p.name));
            } else {
                out.push_str(&format!(" [<{}>]", p.name));
            }
        }
        for p in self.params().iter().filter(|p| !p.positional) {
            if p.required {
                out.push_str(&format!(" --{} {}", p.name, p.value_hint()));
            } else {
                out.push_str(&format!(" [--{} {}]", p.name, p.value_hint()));
            }
        }
        out
    }

    /// Check that the arguments are complete before the handler runs
    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        match self.params().iter().find(|p| p.required && !args.has(p.name)) {
            Some(p) => Err(CmdError::missing(p.name, self.usage())),
            None => Ok(()),
        }
    }

    /// Execute the command
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome>;

    /// Get help text for this command
    fn help(&self) -> String {
        let mut out = format!("DESCRIPTION\n\n    {}\n\nUSAGE\n\n    {}\n", self.description(), self.usage());
        if !self.aliases().is_empty() {
            out.push_str(&format!("\nALIASES\n\n    {}\n", self.aliases().join(", ")));
        }
        if !self.params().is_empty() {
            out.push_str("\nARGUMENTS\n\n");
            for p in self.params() {
                let req = if p.required { " (required)" } else { "" };
                out.push_str(&format!("    {} = {}: {}{}\n", p.name, p.value_hint(), p.help, req));
            }
        }
        if !self.examples().is_empty() {
            out.push_str("\nEXAMPLES\n\n");
            for ex in self.examples() {
                out.push_str(&format!("    {}\n", ex));
            }
        }
        out
    }
}

/// Registry mapping command names to implementations
///
/// Filled once while the executor is built and read-only afterwards.
pub struct CommandRegistry {
    /// Commands indexed by name
    commands: AHashMap<String, Arc<dyn Command>>,
    /// Names in registration order
    order: Vec<String>,
    /// Aliases mapping alias -> command name
    aliases: AHashMap<String, String>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: AHashMap::new(),
            order: Vec::new(),
            aliases: AHashMap::new(),
        }
    }

    /// Create a registry with all built-in commands registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::commands::register_all(&mut registry);
        registry
    }

    /// Register a command
    ///
    /// Also registers any aliases defined by the command. Registering a
    /// name twice replaces the earlier command but keeps its position.
    pub fn register<C: Command + 'static>(&mut self, cmd: C) {
        let name = cmd.name().to_ascii_lowercase();
        for alias in cmd.aliases() {
            self.aliases.insert(alias.to_ascii_lowercase(), name.clone());
        }
        if !self.commands.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.commands.insert(name, Arc::new(cmd));
    }

    /// Look up a command by name or alias, case-insensitive
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        let name = name.to_ascii_lowercase();
        if let Some(cmd) = self.commands.get(&name) {
            return Some(cmd.clone());
        }
        self.aliases
            .get(&name)
            .and_then(|real| self.commands.get(real))
            .cloned()
    }

    /// Check if a command exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Command names in registration order (not including aliases)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Alias names
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(|s| s.as_str())
    }

    /// Get the number of registered commands
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ParamKind;

    struct Survey;

    impl Command for Survey {
        fn name(&self) -> &str {
            "survey"
        }

        fn description(&self) -> &str {
            "Test command"
        }

        fn params(&self) -> &[ParamSpec] {
            const PARAMS: &[ParamSpec] = &[
                ParamSpec::positional("at", ParamKind::Point).required(),
                ParamSpec::flag("depth", ParamKind::Length),
            ];
            PARAMS
        }

        fn aliases(&self) -> &[&str] {
            &["sv"]
        }

        fn execute(&self, _ctx: &mut CommandContext<'_>, _args: &ParsedCommand) -> CmdResult<Outcome> {
            Ok(Outcome::message("ok"))
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = CommandRegistry::new();
        registry.register(Survey);
        assert!(registry.contains("survey"));
        assert!(registry.contains("SV"));
        assert_eq!(registry.get("sv").unwrap().name(), "survey");
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order_kept() {
        let registry = CommandRegistry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(&names[..3], ["wall", "door", "window"]);
    }

    #[test]
    fn test_usage_and_validate() {
        assert_eq!(Survey.usage(), "survey <at> [--depth n]");
        let err = Survey.validate(&ParsedCommand::new("survey")).unwrap_err();
        assert!(matches!(err, CmdError::MissingArgument { ref param, .. } if param == "at"));
        assert!(Survey.help().contains("ARGUMENTS"));
    }
}
