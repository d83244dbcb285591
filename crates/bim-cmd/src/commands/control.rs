//! Control commands: help, undo, redo, set

use bim_settings::{get_setting, get_setting_id};
use serde_json::{json, Value};

use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Effect, Outcome};
use crate::error::{CmdError, CmdResult};
use crate::grammar::ROOT_RULE;

/// Register control commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(HelpCommand);
    registry.register(UndoCommand);
    registry.register(RedoCommand);
    registry.register(SetCommand);
}

// ============================================================================
// help command
// ============================================================================

struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "List commands, or show the usage and grammar of one command"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::positional("command", ParamKind::CommandName)
            .help("command to describe, or 'grammar' for the full grammar")];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["help", "help wall", "help grammar"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let Some(topic) = args.text("command") else {
            let width = ctx.registry.names().map(str::len).max().unwrap_or(0);
            let mut out = String::from(" Commands:\n");
            for name in ctx.registry.names() {
                if let Some(cmd) = ctx.registry.get(name) {
                    out.push_str(&format!("   {:<width$}  {}\n", name, cmd.description(), width = width));
                }
            }
            out.push_str("\n Type 'help <command>' for details or 'help grammar' for the syntax.");
            let names: Vec<&str> = ctx.registry.names().collect();
            return Ok(Outcome::message(out).with_data(json!(names)));
        };

        if topic.eq_ignore_ascii_case("grammar") {
            return Ok(Outcome::message(ctx.grammar.to_display_form()));
        }

        let cmd = ctx.registry.get(topic).ok_or_else(|| CmdError::UnknownCommand {
            name: topic.to_string(),
            suggestions: Vec::new(),
        })?;
        let mut out = cmd.help();
        let name = cmd.name().to_string();
        let rules: Vec<String> = [name.clone(), format!("{}-option", name)]
            .iter()
            .filter_map(|rule| ctx.grammar.display_rule(rule))
            .collect();
        if !rules.is_empty() {
            out.push_str("\nGRAMMAR\n\n");
            for rule in rules {
                out.push_str(&format!("    {}\n", rule));
            }
        }
        Ok(Outcome::message(out).with_data(json!({ "command": name, "root": ROOT_RULE })))
    }
}

// ============================================================================
// undo / redo commands
// ============================================================================

struct UndoCommand;

impl Command for UndoCommand {
    fn name(&self) -> &str {
        "undo"
    }

    fn description(&self) -> &str {
        "Revert the last model change"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, _args: &ParsedCommand) -> CmdResult<Outcome> {
        Ok(Outcome {
            effect: Effect::Undo,
            ..Default::default()
        })
    }
}

struct RedoCommand;

impl Command for RedoCommand {
    fn name(&self) -> &str {
        "redo"
    }

    fn description(&self) -> &str {
        "Re-apply the last undone change"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, _args: &ParsedCommand) -> CmdResult<Outcome> {
        Ok(Outcome {
            effect: Effect::Redo,
            ..Default::default()
        })
    }
}

// ============================================================================
// set command
// ============================================================================

struct SetCommand;

impl Command for SetCommand {
    fn name(&self) -> &str {
        "set"
    }

    fn description(&self) -> &str {
        "Show or change a setting"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("setting", ParamKind::Setting).help("setting name {default: list all}"),
            ParamSpec::positional("value", ParamKind::Text).help("new value {default: show the current value}"),
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["set", "set default_wall_height", "set default_wall_height 2.7", "set length_unit mm"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let Some(name) = args.text("setting") else {
            let mut out = String::new();
            let mut data = serde_json::Map::new();
            for (setting, value, overridden) in ctx.settings.iter() {
                let mark = if overridden { " *" } else { "" };
                out.push_str(&format!(" {} = {}{}\n", setting.name, value, mark));
                data.insert(setting.name.to_string(), json!(value));
            }
            return Ok(Outcome::message(out.trim_end().to_string()).with_data(Value::Object(data)));
        };

        match args.text("value") {
            Some(text) => {
                let setting = ctx.settings.set_from_str(name, text)?;
                let value = ctx.settings.get(setting.id).unwrap_or_else(|| setting.default.to_value());
                log::info!("setting {} = {}", setting.name, value);
                Ok(Outcome::message(format!(" {} = {}", setting.name, value))
                    .with_data(json!({ setting.name: json!(value) })))
            }
            None => {
                let setting = get_setting_id(name)
                    .and_then(get_setting)
                    .ok_or_else(|| CmdError::invalid_arg("setting", format!("unknown setting '{}'", name)))?;
                let value = ctx.settings.get(setting.id).unwrap_or_else(|| setting.default.to_value());
                Ok(Outcome::message(format!(" {} = {}  ({})", setting.name, value, setting.help))
                    .with_data(json!({ setting.name: json!(value) })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::executor::CommandExecutor;
    use bim_settings::{id, Settings};

    fn executor() -> CommandExecutor {
        CommandExecutor::new(Settings::new()).unwrap()
    }

    #[test]
    fn test_help_lists_commands() {
        let mut exec = executor();
        let result = exec.execute("help");
        assert!(result.success);
        assert!(result.message.contains("wall"));
        assert!(result.message.contains("Place a door in a wall"));
    }

    #[test]
    fn test_help_for_command_shows_grammar() {
        let mut exec = executor();
        let result = exec.execute("help wall");
        assert!(result.message.contains("USAGE"), "{}", result.message);
        assert!(result.message.contains("wall <start> <end>"));
        assert!(result.message.contains("GRAMMAR"));

        let result = exec.execute("help rm");
        assert!(result.message.contains("delete"));

        let result = exec.execute("help grammar");
        assert!(result.message.starts_with("command ::="), "{}", result.message);

        let result = exec.execute("help nonsense");
        assert_eq!(result.error, Some(ErrorKind::UnknownCommand));
    }

    #[test]
    fn test_undo_redo_commands() {
        let mut exec = executor();
        assert_eq!(exec.execute("undo").message, "Nothing to undo");
        exec.execute("wall 0,0 5,0");
        let result = exec.execute("undo");
        assert!(result.message.starts_with("Undone: Created wall-1"), "{}", result.message);
        assert!(exec.model().is_empty());
        let result = exec.execute("redo");
        assert!(result.message.starts_with("Redone: Created wall-1"));
        assert_eq!(exec.model().len(), 1);
        assert_eq!(exec.execute("redo").message, "Nothing to redo");
    }

    #[test]
    fn test_set_changes_defaults() {
        let mut exec = executor();
        let result = exec.execute("set default_wall_height 2.7");
        assert!(result.success, "{}", result.message);
        assert_eq!(exec.settings().get_float(id::default_wall_height), 2.7);

        let result = exec.execute("set default_wall_height 500");
        assert!(!result.success);
        assert_eq!(exec.settings().get_float(id::default_wall_height), 2.7);

        let result = exec.execute("set nonsense 1");
        assert!(!result.success);
    }

    #[test]
    fn test_set_length_unit_applies_to_parsing() {
        let mut exec = executor();
        assert!(exec.execute("set length_unit mm").success);
        exec.execute("wall 0,0 5000,0");
        let result = exec.execute("get wall-1");
        assert_eq!(result.data.unwrap()["end"]["x"], 5.0);
    }

    #[test]
    fn test_set_lists_and_shows() {
        let mut exec = executor();
        exec.execute("set undo_limit 5");
        let result = exec.execute("set");
        assert!(result.message.contains("undo_limit = 5 *"), "{}", result.message);
        let result = exec.execute("set snap_tolerance");
        assert!(result.message.contains("snap_tolerance = 0.01"), "{}", result.message);
    }
}
