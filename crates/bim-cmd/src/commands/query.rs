//! Read-only query commands: status, list, get, history

use std::fmt::Write;

use bim_model::geometry::format_length;
use bim_model::{Element, ElementKind, Model};
use serde_json::{json, Value};

use super::{element_json, required};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::{CmdError, CmdResult};

/// Number of history lines shown by default
const DEFAULT_HISTORY_COUNT: usize = 20;

/// Categories accepted by `list`
pub const LIST_CATEGORIES: &[&str] = &[
    "walls", "doors", "windows", "rooms", "floors", "roofs", "columns", "beams", "stairs", "levels",
];

/// Register query commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(StatusCommand);
    registry.register(ListCommand);
    registry.register(GetCommand);
    registry.register(HistoryCommand);
}

fn level_name(model: &Model, element: &Element) -> String {
    model
        .level(element.level())
        .map(|l| l.name.clone())
        .unwrap_or_else(|| element.level().to_string())
}

// ============================================================================
// status command
// ============================================================================

struct StatusCommand;

impl Command for StatusCommand {
    fn name(&self) -> &str {
        "status"
    }

    fn description(&self) -> &str {
        "Summarize the model and the session"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &ParsedCommand) -> CmdResult<Outcome> {
        let model = ctx.model;
        let counts: Vec<(ElementKind, usize)> = ElementKind::ALL
            .into_iter()
            .map(|kind| (kind, model.elements_of(kind).count()))
            .filter(|(_, n)| *n > 0)
            .collect();
        let selection = ctx.session.selection.filter(|id| model.contains(*id));
        let (undo, redo) = ctx.undo_depth;

        let mut out = String::new();
        let _ = writeln!(out, " Active level: {}", ctx.session.active_level);
        let _ = writeln!(out, " Levels: {}", model.level_names().join(", "));
        let breakdown = counts
            .iter()
            .map(|(kind, n)| format!("{} {}", n, kind.plural()))
            .collect::<Vec<_>>()
            .join(", ");
        if breakdown.is_empty() {
            let _ = writeln!(out, " Elements: 0");
        } else {
            let _ = writeln!(out, " Elements: {} ({})", model.len(), breakdown);
        }
        let _ = writeln!(
            out,
            " Selection: {}",
            selection.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        let _ = write!(out, " Undo: {}, redo: {}", undo, redo);

        let data = json!({
            "active_level": ctx.session.active_level,
            "levels": model.levels(),
            "elements": counts
                .iter()
                .map(|(kind, n)| (kind.plural().to_string(), json!(n)))
                .collect::<serde_json::Map<String, Value>>(),
            "selection": selection.map(|id| id.to_string()),
            "undo_depth": undo,
            "redo_depth": redo,
        });
        Ok(Outcome::message(out).with_data(data))
    }
}

// ============================================================================
// list command
// ============================================================================

struct ListCommand;

impl Command for ListCommand {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "List elements, optionally of one category, or the levels"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::positional("category", ParamKind::Choice(LIST_CATEGORIES))
            .help("element category or levels {default: everything}")];
        PARAMS
    }

    fn aliases(&self) -> &[&str] {
        &["ls"]
    }

    fn examples(&self) -> &[&str] {
        &["list", "list walls", "ls levels"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let model = ctx.model;
        let category = args.text("category");

        if category.is_some_and(|c| c.eq_ignore_ascii_case("levels")) {
            let mut out = String::new();
            for level in model.levels() {
                let active = if level.is_named(&ctx.session.active_level) { " *" } else { "" };
                let _ = writeln!(
                    out,
                    " {}  elevation {}, height {}{}",
                    level.name,
                    format_length(level.elevation),
                    format_length(level.height),
                    active
                );
            }
            return Ok(Outcome::message(out.trim_end().to_string()).with_data(json!(model.levels())));
        }

        let kind = match category {
            Some(c) => Some(ElementKind::from_category(c).ok_or_else(|| {
                CmdError::invalid_arg("category", format!("unknown category '{}'", c))
            })?),
            None => None,
        };
        let elements: Vec<&Element> = match kind {
            Some(kind) => model.elements_of(kind).collect(),
            None => model.elements().collect(),
        };

        let what = kind.map_or("elements", |k| k.plural());
        if elements.is_empty() {
            return Ok(Outcome::message(format!("No {}", what)).with_data(json!([])));
        }
        let mut out = format!(" {} {}:", elements.len(), what);
        for element in &elements {
            let _ = write!(
                out,
                "\n  {}  {}  [{}]",
                element.id(),
                element.summary(),
                level_name(model, element)
            );
        }
        let data = Value::Array(elements.iter().map(|e| element_json(e)).collect());
        Ok(Outcome::message(out).with_data(data))
    }
}

// ============================================================================
// get command
// ============================================================================

struct GetCommand;

impl Command for GetCommand {
    fn name(&self) -> &str {
        "get"
    }

    fn description(&self) -> &str {
        "Show the properties and relationships of an element"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::positional("ref", ParamKind::Element)
            .required()
            .help("element to inspect")];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["get wall-1", "get $last"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let id = required(args.element("ref"), "ref", || self.usage())?;
        let element = ctx.element(id)?;

        let mut out = format!(" {}: {}\n level: {}", id, element.summary(), level_name(ctx.model, element));
        for rel in element.relationships().iter() {
            let _ = write!(out, "\n {} {}", rel.kind, rel.target);
        }
        Ok(Outcome::message(out).with_data(element_json(element)))
    }
}

// ============================================================================
// history command
// ============================================================================

struct HistoryCommand;

impl Command for HistoryCommand {
    fn name(&self) -> &str {
        "history"
    }

    fn description(&self) -> &str {
        "Show recently entered commands"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::positional("count", ParamKind::Count)
            .help("number of lines {default: 20}")];
        PARAMS
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let count = match args.number("count") {
            Some(n) if n < 1.0 || n.fract() != 0.0 => {
                return Err(CmdError::invalid_arg(
                    "count",
                    format!("expected a positive whole number, got {}", format_length(n)),
                ))
            }
            Some(n) => n as usize,
            None => DEFAULT_HISTORY_COUNT,
        };

        let entries: Vec<_> = ctx.history.last_n(count).collect();
        if entries.is_empty() {
            return Ok(Outcome::message("History is empty"));
        }
        let out = entries
            .iter()
            .map(|(index, entry)| {
                let mark = if entry.success { "" } else { "  (failed)" };
                format!("{:>5}  {}{}", index, entry.line, mark)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let data = json!(entries.iter().map(|(_, e)| e).collect::<Vec<_>>());
        Ok(Outcome::message(out).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use crate::executor::CommandExecutor;
    use bim_settings::Settings;

    fn executor() -> CommandExecutor {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        exec.execute("wall 0,0 5,0");
        exec.execute("wall 5,0 5,4");
        exec.execute("column 2,2");
        exec
    }

    #[test]
    fn test_status_counts() {
        let mut exec = executor();
        let result = exec.execute("status");
        assert!(result.success);
        assert!(result.message.contains("Elements: 3 (2 walls, 1 columns)"), "{}", result.message);
        let data = result.data.unwrap();
        assert_eq!(data["elements"]["walls"], 2);
        assert_eq!(data["undo_depth"], 3);
    }

    #[test]
    fn test_list_by_category() {
        let mut exec = executor();
        let result = exec.execute("list walls");
        assert!(result.message.starts_with(" 2 walls:"), "{}", result.message);
        assert_eq!(result.data.unwrap().as_array().unwrap().len(), 2);

        let result = exec.execute("ls");
        assert!(result.message.contains("column-1"));

        let result = exec.execute("list stairs");
        assert_eq!(result.message, "No stairs");

        let result = exec.execute("list levels");
        assert!(result.message.contains("Level 1"));
        assert!(result.message.ends_with('*'));
    }

    #[test]
    fn test_get_returns_element_json() {
        let mut exec = executor();
        let result = exec.execute("get wall-2");
        assert!(result.message.contains("joins wall-1"), "{}", result.message);
        let data = result.data.unwrap();
        assert_eq!(data["type"], "wall");
        assert_eq!(data["id"], "wall-2");
    }

    #[test]
    fn test_history_lists_failures() {
        let mut exec = executor();
        exec.execute("wal 1,1");
        let result = exec.execute("history 2");
        assert!(result.success);
        let lines: Vec<&str> = result.message.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("wal 1,1  (failed)"));
        assert!(!exec.execute("history 0").success);
    }
}
