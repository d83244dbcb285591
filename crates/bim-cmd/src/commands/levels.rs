//! Level commands: level, activate

use bim_model::geometry::format_length;
use bim_model::{Change, Delta, Level};
use bim_settings::id;
use serde_json::json;

use super::{positive, required};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::{CmdError, CmdResult};

/// Register level commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(LevelCommand);
    registry.register(ActivateCommand);
}

// ============================================================================
// level command
// ============================================================================

struct LevelCommand;

impl Command for LevelCommand {
    fn name(&self) -> &str {
        "level"
    }

    fn description(&self) -> &str {
        "Create a new level"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("name", ParamKind::Text)
                .required()
                .help("level name, unique ignoring case"),
            ParamSpec::flag("elevation", ParamKind::Length)
                .help("floor elevation {default: top of the highest level}"),
            ParamSpec::flag("height", ParamKind::Length)
                .help("floor-to-floor height {default: default_level_height}"),
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &[
            "level \"Level 2\"",
            "level Basement --elevation -3 --height 2.8",
        ]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let name = required(args.text("name"), "name", || self.usage())?.trim();
        if name.is_empty() {
            return Err(CmdError::invalid_arg("name", "level name cannot be empty"));
        }
        if ctx.model.level_by_name(name).is_some() {
            return Err(CmdError::handler(format!("level '{}' already exists", name)));
        }

        let top = ctx
            .model
            .levels()
            .iter()
            .map(|l| l.elevation + l.height)
            .fold(None, |acc: Option<f64>, z| Some(acc.map_or(z, |a| a.max(z))));
        let elevation = args.number_or("elevation", top.unwrap_or(0.0));
        let height = positive(args, "height", ctx.settings.get_float(id::default_level_height))?;

        let level = Level::new(ctx.ids().next_level(), name, elevation, height);
        let message = format!(
            "Created level '{}' at elevation {}, height {}",
            level.name,
            format_length(elevation),
            format_length(height)
        );
        let data = json!({ "level": level });
        let delta = Delta::from(vec![Change::AddLevel(level)]);
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}

// ============================================================================
// activate command
// ============================================================================

struct ActivateCommand;

impl Command for ActivateCommand {
    fn name(&self) -> &str {
        "activate"
    }

    fn description(&self) -> &str {
        "Make a level the default target for new elements"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::positional("level", ParamKind::Level)
            .required()
            .help("existing level name")];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["activate \"Level 2\""]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let name = required(args.text("level"), "level", || self.usage())?;
        let level = ctx.level(Some(name))?;
        ctx.session.active_level = level.name.clone();
        Ok(Outcome::message(format!("Active level: {}", level.name)))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::executor::CommandExecutor;
    use bim_settings::Settings;

    #[test]
    fn test_level_stacks_on_top() {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        let result = exec.execute("level \"Level 2\"");
        assert!(result.success, "{}", result.message);
        let level = exec.model().level_by_name("level 2").unwrap();
        assert_eq!(level.elevation, 3.0);
        assert_eq!(exec.undo_depth(), 1);

        exec.execute("undo");
        assert!(exec.model().level_by_name("Level 2").is_none());
    }

    #[test]
    fn test_duplicate_level_rejected() {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        let result = exec.execute("level \"LEVEL 1\"");
        assert!(!result.success);
        assert!(result.message.contains("already exists"));
    }

    #[test]
    fn test_activate_changes_default_level() {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        exec.execute("level Roof --elevation 9");
        assert!(exec.execute("activate roof").success);
        assert_eq!(exec.session().active_level, "Roof");

        exec.execute("wall 0,0 5,0");
        let wall = exec.model().elements().next().unwrap();
        assert_eq!(exec.model().level(wall.level()).unwrap().name, "Roof");

        let result = exec.execute("activate Attic");
        assert_eq!(result.error, Some(ErrorKind::LevelResolution));
        assert_eq!(exec.session().active_level, "Roof");
    }
}
