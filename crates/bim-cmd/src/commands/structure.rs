//! Structural elements: columns, beams and stairs

use bim_model::geometry::format_length;
use bim_model::{Beam, Column, Delta, Element, ElementBase, ElementKind, Level, Point2, Stair};
use bim_settings::{get_setting, id};

use super::{created, positive, required, LEVEL_PARAM};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::{CmdError, CmdResult};

/// Riser bounds used when the settings table carries none
const MIN_RISER: f64 = 0.1;
const MAX_RISER: f64 = 0.25;

/// Register structural commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(ColumnCommand);
    registry.register(BeamCommand);
    registry.register(StairCommand);
}

/// Read the start and end points of a linear element and reject zero length
fn span(
    ctx: &CommandContext<'_>,
    args: &ParsedCommand,
    what: &str,
    usage: impl Fn() -> String,
) -> CmdResult<(Point2, Point2)> {
    let start = required(args.point("start"), "start", &usage)?;
    let end = required(args.point("end"), "end", &usage)?;
    let tolerance = ctx.settings.get_float(id::snap_tolerance).max(f64::EPSILON);
    if start.distance(end) <= tolerance {
        return Err(CmdError::handler(format!(
            "{} from {} to {} has zero length",
            what, start, end
        )));
    }
    Ok((start, end))
}

fn single(element: Element, level: &Level) -> Outcome {
    let (message, data) = created(&element, level);
    let mut delta = Delta::new();
    delta.add(element);
    Outcome::apply(message, delta).with_data(data)
}

// ============================================================================
// column command
// ============================================================================

struct ColumnCommand;

impl Command for ColumnCommand {
    fn name(&self) -> &str {
        "column"
    }

    fn description(&self) -> &str {
        "Place a rectangular column"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("position", ParamKind::Point)
                .required()
                .help("column centre"),
            ParamSpec::flag("width", ParamKind::Length).help("section width {default: default_column_size}"),
            ParamSpec::flag("depth", ParamKind::Length).help("section depth {default: default_column_size}"),
            ParamSpec::flag("height", ParamKind::Length).help("column height {default: level height}"),
            LEVEL_PARAM,
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["column 2,2", "column 6,0 --width 30cm --depth 60cm"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let level = ctx.level(args.text("level"))?;
        let position = required(args.point("position"), "position", || self.usage())?;
        let size = ctx.settings.get_float(id::default_column_size);
        let width = positive(args, "width", size)?;
        let depth = positive(args, "depth", size)?;
        let height = positive(args, "height", level.height)?;

        let column = Element::Column(Column {
            base: ElementBase::new(ctx.ids().next(ElementKind::Column), level.id),
            position,
            width,
            depth,
            height,
        });
        Ok(single(column, &level))
    }
}

// ============================================================================
// beam command
// ============================================================================

struct BeamCommand;

impl Command for BeamCommand {
    fn name(&self) -> &str {
        "beam"
    }

    fn description(&self) -> &str {
        "Create a beam between two points"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("start", ParamKind::Point).required().help("start point"),
            ParamSpec::positional("end", ParamKind::Point).required().help("end point"),
            ParamSpec::flag("width", ParamKind::Length).help("section width {default: default_beam_width}"),
            ParamSpec::flag("depth", ParamKind::Length).help("section depth {default: default_beam_depth}"),
            LEVEL_PARAM,
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["beam 0,0 6,0", "beam 0,0 0,8 --depth 600mm"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let level = ctx.level(args.text("level"))?;
        let (start, end) = span(ctx, args, "beam", || self.usage())?;
        let width = positive(args, "width", ctx.settings.get_float(id::default_beam_width))?;
        let depth = positive(args, "depth", ctx.settings.get_float(id::default_beam_depth))?;

        let beam = Element::Beam(Beam {
            base: ElementBase::new(ctx.ids().next(ElementKind::Beam), level.id),
            start,
            end,
            width,
            depth,
        });
        Ok(single(beam, &level))
    }
}

// ============================================================================
// stair command
// ============================================================================

struct StairCommand;

impl Command for StairCommand {
    fn name(&self) -> &str {
        "stair"
    }

    fn description(&self) -> &str {
        "Create a straight stair flight rising one level"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("start", ParamKind::Point).required().help("foot of the flight"),
            ParamSpec::positional("end", ParamKind::Point).required().help("head of the flight"),
            ParamSpec::flag("width", ParamKind::Length).help("flight width {default: default_stair_width}"),
            ParamSpec::flag("riser", ParamKind::Length)
                .help("maximum riser height, 0.1 to 0.25 {default: default_riser_height}"),
            LEVEL_PARAM,
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["stair 0,0 4,0", "stair 0,0 0,5 --width 1m --riser 17cm"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let level = ctx.level(args.text("level"))?;
        let (start, end) = span(ctx, args, "stair", || self.usage())?;
        let width = positive(args, "width", ctx.settings.get_float(id::default_stair_width))?;
        let max_riser = positive(args, "riser", ctx.settings.get_float(id::default_riser_height))?;

        let (lowest, highest) = get_setting(id::default_riser_height)
            .and_then(|s| s.min.zip(s.max))
            .unwrap_or((MIN_RISER, MAX_RISER));
        if max_riser < lowest || max_riser > highest {
            return Err(CmdError::invalid_arg(
                "riser",
                format!(
                    "must be between {} and {}, got {}",
                    format_length(lowest),
                    format_length(highest),
                    format_length(max_riser)
                ),
            ));
        }

        // Equal risers no taller than the requested height
        let count = (level.height / max_riser).ceil().max(1.0);
        if !count.is_finite() || count > f64::from(u32::MAX) {
            return Err(CmdError::handler(format!(
                "a stair on {} (height {}) would need too many risers",
                level.name,
                format_length(level.height)
            )));
        }
        let risers = count as u32;
        let riser_height = level.height / f64::from(risers);
        log::debug!(
            "stair on {}: {} risers of {}",
            level.name,
            risers,
            format_length(riser_height)
        );

        let stair = Element::Stair(Stair {
            base: ElementBase::new(ctx.ids().next(ElementKind::Stair), level.id),
            start,
            end,
            width,
            risers,
            riser_height,
        });
        Ok(single(stair, &level))
    }
}
