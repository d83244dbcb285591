//! Floor and roof slabs

use bim_model::geometry::{format_length, polygon_area};
use bim_model::{Delta, Element, ElementBase, ElementKind, Extents, Floor, Point2, Roof, RoofType};
use bim_settings::id;

use super::{choice, created, non_negative, positive, required, LEVEL_PARAM};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::{CmdError, CmdResult};

/// Register slab commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(FloorCommand);
    registry.register(RoofCommand);
}

/// Check that `points` describe a polygon with a non-zero area
pub(crate) fn check_boundary(points: &[Point2], what: &str) -> CmdResult {
    if points.len() < 3 {
        return Err(CmdError::handler(format!(
            "{} boundary needs at least 3 points, got {}",
            what,
            points.len()
        )));
    }
    let area = polygon_area(points);
    if !area.is_finite() {
        return Err(CmdError::handler(format!("{} boundary is too large", what)));
    }
    if area < 1e-9 {
        return Err(CmdError::handler(format!("{} boundary has zero area", what)));
    }
    Ok(())
}

// ============================================================================
// floor command
// ============================================================================

struct FloorCommand;

impl Command for FloorCommand {
    fn name(&self) -> &str {
        "floor"
    }

    fn description(&self) -> &str {
        "Create a floor slab from a boundary or a rectangle"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("points", ParamKind::Points).help("boundary polygon"),
            ParamSpec::flag("min", ParamKind::Point).help("rectangle corner, with --max"),
            ParamSpec::flag("max", ParamKind::Point).help("opposite rectangle corner, with --min"),
            ParamSpec::flag("thickness", ParamKind::Length)
                .help("slab thickness {default: default_floor_thickness}"),
            LEVEL_PARAM,
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["floor 0,0 5,0 5,4 0,4", "floor --min 0,0 --max 10,8 --thickness 250mm"]
    }

    /// Either a boundary or both rectangle corners
    fn validate(&self, args: &ParsedCommand) -> CmdResult {
        let corners = args.has("min") || args.has("max");
        if args.has("points") {
            if corners {
                return Err(CmdError::invalid_arg(
                    "points",
                    "give either a boundary or --min/--max, not both",
                ));
            }
            return Ok(());
        }
        for corner in ["min", "max"] {
            if !args.has(corner) {
                return Err(CmdError::missing(if corners { corner } else { "points" }, self.usage()));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let level = ctx.level(args.text("level"))?;
        let boundary = match args.points("points") {
            Some(points) => points,
            None => {
                let min = required(args.point("min"), "min", || self.usage())?;
                let max = required(args.point("max"), "max", || self.usage())?;
                Extents::from_points(&[min, max])
                    .map(|e| e.corners())
                    .unwrap_or_default()
            }
        };
        check_boundary(&boundary, "floor")?;
        let thickness = positive(
            args,
            "thickness",
            ctx.settings.get_float(id::default_floor_thickness),
        )?;

        let floor = Element::Floor(Floor {
            base: ElementBase::new(ctx.ids().next(ElementKind::Floor), level.id),
            boundary,
            thickness,
        });
        let (message, data) = created(&floor, &level);
        let mut delta = Delta::new();
        delta.add(floor);
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}

// ============================================================================
// roof command
// ============================================================================

struct RoofCommand;

impl Command for RoofCommand {
    fn name(&self) -> &str {
        "roof"
    }

    fn description(&self) -> &str {
        "Create a roof over a boundary polygon"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("boundary", ParamKind::Points)
                .required()
                .help("eave outline before overhang"),
            ParamSpec::flag("type", ParamKind::Choice(RoofType::NAMES)).help("roof form {default: gable}"),
            ParamSpec::flag("slope", ParamKind::Angle)
                .help("pitch, ignored for flat roofs {default: default_roof_slope}"),
            ParamSpec::flag("overhang", ParamKind::Length)
                .help("projection beyond the boundary {default: default_roof_overhang}"),
            LEVEL_PARAM,
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &[
            "roof 0,0 10,0 10,8 0,8",
            "roof 0,0 10,0 10,8 0,8 --type hip --slope 35deg --overhang 60cm",
            "roof 0,0 6,0 6,6 0,6 --type flat",
        ]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let level = ctx.level(args.text("level"))?;
        let boundary = required(args.points("boundary"), "boundary", || self.usage())?;
        check_boundary(&boundary, "roof")?;

        let roof_type = choice(args, "type", RoofType::default())?;
        let slope = match roof_type {
            RoofType::Flat => 0.0,
            _ => args.number_or("slope", ctx.settings.get_float(id::default_roof_slope)),
        };
        if !(0.0..90.0).contains(&slope) {
            return Err(CmdError::invalid_arg(
                "slope",
                format!("must be between 0 and 90 degrees, got {}", format_length(slope)),
            ));
        }
        let overhang = non_negative(
            args,
            "overhang",
            ctx.settings.get_float(id::default_roof_overhang),
        )?;

        let roof = Element::Roof(Roof {
            base: ElementBase::new(ctx.ids().next(ElementKind::Roof), level.id),
            boundary,
            roof_type,
            slope,
            overhang,
        });
        let (message, data) = created(&roof, &level);
        let mut delta = Delta::new();
        delta.add(roof);
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}
