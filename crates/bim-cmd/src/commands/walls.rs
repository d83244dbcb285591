//! Wall creation
//!
//! A new wall joins every wall on the same level whose endpoint lies within
//! `snap_tolerance` of one of its own endpoints, and bounds every room whose
//! boundary runs along it.

use bim_model::geometry::{format_length, segment_on_ring};
use bim_model::{Delta, Element, ElementBase, ElementKind, RelationKind, Wall, WallType};
use bim_settings::id;

use super::{choice, created, positive, required, LEVEL_PARAM};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::{CmdError, CmdResult};

/// Register wall commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(WallCommand);
}

// ============================================================================
// wall command
// ============================================================================

struct WallCommand;

impl Command for WallCommand {
    fn name(&self) -> &str {
        "wall"
    }

    fn description(&self) -> &str {
        "Create a straight wall between two points"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("start", ParamKind::Point)
                .required()
                .help("start point of the wall axis"),
            ParamSpec::positional("end", ParamKind::Point)
                .required()
                .help("end point of the wall axis"),
            ParamSpec::flag("height", ParamKind::Length).help("wall height {default: default_wall_height}"),
            ParamSpec::flag("thickness", ParamKind::Length)
                .help("wall thickness {default: default_wall_thickness}"),
            ParamSpec::flag("type", ParamKind::Choice(WallType::NAMES)).help("wall type {default: default_wall_type}"),
            LEVEL_PARAM,
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &[
            "wall 0,0 5,0",
            "wall (0, 0) (0, 4m) --height 2.7 --type structural",
            "wall --start 0,0 --end 500cm,0 --level \"Level 2\"",
        ]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let level = ctx.level(args.text("level"))?;
        let start = required(args.point("start"), "start", || self.usage())?;
        let end = required(args.point("end"), "end", || self.usage())?;

        let tolerance = ctx.settings.get_float(id::snap_tolerance);
        if start.distance(end) <= tolerance.max(f64::EPSILON) {
            return Err(CmdError::handler(format!(
                "wall from {} to {} has zero length",
                start, end
            )));
        }
        let height = positive(args, "height", ctx.settings.get_float(id::default_wall_height))?;
        let thickness = positive(
            args,
            "thickness",
            ctx.settings.get_float(id::default_wall_thickness),
        )?;
        let default_type: WallType = ctx
            .settings
            .get_string(id::default_wall_type)
            .parse()
            .unwrap_or_default();
        let wall_type = choice(args, "type", default_type)?;

        let wall_id = ctx.ids().next(ElementKind::Wall);
        let mut wall = Wall {
            base: ElementBase::new(wall_id, level.id),
            start,
            end,
            height,
            thickness,
            wall_type,
        };

        let mut neighbours = Vec::new();
        let mut joined = Vec::new();

        // Walls sharing an endpoint
        for other in ctx.model.elements_of(ElementKind::Wall) {
            let Element::Wall(w) = other else { continue };
            if w.base.level != level.id {
                continue;
            }
            let touches = [w.start, w.end]
                .iter()
                .any(|p| p.distance(start) <= tolerance || p.distance(end) <= tolerance);
            if touches {
                wall.base.relationships.add(RelationKind::Joins, w.base.id);
                let mut after = other.clone();
                after.relationships_mut().add(RelationKind::Joins, wall_id);
                neighbours.push((other.clone(), after));
                joined.push(w.base.id.to_string());
            }
        }

        // Rooms whose boundary runs along the new wall
        for room in ctx.model.elements_of(ElementKind::Room) {
            let Element::Room(r) = room else { continue };
            if r.base.level != level.id || !segment_on_ring(start, end, &r.boundary, tolerance) {
                continue;
            }
            wall.base.relationships.add(RelationKind::Bounds, r.base.id);
            let mut after = room.clone();
            after.relationships_mut().add(RelationKind::BoundedBy, wall_id);
            neighbours.push((room.clone(), after));
        }

        log::debug!(
            "{}: length {}, {} neighbour(s) updated",
            wall_id,
            format_length(start.distance(end)),
            neighbours.len()
        );

        let element = Element::Wall(wall);
        let (mut message, data) = created(&element, &level);
        if !joined.is_empty() {
            message.push_str(&format!(" (joins {})", joined.join(", ")));
        }

        let mut delta = Delta::new();
        delta.add(element);
        for (before, after) in neighbours {
            delta.modify(before, after);
        }
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use crate::executor::CommandExecutor;
    use bim_model::{ElementId, ElementKind, RelationKind};
    use bim_settings::Settings;

    fn executor() -> CommandExecutor {
        CommandExecutor::new(Settings::new()).unwrap()
    }

    fn wall(n: u32) -> ElementId {
        ElementId::new(ElementKind::Wall, n)
    }

    #[test]
    fn test_wall_defaults_from_settings() {
        let mut exec = executor();
        let result = exec.execute("wall 0,0 5,0");
        assert!(result.success, "{}", result.message);
        assert!(result.message.starts_with("Created wall-1 on Level 1"));

        let bim_model::Element::Wall(w) = exec.model().get(wall(1)).unwrap() else {
            panic!("not a wall");
        };
        assert_eq!(w.height, 3.0);
        assert_eq!(w.thickness, 0.2);
        assert_eq!(w.wall_type, bim_model::WallType::Basic);
    }

    #[test]
    fn test_units_are_normalized() {
        let mut exec = executor();
        assert!(exec.execute("wall 0,0 500cm,0 --height 2700mm").success);
        let bim_model::Element::Wall(w) = exec.model().get(wall(1)).unwrap() else {
            panic!("not a wall");
        };
        assert!((w.end.x - 5.0).abs() < 1e-9);
        assert!((w.height - 2.7).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_rejected() {
        let mut exec = executor();
        let result = exec.execute("wall 1,1 1,1");
        assert!(!result.success);
        assert!(result.message.contains("zero length"));
        assert!(exec.model().is_empty());
        assert_eq!(exec.undo_depth(), 0);
    }

    #[test]
    fn test_non_positive_height_rejected() {
        let mut exec = executor();
        let result = exec.execute("wall 0,0 5,0 --height 0");
        assert!(!result.success);
        assert!(result.message.contains("height"));
    }

    #[test]
    fn test_walls_join_at_shared_endpoint() {
        let mut exec = executor();
        exec.execute("wall 0,0 5,0");
        let result = exec.execute("wall 5,0 5,4");
        assert!(result.message.contains("joins wall-1"), "{}", result.message);

        let first = exec.model().get(wall(1)).unwrap();
        let second = exec.model().get(wall(2)).unwrap();
        assert!(first.relationships().contains(RelationKind::Joins, wall(2)));
        assert!(second.relationships().contains(RelationKind::Joins, wall(1)));

        exec.execute("undo");
        assert!(exec.model().get(wall(1)).unwrap().relationships().is_empty());
    }

    #[test]
    fn test_wall_on_room_edge_bounds_room() {
        let mut exec = executor();
        exec.execute("room 0,0 4,0 4,3 0,3");
        exec.execute("wall 0,0 4,0");
        let room = ElementId::new(ElementKind::Room, 1);
        assert!(exec
            .model()
            .get(room)
            .unwrap()
            .relationships()
            .contains(RelationKind::BoundedBy, wall(1)));
    }
}
