//! Room creation
//!
//! A room records the walls lying along its boundary (`bounded-by`), and the
//! doors in those walls gain a `leads-to` edge to the new room.

use bim_model::geometry::segment_on_ring;
use bim_model::{Delta, Element, ElementBase, ElementKind, RelationKind, Room, RoomType};
use bim_settings::id;

use super::slabs::check_boundary;
use super::{choice, created, required, LEVEL_PARAM};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::CmdResult;

/// Register room commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(RoomCommand);
}

// ============================================================================
// room command
// ============================================================================

struct RoomCommand;

impl Command for RoomCommand {
    fn name(&self) -> &str {
        "room"
    }

    fn description(&self) -> &str {
        "Define a room by its boundary polygon"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("boundary", ParamKind::Points)
                .required()
                .help("room outline, at least 3 points"),
            ParamSpec::flag("name", ParamKind::Text).help("display name {default: Room <n>}"),
            ParamSpec::flag("number", ParamKind::Text).help("room number"),
            ParamSpec::flag("type", ParamKind::Choice(RoomType::NAMES)).help("room use {default: other}"),
            LEVEL_PARAM,
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &[
            "room 0,0 5,0 5,4 0,4",
            "room 0,0 5,0 5,4 0,4 --name \"Master Bedroom\" --number 101 --type bedroom",
        ]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let level = ctx.level(args.text("level"))?;
        let boundary = required(args.points("boundary"), "boundary", || self.usage())?;
        check_boundary(&boundary, "room")?;
        let room_type = choice(args, "type", RoomType::default())?;

        let room_id = ctx.ids().next(ElementKind::Room);
        let name = match args.text("name") {
            Some(name) => name.to_string(),
            None => format!("Room {}", room_id.number()),
        };
        let tolerance = ctx.settings.get_float(id::snap_tolerance);

        let mut base = ElementBase::new(room_id, level.id);
        let mut neighbours = Vec::new();
        for element in ctx.model.elements_of(ElementKind::Wall) {
            let Element::Wall(w) = element else { continue };
            if w.base.level != level.id || !segment_on_ring(w.start, w.end, &boundary, tolerance) {
                continue;
            }
            base.relationships.add(RelationKind::BoundedBy, w.base.id);
            let mut after = element.clone();
            after.relationships_mut().add(RelationKind::Bounds, room_id);
            neighbours.push((element.clone(), after));

            for hosted in w.base.relationships.targets(RelationKind::Hosts) {
                let Some(door @ Element::Door(_)) = ctx.model.get(hosted) else {
                    continue;
                };
                let mut after = door.clone();
                after.relationships_mut().add(RelationKind::LeadsTo, room_id);
                neighbours.push((door.clone(), after));
            }
        }

        let room = Element::Room(Room {
            base,
            boundary,
            name,
            number: args.text("number").map(str::to_string),
            room_type,
        });
        let (mut message, data) = created(&room, &level);
        let walls = room
            .relationships()
            .targets(RelationKind::BoundedBy)
            .map(|id| id.to_string())
            .collect::<Vec<_>>();
        if !walls.is_empty() {
            message.push_str(&format!(" (bounded by {})", walls.join(", ")));
        }

        let mut delta = Delta::new();
        delta.add(room);
        for (before, after) in neighbours {
            delta.modify(before, after);
        }
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use crate::executor::CommandExecutor;
    use bim_model::{Element, ElementId, ElementKind, RelationKind, RoomType};
    use bim_settings::Settings;

    fn room(n: u32) -> ElementId {
        ElementId::new(ElementKind::Room, n)
    }

    #[test]
    fn test_room_defaults() {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        let result = exec.execute("room 0,0 4,0 4,3 0,3");
        assert!(result.success, "{}", result.message);
        let Some(Element::Room(r)) = exec.model().get(room(1)) else {
            panic!("room missing");
        };
        assert_eq!(r.name, "Room 1");
        assert_eq!(r.room_type, RoomType::Other);
        assert_eq!(r.number, None);
    }

    #[test]
    fn test_room_named_with_quotes() {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        assert!(exec
            .execute("room 0,0 4,0 4,3 0,3 --name \"Master Bedroom\" --number 101 --type bedroom")
            .success);
        let Some(Element::Room(r)) = exec.model().get(room(1)) else {
            panic!("room missing");
        };
        assert_eq!(r.name, "Master Bedroom");
        assert_eq!(r.number.as_deref(), Some("101"));
        assert_eq!(r.room_type, RoomType::Bedroom);
    }

    #[test]
    fn test_room_bounded_by_existing_walls() {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        exec.execute("wall 0,0 4,0");
        exec.execute("wall 4,0 4,3");
        exec.execute("wall 10,0 12,0");
        exec.execute("door wall-1 --offset 2");

        let result = exec.execute("room 0,0 4,0 4,3 0,3");
        assert!(result.message.contains("bounded by wall-1, wall-2"), "{}", result.message);

        let door = exec.model().get(ElementId::new(ElementKind::Door, 1)).unwrap();
        assert!(door.relationships().contains(RelationKind::LeadsTo, room(1)));
        let far = exec.model().get(ElementId::new(ElementKind::Wall, 3)).unwrap();
        assert!(!far.relationships().contains(RelationKind::Bounds, room(1)));

        exec.execute("undo");
        let door = exec.model().get(ElementId::new(ElementKind::Door, 1)).unwrap();
        assert!(!door.relationships().contains(RelationKind::LeadsTo, room(1)));
    }

    #[test]
    fn test_room_needs_area() {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        assert!(!exec.execute("room 0,0 4,0").success);
        assert!(!exec.execute("room 0,0 4,0 8,0").success);
        assert!(exec.model().is_empty());
    }
}
