//! Door and window placement
//!
//! Openings are hosted by a wall and placed by the offset of their centre
//! along the wall axis. They always live on the host's level.

use bim_model::geometry::format_length;
use bim_model::{
    Delta, Door, DoorType, Element, ElementBase, ElementId, ElementKind, Level, RelationKind,
    Wall, Window, WindowType,
};
use bim_settings::id;

use super::{choice, created, non_negative, positive, required};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::{CmdError, CmdResult};

/// Register door and window commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(DoorCommand);
    registry.register(WindowCommand);
}

/// Resolved host wall for a new opening
struct Placement<'a> {
    host: &'a Element,
    wall: &'a Wall,
    level: Level,
}

/// Look up the host wall and check that an opening of `width` centred at
/// `offset` fits on it without overlapping existing openings
fn place<'a>(
    ctx: &CommandContext<'a>,
    host_id: ElementId,
    offset: f64,
    width: f64,
    what: &str,
) -> CmdResult<Placement<'a>> {
    let host = ctx.element_of(host_id, ElementKind::Wall)?;
    let Element::Wall(wall) = host else {
        return Err(CmdError::WrongElementKind {
            id: host_id,
            expected: ElementKind::Wall.as_str(),
        });
    };

    let level_name = ctx.model.level(wall.base.level).map(|l| l.name.clone());
    let level = ctx.level(level_name.as_deref())?;

    let half = width / 2.0;
    let length = wall.length();
    if offset - half < -1e-9 || offset + half > length + 1e-9 {
        return Err(CmdError::handler(format!(
            "{} of width {} at offset {} does not fit in {} (length {})",
            what,
            format_length(width),
            format_length(offset),
            host_id,
            format_length(length)
        )));
    }

    for hosted in wall.base.relationships.targets(RelationKind::Hosts) {
        let (other_offset, other_width) = match ctx.model.get(hosted) {
            Some(Element::Door(d)) => (d.offset, d.width),
            Some(Element::Window(w)) => (w.offset, w.width),
            _ => continue,
        };
        if (offset - other_offset).abs() < half + other_width / 2.0 - 1e-9 {
            return Err(CmdError::handler(format!(
                "{} at offset {} overlaps {} in {}",
                what,
                format_length(offset),
                hosted,
                host_id
            )));
        }
    }

    Ok(Placement { host, wall, level })
}

/// Delta adding `opening` and the host's side of the hosting relationship
fn hosting_delta(placement: &Placement<'_>, opening: Element) -> Delta {
    let mut host_after = placement.host.clone();
    host_after
        .relationships_mut()
        .add(RelationKind::Hosts, opening.id());

    let mut delta = Delta::new();
    delta.add(opening);
    delta.modify(placement.host.clone(), host_after);
    delta
}

// ============================================================================
// door command
// ============================================================================

struct DoorCommand;

impl Command for DoorCommand {
    fn name(&self) -> &str {
        "door"
    }

    fn description(&self) -> &str {
        "Place a door in a wall"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("host", ParamKind::Element)
                .required()
                .help("wall that hosts the door"),
            ParamSpec::flag("offset", ParamKind::Length)
                .required()
                .help("distance from the wall start to the door centre"),
            ParamSpec::flag("width", ParamKind::Length).help("door width {default: default_door_width}"),
            ParamSpec::flag("height", ParamKind::Length).help("door height {default: default_door_height}"),
            ParamSpec::flag("type", ParamKind::Choice(DoorType::NAMES)).help("door type {default: single}"),
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &[
            "door wall-1 --offset 2.5",
            "door $last --offset 1 --width 1.8 --type double",
        ]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let host_id = required(args.element("host"), "host", || self.usage())?;
        let offset = required(args.number("offset"), "offset", || self.usage())?;
        let width = positive(args, "width", ctx.settings.get_float(id::default_door_width))?;
        let height = positive(args, "height", ctx.settings.get_float(id::default_door_height))?;
        let door_type = choice(args, "type", DoorType::default())?;

        let placement = place(ctx, host_id, offset, width, "door")?;
        if height > placement.wall.height {
            return Err(CmdError::handler(format!(
                "door height {} exceeds the height of {} ({})",
                format_length(height),
                host_id,
                format_length(placement.wall.height)
            )));
        }

        let door_id = ctx.ids().next(ElementKind::Door);
        let mut base = ElementBase::new(door_id, placement.level.id);
        base.relationships.add(RelationKind::HostedBy, host_id);
        // Doors give access to the rooms their wall bounds
        for room in placement.wall.base.relationships.targets(RelationKind::Bounds) {
            base.relationships.add(RelationKind::LeadsTo, room);
        }

        let door = Element::Door(Door {
            base,
            offset,
            position: placement.wall.point_at(offset),
            width,
            height,
            door_type,
        });
        let (message, data) = created(&door, &placement.level);
        let delta = hosting_delta(&placement, door);
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}

// ============================================================================
// window command
// ============================================================================

struct WindowCommand;

impl Command for WindowCommand {
    fn name(&self) -> &str {
        "window"
    }

    fn description(&self) -> &str {
        "Place a window in a wall"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("host", ParamKind::Element)
                .required()
                .help("wall that hosts the window"),
            ParamSpec::flag("offset", ParamKind::Length)
                .required()
                .help("distance from the wall start to the window centre"),
            ParamSpec::flag("width", ParamKind::Length).help("window width {default: default_window_width}"),
            ParamSpec::flag("height", ParamKind::Length).help("window height {default: default_window_height}"),
            ParamSpec::flag("sill", ParamKind::Length).help("sill height {default: default_sill_height}"),
            ParamSpec::flag("type", ParamKind::Choice(WindowType::NAMES)).help("window type {default: casement}"),
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &[
            "window wall-2 --offset 1.5",
            "window wall-2 --offset 3 --width 2 --sill 0.6 --type sliding",
        ]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let host_id = required(args.element("host"), "host", || self.usage())?;
        let offset = required(args.number("offset"), "offset", || self.usage())?;
        let width = positive(args, "width", ctx.settings.get_float(id::default_window_width))?;
        let height = positive(args, "height", ctx.settings.get_float(id::default_window_height))?;
        let sill = non_negative(args, "sill", ctx.settings.get_float(id::default_sill_height))?;
        let window_type = choice(args, "type", WindowType::default())?;

        let placement = place(ctx, host_id, offset, width, "window")?;
        if sill + height > placement.wall.height + 1e-9 {
            return Err(CmdError::handler(format!(
                "window head at {} is above the top of {} ({})",
                format_length(sill + height),
                host_id,
                format_length(placement.wall.height)
            )));
        }

        let window_id = ctx.ids().next(ElementKind::Window);
        let mut base = ElementBase::new(window_id, placement.level.id);
        base.relationships.add(RelationKind::HostedBy, host_id);

        let window = Element::Window(Window {
            base,
            offset,
            position: placement.wall.point_at(offset),
            width,
            height,
            sill,
            window_type,
        });
        let (message, data) = created(&window, &placement.level);
        let delta = hosting_delta(&placement, window);
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}
