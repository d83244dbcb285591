//! Editing commands: delete, move, select
//!
//! Edits keep relationship integrity by rewriting the neighbours of the
//! edited element in the same delta.

use bim_model::{Delta, Element, ElementId, ElementKind, Point2, RelationKind};
use serde_json::json;

use super::{element_json, required};
use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::{Command, CommandContext, CommandRegistry, Outcome};
use crate::error::{CmdError, CmdResult};

/// Register editing commands
pub fn register(registry: &mut CommandRegistry) {
    registry.register(DeleteCommand);
    registry.register(MoveCommand);
    registry.register(SelectCommand);
}

/// Remove the `kind` edge pointing at `from` from element `target`
fn detach(ctx: &CommandContext<'_>, delta: &mut Delta, target: ElementId, kind: RelationKind, from: ElementId) {
    if let Some(element) = ctx.model.get(target) {
        let mut after = element.clone();
        if after.relationships_mut().remove(kind, from) {
            delta.modify(element.clone(), after);
        }
    }
}

// ============================================================================
// delete command
// ============================================================================

struct DeleteCommand;

impl Command for DeleteCommand {
    fn name(&self) -> &str {
        "delete"
    }

    fn description(&self) -> &str {
        "Delete an element and the openings it hosts"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::positional("ref", ParamKind::Element)
            .required()
            .help("element to delete")];
        PARAMS
    }

    fn aliases(&self) -> &[&str] {
        &["rm"]
    }

    fn examples(&self) -> &[&str] {
        &["delete wall-3", "rm $selected"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let id = required(args.element("ref"), "ref", || self.usage())?;
        let target = ctx.element(id)?;

        let mut removed = vec![target];
        removed.extend(
            target
                .relationships()
                .targets(RelationKind::Hosts)
                .filter_map(|hosted| ctx.model.get(hosted)),
        );
        let removed_ids: Vec<ElementId> = removed.iter().map(|e| e.id()).collect();

        let mut delta = Delta::new();
        // Strip edges pointing into the removed set from everything else
        for element in ctx.model.elements() {
            if removed_ids.contains(&element.id()) {
                continue;
            }
            if !removed_ids.iter().any(|r| element.relationships().references(*r)) {
                continue;
            }
            let mut after = element.clone();
            for r in &removed_ids {
                after.relationships_mut().remove_target(*r);
            }
            delta.modify(element.clone(), after);
        }
        for element in removed.iter().rev() {
            delta.remove((*element).clone());
        }

        let mut message = format!("Deleted {}", id);
        if removed_ids.len() > 1 {
            let cascade: Vec<String> = removed_ids[1..].iter().map(|id| id.to_string()).collect();
            message.push_str(&format!(" (and hosted {})", cascade.join(", ")));
        }
        let data = json!({
            "deleted": removed_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        });
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}

// ============================================================================
// move command
// ============================================================================

struct MoveCommand;

impl Command for MoveCommand {
    fn name(&self) -> &str {
        "move"
    }

    fn description(&self) -> &str {
        "Translate an element in plan"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::positional("ref", ParamKind::Element)
                .required()
                .help("element to move"),
            ParamSpec::flag("by", ParamKind::Point)
                .required()
                .help("displacement dx,dy"),
        ];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["move wall-2 --by 0,1.5", "move $selected --by (-50cm, 0)"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        let id = required(args.element("ref"), "ref", || self.usage())?;
        let by = required(args.point("by"), "by", || self.usage())?;
        let element = ctx.element(id)?;

        if let Some(host) = element.relationships().host() {
            return Err(CmdError::handler(format!(
                "{} is hosted by {}; move the host instead",
                id, host
            )));
        }
        if by == Point2::ORIGIN {
            return Ok(Outcome::message(format!("{} not moved (zero displacement)", id)));
        }

        let mut delta = Delta::new();
        let mut moved = element.translated(by.x, by.y);
        match element.kind() {
            ElementKind::Wall => {
                // A moved wall leaves its joins and room boundaries behind
                for other in moved.relationships_mut().remove_kind(RelationKind::Joins) {
                    detach(ctx, &mut delta, other, RelationKind::Joins, id);
                }
                for room in moved.relationships_mut().remove_kind(RelationKind::Bounds) {
                    detach(ctx, &mut delta, room, RelationKind::BoundedBy, id);
                }
                for hosted in element.relationships().targets(RelationKind::Hosts) {
                    if let Some(opening) = ctx.model.get(hosted) {
                        let mut after = opening.translated(by.x, by.y);
                        after.relationships_mut().remove_kind(RelationKind::LeadsTo);
                        delta.modify(opening.clone(), after);
                    }
                }
            }
            ElementKind::Room => {
                for wall in moved.relationships_mut().remove_kind(RelationKind::BoundedBy) {
                    detach(ctx, &mut delta, wall, RelationKind::Bounds, id);
                }
                let doors: Vec<ElementId> = ctx
                    .model
                    .elements_of(ElementKind::Door)
                    .filter(|d| d.relationships().contains(RelationKind::LeadsTo, id))
                    .map(Element::id)
                    .collect();
                for door in doors {
                    detach(ctx, &mut delta, door, RelationKind::LeadsTo, id);
                }
            }
            _ => {}
        }

        let message = format!("Moved {} by {}", id, by);
        let data = element_json(&moved);
        delta.modify(element.clone(), moved);
        Ok(Outcome::apply(message, delta).with_data(data))
    }
}

// ============================================================================
// select command
// ============================================================================

struct SelectCommand;

impl Command for SelectCommand {
    fn name(&self) -> &str {
        "select"
    }

    fn description(&self) -> &str {
        "Select an element for $selected, or clear the selection"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::positional("ref", ParamKind::Element)
            .help("element to select {default: clear the selection}")];
        PARAMS
    }

    fn examples(&self) -> &[&str] {
        &["select wall-1", "select $last", "select"]
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ParsedCommand) -> CmdResult<Outcome> {
        match args.element("ref") {
            Some(id) => {
                let element = ctx.element(id)?;
                ctx.session.selection = Some(id);
                Ok(Outcome::message(format!("Selected {}: {}", id, element.summary()))
                    .with_data(element_json(element)))
            }
            None => {
                ctx.session.selection = None;
                Ok(Outcome::message("Selection cleared"))
            }
        }
    }
}
