//! Command implementations
//!
//! This module contains all built-in command implementations organized by category.

pub mod control;
pub mod edit;
pub mod levels;
pub mod openings;
pub mod query;
pub mod rooms;
pub mod slabs;
pub mod structure;
pub mod walls;

use std::str::FromStr;

use serde_json::{json, Value};

use bim_model::geometry::format_length;
use bim_model::{Element, Level, ModelError};

use crate::args::{ParamKind, ParamSpec, ParsedCommand};
use crate::command::CommandRegistry;
use crate::error::{CmdError, CmdResult};

/// Register all built-in commands with the registry
pub fn register_all(registry: &mut CommandRegistry) {
    // Walls first: they host openings and bound rooms
    walls::register(registry);

    // Doors and windows
    openings::register(registry);

    // Floors and roofs
    slabs::register(registry);

    rooms::register(registry);

    // Columns, beams, stairs
    structure::register(registry);

    // Level management
    levels::register(registry);

    // delete, move, select
    edit::register(registry);

    // Read-only queries
    query::register(registry);

    // help, undo, redo, set
    control::register(registry);
}

// ============================================================================
// Shared argument helpers
// ============================================================================

/// `--level` flag accepted by every element-creating command
pub(crate) const LEVEL_PARAM: ParamSpec =
    ParamSpec::flag("level", ParamKind::Level).help("target level {default: active level}");

/// Read a length argument that must be strictly positive
pub(crate) fn positive(args: &ParsedCommand, name: &str, default: f64) -> CmdResult<f64> {
    let value = args.number_or(name, default);
    if !value.is_finite() || value <= 0.0 {
        return Err(CmdError::invalid_arg(
            name,
            format!("must be positive, got {}", format_length(value)),
        ));
    }
    Ok(value)
}

/// Read a length argument that may be zero
pub(crate) fn non_negative(args: &ParsedCommand, name: &str, default: f64) -> CmdResult<f64> {
    let value = args.number_or(name, default);
    if !value.is_finite() || value < 0.0 {
        return Err(CmdError::invalid_arg(
            name,
            format!("must not be negative, got {}", format_length(value)),
        ));
    }
    Ok(value)
}

/// Read an enumerated type argument, falling back to `default`
pub(crate) fn choice<T>(args: &ParsedCommand, name: &str, default: T) -> CmdResult<T>
where
    T: FromStr<Err = ModelError>,
{
    match args.text(name) {
        Some(text) => text
            .parse()
            .map_err(|e: ModelError| CmdError::invalid_arg(name, e.to_string())),
        None => Ok(default),
    }
}

/// Look up a required argument that validation has already checked
pub(crate) fn required<T>(value: Option<T>, name: &str, usage: impl FnOnce() -> String) -> CmdResult<T> {
    value.ok_or_else(|| CmdError::missing(name, usage()))
}

/// Structured payload describing an element
pub(crate) fn element_json(element: &Element) -> Value {
    serde_json::to_value(element).unwrap_or(Value::Null)
}

/// Message and payload for a freshly created element
pub(crate) fn created(element: &Element, level: &Level) -> (String, Value) {
    let message = format!(
        "Created {} on {}: {}",
        element.id(),
        level.name,
        element.summary()
    );
    let data = json!({
        "id": element.id().to_string(),
        "level": level.name,
        "element": element_json(element),
    });
    (message, data)
}
