//! Setting definitions
//!
//! Setting indices are stable; `id` constants index directly into `SETTINGS`.

use crate::setting::{Setting, SettingDefault, SettingGroup, SettingType};

/// Total number of settings
pub const SETTING_COUNT: usize = 24;

/// Units accepted by `length_unit`
pub const LENGTH_UNITS: &[&str] = &["m", "cm", "mm", "km", "ft", "in"];

/// Wall types accepted by `default_wall_type`
pub const WALL_TYPES: &[&str] = &["basic", "structural", "curtain", "retaining"];

// =============================================================================
// Setting ID Constants
// =============================================================================

#[allow(non_upper_case_globals)]
pub mod id {
    // Walls
    pub const default_wall_height: u16 = 0;
    pub const default_wall_thickness: u16 = 1;
    pub const default_wall_type: u16 = 2;

    // Openings
    pub const default_door_width: u16 = 3;
    pub const default_door_height: u16 = 4;
    pub const default_window_width: u16 = 5;
    pub const default_window_height: u16 = 6;
    pub const default_sill_height: u16 = 7;

    // Slabs
    pub const default_floor_thickness: u16 = 8;
    pub const default_roof_slope: u16 = 9;
    pub const default_roof_overhang: u16 = 10;

    // Structure
    pub const default_column_size: u16 = 11;
    pub const default_beam_width: u16 = 12;
    pub const default_beam_depth: u16 = 13;
    pub const default_stair_width: u16 = 14;
    pub const default_riser_height: u16 = 15;

    // Levels
    pub const initial_level: u16 = 16;
    pub const default_level_height: u16 = 17;

    // Units
    pub const length_unit: u16 = 18;
    pub const snap_tolerance: u16 = 19;

    // Session
    pub const undo_limit: u16 = 20;
    pub const history_limit: u16 = 21;
    pub const double_tab_ms: u16 = 22;
    pub const echo_commands: u16 = 23;
}

/// Get a setting definition by ID
pub fn get_setting(id: u16) -> Option<&'static Setting> {
    SETTINGS.get(id as usize)
}

/// Get a setting ID by name (case-insensitive)
pub fn get_setting_id(name: &str) -> Option<u16> {
    SETTINGS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .map(|s| s.id)
}

/// Names of all settings in table order, for completion
pub fn setting_names() -> Vec<&'static str> {
    SETTINGS.iter().map(|s| s.name).collect()
}

// Helper macros for defining settings
macro_rules! s_bool {
    ($id:expr, $name:expr, $group:expr, $default:expr, $help:expr) => {
        Setting { id: $id, name: $name, setting_type: SettingType::Bool, group: $group, default: SettingDefault::Bool($default), min: None, max: None, choices: None, help: $help }
    };
}

macro_rules! s_int {
    ($id:expr, $name:expr, $group:expr, $default:expr, $min:expr, $max:expr, $help:expr) => {
        Setting { id: $id, name: $name, setting_type: SettingType::Int, group: $group, default: SettingDefault::Int($default), min: Some($min as f64), max: Some($max as f64), choices: None, help: $help }
    };
}

macro_rules! s_float {
    ($id:expr, $name:expr, $group:expr, $default:expr, $min:expr, $max:expr, $help:expr) => {
        Setting { id: $id, name: $name, setting_type: SettingType::Float, group: $group, default: SettingDefault::Float($default), min: Some($min), max: Some($max), choices: None, help: $help }
    };
}

macro_rules! s_string {
    ($id:expr, $name:expr, $group:expr, $default:expr, $help:expr) => {
        Setting { id: $id, name: $name, setting_type: SettingType::String, group: $group, default: SettingDefault::Str($default), min: None, max: None, choices: None, help: $help }
    };
    ($id:expr, $name:expr, $group:expr, $default:expr, $choices:expr, $help:expr) => {
        Setting { id: $id, name: $name, setting_type: SettingType::String, group: $group, default: SettingDefault::Str($default), min: None, max: None, choices: Some($choices), help: $help }
    };
}

use SettingGroup::*;

/// All setting definitions
pub static SETTINGS: &[Setting] = &[
    s_float!(0, "default_wall_height", Walls, 3.0, 0.1, 100.0, "wall height when --height is omitted"),
    s_float!(1, "default_wall_thickness", Walls, 0.2, 0.01, 5.0, "wall thickness when --thickness is omitted"),
    s_string!(2, "default_wall_type", Walls, "basic", WALL_TYPES, "wall type when --type is omitted"),
    s_float!(3, "default_door_width", Openings, 0.9, 0.3, 10.0, "door width when --width is omitted"),
    s_float!(4, "default_door_height", Openings, 2.1, 0.5, 10.0, "door height when --height is omitted"),
    s_float!(5, "default_window_width", Openings, 1.2, 0.1, 20.0, "window width when --width is omitted"),
    s_float!(6, "default_window_height", Openings, 1.2, 0.1, 20.0, "window height when --height is omitted"),
    s_float!(7, "default_sill_height", Openings, 0.9, 0.0, 20.0, "window sill height when --sill is omitted"),
    s_float!(8, "default_floor_thickness", Slabs, 0.3, 0.01, 5.0, "floor slab thickness"),
    s_float!(9, "default_roof_slope", Slabs, 30.0, 0.0, 89.0, "roof pitch in degrees"),
    s_float!(10, "default_roof_overhang", Slabs, 0.5, 0.0, 5.0, "roof overhang beyond the boundary"),
    s_float!(11, "default_column_size", Structure, 0.4, 0.05, 5.0, "column width and depth"),
    s_float!(12, "default_beam_width", Structure, 0.3, 0.05, 5.0, "beam section width"),
    s_float!(13, "default_beam_depth", Structure, 0.5, 0.05, 5.0, "beam section depth"),
    s_float!(14, "default_stair_width", Structure, 1.2, 0.5, 10.0, "stair flight width"),
    s_float!(15, "default_riser_height", Structure, 0.18, 0.1, 0.25, "target riser height for stairs"),
    s_string!(16, "initial_level", Levels, "Level 1", "name of the level created at startup"),
    s_float!(17, "default_level_height", Levels, 3.0, 0.5, 100.0, "floor-to-floor height of new levels"),
    s_string!(18, "length_unit", Units, "m", LENGTH_UNITS, "unit assumed for numbers without a suffix"),
    s_float!(19, "snap_tolerance", Units, 0.01, 0.0, 1.0, "distance under which endpoints are joined"),
    s_int!(20, "undo_limit", Session, 100, 1, 10_000, "maximum number of undoable operations"),
    s_int!(21, "history_limit", Session, 1000, 1, 100_000, "maximum number of remembered input lines"),
    s_int!(22, "double_tab_ms", Session, 400, 50, 5000, "window for a second Tab to list all matches"),
    s_bool!(23, "echo_commands", Session, false, "log every executed line"),
];
