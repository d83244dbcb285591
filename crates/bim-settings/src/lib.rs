//! BIM command engine settings
//!
//! Typed, range-checked settings consulted by command handlers for default
//! dimensions, units, tolerances and session limits.
//!
//! # Setting Types
//!
//! - `Bool` - Boolean values
//! - `Int` - Integer values
//! - `Float` - Lengths in metres and angles in degrees
//! - `String` - String values, optionally restricted to a list of choices
//!
//! # Example
//!
//! ```rust
//! use bim_settings::{id, Settings};
//!
//! let mut settings = Settings::new();
//! settings.set_float(id::default_wall_height, 2.8).unwrap();
//! assert_eq!(settings.get_float(id::default_wall_height), 2.8);
//! ```

mod definitions;
mod error;
mod setting;
mod store;

pub use definitions::{
    get_setting, get_setting_id, setting_names, LENGTH_UNITS, SETTINGS,
    SETTING_COUNT, WALL_TYPES,
};
pub use error::SettingError;
pub use setting::{Setting, SettingDefault, SettingGroup, SettingType, SettingValue};
pub use store::Settings;

/// Setting ID constants
pub mod id {
    pub use crate::definitions::id::*;
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::definitions::id;
    pub use crate::{Setting, SettingError, SettingType, SettingValue, Settings};
}
