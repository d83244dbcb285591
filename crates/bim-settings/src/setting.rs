//! Setting definitions and value types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SettingError;

/// Type of a setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SettingType {
    /// Boolean value
    Bool = 0,
    /// Integer value
    Int = 1,
    /// Floating point value (lengths are in metres, angles in degrees)
    Float = 2,
    /// String value
    String = 3,
}

impl SettingType {
    /// Get the display name for this type
    pub fn name(&self) -> &'static str {
        match self {
            SettingType::Bool => "bool",
            SettingType::Int => "int",
            SettingType::Float => "float",
            SettingType::String => "string",
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Group a setting belongs to, used when listing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingGroup {
    /// Wall creation defaults
    Walls,
    /// Door and window defaults
    Openings,
    /// Floor and roof defaults
    Slabs,
    /// Columns, beams and stairs
    Structure,
    /// Level defaults
    Levels,
    /// Units and tolerances
    Units,
    /// Interactive session behaviour
    Session,
}

impl SettingGroup {
    /// Get the display name for this group
    pub fn name(&self) -> &'static str {
        match self {
            SettingGroup::Walls => "walls",
            SettingGroup::Openings => "openings",
            SettingGroup::Slabs => "slabs",
            SettingGroup::Structure => "structure",
            SettingGroup::Levels => "levels",
            SettingGroup::Units => "units",
            SettingGroup::Session => "session",
        }
    }
}

impl fmt::Display for SettingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl SettingValue {
    /// Get the type of this value
    pub fn setting_type(&self) -> SettingType {
        match self {
            SettingValue::Bool(_) => SettingType::Bool,
            SettingValue::Int(_) => SettingType::Int,
            SettingValue::Float(_) => SettingType::Float,
            SettingValue::String(_) => SettingType::String,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(v) => Some(*v),
            SettingValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Try to get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(v) => Some(*v),
            SettingValue::Bool(v) => Some(i64::from(*v)),
            SettingValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Try to get as float (integers coerce)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(v) => Some(*v),
            SettingValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this value can be stored in a setting of the target type
    pub fn is_compatible_with(&self, target: SettingType) -> bool {
        match (self, target) {
            (SettingValue::Bool(_), SettingType::Bool) => true,
            (SettingValue::Int(_), SettingType::Int) => true,
            (SettingValue::Float(_), SettingType::Float) => true,
            (SettingValue::String(_), SettingType::String) => true,
            (SettingValue::Int(_), SettingType::Bool) => true,
            (SettingValue::Int(_), SettingType::Float) => true,
            (SettingValue::Float(v), SettingType::Int) => v.fract() == 0.0,
            _ => false,
        }
    }

    /// Convert into the canonical representation for `target`
    pub fn coerce(self, target: SettingType) -> Option<SettingValue> {
        if !self.is_compatible_with(target) {
            return None;
        }
        Some(match target {
            SettingType::Bool => SettingValue::Bool(self.as_bool()?),
            SettingType::Int => SettingValue::Int(self.as_int()?),
            SettingType::Float => SettingValue::Float(self.as_float()?),
            SettingType::String => self,
        })
    }

    /// Parse user text as a value of the given type
    pub fn parse_as(text: &str, target: SettingType) -> Option<SettingValue> {
        let text = text.trim();
        match target {
            SettingType::Bool => match text.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" | "1" => Some(SettingValue::Bool(true)),
                "off" | "false" | "no" | "0" => Some(SettingValue::Bool(false)),
                _ => None,
            },
            SettingType::Int => text.parse().ok().map(SettingValue::Int),
            SettingType::Float => text.parse().ok().map(SettingValue::Float),
            SettingType::String => Some(SettingValue::String(text.to_string())),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{}", if *v { "on" } else { "off" }),
            SettingValue::Int(v) => write!(f, "{}", v),
            SettingValue::Float(v) => write!(f, "{}", v),
            SettingValue::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Float(v)
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::String(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::String(v.to_string())
    }
}

/// Compile-time default of a setting
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingDefault {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
}

impl SettingDefault {
    /// Materialize the default as a runtime value
    pub fn to_value(&self) -> SettingValue {
        match *self {
            SettingDefault::Bool(v) => SettingValue::Bool(v),
            SettingDefault::Int(v) => SettingValue::Int(v),
            SettingDefault::Float(v) => SettingValue::Float(v),
            SettingDefault::Str(v) => SettingValue::String(v.to_string()),
        }
    }
}

/// Definition of a single setting
#[derive(Debug, Clone)]
pub struct Setting {
    /// Stable index into the settings table
    pub id: u16,
    /// Name used by `set` and completion
    pub name: &'static str,
    pub setting_type: SettingType,
    pub group: SettingGroup,
    pub default: SettingDefault,
    /// Inclusive lower bound for numeric settings
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric settings
    pub max: Option<f64>,
    /// Allowed values for string settings
    pub choices: Option<&'static [&'static str]>,
    /// One-line description shown by `set`
    pub help: &'static str,
}

impl Setting {
    /// Type- and range-check a candidate value, returning its canonical form
    pub fn check(&self, value: SettingValue) -> Result<SettingValue, SettingError> {
        let actual = value.setting_type().name();
        let value = value
            .coerce(self.setting_type)
            .ok_or_else(|| SettingError::TypeMismatch {
                name: self.name.to_string(),
                expected: self.setting_type.name(),
                actual,
            })?;

        if let Some(v) = value.as_float().filter(|_| self.setting_type != SettingType::Bool) {
            let min = self.min.unwrap_or(f64::NEG_INFINITY);
            let max = self.max.unwrap_or(f64::INFINITY);
            if !v.is_finite() || v < min || v > max {
                return Err(SettingError::invalid(
                    self.name,
                    format!("value {} is outside range [{}, {}]", v, min, max),
                ));
            }
        }

        if let (Some(choices), Some(s)) = (self.choices, value.as_str()) {
            if !choices.iter().any(|c| c.eq_ignore_ascii_case(s)) {
                return Err(SettingError::invalid(
                    self.name,
                    format!("expected one of {}", choices.join("|")),
                ));
            }
            return Ok(SettingValue::String(s.to_ascii_lowercase()));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_as() {
        assert_eq!(
            SettingValue::parse_as("on", SettingType::Bool),
            Some(SettingValue::Bool(true))
        );
        assert_eq!(
            SettingValue::parse_as("12", SettingType::Int),
            Some(SettingValue::Int(12))
        );
        assert_eq!(
            SettingValue::parse_as("0.25", SettingType::Float),
            Some(SettingValue::Float(0.25))
        );
        assert_eq!(SettingValue::parse_as("abc", SettingType::Float), None);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(
            SettingValue::Int(3).coerce(SettingType::Float),
            Some(SettingValue::Float(3.0))
        );
        assert_eq!(SettingValue::Float(2.5).coerce(SettingType::Int), None);
        assert_eq!(SettingValue::Bool(true).coerce(SettingType::String), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SettingValue::Bool(false).to_string(), "off");
        assert_eq!(SettingValue::Float(0.2).to_string(), "0.2");
    }
}
