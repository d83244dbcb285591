//! Setting storage and retrieval

use crate::definitions::{get_setting, get_setting_id, SETTINGS, SETTING_COUNT};
use crate::error::SettingError;
use crate::setting::{Setting, SettingValue};

// =============================================================================
// Settings Store
// =============================================================================

/// Session settings store
///
/// Uses a Vec indexed by setting ID; `None` means the default applies.
#[derive(Debug, Clone)]
pub struct Settings {
    values: Vec<Option<SettingValue>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create a store with every setting at its default
    pub fn new() -> Self {
        Settings {
            values: vec![None; SETTING_COUNT],
        }
    }

    /// Get a setting value, returning the default if not explicitly set
    pub fn get(&self, id: u16) -> Option<SettingValue> {
        self.values
            .get(id as usize)
            .and_then(|v| v.clone())
            .or_else(|| get_setting(id).map(|s| s.default.to_value()))
    }

    /// Check if a setting is explicitly defined (not using default)
    pub fn is_defined(&self, id: u16) -> bool {
        self.values.get(id as usize).map_or(false, |v| v.is_some())
    }

    /// Set a setting value after type and range checks
    pub fn set(&mut self, id: u16, value: SettingValue) -> Result<(), SettingError> {
        let setting = get_setting(id).ok_or_else(|| SettingError::not_found_id(id))?;
        let value = setting.check(value)?;
        log::debug!("setting {} = {}", setting.name, value);
        self.values[id as usize] = Some(value);
        Ok(())
    }

    /// Set a setting from user text, parsing it according to the setting's type
    pub fn set_from_str(&mut self, name: &str, text: &str) -> Result<&'static Setting, SettingError> {
        let id = get_setting_id(name).ok_or_else(|| SettingError::not_found_name(name))?;
        let setting = get_setting(id).ok_or_else(|| SettingError::not_found_id(id))?;
        let value = SettingValue::parse_as(text, setting.setting_type).ok_or_else(|| {
            SettingError::invalid(
                setting.name,
                format!("'{}' is not a valid {}", text, setting.setting_type),
            )
        })?;
        self.set(id, value)?;
        Ok(setting)
    }

    /// Unset a setting (revert to default)
    pub fn unset(&mut self, id: u16) -> bool {
        match self.values.get_mut(id as usize) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    /// Reset all settings to defaults
    pub fn reset_all(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }

    /// Iterate over every setting with its current value and whether it is overridden
    pub fn iter(&self) -> impl Iterator<Item = (&'static Setting, SettingValue, bool)> + '_ {
        SETTINGS.iter().map(move |s| {
            let defined = self.is_defined(s.id);
            let value = self.get(s.id).unwrap_or_else(|| s.default.to_value());
            (s, value, defined)
        })
    }

    // =========================================================================
    // Type-Safe Getters
    // =========================================================================

    /// Get a boolean setting
    pub fn get_bool(&self, id: u16) -> bool {
        self.get(id).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// Get an integer setting
    pub fn get_int(&self, id: u16) -> i64 {
        self.get(id).and_then(|v| v.as_int()).unwrap_or(0)
    }

    /// Get a float setting (with automatic int-to-float coercion)
    pub fn get_float(&self, id: u16) -> f64 {
        self.get(id).and_then(|v| v.as_float()).unwrap_or(0.0)
    }

    /// Get a string setting
    pub fn get_string(&self, id: u16) -> String {
        self.get(id)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    // =========================================================================
    // Type-Safe Setters
    // =========================================================================

    /// Set a boolean setting
    pub fn set_bool(&mut self, id: u16, value: bool) -> Result<(), SettingError> {
        self.set(id, SettingValue::Bool(value))
    }

    /// Set an integer setting
    pub fn set_int(&mut self, id: u16, value: i64) -> Result<(), SettingError> {
        self.set(id, SettingValue::Int(value))
    }

    /// Set a float setting
    pub fn set_float(&mut self, id: u16, value: f64) -> Result<(), SettingError> {
        self.set(id, SettingValue::Float(value))
    }

    /// Set a string setting
    pub fn set_string(&mut self, id: u16, value: impl Into<String>) -> Result<(), SettingError> {
        self.set(id, SettingValue::String(value.into()))
    }
}
