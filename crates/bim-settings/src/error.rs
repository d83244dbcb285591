//! Error types for the settings system

use thiserror::Error;

/// Errors that can occur when working with settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingError {
    /// Setting not found
    #[error("unknown setting '{0}'")]
    NotFound(String),

    /// Type mismatch when getting or setting a value
    #[error("type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Invalid value for the setting
    #[error("invalid value for setting '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl SettingError {
    /// Create a not found error from a setting ID
    pub fn not_found_id(id: u16) -> Self {
        SettingError::NotFound(format!("id:{}", id))
    }

    /// Create a not found error from a setting name
    pub fn not_found_name(name: impl Into<String>) -> Self {
        SettingError::NotFound(name.into())
    }

    /// Create an invalid value error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SettingError::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
