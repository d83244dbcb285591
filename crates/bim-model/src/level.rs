//! Building levels (storeys)

use serde::{Deserialize, Serialize};

use crate::index::LevelId;

/// A named horizontal storey referenced by elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    /// Height of the finished floor above datum
    pub elevation: f64,
    /// Floor-to-floor height
    pub height: f64,
}

impl Level {
    pub fn new(id: LevelId, name: impl Into<String>, elevation: f64, height: f64) -> Self {
        Level {
            id,
            name: name.into(),
            elevation,
            height,
        }
    }

    /// Case-insensitive name comparison
    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_named() {
        let level = Level::new(LevelId(0), "Ground Floor", 0.0, 3.0);
        assert!(level.is_named("ground floor"));
        assert!(level.is_named("  GROUND FLOOR "));
        assert!(!level.is_named("ground"));
    }
}
