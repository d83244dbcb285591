//! Level resolution
//!
//! Every element-creating command resolves its target level here before it
//! computes any change. There is no fallback level: a name that does not
//! match fails with the list of levels that do exist.

use bim_model::{Level, Model};

use crate::error::LevelError;

/// Resolve `explicit`, or the active level when no name is given
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn resolve_level(model: &Model, active: &str, explicit: Option<&str>) -> Result<Level, LevelError> {
    let requested = explicit.unwrap_or(active);
    model
        .level_by_name(requested)
        .cloned()
        .ok_or_else(|| LevelError {
            requested: requested.trim().to_string(),
            available: available_levels(model),
        })
}

/// Comma separated level names, or `(none)`
pub fn available_levels(model: &Model) -> String {
    let names = model.level_names();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_model::{Change, Delta, LevelId};

    fn model() -> Model {
        let mut model = Model::new();
        let mut delta = Delta::new();
        delta.push(Change::AddLevel(Level::new(LevelId(0), "Ground", 0.0, 3.0)));
        delta.push(Change::AddLevel(Level::new(LevelId(1), "First", 3.0, 3.0)));
        model.apply(&delta).unwrap();
        model
    }

    #[test]
    fn test_explicit_wins() {
        let level = resolve_level(&model(), "Ground", Some("FIRST")).unwrap();
        assert_eq!(level.name, "First");
    }

    #[test]
    fn test_falls_back_to_active() {
        let level = resolve_level(&model(), "ground", None).unwrap();
        assert_eq!(level.id, LevelId(0));
    }

    #[test]
    fn test_unknown_level_lists_available() {
        let err = resolve_level(&model(), "Ground", Some("Nonexistent")).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Nonexistent"));
        assert!(text.contains("Ground, First"));
    }

    #[test]
    fn test_no_levels_says_none() {
        let err = resolve_level(&Model::new(), "Level 1", None).unwrap_err();
        assert_eq!(err.available, "(none)");
        assert!(err.to_string().ends_with("available levels: (none)"));
    }
}
