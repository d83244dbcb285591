//! Error types for model operations

use thiserror::Error;

use crate::index::ElementId;
use crate::relationship::RelationKind;

/// Errors that can occur when mutating or querying the model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// An element with this id already exists
    #[error("element {0} already exists")]
    DuplicateElement(ElementId),

    /// No element with this id
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// The recorded snapshot does not match the element's current value
    #[error("element {0} changed since the operation was recorded")]
    StaleSnapshot(ElementId),

    /// A level with this name or id already exists
    #[error("level '{0}' already exists")]
    DuplicateLevel(String),

    /// No level with this name or id
    #[error("level '{0}' not found")]
    LevelNotFound(String),

    /// The recorded level snapshot does not match the current level
    #[error("level '{0}' changed since the operation was recorded")]
    StaleLevel(String),

    /// A level cannot be removed while elements reference it
    #[error("level '{level}' is still used by {element}")]
    LevelInUse { level: String, element: ElementId },

    /// Relationship target does not exist
    #[error("{from} {kind} {to}, but {to} does not exist")]
    DanglingRelationship {
        from: ElementId,
        kind: RelationKind,
        to: ElementId,
    },

    /// Paired relationship is missing its counterpart
    #[error("{from} {kind} {to}, but {to} has no matching back reference")]
    AsymmetricRelationship {
        from: ElementId,
        kind: RelationKind,
        to: ElementId,
    },

    /// Element relates to itself
    #[error("element {0} cannot relate to itself")]
    SelfRelationship(ElementId),

    /// Text is not a valid element id
    #[error("invalid element id '{0}' (expected e.g. wall-1)")]
    InvalidId(String),

    /// Text is not a member of an enumeration
    #[error("unknown {what} '{value}' (expected one of {expected})")]
    UnknownVariant {
        what: &'static str,
        value: String,
        expected: String,
    },
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ElementKind;

    #[test]
    fn test_error_display() {
        let id = ElementId::new(ElementKind::Wall, 3);
        assert_eq!(
            ModelError::ElementNotFound(id).to_string(),
            "element wall-3 not found"
        );

        let err = ModelError::DanglingRelationship {
            from: ElementId::new(ElementKind::Door, 1),
            kind: RelationKind::HostedBy,
            to: id,
        };
        assert_eq!(
            err.to_string(),
            "door-1 hosted-by wall-3, but wall-3 does not exist"
        );
    }
}
