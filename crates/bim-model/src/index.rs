//! Type-safe identifiers
//!
//! Element ids carry their kind so that `wall-3` and `door-3` never collide,
//! and level ids are plain newtype indices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Discriminant of an [`Element`](crate::Element)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Wall,
    Door,
    Window,
    Room,
    Floor,
    Roof,
    Column,
    Beam,
    Stair,
}

impl ElementKind {
    /// Every kind, in id ordering
    pub const ALL: [ElementKind; 9] = [
        ElementKind::Wall,
        ElementKind::Door,
        ElementKind::Window,
        ElementKind::Room,
        ElementKind::Floor,
        ElementKind::Roof,
        ElementKind::Column,
        ElementKind::Beam,
        ElementKind::Stair,
    ];

    /// Lowercase name, also the id prefix
    pub const fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Wall => "wall",
            ElementKind::Door => "door",
            ElementKind::Window => "window",
            ElementKind::Room => "room",
            ElementKind::Floor => "floor",
            ElementKind::Roof => "roof",
            ElementKind::Column => "column",
            ElementKind::Beam => "beam",
            ElementKind::Stair => "stair",
        }
    }

    /// Plural name used for list categories
    pub const fn plural(&self) -> &'static str {
        match self {
            ElementKind::Wall => "walls",
            ElementKind::Door => "doors",
            ElementKind::Window => "windows",
            ElementKind::Room => "rooms",
            ElementKind::Floor => "floors",
            ElementKind::Roof => "roofs",
            ElementKind::Column => "columns",
            ElementKind::Beam => "beams",
            ElementKind::Stair => "stairs",
        }
    }

    /// Parse either the singular or plural name
    pub fn from_category(text: &str) -> Option<ElementKind> {
        ElementKind::ALL.into_iter().find(|k| {
            k.as_str().eq_ignore_ascii_case(text) || k.plural().eq_ignore_ascii_case(text)
        })
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownVariant {
                what: "element kind",
                value: s.to_string(),
                expected: ElementKind::ALL.map(|k| k.as_str()).join("|"),
            })
    }
}

/// Globally unique, stable element identifier such as `wall-3`
///
/// Numbers are allocated per kind and never reused within a model.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ElementId {
    kind: ElementKind,
    number: u32,
}

impl ElementId {
    /// Create an id from its parts
    pub const fn new(kind: ElementKind, number: u32) -> Self {
        ElementId { kind, number }
    }

    /// Kind encoded in the id
    #[inline]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Per-kind sequence number
    #[inline]
    pub const fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({}-{})", self.kind, self.number)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.number)
    }
}

impl FromStr for ElementId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidId(s.to_string());
        let (kind, number) = s.rsplit_once('-').ok_or_else(invalid)?;
        let kind: ElementKind = kind.parse().map_err(|_| invalid())?;
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number = number.parse().map_err(|_| invalid())?;
        Ok(ElementId::new(kind, number))
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ElementId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Macro to generate type-safe index types with common implementations.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $debug_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a new index
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the raw u32 value
            #[inline]
            pub const fn as_u32(&self) -> u32 {
                self.0
            }

            /// The index following this one
            #[inline]
            pub const fn next(&self) -> Self {
                $name(self.0 + 1)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $debug_name, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(index: u32) -> Self {
                $name(index)
            }
        }
    };
}

define_index!(
    /// Identifier of a [`Level`](crate::Level), stable for the level's lifetime
    LevelId, "LevelId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_display_and_parse() {
        let id = ElementId::new(ElementKind::Window, 12);
        assert_eq!(id.to_string(), "window-12");
        assert_eq!("window-12".parse::<ElementId>().unwrap(), id);
        assert_eq!("WINDOW-12".parse::<ElementId>().unwrap(), id);
    }

    #[test]
    fn test_element_id_rejects_garbage() {
        assert!("wall".parse::<ElementId>().is_err());
        assert!("wall-".parse::<ElementId>().is_err());
        assert!("wall-x".parse::<ElementId>().is_err());
        assert!("tower-1".parse::<ElementId>().is_err());
        assert!("wall--1".parse::<ElementId>().is_err());
    }

    #[test]
    fn test_element_id_ordering_groups_by_kind() {
        let mut ids = vec![
            ElementId::new(ElementKind::Door, 1),
            ElementId::new(ElementKind::Wall, 10),
            ElementId::new(ElementKind::Wall, 2),
        ];
        ids.sort();
        let text: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
        assert_eq!(text, ["wall-2", "wall-10", "door-1"]);
    }

    #[test]
    fn test_kind_from_category() {
        assert_eq!(ElementKind::from_category("Walls"), Some(ElementKind::Wall));
        assert_eq!(ElementKind::from_category("stair"), Some(ElementKind::Stair));
        assert_eq!(ElementKind::from_category("chairs"), None);
    }

    #[test]
    fn test_level_id() {
        let id = LevelId::new(1);
        assert_eq!(id.next(), LevelId(2));
        assert_eq!(format!("{:?}", id), "LevelId(1)");
    }
}
