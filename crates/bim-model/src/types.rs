//! Per-kind type enumerations (wall types, door types, ...)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Generates a closed enumeration with its textual names, parsing and display.
macro_rules! define_choice {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Accepted spellings, in declaration order
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(ModelError::UnknownVariant {
                    what: $what,
                    value: s.to_string(),
                    expected: Self::NAMES.join("|"),
                })
            }
        }
    };
}

define_choice!(
    /// Wall construction type
    WallType, "wall type" {
        Basic => "basic",
        Structural => "structural",
        Curtain => "curtain",
        Retaining => "retaining",
    }
    default Basic
);

define_choice!(
    /// Door operation type
    DoorType, "door type" {
        Single => "single",
        Double => "double",
        Sliding => "sliding",
        Folding => "folding",
        Revolving => "revolving",
    }
    default Single
);

define_choice!(
    /// Window operation type
    WindowType, "window type" {
        Fixed => "fixed",
        Casement => "casement",
        Sliding => "sliding",
        Awning => "awning",
        DoubleHung => "double-hung",
    }
    default Casement
);

define_choice!(
    /// Roof form
    RoofType, "roof type" {
        Flat => "flat",
        Gable => "gable",
        Hip => "hip",
        Shed => "shed",
        Mansard => "mansard",
    }
    default Gable
);

define_choice!(
    /// Room usage
    RoomType, "room type" {
        Living => "living",
        Bedroom => "bedroom",
        Kitchen => "kitchen",
        Bathroom => "bathroom",
        Office => "office",
        Corridor => "corridor",
        Storage => "storage",
        Other => "other",
    }
    default Other
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Curtain".parse::<WallType>().unwrap(), WallType::Curtain);
        assert_eq!("DOUBLE-HUNG".parse::<WindowType>().unwrap(), WindowType::DoubleHung);
    }

    #[test]
    fn test_unknown_lists_members() {
        let err = "dome".parse::<RoofType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown roof type 'dome' (expected one of flat|gable|hip|shed|mansard)"
        );
    }

    #[test]
    fn test_names_match_display() {
        for name in DoorType::NAMES {
            assert_eq!(name.parse::<DoorType>().unwrap().to_string(), *name);
        }
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&WindowType::DoubleHung).unwrap();
        assert_eq!(json, "\"double-hung\"");
    }
}
