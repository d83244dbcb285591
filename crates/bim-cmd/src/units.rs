//! Unit suffix tables
//!
//! Lengths normalize to metres and angles to degrees.

use phf::phf_map;

/// Length units and their size in metres
pub static LENGTH_UNITS: phf::Map<&'static str, f64> = phf_map! {
    "m" => 1.0,
    "cm" => 0.01,
    "mm" => 0.001,
    "km" => 1000.0,
    "ft" => 0.3048,
    "in" => 0.0254,
};

/// Angle units and their size in degrees
pub static ANGLE_UNITS: phf::Map<&'static str, f64> = phf_map! {
    "deg" => 1.0,
    "rad" => 57.29577951308232,
};

/// Metres per `unit`, case-insensitive
pub fn length_factor(unit: &str) -> Option<f64> {
    LENGTH_UNITS.get(unit.to_ascii_lowercase().as_str()).copied()
}

/// Degrees per `unit`, case-insensitive
pub fn angle_factor(unit: &str) -> Option<f64> {
    ANGLE_UNITS.get(unit.to_ascii_lowercase().as_str()).copied()
}

/// Whether the suffix names any known unit
pub fn is_known_unit(unit: &str) -> bool {
    length_factor(unit).is_some() || angle_factor(unit).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_factors() {
        assert_eq!(length_factor("mm"), Some(0.001));
        assert_eq!(length_factor("FT"), Some(0.3048));
        assert_eq!(length_factor("deg"), None);
    }

    #[test]
    fn test_angle_factors() {
        assert_eq!(angle_factor("deg"), Some(1.0));
        let half_turn = std::f64::consts::PI * angle_factor("rad").unwrap();
        assert!((half_turn - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_units() {
        assert!(is_known_unit("cm"));
        assert!(is_known_unit("rad"));
        assert!(!is_known_unit("furlong"));
    }
}
