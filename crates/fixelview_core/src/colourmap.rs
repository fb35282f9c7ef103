//! Colour maps and colouring modes
//!
//! A colour map is a WGSL statement block that writes a `color: vec3<f32>`
//! variable. Formula maps read a windowed `amplitude` in [0, 1] prepared by the
//! shader; "special" maps compute their own colour from `value_out` and the
//! uniform block `u`.

use serde::{Serialize, Deserialize};

/// How fixel segments are coloured
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColourType {
    /// Absolute value of the segment direction as RGB
    Direction,
    /// One fixed colour for every segment
    Colour,
    /// Segment value through the active colour map
    #[default]
    Value,
}

impl ColourType {
    /// All modes, in cycling order
    pub const ALL: [ColourType; 3] = [ColourType::Direction, ColourType::Colour, ColourType::Value];

    /// Next mode in cycling order
    pub fn next(self) -> Self {
        match self {
            ColourType::Direction => ColourType::Colour,
            ColourType::Colour => ColourType::Value,
            ColourType::Value => ColourType::Direction,
        }
    }
}

/// A colour map entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColourMap {
    pub name: &'static str,
    /// Special maps skip the amplitude clamp and do their own windowing
    pub special: bool,
    /// WGSL statements assigning `color`
    pub mapping: &'static str,
}

/// Built-in colour maps, indexed by id
pub const MAPS: [ColourMap; 5] = [
    ColourMap {
        name: "Gray",
        special: false,
        mapping: "  color = vec3<f32>(amplitude);\n",
    },
    ColourMap {
        name: "Hot",
        special: false,
        mapping: "  color = clamp(vec3<f32>(2.7213 * amplitude, 2.7213 * amplitude - 1.0, 3.7727 * amplitude - 2.7727), vec3<f32>(0.0), vec3<f32>(1.0));\n",
    },
    ColourMap {
        name: "Cool",
        special: false,
        mapping: "  color = clamp(1.0 - vec3<f32>(2.7213 * (1.0 - amplitude), 2.7213 * (1.0 - amplitude) - 1.0, 3.7727 * (1.0 - amplitude) - 2.7727), vec3<f32>(0.0), vec3<f32>(1.0));\n",
    },
    ColourMap {
        name: "Jet",
        special: false,
        mapping: "  color = clamp(1.5 - 4.0 * abs(1.0 - amplitude - vec3<f32>(0.25, 0.5, 0.75)), vec3<f32>(0.0), vec3<f32>(1.0));\n",
    },
    ColourMap {
        name: "Colour",
        special: true,
        mapping: "  color = clamp(u.scale * (value_out - u.offset), 0.0, 1.0) * u.const_colour;\n",
    },
];

/// Default colour map for fixel images (Hot)
pub const DEFAULT_MAP: usize = 1;

/// Look up a map by id
pub fn get(index: usize) -> Option<&'static ColourMap> {
    MAPS.get(index)
}

/// Find a map id by case-insensitive name
pub fn index_of(name: &str) -> Option<usize> {
    MAPS.iter().position(|m| m.name.eq_ignore_ascii_case(name))
}

/// Number of built-in maps
pub fn count() -> usize {
    MAPS.len()
}

/// Colour map id outside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownColourMap(pub usize);

impl std::fmt::Display for UnknownColourMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown colour map index {} (have {})", self.0, MAPS.len())
    }
}

impl std::error::Error for UnknownColourMap {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_hot() {
        assert_eq!(get(DEFAULT_MAP).unwrap().name, "Hot");
    }

    #[test]
    fn test_index_of_ignores_case() {
        assert_eq!(index_of("jet"), Some(3));
        assert_eq!(index_of("GRAY"), Some(0));
        assert_eq!(index_of("viridis"), None);
    }

    #[test]
    fn test_every_mapping_assigns_color() {
        for map in MAPS.iter() {
            assert!(map.mapping.contains("color ="), "{} has no assignment", map.name);
            // formula maps work from the prepared amplitude only
            if !map.special {
                assert!(map.mapping.contains("amplitude"));
            }
        }
    }

    #[test]
    fn test_colour_type_cycle() {
        let mut t = ColourType::Value;
        for _ in 0..ColourType::ALL.len() {
            t = t.next();
        }
        assert_eq!(t, ColourType::Value);
        assert_eq!(ColourType::default(), ColourType::Value);
    }

    #[test]
    fn test_unknown_display() {
        let msg = format!("{}", UnknownColourMap(9));
        assert!(msg.contains("9"));
    }
}
