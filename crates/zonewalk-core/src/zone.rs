use crate::surface::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category tag painted onto grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Beach,
    UrbanDense,
    Park,
    Residential,
    Cafe,
    Waterfront,
}

impl ZoneType {
    pub const ALL: [ZoneType; 6] = [
        ZoneType::Beach,
        ZoneType::UrbanDense,
        ZoneType::Park,
        ZoneType::Residential,
        ZoneType::Cafe,
        ZoneType::Waterfront,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<ZoneType> {
        Self::ALL.get(index).copied()
    }

    pub fn fill(self) -> Rgba {
        match self {
            ZoneType::Beach => Rgba::new(29, 211, 176, 0.07),
            ZoneType::UrbanDense => Rgba::new(150, 150, 170, 0.06),
            ZoneType::Park => Rgba::new(100, 200, 100, 0.07),
            ZoneType::Residential => Rgba::new(244, 162, 97, 0.06),
            ZoneType::Cafe => Rgba::new(123, 107, 219, 0.06),
            ZoneType::Waterfront => Rgba::new(100, 180, 255, 0.06),
        }
    }

    pub fn border(self) -> Rgba {
        match self {
            ZoneType::Beach => Rgba::new(29, 211, 176, 0.2),
            ZoneType::UrbanDense => Rgba::new(150, 150, 170, 0.18),
            ZoneType::Park => Rgba::new(100, 200, 100, 0.2),
            ZoneType::Residential => Rgba::new(244, 162, 97, 0.18),
            ZoneType::Cafe => Rgba::new(123, 107, 219, 0.18),
            ZoneType::Waterfront => Rgba::new(100, 180, 255, 0.18),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ZoneType::Beach => "beach",
            ZoneType::UrbanDense => "urban_dense",
            ZoneType::Park => "park",
            ZoneType::Residential => "residential",
            ZoneType::Cafe => "cafe",
            ZoneType::Waterfront => "waterfront",
        }
    }

    /// Single-letter key used by the ASCII map.
    pub fn letter(self) -> char {
        match self {
            ZoneType::Beach => 'B',
            ZoneType::UrbanDense => 'U',
            ZoneType::Park => 'P',
            ZoneType::Residential => 'R',
            ZoneType::Cafe => 'C',
            ZoneType::Waterfront => 'W',
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_for_every_zone() {
        for (i, zone) in ZoneType::ALL.iter().enumerate() {
            assert_eq!(zone.index(), i);
            assert_eq!(ZoneType::from_index(i), Some(*zone));
        }
        assert_eq!(ZoneType::from_index(ZoneType::COUNT), None);
    }

    #[test]
    fn borders_are_stronger_than_fills() {
        for zone in ZoneType::ALL {
            let (fill, border) = (zone.fill(), zone.border());
            assert_eq!((fill.r, fill.g, fill.b), (border.r, border.g, border.b));
            assert!(border.a > fill.a, "{zone} border should be more opaque");
        }
    }

    #[test]
    fn letters_are_unique() {
        let mut letters: Vec<char> = ZoneType::ALL.iter().map(|z| z.letter()).collect();
        letters.sort_unstable();
        letters.dedup();
        assert_eq!(letters.len(), ZoneType::COUNT);
    }

    #[test]
    fn serializes_as_snake_case_name() {
        let json = serde_json::to_string(&ZoneType::UrbanDense).unwrap();
        assert_eq!(json, "\"urban_dense\"");
    }
}
