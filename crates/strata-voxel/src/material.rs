//! Material tags stored in every voxel cell.
//!
//! [`Material::Air`] is discriminant 0 so that a zeroed grid represents empty
//! space, and it is the only material that produces neither mesh nor collision.

use serde::{Deserialize, Serialize};

/// What occupies a single voxel cell (1 byte).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Material {
    /// Empty space.
    #[default]
    Air = 0,
    /// Surface layer with a grass top.
    Grass = 1,
    /// Generic fill between the stone band and the surface.
    Dirt = 2,
    /// Probabilistic stone band.
    Stone = 3,
    /// Probabilistic ore pockets inside the ore band.
    Ore = 4,
    /// Unbreakable floor at world-y 0.
    Bedrock = 5,
}

impl Material {
    /// Every material, in discriminant order.
    pub const ALL: [Material; 6] = [
        Self::Air,
        Self::Grass,
        Self::Dirt,
        Self::Stone,
        Self::Ore,
        Self::Bedrock,
    ];

    /// Returns `true` for the empty-space sentinel.
    #[inline]
    pub fn is_air(self) -> bool {
        self == Self::Air
    }

    /// Returns `true` if this material occupies its cell (renders and collides).
    #[inline]
    pub fn is_solid(self) -> bool {
        !self.is_air()
    }

    /// Lower-case name used in logs and statistics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Grass => "grass",
            Self::Dirt => "dirt",
            Self::Stone => "stone",
            Self::Ore => "ore",
            Self::Bedrock => "bedrock",
        }
    }

    /// Decodes a raw discriminant. Returns `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_is_default_and_zero() {
        assert_eq!(Material::default(), Material::Air);
        assert_eq!(Material::Air as u8, 0);
    }

    #[test]
    fn test_only_air_is_empty() {
        for material in Material::ALL {
            assert_eq!(material.is_air(), material == Material::Air, "{material:?}");
            assert_eq!(material.is_solid(), !material.is_air());
        }
    }

    #[test]
    fn test_from_u8_matches_discriminants() {
        for material in Material::ALL {
            assert_eq!(Material::from_u8(material as u8), Some(material));
        }
        assert_eq!(Material::from_u8(6), None);
        assert_eq!(Material::from_u8(255), None);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Material::ALL.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Material::ALL.len());
    }
}
