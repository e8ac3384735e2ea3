//! Per-layer noise parameters and the bundle of layers that shapes a world.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::noise_field::{MAX_WORLD_FREQUENCY, top_frequency};

/// Identifies one terrain layer in error messages and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainLayer {
    /// Surface height field.
    Surface,
    /// Upper limit of the stone band.
    Stone,
    /// Upper limit of the ore band.
    OreTop,
    /// Lower limit of the ore band.
    OreBottom,
    /// 3D cave carving field.
    Cave,
}

impl TerrainLayer {
    /// Every layer, in the order they appear in [`TerrainSettings`].
    pub const ALL: [TerrainLayer; 5] = [
        Self::Surface,
        Self::Stone,
        Self::OreTop,
        Self::OreBottom,
        Self::Cave,
    ];
}

impl fmt::Display for TerrainLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Surface => "surface",
            Self::Stone => "stone",
            Self::OreTop => "ore-top",
            Self::OreBottom => "ore-bottom",
            Self::Cave => "cave",
        })
    }
}

/// fBm parameters for one terrain layer.
///
/// Shared read-only by every chunk and every voxel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettings {
    /// Number of octaves summed. Zero yields a flat plane at `height_offset`.
    pub octaves: u32,
    /// Base frequency of the first octave. Each octave doubles it.
    pub scale: f64,
    /// Multiplier applied to the normalized octave sum.
    pub height_scale: f64,
    /// Added after scaling.
    pub height_offset: f64,
    /// Acceptance probability for probability-gated layers, or the carving
    /// threshold for the cave layer. Conventionally in `[0, 1]`.
    pub probability: f64,
}

impl NoiseSettings {
    /// Creates a settings value.
    pub const fn new(
        octaves: u32,
        scale: f64,
        height_scale: f64,
        height_offset: f64,
        probability: f64,
    ) -> Self {
        Self {
            octaves,
            scale,
            height_scale,
            height_offset,
            probability,
        }
    }

    /// Rejects settings that would make noise evaluation undefined.
    pub fn validate(&self, layer: TerrainLayer) -> Result<(), TerrainError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(TerrainError::InvalidScale {
                layer,
                scale: self.scale,
            });
        }
        let frequency = top_frequency(self.octaves, self.scale);
        if frequency > MAX_WORLD_FREQUENCY {
            return Err(TerrainError::FrequencyTooHigh {
                layer,
                octaves: self.octaves,
                scale: self.scale,
                frequency,
                limit: MAX_WORLD_FREQUENCY,
            });
        }
        for (field, value) in [
            ("height_scale", self.height_scale),
            ("height_offset", self.height_offset),
            ("probability", self.probability),
        ] {
            if !value.is_finite() {
                return Err(TerrainError::NonFinite {
                    layer,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// The five layers that drive voxel classification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Surface height; the voxel at this height becomes grass.
    pub surface: NoiseSettings,
    /// Stone band ceiling; `probability` gates each stone voxel.
    pub stone: NoiseSettings,
    /// Ore band ceiling; its `probability` gates each ore voxel.
    pub ore_top: NoiseSettings,
    /// Ore band floor.
    pub ore_bottom: NoiseSettings,
    /// 3D cave field; values below `probability` are carved to air.
    pub cave: NoiseSettings,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            surface: NoiseSettings::new(4, 0.01, 24.0, 12.0, 1.0),
            stone: NoiseSettings::new(4, 0.02, 20.0, 0.0, 0.9),
            ore_top: NoiseSettings::new(2, 0.03, 10.0, 6.0, 0.25),
            ore_bottom: NoiseSettings::new(2, 0.03, 10.0, 0.0, 1.0),
            cave: NoiseSettings::new(3, 0.08, 1.0, 0.0, 0.35),
        }
    }
}

impl TerrainSettings {
    /// Settings for one layer.
    pub fn layer(&self, layer: TerrainLayer) -> &NoiseSettings {
        match layer {
            TerrainLayer::Surface => &self.surface,
            TerrainLayer::Stone => &self.stone,
            TerrainLayer::OreTop => &self.ore_top,
            TerrainLayer::OreBottom => &self.ore_bottom,
            TerrainLayer::Cave => &self.cave,
        }
    }

    /// Validates every layer, reporting the first failure.
    pub fn validate(&self) -> Result<(), TerrainError> {
        TerrainLayer::ALL
            .into_iter()
            .try_for_each(|layer| self.layer(layer).validate(layer))
    }
}
