//! Terrain configuration errors.

use strata_voxel::VoxelError;

use crate::settings::TerrainLayer;

/// Errors detected before any voxel is classified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// A layer's base frequency is zero, negative, or not finite.
    #[error("{layer} layer: scale must be a finite value > 0, got {scale}")]
    InvalidScale {
        /// Offending layer.
        layer: TerrainLayer,
        /// Offending value.
        scale: f64,
    },

    /// A layer parameter is NaN or infinite.
    #[error("{layer} layer: {field} must be finite, got {value}")]
    NonFinite {
        /// Offending layer.
        layer: TerrainLayer,
        /// Parameter name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A layer's highest octave is too fine to sample the whole world safely.
    #[error(
        "{layer} layer: {octaves} octaves at scale {scale} reach frequency {frequency}, above the limit {limit}"
    )]
    FrequencyTooHigh {
        /// Offending layer.
        layer: TerrainLayer,
        /// Octave count.
        octaves: u32,
        /// Base frequency.
        scale: f64,
        /// Frequency of the highest octave.
        frequency: f64,
        /// Largest accepted top-octave frequency.
        limit: f64,
    },

    /// A noise coordinate is NaN or infinite.
    #[error("noise coordinate must be finite, got {value}")]
    NonFiniteCoordinate {
        /// Offending coordinate.
        value: f64,
    },

    /// A coordinate scaled by the top-octave frequency leaves the range noise
    /// can be sampled in.
    #[error("noise sample reaches {reach} at frequency {frequency}, beyond the sampling range")]
    SampleOutOfRange {
        /// Frequency of the highest octave.
        frequency: f64,
        /// Largest scaled coordinate.
        reach: f64,
    },

    /// The chunk itself is malformed.
    #[error(transparent)]
    Voxel(#[from] VoxelError),
}
