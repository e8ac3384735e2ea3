//! Deterministic terrain classification: multi-octave noise, layered material rules,
//! and per-chunk seeded randomness.

mod classifier;
mod error;
mod noise_field;
mod seed;
mod settings;

pub use classifier::{ColumnHeights, VoxelClassifier};
pub use error::TerrainError;
pub use noise_field::{MAX_SAMPLE_COORDINATE, NoiseField};
pub use seed::{chunk_rng, derive_chunk_seed, hash_grid, noise_seed};
pub use settings::{NoiseSettings, TerrainLayer, TerrainSettings};
