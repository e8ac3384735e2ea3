//! Configuration error types.

use strata_terrain::TerrainError;
use strata_voxel::VoxelError;

/// Errors that can occur when loading, saving, parsing or validating
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The chunk dimensions cannot form a chunk.
    #[error("invalid world: {0}")]
    Voxel(#[from] VoxelError),

    /// A terrain noise layer is unusable.
    #[error("invalid terrain: {0}")]
    Terrain(#[from] TerrainError),

    /// The world layout describes no chunks.
    #[error("world has no chunks: columns {columns:?}, {chunks_per_column} per column")]
    EmptyWorld {
        /// Chunk columns along x and z.
        columns: (u32, u32),
        /// Chunks stacked in each column.
        chunks_per_column: u32,
    },

    /// A chunk origin of the world layout does not fit in 32-bit world space.
    #[error("chunk at grid position {position:?} lies outside 32-bit world space")]
    WorldTooLarge {
        /// Grid position of the first chunk that does not fit.
        position: [u32; 3],
    },
}
