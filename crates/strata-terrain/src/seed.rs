//! Deterministic seeded generation utilities.
//!
//! Derives a per-chunk RNG from the world seed and chunk origin, so chunks can
//! be classified independently on any thread and still reproduce exactly.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_voxel::{ChunkDescriptor, VoxelGrid};

/// Derive a u64 seed for a chunk from the world seed and the chunk's placement.
///
/// Uses SipHash (via std's `DefaultHasher`) to combine the inputs into a
/// well-distributed value.
pub fn derive_chunk_seed(world_seed: u64, chunk: &ChunkDescriptor) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    chunk.origin().hash(&mut hasher);
    chunk.dimensions().hash(&mut hasher);
    hasher.finish()
}

/// Seed for the world's coherent noise, folded from the 64-bit world seed.
///
/// Every chunk of a world shares this value, so noise is continuous across
/// chunk borders.
pub fn noise_seed(world_seed: u64) -> u32 {
    (world_seed ^ (world_seed >> 32)) as u32
}

/// Deterministic RNG for a specific chunk.
///
/// The same `(world_seed, chunk)` pair always yields the same sequence,
/// regardless of thread or build order.
pub fn chunk_rng(world_seed: u64, chunk: &ChunkDescriptor) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_chunk_seed(world_seed, chunk))
}

/// Hash every voxel of a grid, for determinism comparisons.
pub fn hash_grid(grid: &VoxelGrid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.descriptor().hash(&mut hasher);
    for material in grid.as_slice() {
        (*material as u8).hash(&mut hasher);
    }
    hasher.finish()
}
