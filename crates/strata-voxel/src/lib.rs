//! Voxel data model: material tags, chunk descriptors, and flat per-chunk voxel grids.

pub mod chunk;
pub mod grid;
pub mod material;

pub use chunk::{ChunkDescriptor, VoxelError};
pub use grid::VoxelGrid;
pub use material::Material;
