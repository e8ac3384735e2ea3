//! Chunk meshing: per-voxel mesh fragments, face-culling supplier, parallel
//! assembly into one combined mesh, and the chunk build pipeline.

pub mod assembler;
pub mod combined;
pub mod error;
pub mod face;
pub mod face_culling;
pub mod fragment;
pub mod pipeline;
pub mod supplier;

pub use assembler::{ChunkMeshAssembler, FragmentRange, OffsetTable};
pub use combined::{Aabb, CombinedChunkMesh, SubMesh};
pub use error::AssemblyError;
pub use face::FaceDirection;
pub use face_culling::FaceCullingSupplier;
pub use fragment::{FragmentIndices, MeshFragment};
pub use pipeline::{
    BuildError, BuiltChunk, ChunkBuildPool, ChunkBuildResult, ChunkBuilder, build_chunk,
};
pub use supplier::{VoxelMeshSupplier, collect_fragments};
