//! The single mesh a chunk hands to rendering and collision.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Tight bounds of a point set, or `None` when it is empty.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let start = Vec3::from(*first);
        let (min, max) = rest.iter().fold((start, start), |(min, max), p| {
            let p = Vec3::from(*p);
            (min.min(p), max.max(p))
        });
        Some(Self { min, max })
    }

    /// Center point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// The draw range of the combined mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubMesh {
    /// First index of the range.
    pub index_start: u32,
    /// Number of indices.
    pub index_count: u32,
    /// First vertex referenced.
    pub first_vertex: u32,
    /// Number of vertices referenced.
    pub vertex_count: u32,
}

/// One vertex/normal/UV/index buffer set covering a whole chunk.
///
/// Every index is smaller than the vertex count. Not mutated once assembled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinedChunkMesh {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list, 32-bit.
    pub indices: Vec<u32>,
    /// The single submesh, covering every index and vertex.
    pub submesh: SubMesh,
    /// Bounds of `positions`; `None` for an empty mesh.
    pub bounds: Option<Aabb>,
}

impl CombinedChunkMesh {
    /// A mesh with no geometry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Triangles as position triples, for collision-shape construction.
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [0, 1, 2].map(|i| self.positions[t[i] as usize]))
    }

    /// Raw position stream for GPU upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw normal stream for GPU upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Raw UV stream for GPU upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw index buffer for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
