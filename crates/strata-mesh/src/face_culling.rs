//! Reference supplier: one textured quad per exposed voxel face.
//!
//! A face is exposed when its neighbour inside the chunk is air or lies
//! outside the chunk. Positions are chunk-local; UVs address tiles of a square
//! texture atlas.

use strata_voxel::{Material, VoxelGrid};

use crate::face::FaceDirection;
use crate::fragment::MeshFragment;
use crate::supplier::VoxelMeshSupplier;

/// Face-culling cube supplier over a square texture atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceCullingSupplier {
    atlas_tiles: u32,
}

impl Default for FaceCullingSupplier {
    fn default() -> Self {
        Self { atlas_tiles: 16 }
    }
}

impl FaceCullingSupplier {
    /// Creates a supplier for an atlas of `atlas_tiles` × `atlas_tiles` tiles.
    pub fn new(atlas_tiles: u32) -> Self {
        Self {
            atlas_tiles: atlas_tiles.max(1),
        }
    }

    /// Atlas tile `(column, row)` for one face of a material.
    pub fn tile(material: Material, face: FaceDirection) -> (u32, u32) {
        match (material, face) {
            (Material::Grass, FaceDirection::PosY) => (0, 0),
            (Material::Grass, FaceDirection::NegY) => (2, 0),
            (Material::Grass, _) => (1, 0),
            (Material::Dirt, _) => (2, 0),
            (Material::Stone, _) => (3, 0),
            (Material::Ore, _) => (4, 0),
            (Material::Bedrock, _) => (5, 0),
            (Material::Air, _) => (15, 15),
        }
    }

    /// UVs for the four corners of a face, matching [`FaceDirection::unit_corners`].
    fn face_uvs(&self, material: Material, face: FaceDirection) -> [[f32; 2]; 4] {
        let (col, row) = Self::tile(material, face);
        let step = 1.0 / self.atlas_tiles as f32;
        let u0 = col as f32 * step;
        let v0 = row as f32 * step;
        let (u1, v1) = (u0 + step, v0 + step);
        [[u0, v0], [u0, v1], [u1, v1], [u1, v0]]
    }

    fn is_exposed(grid: &VoxelGrid, position: [u32; 3], face: FaceDirection) -> bool {
        let [x, y, z] = position.map(i64::from);
        let (nx, ny, nz) = face.offset(x, y, z);
        grid.get_signed(nx, ny, nz).is_none_or(Material::is_air)
    }
}

impl VoxelMeshSupplier for FaceCullingSupplier {
    fn mesh_voxel(
        &self,
        position: [u32; 3],
        material: Material,
        grid: &VoxelGrid,
    ) -> Option<MeshFragment> {
        if material.is_air() {
            return None;
        }

        let origin = position.map(|c| c as f32);
        let mut fragment = MeshFragment::new();
        for face in FaceDirection::ALL {
            if !Self::is_exposed(grid, position, face) {
                continue;
            }
            let corners = face
                .unit_corners()
                .map(|c| [c[0] + origin[0], c[1] + origin[1], c[2] + origin[2]]);
            fragment.push_quad(corners, face.normal(), self.face_uvs(material, face));
        }

        (!fragment.is_empty()).then_some(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::ChunkDescriptor;

    fn grid(dims: [u32; 3], f: impl FnMut(u32, u32, u32) -> Material) -> VoxelGrid {
        VoxelGrid::from_fn(ChunkDescriptor::new([0, 0, 0], dims).unwrap(), f)
    }

    #[test]
    fn test_isolated_voxel_emits_six_faces() {
        let g = grid([1, 1, 1], |_, _, _| Material::Stone);
        let f = FaceCullingSupplier::default()
            .mesh_voxel([0, 0, 0], Material::Stone, &g)
            .unwrap();
        assert_eq!(f.vertex_count(), 24);
        assert_eq!(f.index_count(), 36);
        assert!(f.validate(0).is_ok());
    }

    #[test]
    fn test_air_yields_nothing() {
        let g = grid([1, 1, 1], |_, _, _| Material::Air);
        assert!(
            FaceCullingSupplier::default()
                .mesh_voxel([0, 0, 0], Material::Air, &g)
                .is_none()
        );
    }

    #[test]
    fn test_shared_face_is_culled() {
        let g = grid([2, 1, 1], |_, _, _| Material::Dirt);
        let f = FaceCullingSupplier::default()
            .mesh_voxel([0, 0, 0], Material::Dirt, &g)
            .unwrap();
        assert_eq!(f.vertex_count(), 20, "five faces expected");
        assert!(f.normals.iter().all(|n| *n != [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_fully_occluded_voxel_yields_nothing() {
        let g = grid([3, 3, 3], |_, _, _| Material::Stone);
        assert!(
            FaceCullingSupplier::default()
                .mesh_voxel([1, 1, 1], Material::Stone, &g)
                .is_none()
        );
    }

    #[test]
    fn test_positions_are_chunk_local() {
        let g = grid([4, 4, 4], |x, y, z| {
            if (x, y, z) == (2, 3, 1) { Material::Ore } else { Material::Air }
        });
        let f = FaceCullingSupplier::default()
            .mesh_voxel([2, 3, 1], Material::Ore, &g)
            .unwrap();
        for p in &f.positions {
            assert!((2.0..=3.0).contains(&p[0]));
            assert!((3.0..=4.0).contains(&p[1]));
            assert!((1.0..=2.0).contains(&p[2]));
        }
    }

    #[test]
    fn test_grass_top_uses_its_own_tile() {
        let g = grid([1, 1, 1], |_, _, _| Material::Grass);
        let f = FaceCullingSupplier::new(16)
            .mesh_voxel([0, 0, 0], Material::Grass, &g)
            .unwrap();
        let top = f
            .normals
            .iter()
            .position(|n| *n == FaceDirection::PosY.normal())
            .unwrap();
        assert_eq!(f.uvs[top], [0.0, 0.0]);
        let side = f
            .normals
            .iter()
            .position(|n| *n == FaceDirection::PosX.normal())
            .unwrap();
        assert_eq!(f.uvs[side], [1.0 / 16.0, 0.0]);
    }
}
