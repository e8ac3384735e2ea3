//! The per-voxel mesh supplier boundary.

use strata_voxel::{Material, VoxelGrid};

use crate::fragment::MeshFragment;

/// Produces the small mesh for one voxel, or `None` when nothing is visible
/// (air, or every face occluded).
///
/// The grid is passed alongside the voxel so suppliers can query neighbours
/// without holding a reference to the chunk.
pub trait VoxelMeshSupplier: Send + Sync {
    /// Mesh for the voxel at local `position` holding `material`.
    fn mesh_voxel(
        &self,
        position: [u32; 3],
        material: Material,
        grid: &VoxelGrid,
    ) -> Option<MeshFragment>;
}

impl<F> VoxelMeshSupplier for F
where
    F: Fn([u32; 3], Material, &VoxelGrid) -> Option<MeshFragment> + Send + Sync,
{
    fn mesh_voxel(
        &self,
        position: [u32; 3],
        material: Material,
        grid: &VoxelGrid,
    ) -> Option<MeshFragment> {
        self(position, material, grid)
    }
}

/// Queries `supplier` for every non-air voxel in flat index order and keeps
/// the fragments it returns, in that order.
pub fn collect_fragments<S>(grid: &VoxelGrid, supplier: &S) -> Vec<MeshFragment>
where
    S: VoxelMeshSupplier + ?Sized,
{
    grid.iter()
        .filter(|(_, material)| material.is_solid())
        .filter_map(|(position, material)| supplier.mesh_voxel(position, material, grid))
        .collect()
}
