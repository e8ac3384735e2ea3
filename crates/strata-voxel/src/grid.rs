//! Flat per-chunk material storage.
//!
//! A [`VoxelGrid`] holds one [`Material`] per cell in the layout defined by
//! [`ChunkDescriptor::index`]. It is built once per chunk and read-only after.

use crate::chunk::{ChunkDescriptor, VoxelError};
use crate::material::Material;

/// Materials of every voxel in one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    descriptor: ChunkDescriptor,
    voxels: Vec<Material>,
}

impl VoxelGrid {
    /// Creates a grid filled with [`Material::Air`].
    pub fn new_air(descriptor: ChunkDescriptor) -> Self {
        Self {
            descriptor,
            voxels: vec![Material::Air; descriptor.volume()],
        }
    }

    /// Builds a grid by evaluating `f(x, y, z)` for every local coordinate,
    /// in flat index order.
    pub fn from_fn(
        descriptor: ChunkDescriptor,
        mut f: impl FnMut(u32, u32, u32) -> Material,
    ) -> Self {
        let voxels = (0..descriptor.volume())
            .map(|i| {
                let [x, y, z] = descriptor.coords(i);
                f(x, y, z)
            })
            .collect();
        Self { descriptor, voxels }
    }

    /// Wraps an existing buffer. Its length must equal the chunk volume.
    pub fn from_voxels(
        descriptor: ChunkDescriptor,
        voxels: Vec<Material>,
    ) -> Result<Self, VoxelError> {
        if voxels.len() != descriptor.volume() {
            return Err(VoxelError::VolumeMismatch {
                expected: descriptor.volume(),
                actual: voxels.len(),
            });
        }
        Ok(Self { descriptor, voxels })
    }

    /// The chunk this grid belongs to.
    #[inline]
    pub fn descriptor(&self) -> &ChunkDescriptor {
        &self.descriptor
    }

    /// Material at local `(x, y, z)`.
    ///
    /// Panics if the coordinate lies outside the chunk.
    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> Material {
        self.voxels[self.descriptor.index(x, y, z)]
    }

    /// Material at a possibly out-of-range local coordinate, used for
    /// neighbour queries. Returns `None` outside the chunk.
    pub fn get_signed(&self, x: i64, y: i64, z: i64) -> Option<Material> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        let z = u32::try_from(z).ok()?;
        self.descriptor
            .contains_local(x, y, z)
            .then(|| self.get(x, y, z))
    }

    /// The raw voxel buffer in flat index order.
    #[inline]
    pub fn as_slice(&self) -> &[Material] {
        &self.voxels
    }

    /// Iterates `(local position, material)` in flat index order.
    pub fn iter(&self) -> impl Iterator<Item = ([u32; 3], Material)> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .map(|(i, &m)| (self.descriptor.coords(i), m))
    }

    /// Number of cells holding `material`.
    pub fn count(&self, material: Material) -> usize {
        self.voxels.iter().filter(|&&m| m == material).count()
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|m| m.is_solid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(w: u32, h: u32, d: u32) -> ChunkDescriptor {
        ChunkDescriptor::new([0, 0, 0], [w, h, d]).unwrap()
    }

    #[test]
    fn test_new_air_is_empty() {
        let grid = VoxelGrid::new_air(descriptor(4, 5, 6));
        assert_eq!(grid.as_slice().len(), 120);
        assert_eq!(grid.solid_count(), 0);
        assert_eq!(grid.count(Material::Air), 120);
    }

    #[test]
    fn test_from_fn_uses_flat_layout() {
        let d = descriptor(2, 3, 4);
        let grid = VoxelGrid::from_fn(d, |x, y, z| {
            if x == 1 && y == 2 && z == 3 {
                Material::Ore
            } else {
                Material::Air
            }
        });
        let flat = 1 + 2 * (2 + 3 * 3);
        assert_eq!(grid.as_slice()[flat], Material::Ore);
        assert_eq!(grid.get(1, 2, 3), Material::Ore);
        assert_eq!(grid.solid_count(), 1);
    }

    #[test]
    fn test_from_voxels_checks_length() {
        let d = descriptor(2, 2, 2);
        let err = VoxelGrid::from_voxels(d, vec![Material::Dirt; 7]).unwrap_err();
        assert_eq!(
            err,
            VoxelError::VolumeMismatch {
                expected: 8,
                actual: 7
            }
        );
        assert!(VoxelGrid::from_voxels(d, vec![Material::Dirt; 8]).is_ok());
    }

    #[test]
    fn test_get_signed_outside_is_none() {
        let grid = VoxelGrid::from_fn(descriptor(2, 2, 2), |_, _, _| Material::Stone);
        assert_eq!(grid.get_signed(0, 0, 0), Some(Material::Stone));
        assert_eq!(grid.get_signed(-1, 0, 0), None);
        assert_eq!(grid.get_signed(0, 2, 0), None);
        assert_eq!(grid.get_signed(0, 0, i64::MAX), None);
    }

    #[test]
    fn test_iter_matches_get() {
        let grid = VoxelGrid::from_fn(descriptor(3, 2, 2), |x, y, z| {
            Material::from_u8(((x + y + z) % 6) as u8).unwrap()
        });
        for ([x, y, z], material) in grid.iter() {
            assert_eq!(grid.get(x, y, z), material);
        }
        assert_eq!(grid.iter().count(), 12);
    }
}
