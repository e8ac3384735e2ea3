//! Chunk descriptors: the world-space placement and extent of one block of voxels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a chunk or grid is constructed from inconsistent values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoxelError {
    /// At least one axis has zero extent.
    #[error("chunk dimensions must be positive on every axis, got {width}x{height}x{depth}")]
    InvalidDimensions {
        /// Extent along X.
        width: u32,
        /// Extent along Y.
        height: u32,
        /// Extent along Z.
        depth: u32,
    },
    /// The far corner of the chunk does not fit in `i32` world coordinates.
    #[error("chunk at origin {origin:?} with dimensions {dimensions:?} exceeds the world coordinate range")]
    OutOfWorldRange {
        /// Requested origin.
        origin: [i32; 3],
        /// Requested dimensions.
        dimensions: [u32; 3],
    },
    /// `width * height * depth` does not fit in `usize`.
    #[error("chunk dimensions {dimensions:?} describe more voxels than can be addressed")]
    VolumeTooLarge {
        /// Requested dimensions.
        dimensions: [u32; 3],
    },
    /// A voxel buffer does not have `width * height * depth` entries.
    #[error("voxel buffer has {actual} entries, chunk volume is {expected}")]
    VolumeMismatch {
        /// `width * height * depth`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}

/// Placement and extent of one chunk.
///
/// Immutable once constructed: a chunk build reads it but never changes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    origin: [i32; 3],
    dimensions: [u32; 3],
}

impl ChunkDescriptor {
    /// Creates a descriptor after checking that every axis is non-empty, that
    /// every voxel's world coordinate fits in `i32`, and that the voxel count
    /// fits in `usize`.
    pub fn new(origin: [i32; 3], dimensions: [u32; 3]) -> Result<Self, VoxelError> {
        let [width, height, depth] = dimensions;
        if width == 0 || height == 0 || depth == 0 {
            return Err(VoxelError::InvalidDimensions {
                width,
                height,
                depth,
            });
        }

        let fits = origin.iter().zip(dimensions).all(|(&o, d)| {
            i32::try_from(d - 1)
                .ok()
                .and_then(|d| o.checked_add(d))
                .is_some()
        });
        if !fits {
            return Err(VoxelError::OutOfWorldRange { origin, dimensions });
        }

        let volume = dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize));
        if volume.is_none() {
            return Err(VoxelError::VolumeTooLarge { dimensions });
        }

        Ok(Self { origin, dimensions })
    }

    /// World-space corner of voxel `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> [i32; 3] {
        self.origin
    }

    /// `[width, height, depth]`.
    #[inline]
    pub fn dimensions(&self) -> [u32; 3] {
        self.dimensions
    }

    /// Extent along X.
    #[inline]
    pub fn width(&self) -> u32 {
        self.dimensions[0]
    }

    /// Extent along Y.
    #[inline]
    pub fn height(&self) -> u32 {
        self.dimensions[1]
    }

    /// Extent along Z.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.dimensions[2]
    }

    /// Number of voxels in the chunk. Cannot overflow: [`new`](Self::new)
    /// rejects dimensions whose product does not fit.
    #[inline]
    pub fn volume(&self) -> usize {
        self.dimensions.iter().map(|&d| d as usize).product()
    }

    /// Returns `true` if the local coordinate lies inside the chunk.
    #[inline]
    pub fn contains_local(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.width() && y < self.height() && z < self.depth()
    }

    /// Flat index of local voxel `(x, y, z)`: `x + width * (y + height * z)`.
    ///
    /// Every consumer of [`crate::VoxelGrid`] relies on this exact layout.
    #[inline]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        debug_assert!(self.contains_local(x, y, z));
        let (w, h) = (self.width() as usize, self.height() as usize);
        x as usize + w * (y as usize + h * z as usize)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn coords(&self, index: usize) -> [u32; 3] {
        debug_assert!(index < self.volume());
        let (w, h) = (self.width() as usize, self.height() as usize);
        let x = index % w;
        let y = (index / w) % h;
        let z = index / (w * h);
        [x as u32, y as u32, z as u32]
    }

    /// World coordinate of a local voxel (origin + local offset).
    #[inline]
    pub fn world_coords(&self, x: u32, y: u32, z: u32) -> [i32; 3] {
        // `new` guarantees origin + (dimension - 1) fits in i32.
        [
            self.origin[0] + x as i32,
            self.origin[1] + y as i32,
            self.origin[2] + z as i32,
        ]
    }
}
