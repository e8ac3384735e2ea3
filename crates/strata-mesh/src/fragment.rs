//! The small mesh a supplier produces for one non-empty voxel.

use crate::error::AssemblyError;

/// Index buffer of a fragment, in whichever width the supplier chose.
///
/// Both widths are widened to `u32` during assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentIndices {
    /// 16-bit indices.
    U16(Vec<u16>),
    /// 32-bit indices.
    U32(Vec<u32>),
}

impl Default for FragmentIndices {
    fn default() -> Self {
        Self::U16(Vec::new())
    }
}

impl FragmentIndices {
    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    /// Returns `true` if there are no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index `i`, widened to `u32`.
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Self::U16(v) => v.get(i).map(|&x| u32::from(x)),
            Self::U32(v) => v.get(i).copied(),
        }
    }

    /// Largest index value, if any.
    pub fn max(&self) -> Option<u32> {
        match self {
            Self::U16(v) => v.iter().max().map(|&x| u32::from(x)),
            Self::U32(v) => v.iter().max().copied(),
        }
    }

    /// Appends an index, switching to 32-bit storage once a value no longer
    /// fits in 16 bits.
    pub fn push(&mut self, index: u32) {
        match self {
            Self::U16(v) => match u16::try_from(index) {
                Ok(small) => v.push(small),
                Err(_) => {
                    let mut wide: Vec<u32> = v.iter().map(|&x| u32::from(x)).collect();
                    wide.push(index);
                    *self = Self::U32(wide);
                }
            },
            Self::U32(v) => v.push(index),
        }
    }

    /// Writes every index plus `offset` into `dst`, widening to `u32`.
    ///
    /// `dst` must be exactly [`len`](Self::len) long.
    pub fn copy_shifted(&self, dst: &mut [u32], offset: u32) {
        debug_assert_eq!(dst.len(), self.len());
        match self {
            Self::U16(src) => {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = offset + u32::from(s);
                }
            }
            Self::U32(src) => {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = offset + s;
                }
            }
        }
    }
}

/// Vertex streams and triangle indices for one voxel.
///
/// Indices refer to this fragment's own vertices, starting at 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshFragment {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, one per position.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, one per position.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list.
    pub indices: FragmentIndices,
}

impl MeshFragment {
    /// Creates an empty fragment with 16-bit indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices (length of the position stream).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the fragment has no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.indices.is_empty()
    }

    /// Appends a quad as two triangles `(0, 1, 2)` and `(0, 2, 3)`.
    ///
    /// `corners` must wind counter-clockwise when viewed from the side `normal`
    /// points to.
    pub fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], uvs: [[f32; 2]; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 4]);
        self.uvs.extend_from_slice(&uvs);
        for i in [0, 1, 2, 0, 2, 3] {
            self.indices.push(base + i);
        }
    }

    /// Checks the supplier contract: equal stream lengths, whole triangles,
    /// and every index inside the fragment's own vertex range.
    ///
    /// `fragment` is the fragment's position in the assembly order, reported
    /// in errors.
    pub fn validate(&self, fragment: usize) -> Result<(), AssemblyError> {
        let vertex_count = self.positions.len();
        if self.normals.len() != vertex_count || self.uvs.len() != vertex_count {
            return Err(AssemblyError::AttributeLengthMismatch {
                fragment,
                positions: vertex_count,
                normals: self.normals.len(),
                uvs: self.uvs.len(),
            });
        }

        let index_count = self.indices.len();
        if index_count % 3 != 0 {
            return Err(AssemblyError::IncompleteTriangle {
                fragment,
                index_count,
            });
        }

        if let Some(index) = self.indices.max()
            && index as usize >= vertex_count
        {
            return Err(AssemblyError::IndexOutOfRange {
                fragment,
                index,
                vertex_count,
            });
        }

        Ok(())
    }
}
