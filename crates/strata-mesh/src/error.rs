//! Assembly precondition failures.

use thiserror::Error;

/// A fragment broke the supplier contract, or the chunk is too large for a
/// 32-bit index buffer. The chunk build is aborted; no partial mesh exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// Position, normal, and UV streams disagree on the vertex count.
    #[error(
        "fragment {fragment}: attribute streams disagree ({positions} positions, {normals} normals, {uvs} uvs)"
    )]
    AttributeLengthMismatch {
        /// Position of the fragment in the assembly order.
        fragment: usize,
        /// Number of positions.
        positions: usize,
        /// Number of normals.
        normals: usize,
        /// Number of UVs.
        uvs: usize,
    },

    /// An index refers past the fragment's own vertices.
    #[error("fragment {fragment}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Position of the fragment in the assembly order.
        fragment: usize,
        /// Offending index value.
        index: u32,
        /// Vertices the fragment actually has.
        vertex_count: usize,
    },

    /// The index count is not a whole number of triangles.
    #[error("fragment {fragment}: {index_count} indices do not form whole triangles")]
    IncompleteTriangle {
        /// Position of the fragment in the assembly order.
        fragment: usize,
        /// Number of indices.
        index_count: usize,
    },

    /// Running totals no longer fit a 32-bit index buffer.
    #[error("fragment {fragment}: combined mesh exceeds the 32-bit vertex or index range")]
    BufferOverflow {
        /// Fragment at which the totals overflowed.
        fragment: usize,
    },
}
