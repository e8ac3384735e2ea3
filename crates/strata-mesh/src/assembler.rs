//! Two-phase assembly of per-voxel fragments into one chunk mesh.
//!
//! Phase 1 walks the fragments in order and assigns each a vertex offset and
//! an index offset equal to the running totals, producing a partition of the
//! output buffers into disjoint, contiguous ranges. Phase 2 splits the output
//! buffers along that partition and hands each fragment its own mutable
//! sub-slices, so worker threads copy in parallel without locks or atomics.
//! The caller sees the mesh only after every worker has finished.

use std::ops::Range;
use std::thread;

use tracing::{debug, trace};

use crate::combined::{Aabb, CombinedChunkMesh, SubMesh};
use crate::error::AssemblyError;
use crate::fragment::MeshFragment;

/// Below this many fragments phase 2 runs on the calling thread.
const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Output ranges owned by one fragment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FragmentRange {
    /// First vertex slot in the combined buffers.
    pub vertex_offset: u32,
    /// Number of vertex slots.
    pub vertex_count: u32,
    /// First slot in the combined index buffer.
    pub triangle_offset: u32,
    /// Number of index slots.
    pub index_count: u32,
}

impl FragmentRange {
    /// Vertex slots as a range.
    pub fn vertices(&self) -> Range<u32> {
        self.vertex_offset..self.vertex_offset + self.vertex_count
    }

    /// Index slots as a range.
    pub fn indices(&self) -> Range<u32> {
        self.triangle_offset..self.triangle_offset + self.index_count
    }
}

/// Result of phase 1: one [`FragmentRange`] per fragment plus the totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetTable {
    ranges: Vec<FragmentRange>,
    total_vertices: u32,
    total_indices: u32,
}

impl OffsetTable {
    /// Validates every fragment and computes the running-total offsets.
    ///
    /// Fails on the first fragment that breaks the supplier contract or pushes
    /// the totals past the 32-bit range.
    pub fn build(fragments: &[MeshFragment]) -> Result<Self, AssemblyError> {
        let mut ranges = Vec::with_capacity(fragments.len());
        let mut total_vertices = 0u32;
        let mut total_indices = 0u32;

        for (i, fragment) in fragments.iter().enumerate() {
            fragment.validate(i)?;

            let overflow = || AssemblyError::BufferOverflow { fragment: i };
            let vertex_count = u32::try_from(fragment.vertex_count()).map_err(|_| overflow())?;
            let index_count = u32::try_from(fragment.index_count()).map_err(|_| overflow())?;

            ranges.push(FragmentRange {
                vertex_offset: total_vertices,
                vertex_count,
                triangle_offset: total_indices,
                index_count,
            });

            total_vertices = total_vertices
                .checked_add(vertex_count)
                .ok_or_else(overflow)?;
            total_indices = total_indices.checked_add(index_count).ok_or_else(overflow)?;
        }

        trace!(
            fragments = ranges.len(),
            total_vertices, total_indices, "offset table built"
        );

        Ok(Self {
            ranges,
            total_vertices,
            total_indices,
        })
    }

    /// Per-fragment ranges, in fragment order.
    pub fn ranges(&self) -> &[FragmentRange] {
        &self.ranges
    }

    /// Sum of all fragment vertex counts.
    pub fn total_vertices(&self) -> u32 {
        self.total_vertices
    }

    /// Sum of all fragment index counts.
    pub fn total_indices(&self) -> u32 {
        self.total_indices
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if no fragments were given.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// One phase-2 task: a fragment and the exclusive output slices it fills.
struct CopyJob<'a> {
    fragment: &'a MeshFragment,
    vertex_offset: u32,
    positions: &'a mut [[f32; 3]],
    normals: &'a mut [[f32; 3]],
    uvs: &'a mut [[f32; 2]],
    indices: &'a mut [u32],
}

impl CopyJob<'_> {
    fn run(self) {
        self.positions.copy_from_slice(&self.fragment.positions);
        self.normals.copy_from_slice(&self.fragment.normals);
        self.uvs.copy_from_slice(&self.fragment.uvs);
        self.fragment
            .indices
            .copy_shifted(self.indices, self.vertex_offset);
    }
}

/// Output buffers sized from an [`OffsetTable`].
struct OutputBuffers {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl OutputBuffers {
    fn for_table(table: &OffsetTable) -> Self {
        let vertices = table.total_vertices() as usize;
        Self {
            positions: vec![[0.0; 3]; vertices],
            normals: vec![[0.0; 3]; vertices],
            uvs: vec![[0.0; 2]; vertices],
            indices: vec![0; table.total_indices() as usize],
        }
    }

    /// Cuts the buffers into one disjoint job per fragment. Ranges are
    /// contiguous and in fragment order, so successive splits yield exactly
    /// `[offset, offset + count)` for each fragment.
    fn split_jobs<'a>(
        &'a mut self,
        fragments: &'a [MeshFragment],
        table: &OffsetTable,
    ) -> Vec<CopyJob<'a>> {
        let mut positions = self.positions.as_mut_slice();
        let mut normals = self.normals.as_mut_slice();
        let mut uvs = self.uvs.as_mut_slice();
        let mut indices = self.indices.as_mut_slice();

        let mut jobs = Vec::with_capacity(fragments.len());
        for (fragment, range) in fragments.iter().zip(table.ranges()) {
            let v = range.vertex_count as usize;
            let n = range.index_count as usize;

            let (p, rest) = std::mem::take(&mut positions).split_at_mut(v);
            positions = rest;
            let (nm, rest) = std::mem::take(&mut normals).split_at_mut(v);
            normals = rest;
            let (uv, rest) = std::mem::take(&mut uvs).split_at_mut(v);
            uvs = rest;
            let (ix, rest) = std::mem::take(&mut indices).split_at_mut(n);
            indices = rest;

            jobs.push(CopyJob {
                fragment,
                vertex_offset: range.vertex_offset,
                positions: p,
                normals: nm,
                uvs: uv,
                indices: ix,
            });
        }
        debug_assert!(positions.is_empty() && indices.is_empty());
        jobs
    }

    fn into_mesh(self, table: &OffsetTable) -> CombinedChunkMesh {
        let bounds = Aabb::from_points(&self.positions);
        CombinedChunkMesh {
            positions: self.positions,
            normals: self.normals,
            uvs: self.uvs,
            indices: self.indices,
            submesh: SubMesh {
                index_start: 0,
                index_count: table.total_indices(),
                first_vertex: 0,
                vertex_count: table.total_vertices(),
            },
            bounds,
        }
    }
}

/// Combines per-voxel fragments into one [`CombinedChunkMesh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMeshAssembler {
    workers: usize,
    parallel_threshold: usize,
}

impl Default for ChunkMeshAssembler {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ChunkMeshAssembler {
    /// Creates an assembler that fans phase 2 out to `workers` threads
    /// (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// One worker per logical CPU.
    pub fn with_defaults() -> Self {
        Self::new(num_cpus::get())
    }

    /// Assembler that never spawns threads, for callers that already
    /// parallelize across chunks.
    pub fn single_threaded() -> Self {
        Self::new(1)
    }

    /// Sets the fragment count below which phase 2 stays on the calling thread.
    pub fn with_parallel_threshold(mut self, fragments: usize) -> Self {
        self.parallel_threshold = fragments;
        self
    }

    /// Number of phase-2 worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Assembles `fragments` (in voxel iteration order) into one mesh.
    ///
    /// An empty slice yields an empty mesh. Any contract violation aborts the
    /// whole assembly.
    pub fn assemble(&self, fragments: &[MeshFragment]) -> Result<CombinedChunkMesh, AssemblyError> {
        self.assemble_in_order(fragments, 0..fragments.len())
    }

    /// Like [`assemble`](Self::assemble), but dispatches phase-2 jobs in
    /// `order`. Offsets always follow fragment order, so the output does not
    /// depend on `order`. Indices missing from `order` are dispatched last.
    fn assemble_in_order(
        &self,
        fragments: &[MeshFragment],
        order: impl IntoIterator<Item = usize>,
    ) -> Result<CombinedChunkMesh, AssemblyError> {
        let table = OffsetTable::build(fragments)?;
        let mut buffers = OutputBuffers::for_table(&table);

        {
            let mut slots: Vec<Option<CopyJob<'_>>> = buffers
                .split_jobs(fragments, &table)
                .into_iter()
                .map(Some)
                .collect();
            let mut jobs: Vec<CopyJob<'_>> = order
                .into_iter()
                .filter_map(|i| slots.get_mut(i).and_then(Option::take))
                .collect();
            jobs.extend(slots.into_iter().flatten());
            self.run_jobs(jobs);
        }

        let mesh = buffers.into_mesh(&table);
        debug!(
            fragments = fragments.len(),
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "assembled chunk mesh"
        );
        Ok(mesh)
    }

    /// Runs every job and returns once all have finished.
    fn run_jobs(&self, jobs: Vec<CopyJob<'_>>) {
        let workers = self.workers.min(jobs.len());
        if workers <= 1 || jobs.len() < self.parallel_threshold {
            jobs.into_iter().for_each(CopyJob::run);
            return;
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        for job in jobs {
            // `receiver` outlives this loop, so sending cannot fail.
            let _ = sender.send(job);
        }
        drop(sender);

        thread::scope(|scope| {
            for _ in 0..workers {
                let receiver = receiver.clone();
                scope.spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job.run();
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentIndices;

    /// A fragment of `seed % 3` quads, tagged by `seed` in its positions.
    /// Odd seeds use 32-bit indices.
    fn fragment(seed: usize) -> MeshFragment {
        let mut f = MeshFragment::new();
        let s = seed as f32;
        for q in 0..seed % 3 {
            let y = q as f32;
            f.push_quad(
                [[s, y, 0.0], [s, y + 1.0, 0.0], [s + 1.0, y + 1.0, 0.0], [s + 1.0, y, 0.0]],
                [0.0, 0.0, -1.0],
                [[s, 0.0], [s, 1.0], [s + 1.0, 1.0], [s + 1.0, 0.0]],
            );
        }
        if seed % 2 == 1 {
            let wide = (0..f.index_count())
                .filter_map(|i| f.indices.get(i))
                .collect();
            f.indices = FragmentIndices::U32(wide);
        }
        f
    }

    fn fragments(n: usize) -> Vec<MeshFragment> {
        (0..n).map(fragment).collect()
    }

    fn parallel(workers: usize) -> ChunkMeshAssembler {
        ChunkMeshAssembler::new(workers).with_parallel_threshold(0)
    }

    #[test]
    fn test_empty_input_yields_empty_mesh() {
        let mesh = ChunkMeshAssembler::new(4).assemble(&[]).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.index_count(), 0);
        assert_eq!(mesh.submesh, SubMesh::default());
        assert_eq!(mesh.bounds, None);
    }

    #[test]
    fn test_offsets_are_running_totals() {
        let frags = vec![fragment(1), fragment(0), fragment(2), fragment(3)];
        let table = OffsetTable::build(&frags).unwrap();
        let ranges = table.ranges();

        assert_eq!(ranges[0].vertices(), 0..4);
        assert_eq!(ranges[1].vertices(), 4..4, "empty fragment takes no space");
        assert_eq!(ranges[2].vertices(), 4..12);
        assert_eq!(ranges[3].vertices(), 12..12);
        assert_eq!(ranges[0].indices(), 0..6);
        assert_eq!(ranges[1].indices(), 6..6);
        assert_eq!(ranges[2].indices(), 6..18);
        assert_eq!(table.total_vertices(), 12);
        assert_eq!(table.total_indices(), 18);
    }

    #[test]
    fn test_ranges_are_disjoint() {
        let frags = fragments(50);
        let table = OffsetTable::build(&frags).unwrap();
        let ranges = table.ranges();
        for i in 0..ranges.len() {
            for j in (i + 1)..ranges.len() {
                let (a, b) = (ranges[i], ranges[j]);
                assert!(
                    a.vertices().end <= b.vertices().start,
                    "vertex ranges {i} and {j} overlap"
                );
                assert!(
                    a.indices().end <= b.indices().start,
                    "index ranges {i} and {j} overlap"
                );
            }
        }
    }

    #[test]
    fn test_indices_are_shifted_by_vertex_offset() {
        let frags = fragments(12);
        let table = OffsetTable::build(&frags).unwrap();
        let mesh = parallel(3).assemble(&frags).unwrap();

        for (fragment, range) in frags.iter().zip(table.ranges()) {
            for k in 0..fragment.index_count() {
                let src = fragment.indices.get(k).unwrap();
                let dst = mesh.indices[range.triangle_offset as usize + k];
                assert_eq!(dst, src + range.vertex_offset);
            }
            let start = range.vertex_offset as usize;
            let end = start + fragment.vertex_count();
            assert_eq!(&mesh.positions[start..end], fragment.positions.as_slice());
            assert_eq!(&mesh.normals[start..end], fragment.normals.as_slice());
            assert_eq!(&mesh.uvs[start..end], fragment.uvs.as_slice());
        }
    }

    #[test]
    fn test_no_dangling_indices() {
        let frags = fragments(200);
        let mesh = parallel(8).assemble(&frags).unwrap();
        let vertex_count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < vertex_count));
        assert_eq!(mesh.submesh.index_count as usize, mesh.index_count());
        assert_eq!(mesh.submesh.vertex_count as usize, mesh.vertex_count());
    }

    #[test]
    fn test_output_independent_of_dispatch_order() {
        let frags = fragments(97);
        let n = frags.len();
        let reference = ChunkMeshAssembler::single_threaded()
            .assemble(&frags)
            .unwrap();

        let orders: Vec<Vec<usize>> = vec![
            (0..n).rev().collect(),
            (0..n).step_by(2).chain((1..n).step_by(2)).collect(),
            (0..n).map(|i| (i * 37) % n).collect(),
        ];
        for workers in [1, 2, 8] {
            for order in &orders {
                let mesh = parallel(workers)
                    .assemble_in_order(&frags, order.iter().copied())
                    .unwrap();
                assert_eq!(mesh, reference, "workers={workers}");
                assert_eq!(mesh.position_bytes(), reference.position_bytes());
                assert_eq!(mesh.index_bytes(), reference.index_bytes());
            }
        }
    }

    #[test]
    fn test_partial_order_still_fills_every_range() {
        let frags = fragments(10);
        let reference = ChunkMeshAssembler::single_threaded()
            .assemble(&frags)
            .unwrap();
        let mesh = parallel(2).assemble_in_order(&frags, [9, 3]).unwrap();
        assert_eq!(mesh, reference);
    }

    #[test]
    fn test_bounds_recomputed_from_combined_vertices() {
        let frags = vec![fragment(2), fragment(7)];
        let mesh = ChunkMeshAssembler::new(2).assemble(&frags).unwrap();
        let bounds = mesh.bounds.unwrap();
        assert_eq!(bounds.min, glam::Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(bounds.max, glam::Vec3::new(8.0, 2.0, 0.0));
    }

    #[test]
    fn test_contract_violation_aborts_assembly() {
        let mut frags = fragments(6);
        frags[4].uvs.push([0.0, 0.0]);
        let err = parallel(4).assemble(&frags).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::AttributeLengthMismatch { fragment: 4, .. }
        ));
    }

    #[test]
    fn test_dangling_fragment_index_is_reported() {
        let mut frags = fragments(3);
        frags[2].indices = FragmentIndices::U16(vec![0, 1, 9]);
        assert_eq!(
            ChunkMeshAssembler::new(1).assemble(&frags),
            Err(AssemblyError::IndexOutOfRange {
                fragment: 2,
                index: 9,
                vertex_count: 8
            })
        );
    }

    #[test]
    fn test_all_empty_fragments() {
        let frags = vec![MeshFragment::new(); 5];
        let mesh = parallel(4).assemble(&frags).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.index_count(), 0);
    }

    #[test]
    fn test_worker_count_is_at_least_one() {
        assert_eq!(ChunkMeshAssembler::new(0).workers(), 1);
        assert!(ChunkMeshAssembler::with_defaults().workers() >= 1);
    }
}
