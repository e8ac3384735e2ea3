//! Chunk build pipeline: classify a chunk, mesh its voxels, assemble the
//! combined mesh. Runs synchronously via [`ChunkBuilder`] or across a thread
//! pool via [`ChunkBuildPool`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use strata_terrain::{TerrainError, TerrainSettings, VoxelClassifier, noise_seed};
use strata_voxel::{ChunkDescriptor, VoxelGrid};
use thiserror::Error;
use tracing::{debug, warn};

use crate::assembler::ChunkMeshAssembler;
use crate::combined::CombinedChunkMesh;
use crate::error::AssemblyError;
use crate::supplier::{VoxelMeshSupplier, collect_fragments};

/// Why a chunk could not be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The terrain settings were rejected before any voxel work.
    #[error("terrain: {0}")]
    Terrain(#[from] TerrainError),
    /// A supplied fragment broke the mesh contract.
    #[error("assembly: {0}")]
    Assembly(#[from] AssemblyError),
}

/// A classified and meshed chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltChunk {
    /// The chunk that was built.
    pub descriptor: ChunkDescriptor,
    /// Material of every voxel.
    pub grid: VoxelGrid,
    /// All visible geometry of the chunk, in chunk-local coordinates.
    pub mesh: CombinedChunkMesh,
}

/// Builds chunks of one world: fixed settings, seed, supplier and assembler.
pub struct ChunkBuilder<S> {
    classifier: VoxelClassifier,
    supplier: S,
    assembler: ChunkMeshAssembler,
    world_seed: u64,
}

impl<S: VoxelMeshSupplier> ChunkBuilder<S> {
    /// Validates `settings` and prepares the noise for `world_seed`.
    pub fn new(
        settings: TerrainSettings,
        world_seed: u64,
        supplier: S,
        assembler: ChunkMeshAssembler,
    ) -> Result<Self, BuildError> {
        let classifier = VoxelClassifier::new(settings, noise_seed(world_seed))?;
        Ok(Self {
            classifier,
            supplier,
            assembler,
            world_seed,
        })
    }

    /// Seed every chunk RNG is derived from.
    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    /// The classifier that fills each chunk's grid.
    pub fn classifier(&self) -> &VoxelClassifier {
        &self.classifier
    }

    /// The per-voxel fragment source.
    pub fn supplier(&self) -> &S {
        &self.supplier
    }

    /// The assembler that merges fragments into one mesh.
    pub fn assembler(&self) -> &ChunkMeshAssembler {
        &self.assembler
    }

    /// Classifies `descriptor`, collects one fragment per visible voxel in
    /// grid order and assembles them.
    ///
    /// The same builder and descriptor always produce the same chunk.
    pub fn build(&self, descriptor: ChunkDescriptor) -> Result<BuiltChunk, BuildError> {
        build_with(
            &self.classifier,
            self.world_seed,
            &self.supplier,
            &self.assembler,
            descriptor,
        )
    }
}

/// One-shot build of a single chunk.
///
/// Prefer a [`ChunkBuilder`] when building many chunks of the same world.
pub fn build_chunk<S>(
    descriptor: ChunkDescriptor,
    settings: &TerrainSettings,
    world_seed: u64,
    supplier: &S,
    assembler: &ChunkMeshAssembler,
) -> Result<BuiltChunk, BuildError>
where
    S: VoxelMeshSupplier + ?Sized,
{
    let classifier = VoxelClassifier::new(*settings, noise_seed(world_seed))?;
    build_with(&classifier, world_seed, supplier, assembler, descriptor)
}

fn build_with<S>(
    classifier: &VoxelClassifier,
    world_seed: u64,
    supplier: &S,
    assembler: &ChunkMeshAssembler,
    descriptor: ChunkDescriptor,
) -> Result<BuiltChunk, BuildError>
where
    S: VoxelMeshSupplier + ?Sized,
{
    let grid = classifier.classify_seeded(&descriptor, world_seed);
    let fragments = collect_fragments(&grid, supplier);
    let mesh = assembler.assemble(&fragments)?;

    debug!(
        origin = ?descriptor.origin(),
        fragments = fragments.len(),
        vertices = mesh.vertex_count(),
        "built chunk"
    );

    Ok(BuiltChunk {
        descriptor,
        grid,
        mesh,
    })
}

/// Outcome of one chunk submitted to a [`ChunkBuildPool`].
#[derive(Debug)]
pub struct ChunkBuildResult {
    /// The submitted chunk.
    pub descriptor: ChunkDescriptor,
    /// The finished chunk, or why it failed. Failed chunks carry no data.
    pub outcome: Result<BuiltChunk, BuildError>,
    /// Wall time of the build on its worker, in microseconds.
    pub build_time_us: u64,
}

/// Builds chunks on a pool of background threads.
///
/// Submit descriptors with [`submit`](Self::submit) and collect finished
/// chunks with [`drain_results`](Self::drain_results). Each worker builds
/// whole chunks, so a [`ChunkBuilder`] whose assembler is
/// [`single_threaded`](ChunkMeshAssembler::single_threaded) avoids
/// oversubscribing the CPU.
pub struct ChunkBuildPool {
    task_sender: Option<Sender<ChunkDescriptor>>,
    result_receiver: Receiver<ChunkBuildResult>,
    worker_handles: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
}

impl ChunkBuildPool {
    /// Spawns `worker_count` threads (at least one) sharing `builder`.
    /// At most `queue_capacity` chunks wait for a worker at any time.
    pub fn new<S>(builder: ChunkBuilder<S>, worker_count: usize, queue_capacity: usize) -> Self
    where
        S: VoxelMeshSupplier + 'static,
    {
        let (task_sender, task_receiver) = bounded::<ChunkDescriptor>(queue_capacity.max(1));
        let (result_sender, result_receiver) = unbounded::<ChunkBuildResult>();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let builder = Arc::new(builder);

        let worker_count = worker_count.max(1);
        let mut worker_handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let builder = Arc::clone(&builder);

            let handle = std::thread::Builder::new()
                .name(format!("chunk-build-{i}"))
                .spawn(move || {
                    while let Ok(descriptor) = receiver.recv() {
                        let start = Instant::now();
                        let outcome = builder.build(descriptor);
                        let build_time_us = start.elapsed().as_micros() as u64;

                        if let Err(err) = &outcome {
                            warn!(origin = ?descriptor.origin(), %err, "chunk build failed");
                        }

                        // Settle the count before the result becomes observable.
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                        let _ = sender.send(ChunkBuildResult {
                            descriptor,
                            outcome,
                            build_time_us,
                        });
                    }
                })
                .expect("Failed to spawn chunk build worker thread");
            worker_handles.push(handle);
        }

        Self {
            task_sender: Some(task_sender),
            result_receiver,
            worker_handles,
            in_flight,
        }
    }

    /// One worker per logical CPU.
    pub fn with_defaults<S>(builder: ChunkBuilder<S>) -> Self
    where
        S: VoxelMeshSupplier + 'static,
    {
        let workers = num_cpus::get();
        Self::new(builder, workers, workers * 4)
    }

    /// Queues a chunk for building.
    ///
    /// Returns `Err(descriptor)` if the queue is full or the pool has been
    /// shut down.
    pub fn submit(&self, descriptor: ChunkDescriptor) -> Result<(), ChunkDescriptor> {
        let Some(sender) = &self.task_sender else {
            return Err(descriptor);
        };
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        sender.try_send(descriptor).map_err(|e| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            e.into_inner()
        })
    }

    /// All results finished since the last call.
    pub fn drain_results(&self) -> Vec<ChunkBuildResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Chunks queued or being built.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Stops accepting work, lets workers finish what is queued, and joins them.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let name = handle.thread().name().unwrap_or("chunk-build").to_owned();
            if handle.join().is_err() {
                warn!(worker = %name, "chunk build worker panicked");
            }
        }
    }
}

impl Drop for ChunkBuildPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
