//! Builds a block of terrain chunks and logs what came out.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo -- --seed 7 --chunk-height 32`.

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use strata_config::{CliArgs, Config, ConfigError, default_config_dir};
use strata_mesh::{
    BuildError, BuiltChunk, ChunkBuildPool, ChunkBuilder, ChunkMeshAssembler, FaceCullingSupplier,
};
use strata_voxel::{ChunkDescriptor, Material};
use thiserror::Error;
use tracing::{info, warn};

/// How long to wait for the pool before giving up on outstanding chunks.
const BUILD_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("{outstanding} chunks still building after {waited:?}")]
    Timeout { outstanding: usize, waited: Duration },
}

/// Running totals over finished chunks.
#[derive(Default)]
struct BuildStats {
    built: usize,
    failed: usize,
    vertices: usize,
    triangles: usize,
    build_time_us: u64,
    materials: BTreeMap<Material, usize>,
}

impl BuildStats {
    fn record(&mut self, chunk: &BuiltChunk, build_time_us: u64) {
        self.built += 1;
        self.vertices += chunk.mesh.vertex_count();
        self.triangles += chunk.mesh.index_count() / 3;
        self.build_time_us += build_time_us;
        for (_, material) in chunk.grid.iter() {
            *self.materials.entry(material).or_default() += 1;
        }
    }

    fn log(&self, elapsed: Duration) {
        let mean_us = self.build_time_us / self.built.max(1) as u64;
        info!(
            built = self.built,
            failed = self.failed,
            vertices = self.vertices,
            triangles = self.triangles,
            mean_build_us = mean_us,
            wall_ms = elapsed.as_millis() as u64,
            "chunk build finished"
        );
        for (material, count) in &self.materials {
            info!(material = material.name(), voxels = count, "material total");
        }
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("strata: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), DemoError> {
    config.validate()?;
    let chunks = config.world.chunk_descriptors()?;

    let builder = ChunkBuilder::new(
        config.terrain,
        config.world.seed,
        FaceCullingSupplier::default(),
        ChunkMeshAssembler::single_threaded(),
    )?;
    let workers = config.meshing.resolved_workers();
    let pool = ChunkBuildPool::new(builder, workers, config.meshing.queue_capacity);

    info!(
        seed = config.world.seed,
        chunks = chunks.len(),
        workers,
        dimensions = ?config.world.dimensions(),
        "building world"
    );

    let start = Instant::now();
    let stats = build_all(&pool, chunks)?;
    stats.log(start.elapsed());
    Ok(())
}

/// Feeds `chunks` into the pool as queue space frees up and collects every
/// result.
fn build_all(pool: &ChunkBuildPool, chunks: Vec<ChunkDescriptor>) -> Result<BuildStats, DemoError> {
    let total = chunks.len();
    let mut pending = chunks.into_iter().peekable();
    let mut stats = BuildStats::default();
    let deadline = Instant::now() + BUILD_TIMEOUT;

    while stats.built + stats.failed < total {
        while let Some(&next) = pending.peek() {
            if pool.submit(next).is_err() {
                break;
            }
            pending.next();
        }

        for result in pool.drain_results() {
            match &result.outcome {
                Ok(chunk) => stats.record(chunk, result.build_time_us),
                Err(e) => {
                    warn!(origin = ?result.descriptor.origin(), %e, "skipping chunk");
                    stats.failed += 1;
                }
            }
        }

        if Instant::now() > deadline {
            return Err(DemoError::Timeout {
                outstanding: total - stats.built - stats.failed,
                waited: BUILD_TIMEOUT,
            });
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    Ok(stats)
}
