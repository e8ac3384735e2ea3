//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Voxel terrain chunk builder")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Chunk width in voxels (x).
    #[arg(long)]
    pub chunk_width: Option<u32>,

    /// Chunk height in voxels (y).
    #[arg(long)]
    pub chunk_height: Option<u32>,

    /// Chunk depth in voxels (z).
    #[arg(long)]
    pub chunk_depth: Option<u32>,

    /// Chunk build threads (0 = one per logical CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        let dims = &mut self.world.chunk_dimensions;
        if let Some(w) = args.chunk_width {
            dims.0 = w;
        }
        if let Some(h) = args.chunk_height {
            dims.1 = h;
        }
        if let Some(d) = args.chunk_depth {
            dims.2 = d;
        }
        if let Some(workers) = args.workers {
            self.meshing.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
