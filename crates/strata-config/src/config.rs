//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_terrain::TerrainSettings;
use strata_voxel::ChunkDescriptor;

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World seed and chunk layout.
    pub world: WorldConfig,
    /// Noise layers driving classification.
    pub terrain: TerrainSettings,
    /// Mesh assembly threading.
    pub meshing: MeshingConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for noise and per-chunk randomness.
    pub seed: u64,
    /// Voxels per chunk along x, y and z.
    pub chunk_dimensions: (u32, u32, u32),
    /// Number of chunk columns along x and z.
    pub chunk_columns: (u32, u32),
    /// Chunks stacked in each column, starting at world y = 0.
    pub chunks_per_column: u32,
}

/// Mesh assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshingConfig {
    /// Chunk build threads (0 = one per logical CPU).
    pub worker_threads: usize,
    /// Chunks that may wait for a build thread at once.
    pub queue_capacity: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            chunk_dimensions: (16, 16, 16),
            chunk_columns: (4, 4),
            chunks_per_column: 3,
        }
    }
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            queue_capacity: 64,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl MeshingConfig {
    /// Worker threads to spawn, resolving 0 to the logical CPU count.
    pub fn resolved_workers(&self) -> usize {
        match self.worker_threads {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

impl WorldConfig {
    /// Chunk dimensions as an array.
    pub fn dimensions(&self) -> [u32; 3] {
        let (w, h, d) = self.chunk_dimensions;
        [w, h, d]
    }

    /// Every chunk of the layout, column by column, bottom chunk first.
    pub fn chunk_descriptors(&self) -> Result<Vec<ChunkDescriptor>, ConfigError> {
        let (cols_x, cols_z) = self.chunk_columns;
        if cols_x == 0 || cols_z == 0 || self.chunks_per_column == 0 {
            return Err(ConfigError::EmptyWorld {
                columns: self.chunk_columns,
                chunks_per_column: self.chunks_per_column,
            });
        }

        let dimensions = self.dimensions();
        let mut chunks = Vec::new();
        for cx in 0..cols_x {
            for cz in 0..cols_z {
                for cy in 0..self.chunks_per_column {
                    let position = [cx, cy, cz];
                    let mut origin = [0i32; 3];
                    for axis in 0..3 {
                        origin[axis] = u64::from(position[axis])
                            .checked_mul(u64::from(dimensions[axis]))
                            .and_then(|v| i32::try_from(v).ok())
                            .ok_or(ConfigError::WorldTooLarge { position })?;
                    }
                    chunks.push(ChunkDescriptor::new(origin, dimensions)?);
                }
            }
        }
        Ok(chunks)
    }
}

/// Default directory for `config.ron`: the platform config dir joined with
/// `strata`, or the working directory if the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("strata"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Validate ---

impl Config {
    /// Checks chunk dimensions, world layout and every noise layer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ChunkDescriptor::new([0, 0, 0], self.world.dimensions())?;
        self.terrain.validate()?;
        self.world.chunk_descriptors()?;
        Ok(())
    }
}

// --- Persistence ---

fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
    ron::from_str(&text).map_err(ConfigError::ParseError)
}

impl Config {
    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_path(config_dir);
        if !path.exists() {
            let defaults = Self::default();
            defaults.save(config_dir)?;
            log::info!("Wrote default config to {}", path.display());
            return Ok(defaults);
        }

        let config = read_config(&path)?;
        log::info!("Read config from {}", path.display());
        Ok(config)
    }

    /// Writes this config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;
        std::fs::write(config_path(config_dir), text).map_err(ConfigError::WriteError)
    }

    /// Re-reads the file. `Some` carries the new config only when it differs
    /// from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_path(config_dir))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Config changed on disk (seed {} -> {})", self.world.seed, fresh.world.seed);
        Ok(Some(fresh))
    }
}
