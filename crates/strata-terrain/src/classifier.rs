//! Layered, priority-ordered voxel classification.
//!
//! Rules are checked per voxel in a fixed order and the first match wins:
//!
//! 1. world-y 0 is bedrock;
//! 2. cave noise below the cave threshold carves air;
//! 3. the surface height itself is grass;
//! 4. inside the ore band, a random draw gates ore;
//! 5. below the stone ceiling, a random draw gates stone;
//! 6. anything else below the surface is dirt;
//! 7. everything above is air.
//!
//! Random draws are taken only when a gated rule is reached, in flat index
//! order, so a reseeded RNG reproduces the same grid.

use rand::Rng;
use strata_voxel::{ChunkDescriptor, Material, VoxelGrid};
use tracing::debug;

use crate::error::TerrainError;
use crate::noise_field::NoiseField;
use crate::seed::chunk_rng;
use crate::settings::TerrainSettings;

/// Column-wide heights sampled once per `(x, z)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnHeights {
    /// Height of the grass voxel.
    pub surface: i32,
    /// Stone is possible strictly below this.
    pub stone: i32,
    /// Ore is possible strictly below this...
    pub ore_top: i32,
    /// ...and strictly above this.
    pub ore_bottom: i32,
}

/// Assigns a [`Material`] to every voxel of a chunk.
///
/// Holds validated settings and the noise field; cheap to share across
/// threads, and every method takes `&self`.
#[derive(Clone, Debug)]
pub struct VoxelClassifier {
    settings: TerrainSettings,
    noise: NoiseField,
}

impl VoxelClassifier {
    /// Validates `settings` and builds a classifier over a seeded noise field.
    pub fn new(settings: TerrainSettings, noise_seed: u32) -> Result<Self, TerrainError> {
        settings.validate()?;
        Ok(Self {
            settings,
            noise: NoiseField::new(noise_seed),
        })
    }

    /// The layer settings in use.
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// The noise field in use.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Samples the 2D layers for one world column. Heights truncate toward zero.
    pub fn column(&self, wx: i32, wz: i32) -> ColumnHeights {
        let s = &self.settings;
        ColumnHeights {
            surface: self.noise.sample_2d(wx, wz, &s.surface) as i32,
            stone: self.noise.sample_2d(wx, wz, &s.stone) as i32,
            ore_top: self.noise.sample_2d(wx, wz, &s.ore_top) as i32,
            ore_bottom: self.noise.sample_2d(wx, wz, &s.ore_bottom) as i32,
        }
    }

    /// Classifies a single voxel at world coordinate `world`.
    pub fn classify_voxel<R: Rng + ?Sized>(
        &self,
        world: [i32; 3],
        column: &ColumnHeights,
        rng: &mut R,
    ) -> Material {
        let [wx, wy, wz] = world;
        let s = &self.settings;

        if wy == 0 {
            return Material::Bedrock;
        }

        let cave = self.noise.sample_3d(wx, wy, wz, &s.cave);
        if cave < s.cave.probability {
            return Material::Air;
        }

        if wy == column.surface {
            return Material::Grass;
        }

        if wy < column.ore_top
            && wy > column.ore_bottom
            && rng.random::<f64>() <= s.ore_top.probability
        {
            return Material::Ore;
        }

        if wy < column.stone && rng.random::<f64>() <= s.stone.probability {
            return Material::Stone;
        }

        if wy < column.surface {
            Material::Dirt
        } else {
            Material::Air
        }
    }

    /// Classifies every voxel of `chunk`, drawing randomness from `rng` in
    /// flat index order.
    pub fn classify<R: Rng + ?Sized>(&self, chunk: &ChunkDescriptor, rng: &mut R) -> VoxelGrid {
        let [ox, _, oz] = chunk.origin();
        let width = chunk.width() as usize;

        let columns: Vec<ColumnHeights> = (0..chunk.depth())
            .flat_map(|z| (0..chunk.width()).map(move |x| (x, z)))
            .map(|(x, z)| self.column(ox + x as i32, oz + z as i32))
            .collect();

        let grid = VoxelGrid::from_fn(*chunk, |x, y, z| {
            let column = &columns[x as usize + width * z as usize];
            self.classify_voxel(chunk.world_coords(x, y, z), column, &mut *rng)
        });

        debug!(
            origin = ?chunk.origin(),
            solid = grid.solid_count(),
            volume = chunk.volume(),
            "classified chunk"
        );
        grid
    }

    /// Classifies `chunk` with an RNG derived from `world_seed` and the chunk's
    /// placement. Identical inputs always produce an identical grid.
    pub fn classify_seeded(&self, chunk: &ChunkDescriptor, world_seed: u64) -> VoxelGrid {
        let mut rng = chunk_rng(world_seed, chunk);
        self.classify(chunk, &mut rng)
    }
}
