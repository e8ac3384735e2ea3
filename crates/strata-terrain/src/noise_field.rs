//! Multi-octave fractal Brownian motion (fBm) over Perlin noise, in 2D and 3D.
//!
//! Both variants share the same octave semantics: octave `i` samples at
//! `scale * 2^i` with weight `0.5^i`, the weighted sum is normalized by the
//! total weight, then multiplied by `height_scale` and shifted by
//! `height_offset`. Evaluation is a pure function of the coordinates, the
//! parameters, and the field's seed.

use noise::{NoiseFn, Perlin};

use crate::error::TerrainError;
use crate::settings::NoiseSettings;

const LACUNARITY: f64 = 2.0;
const PERSISTENCE: f64 = 0.5;

/// Largest magnitude a frequency-scaled coordinate may reach before Perlin's
/// lattice arithmetic stops being exact (2^52).
pub const MAX_SAMPLE_COORDINATE: f64 = 4_503_599_627_370_496.0;

/// Largest top-octave frequency usable across the whole `i32` world.
pub(crate) const MAX_WORLD_FREQUENCY: f64 = MAX_SAMPLE_COORDINATE / 2_147_483_648.0;

/// Frequency of the highest octave, or 0 for zero octaves.
pub(crate) fn top_frequency(octaves: u32, scale: f64) -> f64 {
    match octaves {
        0 => 0.0,
        n => {
            let exponent = i32::try_from(n - 1).unwrap_or(i32::MAX);
            scale.abs() * LACUNARITY.powi(exponent)
        }
    }
}

/// Rejects coordinates that are non-finite or that the top octave would push
/// past [`MAX_SAMPLE_COORDINATE`].
fn check_sample_range(coordinates: &[f64], octaves: u32, scale: f64) -> Result<(), TerrainError> {
    if let Some(&value) = coordinates.iter().find(|c| !c.is_finite()) {
        return Err(TerrainError::NonFiniteCoordinate { value });
    }
    if octaves == 0 {
        return Ok(());
    }

    let frequency = top_frequency(octaves, scale);
    let largest = coordinates.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    let reach = largest * frequency;
    if reach.is_nan() || reach > MAX_SAMPLE_COORDINATE {
        return Err(TerrainError::SampleOutOfRange { frequency, reach });
    }
    Ok(())
}

/// Seeded coherent-noise source for terrain layers.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perlin: Perlin,
    seed: u32,
}

impl NoiseField {
    /// Creates a field over Perlin noise with the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    /// The seed this field was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Single-octave 2D sample mapped to `[0, 1]`. Coordinates must be finite
    /// and within [`MAX_SAMPLE_COORDINATE`].
    #[inline]
    pub(crate) fn base_2d(&self, x: f64, z: f64) -> f64 {
        to_unit(self.perlin.get([x, z]))
    }

    /// Single-octave 3D sample mapped to `[0, 1]`. Same preconditions as
    /// [`base_2d`](Self::base_2d).
    #[inline]
    pub(crate) fn base_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        to_unit(self.perlin.get([x, y, z]))
    }

    /// 2D fBm. Returns a value in `[height_offset, height_offset + height_scale]`
    /// (reversed when `height_scale` is negative).
    ///
    /// Fails if a coordinate is not finite, or if the top octave would sample
    /// beyond [`MAX_SAMPLE_COORDINATE`] (this also catches a non-finite `scale`).
    pub fn evaluate_2d(
        &self,
        x: f64,
        z: f64,
        octaves: u32,
        scale: f64,
        height_scale: f64,
        height_offset: f64,
    ) -> Result<f64, TerrainError> {
        check_sample_range(&[x, z], octaves, scale)?;
        Ok(self.fbm_2d(x, z, octaves, scale, height_scale, height_offset))
    }

    fn fbm_2d(
        &self,
        x: f64,
        z: f64,
        octaves: u32,
        scale: f64,
        height_scale: f64,
        height_offset: f64,
    ) -> f64 {
        let normalized = fbm(octaves, scale, |f| self.base_2d(x * f, z * f));
        normalized.map_or(height_offset, |n| n * height_scale + height_offset)
    }

    /// 3D fBm with the same octave semantics and failure cases as
    /// [`evaluate_2d`](Self::evaluate_2d).
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_3d(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        scale: f64,
        height_scale: f64,
        height_offset: f64,
    ) -> Result<f64, TerrainError> {
        check_sample_range(&[x, y, z], octaves, scale)?;
        Ok(self.fbm_3d(x, y, z, octaves, scale, height_scale, height_offset))
    }

    #[allow(clippy::too_many_arguments)]
    fn fbm_3d(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        scale: f64,
        height_scale: f64,
        height_offset: f64,
    ) -> f64 {
        let normalized = fbm(octaves, scale, |f| self.base_3d(x * f, y * f, z * f));
        normalized.map_or(height_offset, |n| n * height_scale + height_offset)
    }

    /// fBm for a validated layer at an `i32` world column. Validation bounds
    /// the top frequency so any such coordinate stays in range.
    #[inline]
    pub(crate) fn sample_2d(&self, x: i32, z: i32, settings: &NoiseSettings) -> f64 {
        let (x, z) = (f64::from(x), f64::from(z));
        self.fbm_2d(
            x,
            z,
            settings.octaves,
            settings.scale,
            settings.height_scale,
            settings.height_offset,
        )
    }

    /// 3D counterpart of [`sample_2d`](Self::sample_2d).
    #[inline]
    pub(crate) fn sample_3d(&self, x: i32, y: i32, z: i32, settings: &NoiseSettings) -> f64 {
        let (x, y, z) = (f64::from(x), f64::from(y), f64::from(z));
        self.fbm_3d(
            x,
            y,
            z,
            settings.octaves,
            settings.scale,
            settings.height_scale,
            settings.height_offset,
        )
    }
}

/// Weighted octave sum normalized to `[0, 1]`, or `None` for zero octaves.
#[inline]
fn fbm(octaves: u32, scale: f64, mut sample: impl FnMut(f64) -> f64) -> Option<f64> {
    if octaves == 0 {
        return None;
    }

    let mut total = 0.0;
    let mut weight = 0.0;
    let mut frequency = scale;
    let mut amplitude = 1.0;

    for _ in 0..octaves {
        total += sample(frequency) * amplitude;
        weight += amplitude;

        frequency *= LACUNARITY;
        amplitude *= PERSISTENCE;
    }

    Some(total / weight)
}

#[inline]
fn to_unit(v: f64) -> f64 {
    (v * 0.5 + 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_single_octave_matches_reference_perlin() {
        let field = NoiseField::new(7);
        let reference = Perlin::new(7);

        // The origin is a lattice point, where Perlin noise is exactly zero.
        let at_origin = field.evaluate_2d(0.0, 0.0, 1, 0.01, 10.0, 0.0).unwrap();
        assert!((at_origin - 10.0 * field.base_2d(0.0, 0.0)).abs() < EPSILON);
        assert!((at_origin - 5.0).abs() < EPSILON, "got {at_origin}");

        let (x, z) = (37.0, 91.0);
        let expected = 10.0 * (reference.get([x * 0.01, z * 0.01]) * 0.5 + 0.5);
        let h = field.evaluate_2d(x, z, 1, 0.01, 10.0, 0.0).unwrap();
        assert!((h - expected).abs() < EPSILON, "{h} vs {expected}");
    }

    #[test]
    fn test_zero_octaves_is_flat_plane() {
        let field = NoiseField::new(1);
        for i in 0..50 {
            let x = i as f64 * 3.7;
            assert_eq!(field.evaluate_2d(x, -x, 0, 0.1, 99.0, -4.5).unwrap(), -4.5);
            assert_eq!(field.evaluate_3d(x, x, -x, 0, 0.1, 99.0, 2.0).unwrap(), 2.0);
        }
    }

    #[test]
    fn test_determinism_same_seed_same_coord() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        for i in 0..200 {
            let x = i as f64 * 1.3;
            let z = i as f64 * -0.7;
            assert_eq!(
                a.evaluate_2d(x, z, 6, 0.02, 30.0, 1.0).unwrap(),
                b.evaluate_2d(x, z, 6, 0.02, 30.0, 1.0).unwrap()
            );
            assert_eq!(
                a.evaluate_3d(x, z, x, 3, 0.05, 1.0, 0.0).unwrap(),
                b.evaluate_3d(x, z, x, 3, 0.05, 1.0, 0.0).unwrap()
            );
        }
    }

    #[test]
    fn test_different_seeds_produce_different_fields() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(999);
        let differing = (0..100)
            .filter(|&i| {
                let x = 0.37 + i as f64 * 5.1;
                let ha = a.evaluate_2d(x, x, 3, 0.05, 1.0, 0.0).unwrap();
                let hb = b.evaluate_2d(x, x, 3, 0.05, 1.0, 0.0).unwrap();
                (ha - hb).abs() > EPSILON
            })
            .count();
        assert!(differing > 0, "different seeds should change the field");
    }

    #[test]
    fn test_output_within_scaled_range() {
        let field = NoiseField::new(3);
        for i in 0..400 {
            let x = i as f64 * 0.91;
            let z = i as f64 * 1.77;
            let h = field.evaluate_2d(x, z, 8, 0.03, 20.0, -5.0).unwrap();
            assert!((-5.0..=15.0).contains(&h), "2D value {h} out of range");
            let c = field.evaluate_3d(x, z, x - z, 4, 0.1, 2.0, 1.0).unwrap();
            assert!((1.0..=3.0).contains(&c), "3D value {c} out of range");
        }
    }

    #[test]
    fn test_3d_single_octave_scales_base_sample() {
        let field = NoiseField::new(11);
        let (x, y, z) = (12.5, 3.25, -8.0);
        let expected = 4.0 * field.base_3d(x * 0.1, y * 0.1, z * 0.1) + 1.5;
        let got = field.evaluate_3d(x, y, z, 1, 0.1, 4.0, 1.5).unwrap();
        assert!((got - expected).abs() < EPSILON);
    }

    #[test]
    fn test_more_octaves_adds_detail() {
        let field = NoiseField::new(7);
        let step = 0.5;
        let (mut diff_1, mut diff_8) = (0.0, 0.0);
        for i in 0..1000 {
            let x = i as f64 * step;
            diff_1 += (field.evaluate_2d(x + step, 0.3, 1, 0.01, 100.0, 0.0).unwrap()
                - field.evaluate_2d(x, 0.3, 1, 0.01, 100.0, 0.0).unwrap())
            .abs();
            diff_8 += (field.evaluate_2d(x + step, 0.3, 8, 0.01, 100.0, 0.0).unwrap()
                - field.evaluate_2d(x, 0.3, 8, 0.01, 100.0, 0.0).unwrap())
            .abs();
        }
        assert!(
            diff_8 > diff_1,
            "8 octaves should vary faster than 1: {diff_8} vs {diff_1}"
        );
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let field = NoiseField::new(1);
        assert!(matches!(
            field.evaluate_2d(f64::NAN, 0.0, 2, 0.1, 1.0, 0.0),
            Err(TerrainError::NonFiniteCoordinate { .. })
        ));
        assert!(matches!(
            field.evaluate_3d(0.0, f64::INFINITY, 0.0, 0, 0.1, 1.0, 0.0),
            Err(TerrainError::NonFiniteCoordinate { .. })
        ));
    }

    #[test]
    fn test_excessive_frequency_is_an_error_not_a_panic() {
        let field = NoiseField::new(1);
        assert!(matches!(
            field.evaluate_2d(0.0, 0.0, 1100, 0.01, 1.0, 0.0),
            Err(TerrainError::SampleOutOfRange { .. })
        ));
        assert!(matches!(
            field.evaluate_3d(1.0e9, 0.0, 0.0, 64, 1.0, 1.0, 0.0),
            Err(TerrainError::SampleOutOfRange { .. })
        ));
        assert!(matches!(
            field.evaluate_2d(3.0, 4.0, 2, f64::NAN, 1.0, 0.0),
            Err(TerrainError::SampleOutOfRange { .. })
        ));
    }

    #[test]
    fn test_top_frequency() {
        assert_eq!(top_frequency(0, 0.5), 0.0);
        assert_eq!(top_frequency(1, 0.5), 0.5);
        assert_eq!(top_frequency(4, 0.5), 4.0);
        assert!(top_frequency(u32::MAX, 0.01).is_infinite());
    }

    #[test]
    fn test_sample_helpers_forward_settings() {
        let field = NoiseField::new(5);
        let s = NoiseSettings::new(3, 0.04, 12.0, 2.0, 0.5);
        assert_eq!(
            field.sample_2d(10, 20, &s),
            field.evaluate_2d(10.0, 20.0, 3, 0.04, 12.0, 2.0).unwrap()
        );
        assert_eq!(
            field.sample_3d(10, 5, 20, &s),
            field.evaluate_3d(10.0, 5.0, 20.0, 3, 0.04, 12.0, 2.0).unwrap()
        );
    }
}
