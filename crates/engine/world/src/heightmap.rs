//! Noise-generated terrain heights
//!
//! A [`Heightmap`] is a square grid of heights, row-major with rows running
//! along +Z. [`noise_landscape`] fills one from coherent noise sampled once per
//! grid point; [`HeightRemap`] rules reshape it afterwards.

use noise::{Billow, Fbm, MultiFractal, NoiseFn, Perlin};
use serde::Deserialize;

use crate::error::LevelError;

/// Noise family used for a landscape
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    /// Smooth rolling hills (fractal Brownian motion)
    #[default]
    Fractal,
    /// Sharp ridged creases
    Turbulence,
}

/// Parameters of a generated landscape
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NoiseParams {
    /// Samples per side
    pub size: usize,
    pub seed: u32,
    /// Noise frequency per sample step
    pub frequency: f64,
    pub octaves: usize,
    #[serde(default)]
    pub kind: NoiseKind,
    /// Peak-to-peak height range
    pub scale: f32,
}

/// Reshaping rule applied to every height after generation
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HeightRemap {
    /// Raise every height above `threshold` by `offset`
    OffsetAbove { threshold: f32, offset: f32 },
    Clamp { min: f32, max: f32 },
}

impl HeightRemap {
    /// Reject rules with non-finite values or an inverted clamp range
    pub fn validate(&self) -> Result<(), LevelError> {
        match *self {
            HeightRemap::OffsetAbove { threshold, offset } => {
                if !(threshold.is_finite() && offset.is_finite()) {
                    return Err(LevelError::InvalidTerrain(format!(
                        "offset_above needs finite values, got threshold {threshold} offset {offset}"
                    )));
                }
            }
            HeightRemap::Clamp { min, max } => {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(LevelError::InvalidTerrain(format!(
                        "clamp range {min}..{max} is not a finite, ordered range"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn apply(&self, height: f32) -> f32 {
        match *self {
            HeightRemap::OffsetAbove { threshold, offset } if height > threshold => height + offset,
            HeightRemap::OffsetAbove { .. } => height,
            // Unlike `f32::clamp`, never panics on a range that failed validation
            HeightRemap::Clamp { min, max } => height.max(min).min(max),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    size: usize,
    heights: Vec<f32>,
}

impl Heightmap {
    /// Every sample at `height`
    pub fn flat(size: usize, height: f32) -> Self {
        Self {
            size,
            heights: vec![height; size * size],
        }
    }

    pub fn from_heights(size: usize, heights: Vec<f32>) -> Result<Self, LevelError> {
        if heights.len() != size * size {
            return Err(LevelError::InvalidTerrain(format!(
                "{} heights for a {size}x{size} heightmap",
                heights.len()
            )));
        }
        Ok(Self { size, heights })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Height at column `col` (along +X) and row `row` (along +Z)
    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.heights[row * self.size + col]
    }

    /// Apply `f` to every height
    pub fn map_heights(mut self, f: impl Fn(f32) -> f32) -> Self {
        for height in &mut self.heights {
            *height = f(*height);
        }
        self
    }

    /// Apply remap rules in order
    pub fn remapped(self, rules: &[HeightRemap]) -> Self {
        rules
            .iter()
            .fold(self, |map, rule| map.map_heights(|h| rule.apply(h)))
    }

    /// Lowest and highest height
    pub fn range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }
}

/// Generate a landscape centred on height zero
///
/// The same parameters always produce the same heights.
pub fn noise_landscape(params: &NoiseParams) -> Result<Heightmap, LevelError> {
    if params.size < 2 {
        return Err(LevelError::InvalidTerrain(format!(
            "heightmap size {} is below 2",
            params.size
        )));
    }
    if params.octaves == 0 {
        return Err(LevelError::InvalidTerrain("noise needs at least one octave".into()));
    }
    if params.frequency.is_nan() || params.frequency <= 0.0 {
        return Err(LevelError::InvalidTerrain(format!(
            "noise frequency {} is not positive",
            params.frequency
        )));
    }

    let heights = match params.kind {
        NoiseKind::Fractal => {
            let fbm = Fbm::<Perlin>::new(params.seed)
                .set_octaves(params.octaves)
                .set_frequency(params.frequency);
            sample(&fbm, params)
        }
        NoiseKind::Turbulence => {
            let billow = Billow::<Perlin>::new(params.seed)
                .set_octaves(params.octaves)
                .set_frequency(params.frequency);
            sample(&billow, params)
        }
    };

    let map = Heightmap::from_heights(params.size, heights)?;
    let (lo, hi) = map.range();
    tracing::debug!(
        "Generated {}x{} {:?} landscape (seed {}), heights {:.1}..{:.1}",
        params.size,
        params.size,
        params.kind,
        params.seed,
        lo,
        hi
    );
    Ok(map)
}

fn sample(noise: &impl NoiseFn<f64, 2>, params: &NoiseParams) -> Vec<f32> {
    let half_range = params.scale * 0.5;
    let mut heights = Vec::with_capacity(params.size * params.size);
    for row in 0..params.size {
        for col in 0..params.size {
            let value = noise.get([col as f64, row as f64]) as f32;
            heights.push(value * half_range);
        }
    }
    heights
}
