//! This module handles the configuration of datasets.

use crate::{palette, ConfigError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tm_geometry::Colour;

/// The kind of object drawn by an instanced layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum InstanceKind {
    /// A heavy gift box. Boxes sink towards the wide bottom of the tree and barely float.
    Box,

    /// A bauble.
    Sphere,

    /// A tiny light. Stars are very light, float a lot, and their scale breathes.
    Star,
}

impl InstanceKind {
    /// The lightest weight a record of this kind can have. Each record adds up to 0.5 on top.
    pub fn base_weight(self) -> f32 {
        match self {
            Self::Box => 2.5,
            Self::Sphere => 1.,
            Self::Star => 0.3,
        }
    }

    /// The exponent applied to the uniform height ratio.
    ///
    /// Anything above 1 pushes the distribution towards the lower, wider part of the cone.
    pub fn height_bias(self) -> f32 {
        match self {
            Self::Box => 1.5,
            Self::Sphere | Self::Star => 1.,
        }
    }

    /// Whether the scale of this kind gently pulses over time.
    pub fn breathes(self) -> bool {
        matches!(self, Self::Star)
    }

    /// Surface hints for the renderer's material.
    pub fn material(self) -> MaterialHints {
        match self {
            Self::Star => MaterialHints {
                roughness: 0.,
                metalness: 1.,
                emissive: Colour::from_rgb8(palette::GOLD_HIGH),
                emissive_intensity: 4.,
                env_map_intensity: 1.,
                clearcoat: 0.,
            },
            Self::Box | Self::Sphere => MaterialHints {
                roughness: 0.1,
                metalness: 0.5,
                emissive: Colour::BLACK,
                emissive_intensity: 0.,
                env_map_intensity: 2.,
                clearcoat: 1.,
            },
        }
    }
}

/// Physically-based material parameters for an instanced layer.
///
/// These are only hints; the core never reads them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialHints {
    /// How rough the surface is, from mirror-like at 0 to fully diffuse at 1.
    pub roughness: f32,

    /// How metallic the surface is, from 0 to 1.
    pub metalness: f32,

    /// The colour the surface glows with.
    pub emissive: Colour,

    /// How strongly the surface glows.
    pub emissive_intensity: f32,

    /// How strongly the environment map is reflected.
    pub env_map_intensity: f32,

    /// The strength of the clear coat layer, from 0 to 1.
    pub clearcoat: f32,
}

/// The configuration of an instanced layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceDatasetConfig {
    /// What kind of object this layer draws.
    pub kind: InstanceKind,

    /// How many instances to generate.
    pub count: usize,

    /// The colours to pick from. Each instance picks one uniformly.
    pub palette: Vec<Colour>,

    /// The inclusive range of base scales.
    pub scale_range: (f32, f32),

    /// Override the [`base_weight`](InstanceKind::base_weight) of the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_weight: Option<f32>,
}

impl InstanceDatasetConfig {
    /// Create a config with the default weight for the kind.
    pub fn new(
        kind: InstanceKind,
        count: usize,
        palette: Vec<Colour>,
        scale_range: (f32, f32),
    ) -> Self {
        Self {
            kind,
            count,
            palette,
            scale_range,
            base_weight: None,
        }
    }

    /// The base weight used for generation.
    pub fn base_weight(&self) -> f32 {
        self.base_weight.unwrap_or_else(|| self.kind.base_weight())
    }

    /// Check the config for anything that would produce degenerate records.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::ZeroCount);
        }

        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let (min, max) = self.scale_range;
        if !(min.is_finite() && max.is_finite() && 0. <= min && min <= max) {
            return Err(ConfigError::InvalidScaleRange { min, max });
        }

        let weight = self.base_weight();
        if !(weight.is_finite() && weight > 0.) {
            return Err(ConfigError::InvalidWeight(weight));
        }

        Ok(())
    }
}

/// The configuration of the foliage particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleDatasetConfig {
    /// How many particles to generate.
    pub count: usize,

    /// The exponent applied to each particle's height ratio.
    pub height_bias: f32,

    /// The amplitude of the uniform jitter added to each tree position.
    pub jitter: f32,
}

impl Default for ParticleDatasetConfig {
    fn default() -> Self {
        Self {
            count: 5000,
            height_bias: 0.8,
            jitter: 0.7,
        }
    }
}

impl ParticleDatasetConfig {
    /// Check the config for anything that would produce degenerate records.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::ZeroCount);
        }

        if !(self.height_bias.is_finite() && self.height_bias > 0.) {
            return Err(ConfigError::InvalidBias(self.height_bias));
        }

        if !(self.jitter.is_finite() && self.jitter >= 0.) {
            return Err(ConfigError::InvalidJitter(self.jitter));
        }

        Ok(())
    }
}
