//! This module contains the foliage [`ParticleDataset`].

use crate::{validate_dimensions, ConfigError, ParticleDatasetConfig};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tm_geometry::{random_jitter, scatter_position, tree_position, TreeDimensions};
use tracing::{debug, instrument};

/// A single foliage particle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Where this particle sits when the tree is assembled.
    pub tree_position: Vec3,

    /// Where this particle sits when everything is scattered.
    pub scatter_position: Vec3,

    /// A per-particle random value in `[0, 1)`, used to desynchronize the breathing, the swirl,
    /// the sparkle, and the point size.
    pub random_seed: f32,
}

/// A fixed-size, immutable set of foliage particles.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleDataset {
    /// The particles themselves.
    records: Vec<ParticleRecord>,
}

impl ParticleDataset {
    /// Generate a new set of particles.
    ///
    /// Particle `i` of `n` takes the height ratio `(i / n)^bias` on the tree spiral plus some
    /// jitter. Its scatter position is an independent draw on the scatter sphere.
    #[instrument(skip(rng))]
    pub fn generate<R: Rng + ?Sized>(
        config: &ParticleDatasetConfig,
        dimensions: &TreeDimensions,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_dimensions(dimensions)?;

        let count = config.count;
        let records = (0..count)
            .map(|i| {
                let ratio = (i as f32 / count as f32).powf(config.height_bias);
                let tree_position =
                    tree_position(ratio, dimensions) + random_jitter(rng, config.jitter);
                let scatter_position = scatter_position(rng, dimensions.scatter_radius);

                ParticleRecord {
                    tree_position,
                    scatter_position,
                    random_seed: rng.gen(),
                }
            })
            .collect();

        debug!(count, "Generated foliage particles");
        Ok(Self { records })
    }

    /// Wrap an existing set of particles, checking that they're usable.
    pub fn from_records(records: Vec<ParticleRecord>) -> Result<Self, ConfigError> {
        if records.is_empty() {
            return Err(ConfigError::ZeroCount);
        }

        if let Some(index) = records.iter().position(|record| {
            !(record.tree_position.is_finite()
                && record.scatter_position.is_finite()
                && record.random_seed.is_finite())
        }) {
            return Err(ConfigError::NonFinitePosition { index });
        }

        Ok(Self { records })
    }

    /// The particles in this dataset.
    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    /// The number of particles in this dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false, since a dataset can never be empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Collect the tree positions into a buffer for uploading as a vertex attribute.
    pub fn tree_positions(&self) -> Vec<Vec3> {
        self.records.iter().map(|r| r.tree_position).collect()
    }

    /// Collect the scatter positions into a buffer for uploading as a vertex attribute.
    pub fn scatter_positions(&self) -> Vec<Vec3> {
        self.records.iter().map(|r| r.scatter_position).collect()
    }

    /// Collect the random seeds into a buffer for uploading as a vertex attribute.
    pub fn random_seeds(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.random_seed).collect()
    }
}
