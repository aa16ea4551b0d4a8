//! This module contains the [`InstanceDataset`] for the ornaments.

use crate::{validate_dimensions, ConfigError, InstanceDatasetConfig, InstanceKind};
use glam::Vec3;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tm_geometry::{random_jitter, scatter_position, tree_position, Colour, TreeDimensions};
use tracing::{debug, instrument};

/// The amplitude of the jitter added to every ornament's tree position.
const INSTANCE_JITTER: f32 = 0.5;

/// How far boxes and baubles are pushed out from the spiral so that they hang on the surface of
/// the foliage.
const RADIAL_PUSH: f32 = 1.1;

/// The pair of positions that a single object morphs between, plus its resting orientation and
/// size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DualPosition {
    /// Where this object sits when the tree is assembled.
    pub tree_position: Vec3,

    /// Where this object sits when everything is scattered.
    pub scatter_position: Vec3,

    /// The initial Euler angles (XYZ order) of this object.
    pub rotation_seed: Vec3,

    /// The base scale of this object.
    pub scale: f32,
}

/// A single instanced ornament.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// The index of this record in its dataset. Also used as a phase offset for floating.
    pub id: u32,

    /// The positions, rotation, and scale of this record.
    pub position: DualPosition,

    /// The colour picked from the palette.
    pub colour: Colour,

    /// How quickly this record floats and spins.
    pub speed: f32,

    /// How heavy this record is. Heavier records float less and more slowly.
    ///
    /// Always finite and strictly positive.
    pub weight: f32,
}

/// A fixed-size, immutable set of instanced ornaments of a single kind.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceDataset {
    /// What kind of ornament this is.
    kind: InstanceKind,

    /// The ornaments themselves.
    records: Vec<InstanceRecord>,
}

impl InstanceDataset {
    /// Generate a new set of ornaments.
    #[instrument(skip(rng), fields(kind = %config.kind, count = config.count))]
    pub fn generate<R: Rng + ?Sized>(
        config: &InstanceDatasetConfig,
        dimensions: &TreeDimensions,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_dimensions(dimensions)?;

        let kind = config.kind;
        let base_weight = config.base_weight();
        let (scale_min, scale_max) = config.scale_range;

        let records = (0..config.count)
            .map(|i| {
                let ratio = rng.gen::<f32>().powf(kind.height_bias());
                let spiral = tree_position(ratio, dimensions);

                let push = match kind {
                    InstanceKind::Star => rng.gen_range(0.9..1.1),
                    InstanceKind::Box | InstanceKind::Sphere => RADIAL_PUSH,
                };
                let tree_position = spiral * Vec3::new(push, 1., push)
                    + random_jitter(rng, INSTANCE_JITTER);

                let scatter_position = scatter_position(rng, dimensions.scatter_radius);
                let rotation_seed = Vec3::new(rng.gen::<f32>() * PI, rng.gen::<f32>() * PI, 0.);
                let scale = rng.gen::<f32>() * (scale_max - scale_min) + scale_min;

                let colour = *config
                    .palette
                    .choose(rng)
                    .unwrap_or(&Colour::BLACK);

                InstanceRecord {
                    id: i as u32,
                    position: DualPosition {
                        tree_position,
                        scatter_position,
                        rotation_seed,
                        scale,
                    },
                    colour,
                    speed: rng.gen_range(0.5..1.5),
                    weight: base_weight + rng.gen::<f32>() * 0.5,
                }
            })
            .collect();

        debug!("Generated ornaments");
        Ok(Self { kind, records })
    }

    /// Wrap an existing set of records, checking that every one of them is usable.
    ///
    /// In particular, a zero or negative weight is rejected here rather than turning into an
    /// infinite float amplitude later.
    pub fn from_records(
        kind: InstanceKind,
        records: Vec<InstanceRecord>,
    ) -> Result<Self, ConfigError> {
        if records.is_empty() {
            return Err(ConfigError::ZeroCount);
        }

        for (index, record) in records.iter().enumerate() {
            if !(record.weight.is_finite() && record.weight > 0.) {
                return Err(ConfigError::InvalidWeight(record.weight));
            }

            if !record.speed.is_finite() {
                return Err(ConfigError::InvalidSpeed(record.speed));
            }

            let scale = record.position.scale;
            if !(scale.is_finite() && scale >= 0.) {
                return Err(ConfigError::InvalidScale(scale));
            }

            if !(record.position.tree_position.is_finite()
                && record.position.scatter_position.is_finite()
                && record.position.rotation_seed.is_finite())
            {
                return Err(ConfigError::NonFinitePosition { index });
            }
        }

        Ok(Self { kind, records })
    }

    /// The kind of ornament in this dataset.
    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    /// The ornaments in this dataset.
    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    /// The number of ornaments in this dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false, since a dataset can never be empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Collect the colour of every instance, for uploading once per configuration.
    pub fn colours(&self) -> Vec<Colour> {
        self.records.iter().map(|r| r.colour).collect()
    }
}
