//! This module handles the per-frame positions of the foliage particles.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tm_dataset::{ConfigError, ParticleDataset, ParticleRecord};
use tm_geometry::{ease_in_out_cubic, mix};
use tracing::instrument;

/// The tuning of the foliage's secondary motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleMotion {
    /// How far particles breathe in and out while fully scattered.
    pub breathe_amplitude: f32,

    /// How far particles breathe in and out once the tree is assembled.
    pub breathe_rest_amplitude: f32,

    /// The angular frequency of the breathing.
    pub breathe_frequency: f32,

    /// The peak swirl strength, reached halfway through the morph.
    pub swirl_strength: f32,
}

impl Default for ParticleMotion {
    fn default() -> Self {
        Self {
            breathe_amplitude: 0.2,
            breathe_rest_amplitude: 0.,
            breathe_frequency: 1.2,
            swirl_strength: 5.,
        }
    }
}

impl ParticleMotion {
    /// Check that every parameter is finite and that the amplitudes aren't negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("breathe_amplitude", self.breathe_amplitude, true),
            ("breathe_rest_amplitude", self.breathe_rest_amplitude, true),
            ("breathe_frequency", self.breathe_frequency, false),
            ("swirl_strength", self.swirl_strength, false),
        ];

        for (field, value, non_negative) in fields {
            if !value.is_finite() || (non_negative && value < 0.) {
                return Err(ConfigError::InvalidMotion { field, value });
            }
        }

        Ok(())
    }
}

/// Linearly interpolate with GLSL's `mix()` formula, which is exact at both ends.
pub(crate) fn mix_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1. - t) + b * t
}

/// Compute where a single particle is drawn.
///
/// The morph factor is eased with [`ease_in_out_cubic`], the position is interpolated from the
/// scatter position to the tree position, and then the particle breathes along its own direction
/// from the origin and swirls around the vertical axis. The swirl peaks halfway through the
/// morph and vanishes at both ends.
pub fn particle_position(
    record: &ParticleRecord,
    morph: f32,
    time: f32,
    motion: &ParticleMotion,
) -> Vec3 {
    let t = ease_in_out_cubic(morph.clamp(0., 1.));
    let seed = record.random_seed;
    let mut pos = mix_vec3(record.scatter_position, record.tree_position, t);

    let breathe_intensity = mix(motion.breathe_amplitude, motion.breathe_rest_amplitude, t);
    let breathe = (time * motion.breathe_frequency + seed * 10.).sin() * breathe_intensity;
    pos += breathe * pos.normalize_or_zero();

    let swirl_strength = (1. - t) * t * motion.swirl_strength;
    let swirl_angle = swirl_strength * (seed - 0.5) * 2.;
    let (s, c) = swirl_angle.sin_cos();

    Vec3::new(c * pos.x + s * pos.z, pos.y, -s * pos.x + c * pos.z)
}

/// The per-frame position buffer of the foliage, ready to be uploaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffer {
    /// One position per particle, in dataset order.
    positions: Vec<Vec3>,
}

impl ParticleBuffer {
    /// Create a buffer sized for the given dataset, holding the scatter positions.
    pub fn new(dataset: &ParticleDataset) -> Self {
        Self {
            positions: dataset.scatter_positions(),
        }
    }

    /// The current positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Recompute every position for the given morph factor and time.
    ///
    /// Each particle only depends on its own record, so the pass can be split across threads
    /// with the `parallel` feature.
    #[instrument(skip_all, fields(count = dataset.len(), morph, time))]
    pub fn update(
        &mut self,
        dataset: &ParticleDataset,
        morph: f32,
        time: f32,
        motion: &ParticleMotion,
    ) {
        let records = dataset.records();
        self.positions.resize(records.len(), Vec3::ZERO);

        cfg_if::cfg_if! {
            if #[cfg(feature = "parallel")] {
                self.update_parallel(records, morph, time, motion);
            } else {
                self.update_serial(records, morph, time, motion);
            }
        }
    }

    #[cfg(any(test, not(feature = "parallel")))]
    fn update_serial(
        &mut self,
        records: &[ParticleRecord],
        morph: f32,
        time: f32,
        motion: &ParticleMotion,
    ) {
        for (pos, record) in self.positions.iter_mut().zip(records) {
            *pos = particle_position(record, morph, time, motion);
        }
    }

    #[cfg(any(test, feature = "parallel"))]
    fn update_parallel(
        &mut self,
        records: &[ParticleRecord],
        morph: f32,
        time: f32,
        motion: &ParticleMotion,
    ) {
        use rayon::prelude::*;

        self.positions
            .par_iter_mut()
            .zip(records.par_iter())
            .for_each(|(pos, record)| *pos = particle_position(record, morph, time, motion));
    }
}
