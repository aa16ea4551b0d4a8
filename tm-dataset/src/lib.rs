//! This crate builds the static datasets that get morphed: the foliage particles and the
//! instanced ornaments.
//!
//! A dataset is built once per configuration from an explicit RNG and is immutable afterwards.
//! Nothing in the animation loop ever re-randomizes it; only a reconfiguration does that, by
//! building a brand new dataset.

mod config;
mod error;
mod instances;
pub mod palette;
mod particles;

pub use self::{
    config::{InstanceDatasetConfig, InstanceKind, MaterialHints, ParticleDatasetConfig},
    error::ConfigError,
    instances::{DualPosition, InstanceDataset, InstanceRecord},
    particles::{ParticleDataset, ParticleRecord},
};

use tm_geometry::TreeDimensions;

/// Check that the tree dimensions are usable, so that nothing downstream divides by zero or
/// produces a degenerate shape.
pub fn validate_dimensions(dimensions: &TreeDimensions) -> Result<(), ConfigError> {
    let TreeDimensions {
        height,
        radius,
        scatter_radius,
    } = *dimensions;

    if [height, radius, scatter_radius]
        .into_iter()
        .all(|x| x.is_finite() && x > 0.)
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimensions(*dimensions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_dimensions_test() {
        assert!(validate_dimensions(&TreeDimensions::default()).is_ok());

        for bad in [
            TreeDimensions {
                height: 0.,
                ..Default::default()
            },
            TreeDimensions {
                radius: -1.,
                ..Default::default()
            },
            TreeDimensions {
                scatter_radius: f32::NAN,
                ..Default::default()
            },
        ] {
            assert_eq!(
                validate_dimensions(&bad),
                Err(ConfigError::InvalidDimensions(bad))
            );
        }
    }
}
