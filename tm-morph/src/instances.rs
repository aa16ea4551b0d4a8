//! This module handles the per-frame transforms of the instanced ornaments.

use crate::particles::mix_vec3;
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tm_dataset::{InstanceDataset, InstanceKind, InstanceRecord};
use tm_geometry::ease_in_out_quad;
use tracing::instrument;

/// The float amplitude of a record with a weight of 1, while fully scattered.
const FLOAT_AMPLITUDE: f32 = 1.5;

/// How far the scale of a breathing kind swings either side of its base.
const SCALE_BREATHE_AMPLITUDE: f32 = 0.2;

/// The angular frequency of the scale breathing.
const SCALE_BREATHE_FREQUENCY: f32 = 5.;

/// The position, orientation, and uniform scale of one drawn object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceTransform {
    /// Where the object is.
    pub translation: Vec3,

    /// Euler angles, applied in XYZ order.
    pub rotation: Vec3,

    /// Uniform scale. Never negative.
    pub scale: f32,
}

impl InstanceTransform {
    /// The rotation as a quaternion.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// The 4x4 model matrix for this transform, as uploaded to the renderer.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.quat(),
            self.translation,
        )
    }
}

/// Compute the transform of a single ornament.
///
/// The morph factor is eased with [`ease_in_out_quad`], which is deliberately softer than the
/// foliage's cubic easing. While scattered, each ornament floats on three axes with an amplitude
/// proportional to `1 / weight` and a frequency proportional to `speed / √weight`, and spins at
/// half that frequency. Floating fades out completely once the tree is assembled.
pub fn instance_transform(
    record: &InstanceRecord,
    kind: InstanceKind,
    morph: f32,
    time: f32,
) -> InstanceTransform {
    let t = ease_in_out_quad(morph.clamp(0., 1.));
    let phase = record.id as f32;
    let base = mix_vec3(
        record.position.scatter_position,
        record.position.tree_position,
        t,
    );

    let scatter_influence = 1. - t;
    let float_amplitude = (FLOAT_AMPLITUDE / record.weight) * scatter_influence;
    let float_speed = record.speed / record.weight.sqrt();

    let float = Vec3::new(
        (time * float_speed + phase).sin() * float_amplitude,
        (time * float_speed * 0.8 + phase).cos() * float_amplitude,
        (time * float_speed * 0.5 + phase).sin() * float_amplitude * 0.5,
    );

    let spin = time * float_speed * 0.5;
    let seed = record.position.rotation_seed;
    let rotation = Vec3::new(seed.x + spin, seed.y + spin, seed.z);

    let breathe = if kind.breathes() {
        (time * SCALE_BREATHE_FREQUENCY + phase).sin() * SCALE_BREATHE_AMPLITUDE
    } else {
        0.
    };
    let scale = (record.position.scale * (0.8 + 0.2 * t) + breathe).max(0.);

    InstanceTransform {
        translation: base + float,
        rotation,
        scale,
    }
}

/// The per-frame transform buffer of one instanced layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceBuffer {
    /// The decomposed transforms, in dataset order.
    transforms: Vec<InstanceTransform>,

    /// The model matrices, in dataset order. This is what gets uploaded.
    matrices: Vec<Mat4>,
}

impl InstanceBuffer {
    /// Create a buffer sized for the given dataset, holding the fully scattered transforms at
    /// time zero.
    pub fn new(dataset: &InstanceDataset) -> Self {
        let mut buffer = Self::default();
        buffer.update(dataset, 0., 0.);
        buffer
    }

    /// The current transforms.
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// The current model matrices.
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Recompute every transform for the given morph factor and time.
    #[instrument(skip_all, fields(kind = %dataset.kind(), count = dataset.len(), morph, time))]
    pub fn update(&mut self, dataset: &InstanceDataset, morph: f32, time: f32) {
        let kind = dataset.kind();
        let records = dataset.records();
        self.transforms.resize(
            records.len(),
            InstanceTransform {
                translation: Vec3::ZERO,
                rotation: Vec3::ZERO,
                scale: 0.,
            },
        );
        self.matrices.resize(records.len(), Mat4::IDENTITY);

        cfg_if::cfg_if! {
            if #[cfg(feature = "parallel")] {
                self.update_parallel(records, kind, morph, time);
            } else {
                self.update_serial(records, kind, morph, time);
            }
        }
    }

    #[cfg(any(test, not(feature = "parallel")))]
    fn update_serial(
        &mut self,
        records: &[InstanceRecord],
        kind: InstanceKind,
        morph: f32,
        time: f32,
    ) {
        records
            .iter()
            .zip(self.transforms.iter_mut().zip(self.matrices.iter_mut()))
            .for_each(|(record, (transform, matrix))| {
                *transform = instance_transform(record, kind, morph, time);
                *matrix = transform.to_matrix();
            });
    }

    #[cfg(any(test, feature = "parallel"))]
    fn update_parallel(
        &mut self,
        records: &[InstanceRecord],
        kind: InstanceKind,
        morph: f32,
        time: f32,
    ) {
        use rayon::prelude::*;

        records
            .par_iter()
            .zip(self.transforms.par_iter_mut().zip(self.matrices.par_iter_mut()))
            .for_each(|(record, (transform, matrix))| {
                *transform = instance_transform(record, kind, morph, time);
                *matrix = transform.to_matrix();
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use tm_dataset::{palette, DualPosition, InstanceDatasetConfig};
    use tm_geometry::{Colour, TreeDimensions};

    fn record(id: u32, weight: f32) -> InstanceRecord {
        InstanceRecord {
            id,
            position: DualPosition {
                tree_position: Vec3::new(2., -1., 0.5),
                scatter_position: Vec3::new(0., 20., 0.),
                rotation_seed: Vec3::new(0.3, 1.2, 0.),
                scale: 0.4,
            },
            colour: Colour::BLACK,
            speed: 1.,
            weight,
        }
    }

    fn dataset(kind: InstanceKind) -> InstanceDataset {
        InstanceDataset::generate(
            &InstanceDatasetConfig::new(kind, 50, palette::metallic(), (0.1, 0.3)),
            &TreeDimensions::default(),
            &mut StdRng::seed_from_u64(12345),
        )
        .unwrap()
    }

    #[test]
    fn assembled_instances_sit_on_the_tree() {
        let record = record(3, 1.2);

        for time in [0., 0.4, 13.] {
            let transform = instance_transform(&record, InstanceKind::Sphere, 1., time);
            assert_eq!(transform.translation, record.position.tree_position);
            assert!(approx_eq!(f32, transform.scale, 0.4, epsilon = 1e-6));
        }
    }

    #[test]
    fn scattered_instances_float_around_their_scatter_position() {
        let record = record(0, 1.);
        let transform = instance_transform(&record, InstanceKind::Sphere, 0., 0.);

        // At time zero with an id of zero, only the cosine term is non-zero
        assert_eq!(
            transform.translation,
            record.position.scatter_position + Vec3::new(0., 1.5, 0.)
        );
        assert!(approx_eq!(f32, transform.scale, 0.32, epsilon = 1e-6));
        assert_eq!(transform.rotation, record.position.rotation_seed);
    }

    #[test]
    fn heavier_instances_float_less() {
        let max_offset = |weight: f32| {
            let record = record(7, weight);
            (0..500)
                .map(|i| {
                    let transform =
                        instance_transform(&record, InstanceKind::Box, 0., i as f32 * 0.05);
                    (transform.translation - record.position.scatter_position).length()
                })
                .fold(0., f32::max)
        };

        let light = max_offset(0.3);
        let heavy = max_offset(2.7);
        assert!(heavy < light);

        // The amplitude is 1.5 / weight on x and y and half that on z
        assert!(heavy <= 1.5 / 2.7 * 1.5 + 1e-4);
    }

    #[test]
    fn only_stars_breathe() {
        let record = record(2, 0.5);

        let sphere_scales: Vec<f32> = (0..20)
            .map(|i| instance_transform(&record, InstanceKind::Sphere, 1., i as f32 * 0.1).scale)
            .collect();
        assert!(sphere_scales.iter().all(|&s| s == sphere_scales[0]));

        let star_scales: Vec<f32> = (0..20)
            .map(|i| instance_transform(&record, InstanceKind::Star, 1., i as f32 * 0.1).scale)
            .collect();
        assert!(star_scales.iter().any(|&s| s != star_scales[0]));
        assert!(star_scales.iter().all(|&s| s >= 0.));
    }

    #[test]
    fn rotation_advances_with_time() {
        let record = record(0, 4.);
        let transform = instance_transform(&record, InstanceKind::Box, 0.5, 2.);

        // float speed is 1 / √4 = 0.5, so spin speed is 0.25 rad/s
        assert!(approx_eq!(f32, transform.rotation.x, 0.3 + 0.5, epsilon = 1e-6));
        assert!(approx_eq!(f32, transform.rotation.y, 1.2 + 0.5, epsilon = 1e-6));
        assert_eq!(transform.rotation.z, 0.);
    }

    #[test]
    fn matrix_matches_transform() {
        let transform = InstanceTransform {
            translation: Vec3::new(1., 2., 3.),
            rotation: Vec3::new(0., std::f32::consts::FRAC_PI_2, 0.),
            scale: 2.,
        };
        let matrix = transform.to_matrix();

        let x = matrix.transform_point3(Vec3::X);
        assert!(x.abs_diff_eq(Vec3::new(1., 2., 1.), 1e-5), "{x:?}");

        let (scale, _, translation) = matrix.to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::splat(2.), 1e-5));
        assert_eq!(translation, Vec3::new(1., 2., 3.));
    }

    #[test]
    fn buffer_update_is_pure() {
        let dataset = dataset(InstanceKind::Star);

        let mut a = InstanceBuffer::new(&dataset);
        let mut b = InstanceBuffer::new(&dataset);
        assert_eq!(a.matrices().len(), 50);

        a.update(&dataset, 0.6, 3.3);
        b.update(&dataset, 0.1, 9.);
        b.update(&dataset, 0.6, 3.3);
        assert_eq!(a, b);

        for ((transform, matrix), record) in a
            .transforms()
            .iter()
            .zip(a.matrices())
            .zip(dataset.records())
        {
            assert_eq!(
                *transform,
                instance_transform(record, InstanceKind::Star, 0.6, 3.3)
            );
            assert_eq!(*matrix, transform.to_matrix());
        }
    }

    #[test]
    fn serial_and_parallel_passes_agree() {
        let config =
            InstanceDatasetConfig::new(InstanceKind::Star, 3000, palette::lights(), (0.08, 0.15));
        let dataset = InstanceDataset::generate(
            &config,
            &TreeDimensions::default(),
            &mut StdRng::seed_from_u64(12345),
        )
        .unwrap();

        let mut serial = InstanceBuffer::new(&dataset);
        let mut parallel = InstanceBuffer::new(&dataset);

        for (morph, time) in [(0., 0.), (0.45, 7.5), (1., 31.)] {
            serial.update_serial(dataset.records(), InstanceKind::Star, morph, time);
            parallel.update_parallel(dataset.records(), InstanceKind::Star, morph, time);
            assert_eq!(serial, parallel);

            for (transform, record) in parallel.transforms().iter().zip(dataset.records()) {
                assert_eq!(
                    *transform,
                    instance_transform(record, InstanceKind::Star, morph, time)
                );
            }
        }
    }
}
