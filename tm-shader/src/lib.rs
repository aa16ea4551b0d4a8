//! This crate provides the foliage shader program, both as GLSL for the renderer and as a CPU
//! reference of the same maths.
//!
//! The vertex stage reuses [`tm_morph::particle_position`], so the positions drawn on the device
//! always agree with the ones the CPU computes for the same morph factor and time.

mod glsl;

pub use self::glsl::{FOLIAGE_FRAGMENT_SHADER, FOLIAGE_VERTEX_SHADER};

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tm_dataset::{palette, ParticleRecord};
use tm_geometry::{mix, smoothstep, Colour};
use tm_morph::{particle_position, ParticleMotion};

/// The names of the per-particle attributes, in the order tree position, scatter position, seed.
pub const ATTRIBUTE_NAMES: [&str; 3] = ["aTreePos", "aScatterPos", "aRandom"];

/// The value of a single uniform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UniformValue {
    /// A `float` uniform.
    Float(f32),

    /// A `vec3` uniform.
    Vec3(Vec3),
}

/// Everything the foliage program reads that isn't a per-particle attribute.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoliageUniforms {
    /// The elapsed time in seconds.
    pub time: f32,

    /// The raw (uneased) morph factor.
    pub morph: f32,

    /// The highlight colour that the rims and sparkles glow with.
    pub colour_high: Colour,

    /// The colour at the core of every particle.
    pub colour_base: Colour,

    /// How far the highlight colour is overdriven to make it bloom.
    pub glow_intensity: f32,

    /// The secondary motion, shared with the CPU updater.
    pub motion: ParticleMotion,
}

impl Default for FoliageUniforms {
    fn default() -> Self {
        Self {
            time: 0.,
            morph: 0.,
            colour_high: Colour::from_rgb8(palette::GOLD_HIGH),
            colour_base: Colour::from_rgb8(palette::FOLIAGE_BASE),
            glow_intensity: 4.,
            motion: ParticleMotion::default(),
        }
    }
}

impl FoliageUniforms {
    /// Every uniform by its GLSL name, ready to be bound.
    pub fn values(&self) -> [(&'static str, UniformValue); 9] {
        use UniformValue::{Float, Vec3};

        [
            ("uTime", Float(self.time)),
            ("uMorph", Float(self.morph)),
            ("uBreatheAmplitude", Float(self.motion.breathe_amplitude)),
            (
                "uBreatheRestAmplitude",
                Float(self.motion.breathe_rest_amplitude),
            ),
            ("uBreatheFrequency", Float(self.motion.breathe_frequency)),
            ("uSwirlStrength", Float(self.motion.swirl_strength)),
            ("uColorHigh", Vec3(self.colour_high.as_vec3())),
            ("uColorBase", Vec3(self.colour_base.as_vec3())),
            ("uGlowIntensity", Float(self.glow_intensity)),
        ]
    }
}

/// The output of the vertex stage for one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoliageVaryings {
    /// The morphed position of the particle in model space.
    pub position: Vec3,

    /// The position in view space.
    pub view_position: Vec4,

    /// The point sprite size in pixels. Larger for random-heavy particles and for particles
    /// close to the camera.
    pub point_size: f32,

    /// The sparkle signal in `[-1, 1]`.
    pub sparkle: f32,

    /// The opacity of the particle before the sprite's radial falloff.
    pub alpha: f32,
}

/// Run the vertex stage for one particle on the CPU.
pub fn foliage_vertex(
    record: &ParticleRecord,
    uniforms: &FoliageUniforms,
    model_view: Mat4,
) -> FoliageVaryings {
    let seed = record.random_seed;
    let position = particle_position(record, uniforms.morph, uniforms.time, &uniforms.motion);
    let view_position = model_view * position.extend(1.);

    let size_random = 90. * seed + 40.;
    let point_size = size_random * (1. / -view_position.z);

    let sparkle = (uniforms.time * 2. + seed * 25.).sin();
    let alpha = 0.8 + 0.2 * sparkle;

    FoliageVaryings {
        position,
        view_position,
        point_size,
        sparkle,
        alpha,
    }
}

/// Run the fragment stage for one pixel of a point sprite on the CPU.
///
/// `point_coord` is the normalized coordinate within the sprite, with `(0.5, 0.5)` at the
/// centre. Returns `None` where the pixel is discarded, which is everywhere outside the inscribed
/// circle. The result is linear RGBA before tone mapping.
pub fn foliage_fragment(
    point_coord: Vec2,
    varyings: &FoliageVaryings,
    uniforms: &FoliageUniforms,
) -> Option<Vec4> {
    let dist = (point_coord - Vec2::splat(0.5)).length();
    if dist > 0.5 {
        return None;
    }

    let core = smoothstep(0.5, 0.2, dist);
    let rim_factor = smoothstep(0.35, 0.5, dist);

    let glow = uniforms.colour_high.overdriven(uniforms.glow_intensity);
    let colour = uniforms.colour_base.lerp(glow, rim_factor * 0.95);

    let sparkle_mix = smoothstep(0., 1., varyings.sparkle) * 0.3;
    let colour = colour.lerp(glow, sparkle_mix);

    Some(colour.as_vec3().extend(mix(0., varyings.alpha, core)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn record(seed: f32) -> ParticleRecord {
        ParticleRecord {
            tree_position: Vec3::new(1., 0., 1.),
            scatter_position: Vec3::new(0., 0., 20.),
            random_seed: seed,
        }
    }

    fn camera() -> Mat4 {
        Mat4::from_translation(Vec3::new(0., 0., -25.))
    }

    fn varyings(sparkle: f32) -> FoliageVaryings {
        FoliageVaryings {
            position: Vec3::ZERO,
            view_position: Vec4::new(0., 0., -10., 1.),
            point_size: 10.,
            sparkle,
            alpha: 0.8 + 0.2 * sparkle,
        }
    }

    #[test]
    fn vertex_agrees_with_the_cpu_updater() {
        let record = record(0.42);

        for (morph, time) in [(0., 0.), (0.3, 1.7), (0.5, 4.), (1., 9.9)] {
            let uniforms = FoliageUniforms {
                morph,
                time,
                ..Default::default()
            };
            let out = foliage_vertex(&record, &uniforms, camera());
            assert_eq!(
                out.position,
                particle_position(&record, morph, time, &uniforms.motion)
            );
            assert_eq!(out.view_position.truncate(), out.position + Vec3::new(0., 0., -25.));
        }
    }

    #[test]
    fn point_size_shrinks_with_distance() {
        let uniforms = FoliageUniforms::default();

        // Scattered at z = 20 puts the particle 5 units from the camera
        let near = foliage_vertex(&record(0.5), &uniforms, camera());
        assert!(approx_eq!(f32, near.point_size, 85. / 5., epsilon = 1e-4));

        let far = foliage_vertex(
            &record(0.5),
            &uniforms,
            Mat4::from_translation(Vec3::new(0., 0., -45.)),
        );
        assert!(far.point_size < near.point_size);

        let big = foliage_vertex(&record(0.9), &uniforms, camera());
        assert!(big.point_size > near.point_size);
    }

    #[test]
    fn sparkle_drives_alpha() {
        let uniforms = FoliageUniforms {
            time: 0.3,
            ..Default::default()
        };
        let out = foliage_vertex(&record(0.1), &uniforms, camera());

        let sparkle = (0.6f32 + 2.5).sin();
        assert!(approx_eq!(f32, out.sparkle, sparkle, epsilon = 1e-6));
        assert!(approx_eq!(f32, out.alpha, 0.8 + 0.2 * sparkle, epsilon = 1e-6));
    }

    #[test]
    fn pixels_outside_the_circle_are_discarded() {
        let uniforms = FoliageUniforms::default();
        let v = varyings(0.);

        for coord in [
            Vec2::new(0., 0.),
            Vec2::new(1., 0.5),
            Vec2::new(0.5, -0.01),
            Vec2::new(0.9, 0.9),
        ] {
            assert_eq!(foliage_fragment(coord, &v, &uniforms), None, "{coord:?}");
        }

        assert!(foliage_fragment(Vec2::new(1., 0.5) - Vec2::X * 1e-3, &v, &uniforms).is_some());
    }

    #[test]
    fn the_core_is_opaque_base_colour() {
        let uniforms = FoliageUniforms::default();
        let v = varyings(-0.5);

        let centre = foliage_fragment(Vec2::splat(0.5), &v, &uniforms).unwrap();
        assert_eq!(centre.truncate(), uniforms.colour_base.as_vec3());
        assert!(approx_eq!(f32, centre.w, v.alpha, epsilon = 1e-6));

        // Everything inside 0.2 is fully opaque
        let inner = foliage_fragment(Vec2::new(0.5, 0.69), &v, &uniforms).unwrap();
        assert!(approx_eq!(f32, inner.w, v.alpha, epsilon = 1e-6));
    }

    #[test]
    fn the_rim_glows() {
        let uniforms = FoliageUniforms::default();
        let v = varyings(-1.);
        let glow = uniforms.colour_high.overdriven(4.).as_vec3();

        let at = |dist: f32| foliage_fragment(Vec2::new(0.5 + dist, 0.5), &v, &uniforms).unwrap();

        // Untouched inside the rim threshold
        assert_eq!(at(0.34).truncate(), uniforms.colour_base.as_vec3());

        // Increasingly bright through the rim band
        let mut previous = 0.;
        for dist in [0.36, 0.4, 0.45, 0.49] {
            let brightness = at(dist).truncate().length();
            assert!(brightness > previous);
            previous = brightness;
        }

        // At the edge the colour is 95% glow and the alpha has fallen away
        let edge = at(0.5);
        let expected = uniforms.colour_base.as_vec3().lerp(glow, 0.95);
        assert!(edge.truncate().abs_diff_eq(expected, 1e-4));
        assert_eq!(edge.w, 0.);
    }

    #[test]
    fn sparkle_pushes_towards_glow() {
        let uniforms = FoliageUniforms::default();
        let coord = Vec2::new(0.5, 0.9);

        let dull = foliage_fragment(coord, &varyings(0.), &uniforms).unwrap();
        let bright = foliage_fragment(coord, &varyings(1.), &uniforms).unwrap();

        assert!(bright.truncate().length() > dull.truncate().length());
        assert!(bright.w > dull.w);
    }

    #[test]
    fn uniform_names_are_unique() {
        let values = FoliageUniforms::default().values();
        for (i, (a, _)) in values.iter().enumerate() {
            assert!(values[i + 1..].iter().all(|(b, _)| a != b), "{a} is duplicated");
        }
    }
}
