//! This crate provides the pure geometry used by Tree Morph: where things go when they form the
//! tree, where they go when they're scattered, and how the morph between the two is eased.

mod colour;
mod easing;
mod position;

pub use self::{
    colour::{Colour, ParseColourError},
    easing::{ease_in_out_cubic, ease_in_out_quad, mix, smoothstep},
    position::{scatter_position, tree_position, TreeDimensions, SPIRAL_FACTOR},
};

use glam::Vec3;
use rand::Rng;

/// Generate a random `Vec3` with every component in `[-amplitude / 2, amplitude / 2)`.
///
/// This is the jitter added on top of [`tree_position`] so that the spiral doesn't show up as
/// visibly discrete layers.
pub fn random_jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f32) -> Vec3 {
    (rng.gen::<Vec3>() - Vec3::splat(0.5)) * amplitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_jitter_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(12345);

        for _ in 0..1000 {
            let v = random_jitter(&mut rng, 0.7);
            assert!(v.abs().max_element() <= 0.35, "{v:?} is outside the jitter cube");
        }

        assert_eq!(random_jitter(&mut rng, 0.), Vec3::ZERO);
    }
}
