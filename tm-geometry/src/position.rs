//! This module handles the two target shapes: the conical spiral of the tree and the spherical
//! shell of the scattered cloud.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// The angle (in multiples of π) that the spiral sweeps from the bottom of the tree to the top.
///
/// 25π is 12.5 full turns.
pub const SPIRAL_FACTOR: f32 = 25.;

/// The size of the tree and of the sphere that everything scatters onto.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeDimensions {
    /// The total height of the tree. The tree is centred vertically on the origin.
    pub height: f32,

    /// The radius of the base of the tree.
    pub radius: f32,

    /// The radius of the sphere that scattered things sit on.
    pub scatter_radius: f32,
}

impl Default for TreeDimensions {
    fn default() -> Self {
        Self {
            height: 12.,
            radius: 4.5,
            scatter_radius: 20.,
        }
    }
}

/// Map a ratio in `[0, 1]` (bottom to top) onto the conical spiral of the tree.
///
/// The height grows linearly with the ratio, the radius shrinks linearly to zero at the top, and
/// the angle winds around [`SPIRAL_FACTOR`]` * π` radians in total.
pub fn tree_position(ratio: f32, dimensions: &TreeDimensions) -> Vec3 {
    let y = ratio * dimensions.height - dimensions.height / 2.;
    let radius_at_height = dimensions.radius * (1. - ratio);
    let angle = ratio * SPIRAL_FACTOR * PI;

    Vec3::new(
        angle.cos() * radius_at_height,
        y,
        angle.sin() * radius_at_height,
    )
}

/// Pick a point uniformly on the surface of a sphere of the given radius.
///
/// This uses inverse-CDF sampling of the polar angle, so the points have uniform area density.
/// They lie on a shell, not inside a ball.
pub fn scatter_position<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (rng.gen::<f32>() * 2. - 1.).clamp(-1., 1.).acos();

    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn horizontal_radius(v: Vec3) -> f32 {
        (v.x * v.x + v.z * v.z).sqrt()
    }

    #[test]
    fn tree_position_endpoints() {
        let dims = TreeDimensions::default();

        let bottom = tree_position(0., &dims);
        assert!(approx_eq!(f32, bottom.x, 4.5, epsilon = 1e-5));
        assert!(approx_eq!(f32, bottom.y, -6., epsilon = 1e-5));
        assert!(approx_eq!(f32, bottom.z, 0., epsilon = 1e-5));

        let top = tree_position(1., &dims);
        assert!(approx_eq!(f32, horizontal_radius(top), 0., epsilon = 1e-5));
        assert!(approx_eq!(f32, top.y, 6., epsilon = 1e-5));
    }

    #[test]
    fn tree_position_is_a_tapering_cone() {
        let dims = TreeDimensions {
            height: 9.,
            radius: 3.,
            scatter_radius: 1.,
        };

        let mut previous_radius = f32::INFINITY;
        for i in 0..=200 {
            let ratio = i as f32 / 200.;
            let point = tree_position(ratio, &dims);
            let radius = horizontal_radius(point);

            assert!(
                (-4.5..=4.5).contains(&point.y),
                "y = {} is outside the tree at ratio {ratio}",
                point.y
            );
            assert!(radius <= 3. + 1e-5, "radius {radius} is wider than the base");
            assert!(
                radius < previous_radius,
                "radius should strictly decrease: {radius} >= {previous_radius} at ratio {ratio}"
            );
            assert!(approx_eq!(f32, radius, 3. * (1. - ratio), epsilon = 1e-4));

            previous_radius = radius;
        }
    }

    #[test]
    fn tree_position_spirals() {
        let dims = TreeDimensions::default();

        // Half a turn is a ratio of 1/25
        let half_turn = tree_position(1. / 25., &dims);
        assert!(half_turn.x < 0.);
        assert!(approx_eq!(f32, half_turn.z, 0., epsilon = 1e-4));
    }

    #[test]
    fn scatter_position_is_on_the_shell() {
        let mut rng = StdRng::seed_from_u64(12345);

        for _ in 0..5000 {
            let point = scatter_position(&mut rng, 20.);
            assert!(
                approx_eq!(f32, point.length(), 20., epsilon = 1e-3),
                "{point:?} has length {}",
                point.length()
            );
        }
    }

    #[test]
    fn scatter_position_is_uniform_over_the_sphere() {
        const SAMPLES: usize = 40_000;

        let mut rng = StdRng::seed_from_u64(12345);
        let points: Vec<Vec3> = (0..SAMPLES)
            .map(|_| scatter_position(&mut rng, 1.))
            .collect();

        let mean = points.iter().copied().sum::<Vec3>() / SAMPLES as f32;
        assert!(mean.abs().max_element() < 0.02, "mean {mean:?} is not centred");

        // By Archimedes' hat-box theorem, every axis should be uniform in [-1, 1] on a uniform
        // sphere, so the middle half of each axis should hold half the points
        for axis in 0..3 {
            let middle = points.iter().filter(|p| p[axis].abs() < 0.5).count();
            let proportion = middle as f32 / SAMPLES as f32;
            assert!(
                (proportion - 0.5).abs() < 0.02,
                "axis {axis} has {proportion} of points in the middle half"
            );
        }

        let mut octants = [0usize; 8];
        for p in &points {
            let idx = usize::from(p.x > 0.) | usize::from(p.y > 0.) << 1 | usize::from(p.z > 0.) << 2;
            octants[idx] += 1;
        }
        for count in octants {
            let proportion = count as f32 / SAMPLES as f32;
            assert!((proportion - 0.125).abs() < 0.01, "octants are uneven: {octants:?}");
        }
    }
}
