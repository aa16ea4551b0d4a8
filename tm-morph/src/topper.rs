//! This module handles the star on top of the tree.

use crate::InstanceTransform;
use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};
use tm_geometry::{mix, TreeDimensions};

/// The star that drops onto the top of the tree as it assembles.
///
/// Unlike the ornaments, the topper follows the raw morph factor with no easing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Topper {
    /// The height the star hangs at while everything is scattered.
    pub scattered_height: f32,

    /// The height the star rests at on top of the tree.
    pub rest_height: f32,

    /// The scale of the star once the tree is assembled. It has zero scale while scattered.
    pub full_scale: f32,

    /// How fast the star spins around the vertical axis, in radians per second.
    pub spin_speed: f32,
}

impl Topper {
    /// Create a topper for a tree of the given size.
    pub fn new(dimensions: &TreeDimensions) -> Self {
        Self {
            scattered_height: dimensions.height + 10.,
            rest_height: dimensions.height / 2. + 0.8,
            full_scale: 0.5,
            spin_speed: 0.8,
        }
    }

    /// The transform of the star for the given morph factor and time.
    pub fn transform(&self, morph: f32, time: f32) -> InstanceTransform {
        let t = morph.clamp(0., 1.);

        InstanceTransform {
            translation: Vec3::new(0., mix(self.scattered_height, self.rest_height, t), 0.),
            rotation: Vec3::new(0., time * self.spin_speed, 0.),
            scale: mix(0., self.full_scale, t),
        }
    }
}

/// The closed outline of a star with the given number of points, with the first point straight
/// up. The renderer extrudes this into the topper mesh.
pub fn star_outline(points: usize, outer_radius: f32, inner_radius: f32) -> Vec<Vec2> {
    let vertices = points * 2;

    (0..vertices)
        .map(|i| {
            let radius = if i % 2 == 0 {
                outer_radius
            } else {
                inner_radius
            };
            let angle = (i as f32 / vertices as f32) * TAU + FRAC_PI_2;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
