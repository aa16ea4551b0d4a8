//! This crate animates the morph between the scattered cloud and the assembled tree.
//!
//! The [`MorphAnimator`] turns a discrete [`ShapeState`] into a smoothly moving morph factor.
//! The frame updaters ([`ParticleBuffer`] and [`InstanceBuffer`]) then turn that factor and the
//! elapsed time into the buffers that the renderer uploads. Every record is computed from its
//! own data alone, so a frame pass is a pure function of `(dataset, morph, time)`.

mod animator;
mod instances;
mod particles;
mod topper;

pub use self::{
    animator::{MorphAnimator, MorphSettings, ShapeState},
    instances::{instance_transform, InstanceBuffer, InstanceTransform},
    particles::{particle_position, ParticleBuffer, ParticleMotion},
    topper::{star_outline, Topper},
};
