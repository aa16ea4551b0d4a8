//! This module provides the [`RenderSink`] trait, which is the boundary between the scene and
//! whatever actually draws it.

use glam::{Mat4, Vec2, Vec3};
use tm_dataset::{InstanceKind, MaterialHints};
use tm_geometry::Colour;
use tm_morph::InstanceTransform;
use tm_shader::FoliageUniforms;
use tracing::{debug, info, instrument};

/// The static per-particle attributes of the foliage, uploaded once per dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct FoliageAttributes {
    /// Where each particle sits on the assembled tree.
    pub tree_positions: Vec<Vec3>,

    /// Where each particle sits when scattered.
    pub scatter_positions: Vec<Vec3>,

    /// The per-particle seed in `[0, 1)`, used for breathing phase and sparkle.
    pub random_seeds: Vec<f32>,
}

/// The static data of an instanced layer, uploaded once per dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerUpload<'a> {
    /// The name of the layer.
    pub name: &'a str,

    /// What the layer draws.
    pub kind: InstanceKind,

    /// The colour of every instance, in dataset order.
    pub colours: Vec<Colour>,

    /// The surface of the layer's material.
    pub material: MaterialHints,
}

/// The star on top of the tree, uploaded once.
#[derive(Clone, Debug, PartialEq)]
pub struct TopperMesh {
    /// The closed outline of the star, to be extruded and centred.
    pub outline: Vec<Vec2>,

    /// How deep to extrude the outline.
    pub depth: f32,

    /// The surface of the star's material.
    pub material: MaterialHints,
}

/// The per-frame transforms of one instanced layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerView<'a> {
    /// The name of the layer.
    pub name: &'a str,

    /// What the layer draws.
    pub kind: InstanceKind,

    /// The model matrix of every instance, in dataset order.
    pub matrices: &'a [Mat4],
}

/// Everything that changes from frame to frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameView<'a> {
    /// The elapsed time in seconds.
    pub time: f64,

    /// The current morph factor.
    pub morph: f32,

    /// The transform applied to the whole scene.
    pub root: Mat4,

    /// The CPU-computed foliage positions, in dataset order. A renderer that runs the foliage
    /// program on the device only needs [`foliage_uniforms`](Self::foliage_uniforms).
    pub particle_positions: &'a [Vec3],

    /// The uniforms of the foliage program for this frame.
    pub foliage_uniforms: FoliageUniforms,

    /// Every instanced layer, in config order.
    pub layers: Vec<LayerView<'a>>,

    /// The transform of the star on top.
    pub topper: InstanceTransform,
}

/// Something that can draw a [`Scene`](crate::Scene).
///
/// The upload methods are only called when the static data changes, which is when the scene is
/// first presented and after a reconfiguration. [`draw_frame`](Self::draw_frame) is called for
/// every presented frame.
pub trait RenderSink {
    /// Upload the static attributes of the foliage.
    fn upload_foliage_attributes(&mut self, attributes: &FoliageAttributes);

    /// Upload the colours and material of an instanced layer.
    fn upload_instance_colours(&mut self, layer: &LayerUpload<'_>);

    /// Upload the mesh of the star on top.
    fn upload_topper(&mut self, topper: &TopperMesh);

    /// Draw a single frame.
    fn draw_frame(&mut self, frame: &FrameView<'_>);
}

/// A simple debug sink that just logs everything it receives with tracing.
#[derive(Clone, Debug, Default)]
pub struct DebugSink {
    /// How many frames have been drawn so far.
    frames: u64,
}

impl DebugSink {
    /// How many frames this sink has drawn.
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for DebugSink {
    #[instrument(skip_all)]
    fn upload_foliage_attributes(&mut self, attributes: &FoliageAttributes) {
        info!(particles = attributes.tree_positions.len(), "Uploading foliage");
    }

    #[instrument(skip_all, fields(layer = layer.name))]
    fn upload_instance_colours(&mut self, layer: &LayerUpload<'_>) {
        info!(
            kind = %layer.kind,
            instances = layer.colours.len(),
            material = ?layer.material,
            "Uploading layer"
        );
    }

    #[instrument(skip_all)]
    fn upload_topper(&mut self, topper: &TopperMesh) {
        info!(vertices = topper.outline.len(), "Uploading topper");
    }

    #[instrument(skip_all, fields(frame = self.frames))]
    fn draw_frame(&mut self, frame: &FrameView<'_>) {
        self.frames += 1;

        let topper_height = frame.topper.translation.y;
        let instances: usize = frame.layers.iter().map(|layer| layer.matrices.len()).sum();
        info!(
            time = frame.time,
            morph = frame.morph,
            topper_height,
            instances
        );
        debug!(first_particle = ?frame.particle_positions.first());
    }
}
