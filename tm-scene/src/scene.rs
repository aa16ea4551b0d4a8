//! This module handles the [`Scene`], which owns every dataset and drives a frame.

use crate::{
    FoliageAttributes, FrameView, LayerConfig, LayerUpload, LayerView, RenderSink, SceneConfig,
    SceneError, TopperMesh,
};
use glam::Mat4;
use rand::{rngs::StdRng, SeedableRng};
use tm_dataset::{
    palette, validate_dimensions, InstanceDataset, InstanceDatasetConfig, MaterialHints,
    ParticleDataset, ParticleDatasetConfig,
};
use tm_geometry::{Colour, TreeDimensions};
use tm_morph::{
    star_outline, InstanceBuffer, InstanceTransform, MorphAnimator, ParticleBuffer, ShapeState,
    Topper,
};
use tm_shader::FoliageUniforms;
use tracing::{debug, error, info, instrument, trace, warn};

/// The surface of the star on top of the tree.
const TOPPER_MATERIAL: MaterialHints = MaterialHints {
    roughness: 0.1,
    metalness: 1.,
    emissive: Colour::new(
        palette::GOLD_MID[0] as f32 / 255.,
        palette::GOLD_MID[1] as f32 / 255.,
        palette::GOLD_MID[2] as f32 / 255.,
    ),
    emissive_intensity: 0.8,
    env_map_intensity: 2.,
    clearcoat: 0.,
};

/// An instanced layer and its frame buffer.
#[derive(Clone, Debug)]
struct Layer {
    name: String,
    dataset: InstanceDataset,
    buffer: InstanceBuffer,

    /// Whether the colours need to be uploaded again.
    dirty: bool,
}

/// The whole morphing tree: the foliage, every instanced layer, and the star on top.
///
/// Datasets are generated once in [`Scene::new`] and only ever regenerated by
/// [`Scene::reconfigure_layer`], [`Scene::reconfigure_foliage`], and [`Scene::set_dimensions`].
/// Every call to [`Scene::advance`] moves the morph factor
/// towards the current shape and recomputes every buffer.
#[derive(Clone, Debug)]
pub struct Scene {
    config: SceneConfig,
    rng: StdRng,
    animator: MorphAnimator,

    /// The elapsed time in seconds. This is kept as an `f64` so that small deltas still move it
    /// after days of running, and only narrowed for the per-frame maths.
    time: f64,

    foliage: ParticleDataset,
    particles: ParticleBuffer,
    foliage_dirty: bool,

    layers: Vec<Layer>,

    topper: Topper,
    topper_transform: InstanceTransform,
    topper_dirty: bool,
}

impl Scene {
    /// Build a scene from the given config, failing if any part of it is invalid.
    #[instrument(skip_all, fields(seed = ?config.seed))]
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => crate::rng!(),
        };

        let foliage =
            ParticleDataset::generate(&config.foliage.particles, &config.dimensions, &mut rng)?;
        let particles = ParticleBuffer::new(&foliage);

        let layers = config
            .layers
            .iter()
            .map(|layer| -> Result<Layer, SceneError> {
                let dataset =
                    InstanceDataset::generate(&layer.instances, &config.dimensions, &mut rng)?;
                Ok(Layer {
                    name: layer.name.clone(),
                    buffer: InstanceBuffer::new(&dataset),
                    dataset,
                    dirty: true,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut animator = MorphAnimator::new(config.morph)?;
        animator.set_shape_state(config.initial_shape);

        let topper = Topper::new(&config.dimensions);

        let mut scene = Self {
            rng,
            animator,
            time: 0.,
            foliage,
            particles,
            foliage_dirty: true,
            layers,
            topper_transform: topper.transform(0., 0.),
            topper,
            topper_dirty: true,
            config,
        };
        scene.update_buffers();

        info!(
            particles = scene.foliage.len(),
            layers = scene.layers.len(),
            "Built scene"
        );
        Ok(scene)
    }

    /// The config this scene was built from, including any reconfigured layers.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The current morph factor.
    pub fn morph(&self) -> f32 {
        self.animator.current()
    }

    /// The elapsed time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The shape the scene is heading towards.
    pub fn shape_state(&self) -> ShapeState {
        self.animator.shape_state()
    }

    /// Whether the morph factor has reached the current shape.
    pub fn is_settled(&self) -> bool {
        self.animator.is_settled()
    }

    /// Head towards the given shape.
    pub fn set_shape_state(&mut self, shape: ShapeState) {
        self.animator.set_shape_state(shape);
    }

    /// Head towards the other shape and return it.
    pub fn toggle_shape_state(&mut self) -> ShapeState {
        let shape = self.animator.shape_state().toggled();
        self.animator.set_shape_state(shape);
        shape
    }

    /// The foliage dataset.
    pub fn foliage(&self) -> &ParticleDataset {
        &self.foliage
    }

    /// The dataset of the named layer.
    pub fn layer(&self, name: &str) -> Option<&InstanceDataset> {
        self.layers
            .iter()
            .find(|layer| layer.name == name)
            .map(|layer| &layer.dataset)
    }

    /// Advance the scene by `delta_seconds` and recompute every buffer.
    ///
    /// Negative or non-finite deltas don't move the clock or the morph factor, and a delta of
    /// zero leaves everything exactly as it was.
    pub fn advance(&mut self, delta_seconds: f32) {
        self.animator.advance(delta_seconds);

        if delta_seconds.is_finite() && delta_seconds > 0. {
            self.time += f64::from(delta_seconds);
        }

        self.update_buffers();
    }

    /// Recompute every buffer for the current morph factor and time.
    fn update_buffers(&mut self) {
        let morph = self.animator.current();
        let time = self.time as f32;
        trace!(morph, time, "Updating buffers");

        self.particles
            .update(&self.foliage, morph, time, &self.config.foliage.motion);

        for layer in &mut self.layers {
            layer.buffer.update(&layer.dataset, morph, time);
        }

        self.topper_transform = self.topper.transform(morph, time);
    }

    /// The uniforms of the foliage program for the current frame.
    pub fn foliage_uniforms(&self) -> FoliageUniforms {
        let foliage = &self.config.foliage;

        FoliageUniforms {
            time: self.time as f32,
            morph: self.animator.current(),
            colour_high: foliage.colour_high,
            colour_base: foliage.colour_base,
            glow_intensity: foliage.glow_intensity,
            motion: foliage.motion,
        }
    }

    /// Everything that changes from frame to frame.
    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            time: self.time,
            morph: self.animator.current(),
            root: Mat4::from_translation(self.config.root_offset),
            particle_positions: self.particles.positions(),
            foliage_uniforms: self.foliage_uniforms(),
            layers: self
                .layers
                .iter()
                .map(|layer| LayerView {
                    name: &layer.name,
                    kind: layer.dataset.kind(),
                    matrices: layer.buffer.matrices(),
                })
                .collect(),
            topper: self.topper_transform,
        }
    }

    /// Upload anything that changed since the last call and then draw the current frame.
    #[instrument(skip_all)]
    pub fn present(&mut self, sink: &mut dyn RenderSink) {
        if self.foliage_dirty {
            sink.upload_foliage_attributes(&FoliageAttributes {
                tree_positions: self.foliage.tree_positions(),
                scatter_positions: self.foliage.scatter_positions(),
                random_seeds: self.foliage.random_seeds(),
            });
            self.foliage_dirty = false;
        }

        for layer in self.layers.iter_mut().filter(|layer| layer.dirty) {
            let kind = layer.dataset.kind();
            sink.upload_instance_colours(&LayerUpload {
                name: &layer.name,
                kind,
                colours: layer.dataset.colours(),
                material: kind.material(),
            });
            layer.dirty = false;
        }

        if self.topper_dirty {
            sink.upload_topper(&TopperMesh {
                outline: star_outline(5, 1.2, 0.6),
                depth: 0.4,
                material: TOPPER_MATERIAL,
            });
            self.topper_dirty = false;
        }

        sink.draw_frame(&self.frame_view());
    }

    /// Rebuild one instanced layer from a new config.
    ///
    /// If the new config is invalid, then the layer keeps its current dataset and the error is
    /// returned. The new dataset starts at the current morph factor and time, so the layer
    /// doesn't jump.
    #[instrument(skip(self, instances), fields(kind = %instances.kind, count = instances.count))]
    pub fn reconfigure_layer(
        &mut self,
        name: &str,
        instances: InstanceDatasetConfig,
    ) -> Result<(), SceneError> {
        let Some(index) = self.layers.iter().position(|layer| layer.name == name) else {
            warn!("Tried to reconfigure a layer that doesn't exist");
            return Err(SceneError::UnknownLayer(name.to_string()));
        };

        let dataset =
            match InstanceDataset::generate(&instances, &self.config.dimensions, &mut self.rng) {
                Ok(dataset) => dataset,
                Err(e) => {
                    error!(%e, "Keeping the previous dataset");
                    return Err(e.into());
                }
            };

        let mut buffer = InstanceBuffer::new(&dataset);
        buffer.update(&dataset, self.animator.current(), self.time as f32);

        let layer = &mut self.layers[index];
        layer.dataset = dataset;
        layer.buffer = buffer;
        layer.dirty = true;

        self.config.layers[index] = LayerConfig::new(name, instances);

        debug!("Reconfigured layer");
        Ok(())
    }

    /// Regenerate the foliage from a new config.
    ///
    /// If the new config is invalid, then the foliage keeps its current dataset and the error is
    /// returned. The morph factor and time are untouched.
    #[instrument(skip_all, fields(count = particles.count))]
    pub fn reconfigure_foliage(
        &mut self,
        particles: ParticleDatasetConfig,
    ) -> Result<(), SceneError> {
        let foliage =
            match ParticleDataset::generate(&particles, &self.config.dimensions, &mut self.rng) {
                Ok(foliage) => foliage,
                Err(e) => {
                    error!(%e, "Keeping the previous foliage");
                    return Err(e.into());
                }
            };

        let mut buffer = ParticleBuffer::new(&foliage);
        buffer.update(
            &foliage,
            self.animator.current(),
            self.time as f32,
            &self.config.foliage.motion,
        );

        self.foliage = foliage;
        self.particles = buffer;
        self.foliage_dirty = true;
        self.config.foliage.particles = particles;

        debug!("Reconfigured foliage");
        Ok(())
    }

    /// Resize the tree, regenerating the foliage, every layer, and the star on top.
    ///
    /// Nothing changes unless every dataset can be generated for the new dimensions. The morph
    /// factor and time are untouched.
    #[instrument(skip(self))]
    pub fn set_dimensions(&mut self, dimensions: TreeDimensions) -> Result<(), SceneError> {
        let rng = &mut self.rng;
        let generated = validate_dimensions(&dimensions)
            .and_then(|()| {
                ParticleDataset::generate(&self.config.foliage.particles, &dimensions, &mut *rng)
            })
            .and_then(|foliage| {
                let datasets = self
                    .config
                    .layers
                    .iter()
                    .map(|layer| {
                        InstanceDataset::generate(&layer.instances, &dimensions, &mut *rng)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((foliage, datasets))
            });

        let (foliage, datasets) = match generated {
            Ok(generated) => generated,
            Err(e) => {
                error!(%e, "Keeping the previous dimensions");
                return Err(e.into());
            }
        };

        self.particles = ParticleBuffer::new(&foliage);
        self.foliage = foliage;
        self.foliage_dirty = true;

        for (layer, dataset) in self.layers.iter_mut().zip(datasets) {
            layer.buffer = InstanceBuffer::new(&dataset);
            layer.dataset = dataset;
            layer.dirty = true;
        }

        self.topper = Topper::new(&dimensions);
        self.topper_dirty = true;
        self.config.dimensions = dimensions;

        self.update_buffers();

        info!(particles = self.foliage.len(), "Resized tree");
        Ok(())
    }
}
