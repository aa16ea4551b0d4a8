//! This module handles the scene config and reading and writing it as RON.

use crate::SceneError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tm_dataset::{
    palette, validate_dimensions, ConfigError, InstanceDatasetConfig, InstanceKind,
    ParticleDatasetConfig,
};
use tm_geometry::{Colour, TreeDimensions};
use tm_morph::{MorphSettings, ParticleMotion, ShapeState};
use tracing::{error, instrument, warn};

/// The look and motion of the foliage particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoliageConfig {
    /// How the particles are generated.
    pub particles: ParticleDatasetConfig,

    /// The colour at the core of each particle.
    pub colour_base: Colour,

    /// The colour of the rims and sparkles.
    pub colour_high: Colour,

    /// How far the highlight colour is overdriven.
    pub glow_intensity: f32,

    /// The breathing and swirling of the particles.
    pub motion: ParticleMotion,
}

impl FoliageConfig {
    /// Check the particles, the motion, and the glow.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.particles.validate()?;
        self.motion.validate()?;

        if !(self.glow_intensity.is_finite() && self.glow_intensity >= 0.) {
            return Err(ConfigError::InvalidGlowIntensity(self.glow_intensity));
        }

        Ok(())
    }
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            particles: ParticleDatasetConfig::default(),
            colour_base: Colour::from_rgb8(palette::FOLIAGE_BASE),
            colour_high: Colour::from_rgb8(palette::GOLD_HIGH),
            glow_intensity: 4.,
            motion: ParticleMotion::default(),
        }
    }
}

/// An instanced layer with a name, so that it can be reconfigured on its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// The unique name of this layer.
    pub name: String,

    /// How the instances in this layer are generated.
    pub instances: InstanceDatasetConfig,
}

impl LayerConfig {
    /// Create a named layer.
    pub fn new(name: impl Into<String>, instances: InstanceDatasetConfig) -> Self {
        Self {
            name: name.into(),
            instances,
        }
    }
}

/// The default layers: heavy gifts, baubles, and tiny lights.
fn default_layers() -> Vec<LayerConfig> {
    vec![
        LayerConfig::new(
            "gifts",
            InstanceDatasetConfig::new(InstanceKind::Box, 35, palette::metallic(), (0.3, 0.45)),
        ),
        LayerConfig::new(
            "baubles",
            InstanceDatasetConfig::new(
                InstanceKind::Sphere,
                150,
                palette::metallic(),
                (0.12, 0.22),
            ),
        ),
        LayerConfig::new(
            "lights",
            InstanceDatasetConfig::new(InstanceKind::Star, 300, palette::lights(), (0.08, 0.15)),
        ),
    ]
}

/// Everything needed to build a [`Scene`](crate::Scene).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// The size of the tree and the scatter shell.
    pub dimensions: TreeDimensions,

    /// The foliage particles.
    pub foliage: FoliageConfig,

    /// The instanced layers, drawn in order.
    pub layers: Vec<LayerConfig>,

    /// The tuning of the morph animation.
    pub morph: MorphSettings,

    /// The shape to head towards as soon as the scene starts.
    pub initial_shape: ShapeState,

    /// The seed for every dataset. If this is `None`, then every run looks different.
    #[serde(default)]
    pub seed: Option<u64>,

    /// The translation the renderer applies to the whole scene.
    pub root_offset: Vec3,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dimensions: TreeDimensions::default(),
            foliage: FoliageConfig::default(),
            layers: default_layers(),
            morph: MorphSettings::default(),
            initial_shape: ShapeState::Tree,
            seed: None,
            root_offset: Vec3::new(0., -1., 0.),
        }
    }
}

impl SceneConfig {
    /// Check everything that would make [`Scene::new`](crate::Scene::new) fail.
    pub fn validate(&self) -> Result<(), SceneError> {
        validate_dimensions(&self.dimensions)?;
        self.foliage.validate()?;
        self.morph.validate()?;

        for (i, layer) in self.layers.iter().enumerate() {
            layer.instances.validate()?;

            if self.layers[..i].iter().any(|other| other.name == layer.name) {
                return Err(SceneError::DuplicateLayer(layer.name.clone()));
            }
        }

        Ok(())
    }

    /// Load and validate the config from the given file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = fs::read_to_string(path)?;
        let config: Self = ron::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config from the given file.
    ///
    /// If the file doesn't exist or doesn't contain a valid config, then the default config is
    /// written to the file and returned.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(%e, "Using the default scene config");

                let default = Self::default();
                if let Err(e) = default.save_to_file(path) {
                    error!(%e, "Failed to write the default scene config");
                }
                default
            }
        }
    }

    /// Save the config to the given file as pretty RON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::DirBuilder::new().recursive(true).create(parent)?;
        }

        let text =
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default().struct_names(true))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Find the layer with the given name.
    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|layer| layer.name == name)
    }
}
