//! This crate ties everything together into a [`Scene`] that can be configured from a RON file
//! and drawn by any [`RenderSink`].

mod config;
mod error;
mod scene;
mod sink;

pub use self::{
    config::{FoliageConfig, LayerConfig, SceneConfig},
    error::SceneError,
    scene::Scene,
    sink::{
        DebugSink, FoliageAttributes, FrameView, LayerUpload, LayerView, RenderSink, TopperMesh,
    },
};

pub use tm_morph::ShapeState;

/// Get an RNG for generating datasets when no seed is configured.
///
/// This is seeded in tests and benchmarks so that they're reproducible.
macro_rules! rng {
    () => {{
        use ::rand::{rngs::StdRng, SeedableRng};

        cfg_if::cfg_if! {
            if #[cfg(any(test, feature = "bench"))] {
                StdRng::seed_from_u64(12345)
            } else {
                StdRng::from_entropy()
            }
        }
    }};
}

pub(crate) use rng;
