//! This binary crate runs the Tree Morph scene headlessly at a fixed time step, toggling between
//! the scattered cloud and the assembled tree, and logs every frame.

mod logging;

use clap::Parser;
use color_eyre::{
    eyre::{ensure, Context},
    Result,
};
use std::{path::PathBuf, thread, time::Duration};
use tm_scene::{DebugSink, Scene, SceneConfig};
use tracing::{info, instrument};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The RON file to read the scene config from. The default config is written here if the
    /// file is missing or invalid.
    #[arg(short, long, default_value = "tree_morph.ron")]
    config: PathBuf,

    /// How many frames to run for.
    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    /// The frame rate of the fixed time step.
    #[arg(long, default_value_t = 60.)]
    fps: f32,

    /// Toggle between the two shapes after this many seconds.
    #[arg(short, long, default_value_t = 5.)]
    toggle_every: f32,

    /// Override the seed in the config file.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Sleep between frames so that the run takes as long as it would on screen.
    #[arg(long)]
    realtime: bool,

    /// Also write debug logs to an hourly file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // _guard gets dropped at the end of main so that the logs get flushed to the file
    let _guard = self::logging::init_tracing(args.log_dir.as_deref());

    ensure!(
        args.fps.is_finite() && args.fps > 0.,
        "The frame rate must be positive, got {}",
        args.fps
    );
    ensure!(
        args.toggle_every.is_finite() && args.toggle_every > 0.,
        "The toggle interval must be positive, got {}",
        args.toggle_every
    );

    let mut config = SceneConfig::from_file(&args.config);
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let scene = Scene::new(config)
        .wrap_err_with(|| format!("Failed to build the scene from {}", args.config.display()))?;

    run(scene, &args);
    Ok(())
}

/// Run the scene for the requested number of frames.
#[instrument(skip_all, fields(frames = args.frames, fps = args.fps))]
fn run(mut scene: Scene, args: &Args) {
    let delta = 1. / args.fps;
    let mut sink = DebugSink::default();
    let mut since_toggle = 0.;

    info!(shape = ?scene.shape_state(), "Starting");

    for _ in 0..args.frames {
        scene.advance(delta);
        scene.present(&mut sink);

        since_toggle += delta;
        if since_toggle >= args.toggle_every {
            since_toggle = 0.;
            let shape = scene.toggle_shape_state();
            info!(?shape, morph = scene.morph(), "Toggled shape");
        }

        if args.realtime {
            thread::sleep(Duration::from_secs_f32(delta));
        }
    }

    info!(
        frames = sink.frames_drawn(),
        time = scene.time(),
        morph = scene.morph(),
        "Finished"
    );
}
