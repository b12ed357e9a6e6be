//! Headless glow demo
//!
//! Builds a scene from a config file, renders it into a recording context,
//! and drives it with a producer thread that changes the sphere count and
//! orbits the camera through deferred calls.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glow_engine::core::ConfigError;
use glow_engine::foundation::logging;
use glow_engine::prelude::*;
use rand::prelude::*;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "glow_app/config/scene.toml";

/// Delay between producer messages
const PRODUCER_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Error, Debug)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("Producer thread panicked")]
    ProducerPanicked,
}

struct GlowDemo {
    config: GlowConfig,
    ctx: RecordingContext,
    scene: Scene,
}

impl GlowDemo {
    fn new(config: GlowConfig) -> Result<Self, AppError> {
        let mut ctx = RecordingContext::new();
        let scene = Scene::new(&config.scene, &mut ctx)?;
        log::info!(
            "Scene ready: {} faces, {} of {} spheres",
            scene.faces().len(),
            scene.spheres().enabled_count(),
            scene.spheres().capacity()
        );
        Ok(Self { config, ctx, scene })
    }

    fn run(mut self) -> Result<(), AppError> {
        let frames = self.config.engine.frames;
        let frame_budget = self
            .config
            .engine
            .target_fps
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));

        let producer = spawn_producer(self.scene.deferred_sender(), self.config.scene.spheres.capacity);

        for frame in 0..frames {
            let started = Instant::now();

            self.scene.update()?;
            self.scene.render(&mut self.ctx)?;
            let commands = self.ctx.take_commands();

            if frame % 60 == 0 {
                let snapshot = self.scene.snapshot();
                log::info!(
                    "frame {:>4}: {} spheres, {} commands, {:.1} fps, camera at ({:.2}, {:.2}, {:.2})",
                    snapshot.frame,
                    snapshot.spheres,
                    commands.len(),
                    snapshot.fps,
                    snapshot.camera.x,
                    snapshot.camera.y,
                    snapshot.camera.z
                );
            }

            if let Some(budget) = frame_budget {
                if let Some(remaining) = budget.checked_sub(started.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }

        log::info!("Finished after {} frames", self.scene.snapshot().frame);

        // the producer stops once the queue it feeds is gone
        drop(self.scene);
        producer.join().map_err(|_| AppError::ProducerPanicked)
    }
}

/// Periodically change the sphere count and hold an orbit key
fn spawn_producer(sender: DeferredSender<Scene>, capacity: usize) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut rng = StdRng::from_entropy();
        let mut orbiting = false;

        loop {
            thread::sleep(PRODUCER_INTERVAL);

            let count = rng.gen_range(1..=capacity.max(1));
            let sent = sender.put(move |scene| {
                scene.set_sphere_count(count);
                Ok(())
            });
            if sent.is_err() {
                break;
            }

            orbiting = !orbiting;
            let hold = orbiting;
            let sent = sender.put(move |scene| {
                if hold {
                    scene.key_down(Key::Right);
                } else {
                    scene.key_up(Key::Right);
                }
                Ok(())
            });
            if sent.is_err() {
                break;
            }
        }

        log::debug!("Producer stopped");
    })
}

fn load_config() -> Result<GlowConfig, AppError> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);

    let config = if path.exists() {
        GlowConfig::load_from_file(&path)?
    } else {
        eprintln!("Config {} not found, using defaults", path.display());
        GlowConfig::default()
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.engine.log_level);

    log::info!("Starting glow demo");
    let result = GlowDemo::new(config).and_then(GlowDemo::run);

    match result {
        Ok(()) => {
            log::info!("Glow demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Glow demo failed: {e}");
            Err(e.into())
        }
    }
}
