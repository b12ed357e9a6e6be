//! The scene compositor
//!
//! Owns the simulation clock, the camera, the sphere pool and the shape, and
//! turns them into a depth-ordered, alpha-blended frame.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::{SceneConfig, ShapeSource};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::foundation::time::Timer;
use crate::render::{BlendFactor, RenderContext, RenderError};
use crate::shape::{Face, Shape, ShapeError, ShapeUniforms};

use super::camera::{CameraRig, OrbitCamera};
use super::deferred::{CallError, DeferredCallQueue, DeferredSender};
use super::draw_order::{sort_back_to_front, DrawItem};
use super::input::{Key, KeyState};
use super::sphere::SpherePool;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Shape could not be built
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),
    /// Render context rejected a call
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A deferred call failed
    #[error("Deferred call failed: {0}")]
    DeferredCall(CallError),
    /// `render` was called before the first `update`
    #[error("Scene has not been updated yet")]
    NotPrepared,
}

/// Read-only view of scene state for overlays and logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSnapshot {
    /// Frames advanced so far
    pub frame: u64,
    /// Seconds simulated so far
    pub elapsed: f32,
    /// Frames per second of the last frame
    pub fps: f32,
    /// Enabled spheres
    pub spheres: usize,
    /// Sphere slots
    pub sphere_capacity: usize,
    /// Faces of the shape
    pub faces: usize,
    /// Triangles of the shape
    pub triangles: usize,
    /// Camera position
    pub camera: Vec3,
}

/// Scene compositor
///
/// Cross-thread producers interact with a scene only through
/// [`Scene::deferred_sender`]; everything else happens on the thread that
/// owns it.
pub struct Scene {
    size: (u32, u32),
    clear_color: [f32; 4],
    fov: f32,
    clip: (f32, f32),
    camera: Box<dyn CameraRig>,
    spheres: SpherePool,
    shape: Shape,
    deferred: DeferredCallQueue<Scene>,
    keys: KeyState,
    timer: Timer,
    rng: StdRng,
    next_texture_slot: u32,
    uniforms: Option<ShapeUniforms>,
    enabled: bool,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("size", &self.size)
            .field("shape", &self.shape)
            .field("spheres", &self.spheres)
            .field("deferred", &self.deferred)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Build a scene with an entropy-seeded random source
    pub fn new(config: &SceneConfig, ctx: &mut dyn RenderContext) -> Result<Self, SceneError> {
        Self::with_rng(config, ctx, StdRng::from_entropy())
    }

    /// Build a scene with a caller-supplied random source
    pub fn with_rng(config: &SceneConfig, ctx: &mut dyn RenderContext, mut rng: StdRng) -> Result<Self, SceneError> {
        config.validate()?;

        ctx.enable_blending(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);

        let capacity = config.spheres.capacity;
        let shape = match &config.shape {
            ShapeSource::Builtin(solid) => {
                log::info!("Using built-in {}", solid.name());
                Shape::from_mesh(ctx, &solid.mesh(), config.shape_radius, capacity)?
            }
            ShapeSource::File(path) => Shape::load(ctx, path, config.shape_radius, capacity)?,
        };

        // texture slot 0 is left to the default texture
        let textures: Vec<u32> = (1..=config.spheres.texture_slots).collect();
        let mut spheres = SpherePool::new(ctx, &config.spheres, textures)?;
        spheres.set_count(config.spheres.initial_count, &mut rng);

        Ok(Self {
            size: (config.width, config.height),
            clear_color: config.clear_color,
            fov: utils::deg_to_rad(config.projection.fov_deg),
            clip: (config.projection.near, config.projection.far),
            camera: Box::new(OrbitCamera::new(&config.camera)),
            spheres,
            shape,
            deferred: DeferredCallQueue::new(),
            keys: KeyState::new(),
            timer: Timer::new(),
            rng,
            next_texture_slot: config.spheres.texture_slots + 1,
            uniforms: None,
            enabled: true,
        })
    }

    /// Replace the camera rig
    pub fn with_camera(mut self, camera: Box<dyn CameraRig>) -> Self {
        self.camera = camera;
        self
    }

    /// Run deferred calls, then sample the clock and advance by the elapsed time
    ///
    /// If a deferred call fails the clock is not sampled, so the elapsed time
    /// carries over to the next successful update.
    pub fn update(&mut self) -> Result<(), SceneError> {
        self.run_deferred()?;
        let dt = self.timer.tick();
        self.step(dt);
        Ok(())
    }

    /// Run deferred calls, then advance by a fixed `dt` without touching the clock
    pub fn advance(&mut self, dt: f32) -> Result<(), SceneError> {
        self.run_deferred()?;
        self.timer.record(dt);
        self.step(dt);
        Ok(())
    }

    fn step(&mut self, dt: f32) {
        self.camera.apply_input(&self.keys);
        self.camera.update(dt);

        let view = self.camera.view_matrix();
        let aspect = self.size.0 as f32 / self.size.1 as f32;
        let projection = Mat4::perspective(self.fov, aspect, self.clip.0, self.clip.1);

        self.spheres.update(dt);
        self.uniforms = Some(self.shape.update(dt, self.spheres.slots(), view, projection));
    }

    /// Run the calls pending at the start of this update, oldest first
    fn run_deferred(&mut self) -> Result<(), SceneError> {
        let mut executed = 0;
        for call in self.deferred.batch() {
            call(self).map_err(SceneError::DeferredCall)?;
            executed += 1;
        }
        if executed > 0 {
            log::trace!("Ran {executed} deferred calls");
        }
        Ok(())
    }

    /// Draw the frame
    ///
    /// Clears, then (if enabled) uploads this frame's uniforms and draws every
    /// face and enabled sphere farthest-first. Calling it again without an
    /// update issues the same command stream.
    pub fn render(&self, ctx: &mut dyn RenderContext) -> Result<(), SceneError> {
        ctx.clear(self.clear_color);
        if !self.enabled {
            return Ok(());
        }

        let uniforms = self.uniforms.as_ref().ok_or(SceneError::NotPrepared)?;
        self.shape.upload(ctx, uniforms)?;
        self.spheres.upload(ctx, &uniforms.view, &uniforms.projection)?;

        for item in self.draw_order() {
            match item {
                DrawItem::Face(index) => self.shape.render_face(ctx, index)?,
                DrawItem::Sphere(index) => self.spheres.render_sphere(ctx, index)?,
            }
        }
        Ok(())
    }

    /// Faces then enabled spheres, sorted by distance to the camera, farthest first
    pub fn draw_order(&self) -> Vec<DrawItem> {
        let eye = self.camera.position();
        let mut items: Vec<(DrawItem, f32)> = self
            .shape
            .faces()
            .iter()
            .map(|face| (DrawItem::Face(face.index()), face.distance_to(&eye)))
            .chain(
                self.spheres
                    .enabled()
                    .map(|(index, sphere)| (DrawItem::Sphere(index), sphere.distance_to(&eye))),
            )
            .collect();

        sort_back_to_front(&mut items, |(_, distance)| *distance);
        items.into_iter().map(|(item, _)| item).collect()
    }

    /// Queue a call to run at the start of the next update
    pub fn defer<F>(&self, call: F)
    where
        F: FnOnce(&mut Scene) -> Result<(), CallError> + Send + 'static,
    {
        self.deferred.put(call);
    }

    /// Handle for queuing calls from other threads
    pub fn deferred_sender(&self) -> DeferredSender<Scene> {
        self.deferred.sender()
    }

    /// Number of deferred calls waiting
    pub fn pending_calls(&self) -> usize {
        self.deferred.pending()
    }

    /// Record a key press
    pub fn key_down(&mut self, key: Key) {
        self.keys.press(key);
    }

    /// Record a key release
    pub fn key_up(&mut self, key: Key) {
        self.keys.release(&key);
    }

    /// Enable the first `count` sphere slots and disable the rest
    pub fn set_sphere_count(&mut self, count: usize) -> usize {
        self.spheres.set_count(count, &mut self.rng)
    }

    /// Reserve the next free texture unit
    pub fn allocate_texture_slot(&mut self) -> u32 {
        let slot = self.next_texture_slot;
        self.next_texture_slot += 1;
        slot
    }

    /// Extension point for sphere/face contact
    pub fn on_sphere_face_collision(&mut self, _sphere: usize, _face: usize, _point: Vec3) {}

    /// Show or hide everything but the clear
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether faces and spheres are drawn
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Viewport size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Faces of the shape in mesh order
    pub fn faces(&self) -> &[Face] {
        self.shape.faces()
    }

    /// The shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mutable access to the shape
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// The sphere pool
    pub fn spheres(&self) -> &SpherePool {
        &self.spheres
    }

    /// Mutable access to the sphere pool
    pub fn spheres_mut(&mut self) -> &mut SpherePool {
        &mut self.spheres
    }

    /// The camera rig
    pub fn camera(&self) -> &dyn CameraRig {
        self.camera.as_ref()
    }

    /// Uniforms produced by the last update
    pub fn uniforms(&self) -> Option<&ShapeUniforms> {
        self.uniforms.as_ref()
    }

    /// Current counters and camera position
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            frame: self.timer.frame_count(),
            elapsed: self.timer.total_time(),
            fps: self.timer.current_fps(),
            spheres: self.spheres.enabled_count(),
            sphere_capacity: self.spheres.capacity(),
            faces: self.shape.faces().len(),
            triangles: self.shape.triangle_count(),
            camera: self.camera.position(),
        }
    }
}
