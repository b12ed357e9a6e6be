//! # Unified Configuration System
//!
//! All configuration structures for the engine live here. Every structure
//! has sensible defaults, builder-style `with_*` setters and a `validate`
//! method, and the top-level [`GlowConfig`] can be loaded from TOML or RON
//! through the [`Config`] trait.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging and demo loop settings
//! - **Scene Config**: viewport, shape source, spheres, camera, projection

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assets::BuiltinSolid;
use crate::foundation::math::constants::TAU;

pub use crate::config::{Config, ConfigError};

/// Highest sphere capacity the shape shader is generated for
pub const MAX_SPHERE_CAPACITY: usize = 64;

/// # Engine Configuration
///
/// Logging and main-loop behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter (`RUST_LOG` overrides it)
    pub log_level: String,
    /// Number of frames the demo loop runs before exiting
    pub frames: u64,
    /// Target FPS for frame rate limiting
    pub target_fps: Option<u32>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            frames: 600,
            target_fps: Some(60),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the number of frames to run
    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = frames;
        self
    }

    /// Set target FPS (`None` runs unthrottled)
    pub fn with_target_fps(mut self, fps: Option<u32>) -> Self {
        self.target_fps = fps;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the scene's polyhedron comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeSource {
    /// One of the solids generated in code
    Builtin(BuiltinSolid),
    /// A Wavefront OBJ file on disk
    File(PathBuf),
}

impl Default for ShapeSource {
    fn default() -> Self {
        Self::Builtin(BuiltinSolid::Hexahedron)
    }
}

/// # Sphere Pool Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    /// Number of pre-allocated sphere slots
    pub capacity: usize,
    /// Spheres enabled at startup
    pub initial_count: usize,
    /// Radius given to re-initialized spheres
    pub radius: f32,
    /// Speed multiplier applied to the unit velocity
    pub speed: f32,
    /// Spheres bounce back when they leave this radius around the origin
    pub arena_radius: f32,
    /// Number of texture slots reserved for sphere textures
    pub texture_slots: u32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            initial_count: 3,
            radius: 1.0,
            speed: 1.0,
            arena_radius: 6.0,
            texture_slots: 4,
        }
    }
}

impl SphereConfig {
    /// Validate the sphere settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.capacity > MAX_SPHERE_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "sphere capacity must be in 1..={MAX_SPHERE_CAPACITY}, got {}",
                self.capacity
            )));
        }
        if self.initial_count > self.capacity {
            return Err(ConfigError::Invalid(format!(
                "initial sphere count {} exceeds capacity {}",
                self.initial_count, self.capacity
            )));
        }
        if self.radius <= 0.0 {
            return Err(ConfigError::Invalid("sphere radius must be positive".to_string()));
        }
        if self.arena_radius <= self.radius {
            return Err(ConfigError::Invalid("arena radius must exceed sphere radius".to_string()));
        }
        if self.texture_slots == 0 {
            return Err(ConfigError::Invalid("at least one sphere texture slot is required".to_string()));
        }
        Ok(())
    }
}

/// # Orbit Camera Configuration
///
/// Angles are given in degrees; speeds in radians (or units) per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial angle around the Y axis
    pub azimuth_deg: f32,
    /// Initial angle from the +Y axis
    pub polar_deg: f32,
    /// Initial distance from the target
    pub distance: f32,
    /// Angular speed for azimuth and polar motion
    pub angular_speed: f32,
    /// Zoom speed in units per second
    pub zoom_speed: f32,
    /// Closest allowed distance
    pub min_distance: f32,
    /// Farthest allowed distance
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            azimuth_deg: 41.0,
            polar_deg: 90.0 - 15.0,
            distance: 10.0,
            angular_speed: TAU / 2.0,
            zoom_speed: 2.0,
            min_distance: 2.0,
            max_distance: 50.0,
        }
    }
}

/// # Projection Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees
    pub fov_deg: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// # Scene Configuration
///
/// Everything the compositor needs at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// RGBA clear color
    pub clear_color: [f32; 4],
    /// Polyhedron to load
    pub shape: ShapeSource,
    /// Circumscribed radius the polyhedron is normalized to
    pub shape_radius: f32,
    /// Sphere pool settings
    pub spheres: SphereConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Projection settings
    pub projection: ProjectionConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 1536,
            height: 864,
            clear_color: [0.1, 0.0, 0.1, 1.0],
            shape: ShapeSource::default(),
            shape_radius: 4.0,
            spheres: SphereConfig::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Set viewport size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the shape source
    pub fn with_shape(mut self, shape: ShapeSource) -> Self {
        self.shape = shape;
        self
    }

    /// Set the target circumscribed radius
    pub fn with_shape_radius(mut self, radius: f32) -> Self {
        self.shape_radius = radius;
        self
    }

    /// Set sphere capacity and initial count
    pub fn with_spheres(mut self, capacity: usize, initial_count: usize) -> Self {
        self.spheres.capacity = capacity;
        self.spheres.initial_count = initial_count;
        self
    }

    /// Viewport aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Validate the scene configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.shape_radius <= 0.0 {
            return Err(ConfigError::Invalid("shape radius must be positive".to_string()));
        }
        if self.projection.near <= 0.0 || self.projection.far <= self.projection.near {
            return Err(ConfigError::Invalid("clip planes must satisfy 0 < near < far".to_string()));
        }
        if self.camera.min_distance <= 0.0 || self.camera.max_distance < self.camera.min_distance {
            return Err(ConfigError::Invalid("camera distance bounds are inverted".to_string()));
        }
        self.spheres.validate()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration applications load from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Scene configuration
    pub scene: SceneConfig,
}

impl GlowConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scene.validate()
    }
}

impl Config for GlowConfig {}
