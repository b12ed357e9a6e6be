//! # Core Engine Module
//!
//! Shared configuration types used by the scene and the demo application.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for logging, viewport, shape, spheres,
//!   camera and projection

pub mod config;

pub use config::{
    GlowConfig,
    EngineConfig,
    SceneConfig,
    SphereConfig,
    CameraConfig,
    ProjectionConfig,
    ShapeSource,
    Config,
    ConfigError,
};
