//! # Glow Engine
//!
//! Scene compositor and polyhedral face-mesh renderer.
//!
//! A polyhedron is loaded from an OBJ file (or one of the built-in solids),
//! normalized to a fixed radius and split into fan-triangulated faces whose
//! triangles remember which edges belong to the original polygons. Glowing
//! spheres bounce inside it. Every frame the scene drains calls queued from
//! other threads, advances the simulation, and draws faces and spheres back
//! to front with alpha blending through a [`render::RenderContext`].
//!
//! ## Quick Start
//!
//! ```rust
//! use glow_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut ctx = RecordingContext::new();
//!     let mut scene = Scene::new(&SceneConfig::default(), &mut ctx)?;
//!
//!     let sender = scene.deferred_sender();
//!     std::thread::spawn(move || {
//!         let _ = sender.put(|scene: &mut Scene| {
//!             scene.set_sphere_count(5);
//!             Ok(())
//!         });
//!     })
//!     .join()
//!     .ok();
//!
//!     scene.update()?;
//!     scene.render(&mut ctx)?;
//!     assert_eq!(scene.spheres().enabled_count(), 5);
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod shape;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{BuiltinSolid, ObjLoader, PolygonFace, PolygonMesh},
        core::{Config, GlowConfig, SceneConfig, ShapeSource},
        foundation::math::{Mat4, Vec3, Vec4},
        render::{RecordingContext, RenderContext},
        scene::{CameraRig, DeferredSender, Key, OrbitCamera, Scene, SceneError, SceneSnapshot},
        shape::{Face, Shape, ShapeUniforms, Triangle},
    };
}
