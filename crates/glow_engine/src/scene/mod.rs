//! Scene compositor
//!
//! [`Scene`] is the per-frame driver. Each update it runs the deferred calls
//! queued by other threads, moves the camera and the spheres, and asks the
//! shape for its uniform bundle. Each render it draws faces and spheres
//! back to front so alpha blending composes correctly.

pub mod camera;
pub mod compositor;
pub mod deferred;
pub mod draw_order;
pub mod input;
pub mod sphere;


pub use camera::{CameraRig, OrbitCamera};
pub use compositor::{Scene, SceneError, SceneSnapshot};
pub use deferred::{CallError, DeferredCall, DeferredCallQueue, DeferredSender, QueueClosed};
pub use draw_order::{sort_back_to_front, DrawItem};
pub use input::{Key, KeyState};
pub use sphere::{Sphere, SpherePool};
