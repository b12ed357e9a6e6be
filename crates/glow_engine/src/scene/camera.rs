//! Camera rigs driving the scene's view matrix

use crate::core::CameraConfig;
use crate::foundation::math::{constants::PI, utils, Mat4, Mat4Ext, Vec3};

use super::input::{Key, KeyState};

/// Anything that can place the scene camera
///
/// The scene owns exactly one rig and queries it once per update.
pub trait CameraRig {
    /// Eye position in world space
    fn position(&self) -> Vec3;

    /// World-to-view transform
    fn view_matrix(&self) -> Mat4;

    /// Advance by `dt` seconds
    fn update(&mut self, dt: f32);

    /// React to held keys before [`update`](Self::update)
    fn apply_input(&mut self, _keys: &KeyState) {}
}

/// Keeps the polar angle off the poles so `look_at` stays well defined
const POLAR_MARGIN: f32 = 1.0e-3;

/// Camera on a sphere around a target point
///
/// Left/right change the azimuth, up/down the polar angle, and page up/down
/// move the camera in and out.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    azimuth: f32,
    polar: f32,
    distance: f32,
    angular_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    // (azimuth, polar, distance) direction, each in [-1, 1]
    motion: Vec3,
}

impl OrbitCamera {
    /// Create a camera around the origin from configuration
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            target: Vec3::zeros(),
            azimuth: utils::deg_to_rad(config.azimuth_deg),
            polar: utils::deg_to_rad(config.polar_deg),
            distance: config.distance,
            angular_speed: config.angular_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            motion: Vec3::zeros(),
        };
        camera.clamp();
        camera
    }

    /// Azimuth in radians
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    /// Polar angle from +Y in radians
    pub fn polar(&self) -> f32 {
        self.polar
    }

    /// Distance from the target
    pub fn distance(&self) -> f32 {
        self.distance
    }

    fn clamp(&mut self) {
        self.polar = self.polar.clamp(POLAR_MARGIN, PI - POLAR_MARGIN);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }
}

impl CameraRig for OrbitCamera {
    fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target + self.distance * Vec3::new(sin_polar * cos_azimuth, cos_polar, sin_polar * sin_azimuth)
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position(), self.target, Vec3::y())
    }

    fn update(&mut self, dt: f32) {
        self.azimuth = (self.azimuth + self.motion.x * self.angular_speed * dt).rem_euclid(2.0 * PI);
        self.polar += self.motion.y * self.angular_speed * dt;
        self.distance += self.motion.z * self.zoom_speed * dt;
        self.clamp();
    }

    fn apply_input(&mut self, keys: &KeyState) {
        self.motion = Vec3::new(
            keys.axis(&Key::Left, &Key::Right),
            keys.axis(&Key::Up, &Key::Down),
            keys.axis(&Key::PageUp, &Key::PageDown),
        );
    }
}
