//! Math utilities and types
//!
//! Provides the fundamental math types for scene and mesh code.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = std::f32::consts::TAU;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Unit normal of the triangle `(a, b, c)` with counter-clockwise winding
    ///
    /// Returns `None` when the three points are collinear or coincident.
    pub fn triangle_normal(a: &Vec3, b: &Vec3, c: &Vec3) -> Option<Vec3> {
        (b - a).cross(&(c - a)).try_normalize(1.0e-12)
    }

    /// Unit normal of a planar polygon by Newell's method
    ///
    /// Tolerates collinear corner runs. Returns `None` when the polygon has
    /// zero area.
    pub fn polygon_normal(corners: &[Vec3]) -> Option<Vec3> {
        let n = corners.len();
        (0..n)
            .map(|i| corners[i].cross(&corners[(i + 1) % n]))
            .fold(Vec3::zeros(), |sum, c| sum + c)
            .try_normalize(1.0e-12)
    }

    /// Area of the triangle `(a, b, c)`
    pub fn triangle_area(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
        0.5 * (b - a).cross(&(c - a)).norm()
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create an OpenGL-style perspective projection matrix
    ///
    /// Maps view-space depth in `[-near, -far]` to clip-space `[-1, 1]`.
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();

        // P = [1/(a·tan(φ/2))  0            0               0            ]
        //     [0               1/tan(φ/2)   0               0            ]
        //     [0               0            (f+n)/(n-f)     2fn/(n-f)    ]
        //     [0               0            -1              0            ]
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = (far + near) / (near - far);
        result[(2, 3)] = (2.0 * far * near) / (near - far);
        result[(3, 2)] = -1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,  // Negative forward for right-handed
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::y());

        let transformed = view.transform_point(&Point3::from(eye));
        assert_relative_eq!(transformed.coords, Vec3::zeros(), epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_target_is_in_front() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), Vec3::y());
        let target = view.transform_point(&Point3::origin());

        // Right-handed view space looks down -Z
        assert_relative_eq!(target.z, -10.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_perspective_maps_clip_planes() {
        let projection = Mat4::perspective(constants::TAU / 8.0, 16.0 / 9.0, 0.1, 100.0);

        let near = projection * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = projection * Vec4::new(0.0, 0.0, -100.0, 1.0);

        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1.0e-4);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1.0e-4);
    }

    #[test]
    fn test_polygon_normal_skips_collinear_corners() {
        let square = [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let n = utils::polygon_normal(&square).unwrap();
        assert_relative_eq!(n, Vec3::z(), epsilon = 1.0e-6);

        let line = [Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0];
        assert!(utils::polygon_normal(&line).is_none());
    }

    #[test]
    fn test_triangle_normal_degenerate() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(2.0, 0.0, 0.0);
        assert!(utils::triangle_normal(&a, &b, &c).is_none());

        let n = utils::triangle_normal(&a, &b, &Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(n, Vec3::z(), epsilon = 1.0e-6);
    }
}
