//! Asset loading
//!
//! Polygon meshes come either from Wavefront OBJ files ([`obj_loader`]) or
//! from the solids generated in code ([`builtin`]). Both produce a
//! [`PolygonMesh`]: an ordered list of n-gon faces with per-corner
//! positions, texture coordinates and normals. Face order and corner order
//! are kept exactly as written, since triangulation pivots on the first
//! corner of each face.

pub mod builtin;
pub mod obj_loader;

pub use builtin::BuiltinSolid;
pub use obj_loader::{ObjError, ObjLoader};

use crate::foundation::math::{Vec2, Vec3};

/// One planar polygon with parallel per-corner attributes
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFace {
    /// Corner positions in winding order
    pub positions: Vec<Vec3>,
    /// Texture coordinate per corner
    pub tex_coords: Vec<Vec2>,
    /// Normal per corner
    pub normals: Vec<Vec3>,
}

impl PolygonFace {
    /// Number of corners
    pub fn corner_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether all attribute arrays have one entry per corner
    pub fn is_consistent(&self) -> bool {
        self.tex_coords.len() == self.positions.len() && self.normals.len() == self.positions.len()
    }
}

/// Ordered collection of polygon faces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonMesh {
    /// Faces in source order
    pub faces: Vec<PolygonFace>,
}

impl PolygonMesh {
    /// Create a mesh from faces
    pub fn new(faces: Vec<PolygonFace>) -> Self {
        Self { faces }
    }

    /// Number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Total number of face corners
    pub fn corner_count(&self) -> usize {
        self.faces.iter().map(PolygonFace::corner_count).sum()
    }

    /// Largest distance of any corner from the origin
    pub fn bounding_radius(&self) -> f32 {
        self.faces
            .iter()
            .flat_map(|face| face.positions.iter())
            .map(|p| p.norm())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_radius_uses_farthest_corner() {
        let face = PolygonFace {
            positions: vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 3.0, 4.0),
                Vec3::new(0.0, 0.0, 2.0),
            ],
            tex_coords: vec![Vec2::zeros(); 3],
            normals: vec![Vec3::x(); 3],
        };
        let mesh = PolygonMesh::new(vec![face]);

        assert!((mesh.bounding_radius() - 5.0).abs() < 1.0e-6);
        assert_eq!(mesh.corner_count(), 3);
    }

    #[test]
    fn test_empty_mesh_has_zero_radius() {
        assert_eq!(PolygonMesh::default().bounding_radius(), 0.0);
    }
}
