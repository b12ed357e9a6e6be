//! Polyhedra generated in code
//!
//! Each solid is centered on the origin with outward counter-clockwise
//! winding and flat per-face normals. Texture coordinates place the corners
//! of every face on a circle inscribed in the unit square.

use serde::{Deserialize, Serialize};

use super::{PolygonFace, PolygonMesh};
use crate::foundation::math::{constants::TAU, utils, Vec2, Vec3};

/// Solids available without a mesh file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinSolid {
    /// 4 triangles
    Tetrahedron,
    /// 6 squares
    Hexahedron,
    /// 8 triangles
    Octahedron,
    /// 2 pentagons and 5 rectangles
    PentagonalPrism,
}

impl BuiltinSolid {
    /// All built-in solids
    pub const ALL: [Self; 4] = [
        Self::Tetrahedron,
        Self::Hexahedron,
        Self::Octahedron,
        Self::PentagonalPrism,
    ];

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Tetrahedron => "tetrahedron",
            Self::Hexahedron => "hexahedron",
            Self::Octahedron => "octahedron",
            Self::PentagonalPrism => "pentagonal prism",
        }
    }

    /// Generate the polygon mesh for this solid
    pub fn mesh(self) -> PolygonMesh {
        match self {
            Self::Tetrahedron => indexed(
                &[
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(1.0, -1.0, -1.0),
                    Vec3::new(-1.0, 1.0, -1.0),
                    Vec3::new(-1.0, -1.0, 1.0),
                ],
                &[&[0, 1, 2], &[0, 3, 1], &[0, 2, 3], &[1, 3, 2]],
            ),
            Self::Hexahedron => indexed(
                &[
                    Vec3::new(-1.0, -1.0, -1.0),
                    Vec3::new(1.0, -1.0, -1.0),
                    Vec3::new(1.0, 1.0, -1.0),
                    Vec3::new(-1.0, 1.0, -1.0),
                    Vec3::new(-1.0, -1.0, 1.0),
                    Vec3::new(1.0, -1.0, 1.0),
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(-1.0, 1.0, 1.0),
                ],
                &[
                    &[4, 5, 6, 7],
                    &[0, 3, 2, 1],
                    &[1, 2, 6, 5],
                    &[0, 4, 7, 3],
                    &[3, 7, 6, 2],
                    &[0, 1, 5, 4],
                ],
            ),
            Self::Octahedron => octahedron(),
            Self::PentagonalPrism => prism(5, 1.0, 0.8),
        }
    }
}

fn octahedron() -> PolygonMesh {
    let faces = [1.0_f32, -1.0]
        .iter()
        .flat_map(|&sx| [1.0_f32, -1.0].into_iter().map(move |sy| (sx, sy)))
        .flat_map(|(sx, sy)| [1.0_f32, -1.0].into_iter().map(move |sz| (sx, sy, sz)))
        .map(|(sx, sy, sz)| {
            let x = Vec3::new(sx, 0.0, 0.0);
            let y = Vec3::new(0.0, sy, 0.0);
            let z = Vec3::new(0.0, 0.0, sz);
            // Octants with an odd number of negative axes flip the winding
            if sx * sy * sz > 0.0 {
                polygon(vec![x, y, z])
            } else {
                polygon(vec![x, z, y])
            }
        })
        .collect();

    PolygonMesh::new(faces)
}

fn prism(sides: usize, ring_radius: f32, half_height: f32) -> PolygonMesh {
    let ring = |y: f32| -> Vec<Vec3> {
        (0..sides)
            .map(|k| {
                let theta = TAU * k as f32 / sides as f32;
                Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin())
            })
            .collect()
    };
    let bottom = ring(-half_height);
    let top = ring(half_height);

    let mut faces = Vec::with_capacity(sides + 2);
    faces.push(polygon(
        std::iter::once(top[0])
            .chain(top[1..].iter().rev().copied())
            .collect(),
    ));
    faces.push(polygon(bottom.clone()));
    for k in 0..sides {
        let next = (k + 1) % sides;
        faces.push(polygon(vec![bottom[k], top[k], top[next], bottom[next]]));
    }

    PolygonMesh::new(faces)
}

fn indexed(vertices: &[Vec3], faces: &[&[usize]]) -> PolygonMesh {
    PolygonMesh::new(
        faces
            .iter()
            .map(|indices| polygon(indices.iter().map(|&i| vertices[i]).collect()))
            .collect(),
    )
}

fn polygon(positions: Vec<Vec3>) -> PolygonFace {
    let n = positions.len();
    let normal = utils::polygon_normal(&positions).unwrap_or_else(Vec3::zeros);
    let tex_coords = (0..n)
        .map(|k| {
            let theta = TAU * k as f32 / n as f32;
            Vec2::new(0.5 + 0.5 * theta.cos(), 0.5 + 0.5 * theta.sin())
        })
        .collect();

    PolygonFace {
        positions,
        tex_coords,
        normals: vec![normal; n],
    }
}
