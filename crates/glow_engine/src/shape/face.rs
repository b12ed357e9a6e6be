//! Planar polygon split into a triangle fan

use crate::assets::PolygonFace;
use crate::foundation::math::{utils, Vec3};
use crate::render::{ProgramId, RenderContext, RenderResult, UniformValue};

use super::{ShapeError, Triangle};

/// One polygon of a [`Shape`](super::Shape)
///
/// A face with `n` corners is split into `n - 2` triangles `(0, i, i + 1)`
/// pivoting on corner 0.
#[derive(Debug)]
pub struct Face {
    index: usize,
    midpoint: Vec3,
    normal: Vec3,
    triangles: Vec<Triangle>,
    highlight: f32,
}

impl Face {
    /// Triangulate `polygon` and upload its triangles
    pub fn new(ctx: &mut dyn RenderContext, index: usize, polygon: &PolygonFace) -> Result<Self, ShapeError> {
        let n = polygon.corner_count();
        if n < 3 || !polygon.is_consistent() {
            return Err(ShapeError::InconsistentFace { index, corners: n });
        }

        let p = &polygon.positions;
        // a corner lying on the first edge leaves the leading triple collinear
        let normal = utils::triangle_normal(&p[0], &p[1], &p[2])
            .or_else(|| utils::polygon_normal(p))
            .ok_or(ShapeError::DegenerateFace { index })?;
        let midpoint = p.iter().fold(Vec3::zeros(), |sum, q| sum + q) / n as f32;

        let mut triangles = Vec::with_capacity(n - 2);
        for i in 1..n - 1 {
            let corners = [0, i, i + 1];
            // edge (i, i+1) is always a polygon edge; the two spokes only
            // at either end of the fan
            let wires = [true, i + 1 == n - 1, i == 1];
            triangles.push(Triangle::new(
                ctx,
                corners.map(|c| polygon.positions[c]),
                corners.map(|c| polygon.tex_coords[c]),
                corners.map(|c| polygon.normals[c]),
                wires,
                corners,
            )?);
        }

        Ok(Self {
            index,
            midpoint,
            normal,
            triangles,
            highlight: 0.0,
        })
    }

    /// Per-frame hook
    pub fn update(&mut self, _dt: f32) {}

    /// Bind the highlight uniform and draw every triangle
    pub fn render(&self, ctx: &mut dyn RenderContext, program: ProgramId) -> RenderResult<()> {
        ctx.use_program(program)?;
        ctx.set_uniform(program, "u_faceHighlight", UniformValue::Float(self.highlight))?;
        for triangle in &self.triangles {
            triangle.render(ctx)?;
        }
        Ok(())
    }

    /// Position in the shape's face list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Mean of the polygon's corners
    pub fn midpoint(&self) -> Vec3 {
        self.midpoint
    }

    /// Unit normal of the first three corners
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Fan triangles in pivot order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Highlight amount in `[0, 1]`
    pub fn highlight(&self) -> f32 {
        self.highlight
    }

    /// Set the highlight amount, clamped to `[0, 1]`
    pub fn set_highlight(&mut self, highlight: f32) {
        self.highlight = highlight.clamp(0.0, 1.0);
    }

    /// Distance from `point` to the face midpoint
    pub fn distance_to(&self, point: &Vec3) -> f32 {
        (self.midpoint - point).norm()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;

    use super::*;
    use crate::foundation::math::{constants::TAU, Vec2};
    use crate::render::{RecordingContext, RenderCommand};

    fn regular_polygon(n: usize, radius: f32) -> PolygonFace {
        let positions: Vec<Vec3> = (0..n)
            .map(|k| {
                let angle = TAU * k as f32 / n as f32;
                Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
            })
            .collect();
        PolygonFace {
            tex_coords: vec![Vec2::zeros(); n],
            normals: vec![Vec3::z(); n],
            positions,
        }
    }

    #[test]
    fn test_fan_covers_polygon_area() {
        let mut ctx = RecordingContext::new();
        let face = Face::new(&mut ctx, 0, &regular_polygon(6, 2.0)).unwrap();

        assert_eq!(face.triangles().len(), 4);
        let area: f32 = face
            .triangles()
            .iter()
            .map(|t| {
                let [a, b, c] = t.positions();
                utils::triangle_area(a, b, c)
            })
            .sum();
        // regular hexagon: (3√3 / 2) r²
        assert_relative_eq!(area, 1.5 * 3.0_f32.sqrt() * 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_fan_pivots_on_first_corner() {
        let mut ctx = RecordingContext::new();
        let face = Face::new(&mut ctx, 0, &regular_polygon(5, 1.0)).unwrap();
        let corners: Vec<[usize; 3]> = face.triangles().iter().map(Triangle::corners).collect();
        assert_eq!(corners, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn test_wire_tags_mark_boundary_edges_only() {
        for n in 3..=9 {
            let mut ctx = RecordingContext::new();
            let face = Face::new(&mut ctx, 0, &regular_polygon(n, 1.0)).unwrap();

            let mut outer: HashMap<(usize, usize), usize> = HashMap::new();
            let mut inner: HashMap<(usize, usize), usize> = HashMap::new();
            for triangle in face.triangles() {
                for (k, wire) in triangle.wires().iter().enumerate() {
                    let (a, b) = triangle.edge_opposite(k);
                    let edge = (a.min(b), a.max(b));
                    let counts = if *wire { &mut outer } else { &mut inner };
                    *counts.entry(edge).or_default() += 1;
                }
            }

            for j in 0..n {
                let edge = (j.min((j + 1) % n), j.max((j + 1) % n));
                assert_eq!(outer.get(&edge), Some(&1), "boundary edge {edge:?} of {n}-gon");
                assert!(!inner.contains_key(&edge));
            }
            assert_eq!(outer.len(), n);

            for i in 2..n - 1 {
                assert_eq!(inner.get(&(0, i)), Some(&2), "diagonal (0, {i}) of {n}-gon");
            }
            assert_eq!(inner.len(), n - 3);
        }
    }

    #[test]
    fn test_corner_on_first_edge_uses_polygon_normal() {
        let mut ctx = RecordingContext::new();
        let mut square = regular_polygon(5, 1.0);
        square.positions = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let face = Face::new(&mut ctx, 0, &square).unwrap();

        assert_relative_eq!(face.normal(), Vec3::z(), epsilon = 1e-6);
        assert_eq!(face.triangles().len(), 3);
        let area: f32 = face
            .triangles()
            .iter()
            .map(|t| {
                let [a, b, c] = t.positions();
                utils::triangle_area(a, b, c)
            })
            .sum();
        assert_relative_eq!(area, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pentagon_wire_buffers() {
        let mut ctx = RecordingContext::new();
        let face = Face::new(&mut ctx, 0, &regular_polygon(5, 1.0)).unwrap();
        let expected: [[f32; 3]; 3] = [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];

        for (triangle, tags) in face.triangles().iter().zip(expected) {
            let uploaded = ctx.buffer_data(triangle.buffers()[4]).unwrap();
            let per_vertex: Vec<f32> = tags.iter().copied().cycle().take(9).collect();
            assert_eq!(uploaded, per_vertex.as_slice(), "triangle {:?}", triangle.corners());
        }
    }

    #[test]
    fn test_midpoint_and_normal() {
        let mut ctx = RecordingContext::new();
        let mut square = regular_polygon(4, 1.0);
        for p in &mut square.positions {
            p.z = 2.0;
        }
        let face = Face::new(&mut ctx, 7, &square).unwrap();

        assert_eq!(face.index(), 7);
        assert_relative_eq!(face.midpoint(), Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-6);
        assert_relative_eq!(face.normal(), Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(face.distance_to(&Vec3::new(0.0, 0.0, 5.0)), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_area_face_is_rejected() {
        let mut ctx = RecordingContext::new();
        let mut polygon = regular_polygon(4, 1.0);
        polygon.positions = (0..4).map(|k| Vec3::x() * k as f32).collect();
        assert!(matches!(
            Face::new(&mut ctx, 3, &polygon),
            Err(ShapeError::DegenerateFace { index: 3 })
        ));
    }

    #[test]
    fn test_render_binds_highlight_then_draws() {
        let mut ctx = RecordingContext::new();
        let program = ctx
            .compile_program("void main() {}", "uniform float u_faceHighlight;\nvoid main() {}")
            .unwrap();
        let mut face = Face::new(&mut ctx, 0, &regular_polygon(4, 1.0)).unwrap();
        face.set_highlight(1.5);
        ctx.take_commands();

        face.render(&mut ctx, program).unwrap();

        let commands = ctx.take_commands();
        assert_eq!(commands[0], RenderCommand::UseProgram(program));
        assert_eq!(
            commands[1],
            RenderCommand::SetUniform {
                program,
                name: "u_faceHighlight".to_string(),
                value: UniformValue::Float(1.0),
            }
        );
        assert_eq!(commands.len(), 4);
    }
}
