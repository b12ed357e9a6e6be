//! Polyhedral face mesh
//!
//! A [`Shape`] is a polyhedron loaded from a [`PolygonMesh`], rescaled so its
//! farthest corner sits at the requested radius, and split into [`Face`]s.
//! Each face is a triangle fan of [`Triangle`]s that remember which of their
//! edges lie on the original polygon boundary.
//!
//! All faces share one shader program. Per frame the shape produces a
//! [`ShapeUniforms`] bundle (sphere slots, view, projection) which is
//! uploaded once before any face is drawn.

pub mod face;
pub mod triangle;

pub use face::Face;
pub use triangle::Triangle;

use std::path::Path;

use thiserror::Error;

use crate::assets::{ObjError, ObjLoader, PolygonFace, PolygonMesh};
use crate::foundation::math::{Mat4, Vec4};
use crate::render::{shaders, ProgramId, RenderContext, RenderError, RenderResult, UniformValue};
use crate::scene::sphere::Sphere;

/// Errors raised while building a shape
#[derive(Error, Debug)]
pub enum ShapeError {
    /// Mesh file could not be read
    #[error("Mesh loading failed: {0}")]
    Obj(#[from] ObjError),
    /// Mesh has no faces
    #[error("Mesh has no faces")]
    Empty,
    /// Every corner sits at the origin
    #[error("Mesh has zero bounding radius")]
    DegenerateMesh,
    /// Face has too few corners or mismatched attribute arrays
    #[error("Face {index} has {corners} corners or mismatched attributes")]
    InconsistentFace {
        /// Face index
        index: usize,
        /// Corner count
        corners: usize,
    },
    /// Face encloses no area
    #[error("Face {index} has no normal, its corners are collinear")]
    DegenerateFace {
        /// Face index
        index: usize,
    },
    /// Face index past the end of the face list
    #[error("Shape has no face {0}")]
    UnknownFace(usize),
    /// Target radius is not positive
    #[error("Shape radius must be positive, got {0}")]
    InvalidRadius(f32),
    /// GPU resource creation failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Dynamic uniforms shared by every face for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeUniforms {
    /// One `(x, y, z, radius)` per sphere slot, radius 0 when disabled
    pub spheres: Vec<Vec4>,
    /// View matrix
    pub view: Mat4,
    /// Projection matrix
    pub projection: Mat4,
}

impl ShapeUniforms {
    /// Build the bundle from the full sphere pool
    pub fn new(spheres: &[Sphere], view: Mat4, projection: Mat4) -> Self {
        let spheres = spheres
            .iter()
            .map(|sphere| {
                let radius = if sphere.enabled { sphere.radius } else { 0.0 };
                Vec4::new(sphere.pos.x, sphere.pos.y, sphere.pos.z, radius)
            })
            .collect();
        Self { spheres, view, projection }
    }

    /// Number of slots describing an enabled sphere
    pub fn active_spheres(&self) -> usize {
        self.spheres.iter().filter(|slot| slot.w != 0.0).count()
    }
}

/// Polyhedron normalized to a fixed circumscribed radius
#[derive(Debug)]
pub struct Shape {
    radius: f32,
    faces: Vec<Face>,
    program: ProgramId,
    sphere_slots: usize,
}

impl Shape {
    /// Load an OBJ file and build the shape
    pub fn load<P: AsRef<Path>>(
        ctx: &mut dyn RenderContext,
        path: P,
        radius: f32,
        sphere_slots: usize,
    ) -> Result<Self, ShapeError> {
        let mesh = ObjLoader::load_polygons(path.as_ref())?;
        log::info!("Loaded {} from {}", plural(mesh.face_count(), "face"), path.as_ref().display());
        Self::from_mesh(ctx, &mesh, radius, sphere_slots)
    }

    /// Build the shape from an in-memory mesh
    ///
    /// `sphere_slots` sizes the sphere array in the fragment shader and must
    /// match the length of every [`ShapeUniforms`] passed to [`upload`](Self::upload).
    pub fn from_mesh(
        ctx: &mut dyn RenderContext,
        mesh: &PolygonMesh,
        radius: f32,
        sphere_slots: usize,
    ) -> Result<Self, ShapeError> {
        if radius <= 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        if mesh.faces.is_empty() {
            return Err(ShapeError::Empty);
        }
        let bounding_radius = mesh.bounding_radius();
        if bounding_radius <= 0.0 {
            return Err(ShapeError::DegenerateMesh);
        }

        let scale = radius / bounding_radius;
        let program = ctx.compile_program(
            shaders::SHAPE_VERTEX_SOURCE,
            &shaders::shape_fragment_source(sphere_slots),
        )?;

        let faces = mesh
            .faces
            .iter()
            .enumerate()
            .map(|(index, polygon)| {
                let scaled = PolygonFace {
                    positions: polygon.positions.iter().map(|p| p * scale).collect(),
                    ..polygon.clone()
                };
                Face::new(ctx, index, &scaled)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let triangle_count: usize = faces.iter().map(|face| face.triangles().len()).sum();
        log::info!(
            "Built shape: {}, {}, scaled by {:.4} to radius {}",
            plural(faces.len(), "face"),
            plural(triangle_count, "triangle"),
            scale,
            radius
        );

        Ok(Self {
            radius,
            faces,
            program,
            sphere_slots,
        })
    }

    /// Produce this frame's uniform bundle and advance every face
    pub fn update(&mut self, dt: f32, spheres: &[Sphere], view: Mat4, projection: Mat4) -> ShapeUniforms {
        for face in &mut self.faces {
            face.update(dt);
        }
        ShapeUniforms::new(spheres, view, projection)
    }

    /// Bind a uniform bundle to the shared program
    pub fn upload(&self, ctx: &mut dyn RenderContext, uniforms: &ShapeUniforms) -> RenderResult<()> {
        ctx.use_program(self.program)?;
        ctx.set_uniform(self.program, "u_spheres", UniformValue::Vec4Array(uniforms.spheres.clone()))?;
        ctx.set_uniform(self.program, "u_view", UniformValue::Mat4(uniforms.view))?;
        ctx.set_uniform(self.program, "u_projection", UniformValue::Mat4(uniforms.projection))?;
        Ok(())
    }

    /// Draw one face with the shared program
    pub fn render_face(&self, ctx: &mut dyn RenderContext, index: usize) -> Result<(), ShapeError> {
        let face = self.faces.get(index).ok_or(ShapeError::UnknownFace(index))?;
        face.render(ctx, self.program)?;
        Ok(())
    }

    /// Circumscribed radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Faces in mesh order
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Mutable access to the faces, for highlight control
    pub fn faces_mut(&mut self) -> &mut [Face] {
        &mut self.faces
    }

    /// Total triangle count
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|face| face.triangles().len()).sum()
    }

    /// Shared face program
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Sphere slots the fragment shader was sized for
    pub fn sphere_slots(&self) -> usize {
        self.sphere_slots
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::assets::BuiltinSolid;
    use crate::foundation::math::Vec3;
    use crate::render::{RecordingContext, RenderCommand};

    const SQUARE_PYRAMID: &[u8] = b"
v 0 0 3
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
f 2 5 4 3
f 1 2 3
f 1 3 4
f 1 4 5
f 1 5 2
";

    fn max_corner_distance(shape: &Shape) -> f32 {
        shape
            .faces()
            .iter()
            .flat_map(|face| face.triangles())
            .flat_map(|triangle| triangle.positions().iter())
            .map(Vec3::norm)
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_radius_normalization() {
        let mut ctx = RecordingContext::new();
        for (solid, radius) in [(BuiltinSolid::Hexahedron, 4.0), (BuiltinSolid::Octahedron, 0.5)] {
            let shape = Shape::from_mesh(&mut ctx, &solid.mesh(), radius, 16).unwrap();
            assert_relative_eq!(max_corner_distance(&shape), radius, epsilon = 1e-5);
            assert_eq!(shape.radius(), radius);
        }
    }

    #[test]
    fn test_obj_mesh_keeps_face_order() {
        let mut ctx = RecordingContext::new();
        let mesh = ObjLoader::parse(SQUARE_PYRAMID).unwrap();
        let shape = Shape::from_mesh(&mut ctx, &mesh, 3.0, 16).unwrap();

        assert_eq!(shape.faces().len(), 5);
        assert_eq!(shape.triangle_count(), 2 + 4);
        assert_eq!(shape.faces()[0].triangles().len(), 2);
        for (i, face) in shape.faces().iter().enumerate() {
            assert_eq!(face.index(), i);
        }
        assert_relative_eq!(shape.faces()[0].normal(), -Vec3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_empty_and_degenerate_meshes_fail() {
        let mut ctx = RecordingContext::new();
        assert!(matches!(
            Shape::from_mesh(&mut ctx, &PolygonMesh::default(), 1.0, 4),
            Err(ShapeError::Empty)
        ));

        let collapsed = PolygonMesh::new(vec![PolygonFace {
            positions: vec![Vec3::zeros(); 3],
            tex_coords: vec![crate::foundation::math::Vec2::zeros(); 3],
            normals: vec![Vec3::z(); 3],
        }]);
        assert!(matches!(
            Shape::from_mesh(&mut ctx, &collapsed, 1.0, 4),
            Err(ShapeError::DegenerateMesh)
        ));
        assert!(matches!(
            Shape::from_mesh(&mut ctx, &BuiltinSolid::Tetrahedron.mesh(), 0.0, 4),
            Err(ShapeError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_face_with_corner_on_edge_loads() {
        let mut ctx = RecordingContext::new();
        let mesh = ObjLoader::parse(
            b"
v -1 -1 0
v 0 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
v 0 0 2
f 1 2 3 4 5
f 1 6 2
f 2 6 3
f 3 6 4
f 4 6 5
f 5 6 1
" as &[u8],
        )
        .unwrap();
        let shape = Shape::from_mesh(&mut ctx, &mesh, 2.0, 4).unwrap();

        assert_eq!(shape.faces().len(), 6);
        assert_eq!(shape.faces()[0].triangles().len(), 3);
        assert_relative_eq!(shape.faces()[0].normal(), Vec3::z(), epsilon = 1e-6);
        for triangle in shape.faces()[0].triangles() {
            for normal in triangle.normals() {
                assert_relative_eq!(*normal, Vec3::z(), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_render_face_rejects_unknown_index() {
        let mut ctx = RecordingContext::new();
        let shape = Shape::from_mesh(&mut ctx, &BuiltinSolid::Tetrahedron.mesh(), 1.0, 2).unwrap();
        ctx.take_commands();

        assert!(matches!(shape.render_face(&mut ctx, 4), Err(ShapeError::UnknownFace(4))));
        assert!(ctx.commands().is_empty());
        shape.render_face(&mut ctx, 3).unwrap();
        assert!(!ctx.commands().is_empty());
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let mut ctx = RecordingContext::new();
        let result = Shape::load(&mut ctx, "does/not/exist.obj", 1.0, 4);
        assert!(matches!(result, Err(ShapeError::Obj(ObjError::Io(_)))));
    }

    #[test]
    fn test_uniforms_zero_disabled_slots() {
        let mut spheres = vec![Sphere::default(); 4];
        spheres[1].enabled = true;
        spheres[1].radius = 2.0;
        spheres[1].pos = Vec3::new(1.0, 2.0, 3.0);
        spheres[3].radius = 5.0;

        let uniforms = ShapeUniforms::new(&spheres, Mat4::identity(), Mat4::identity());
        assert_eq!(uniforms.spheres.len(), 4);
        assert_eq!(uniforms.spheres[1], Vec4::new(1.0, 2.0, 3.0, 2.0));
        assert_eq!(uniforms.spheres[3].w, 0.0);
        assert_eq!(uniforms.active_spheres(), 1);
    }

    #[test]
    fn test_upload_binds_bundle_on_shared_program() {
        let mut ctx = RecordingContext::new();
        let mut shape = Shape::from_mesh(&mut ctx, &BuiltinSolid::Tetrahedron.mesh(), 1.0, 2).unwrap();
        let spheres = vec![Sphere::default(); 2];
        let uniforms = shape.update(0.016, &spheres, Mat4::identity(), Mat4::identity());
        ctx.take_commands();

        shape.upload(&mut ctx, &uniforms).unwrap();

        let names: Vec<&str> = ctx
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::SetUniform { program, name, .. } if *program == shape.program() => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["u_spheres", "u_view", "u_projection"]);
    }
}
