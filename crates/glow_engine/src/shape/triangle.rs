//! Three-vertex GPU primitive

use crate::foundation::math::{Vec2, Vec3};
use crate::render::{BufferId, RenderContext, RenderResult, VertexArrayId};

/// Barycentric identity shared by every triangle
const BARYCENTRIC: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Attribute locations bound by [`Triangle`]
pub mod attribute {
    /// Model-space position
    pub const POSITION: u32 = 0;
    /// Barycentric coordinate
    pub const BARYCENTRIC: u32 = 1;
    /// Texture coordinate
    pub const TEX_COORD: u32 = 2;
    /// Corner normal
    pub const NORMAL: u32 = 3;
    /// Wire tag
    pub const WIRE: u32 = 4;
}

/// One fan triangle of a [`Face`](super::Face)
///
/// `wires[k]` tags the edge opposite corner `k`: `true` for an edge of the
/// original polygon, `false` for a fan diagonal. The fragment shader only
/// draws wireframe lines along tagged edges.
#[derive(Debug)]
pub struct Triangle {
    positions: [Vec3; 3],
    tex_coords: [Vec2; 3],
    normals: [Vec3; 3],
    wires: [bool; 3],
    corners: [usize; 3],
    buffers: [BufferId; 5],
    vertex_array: VertexArrayId,
}

impl Triangle {
    /// Upload the five attribute buffers and bind them into a vertex array
    ///
    /// `corners` are the polygon corner indices the vertices came from.
    pub fn new(
        ctx: &mut dyn RenderContext,
        positions: [Vec3; 3],
        tex_coords: [Vec2; 3],
        normals: [Vec3; 3],
        wires: [bool; 3],
        corners: [usize; 3],
    ) -> RenderResult<Self> {
        let position_data = positions.map(|p| [p.x, p.y, p.z]);
        let tex_data = tex_coords.map(|t| [t.x, t.y]);
        let normal_data = normals.map(|n| [n.x, n.y, n.z]);
        let wire: [f32; 3] = wires.map(|w| if w { 1.0 } else { 0.0 });
        let wire_data = [wire; 3];

        let buffers = [
            ctx.create_vertex_buffer(3, bytemuck::cast_slice(&position_data))?,
            ctx.create_vertex_buffer(3, bytemuck::cast_slice(&BARYCENTRIC))?,
            ctx.create_vertex_buffer(2, bytemuck::cast_slice(&tex_data))?,
            ctx.create_vertex_buffer(3, bytemuck::cast_slice(&normal_data))?,
            ctx.create_vertex_buffer(3, bytemuck::cast_slice(&wire_data))?,
        ];
        let vertex_array = ctx.create_vertex_array(&[
            (attribute::POSITION, buffers[0]),
            (attribute::BARYCENTRIC, buffers[1]),
            (attribute::TEX_COORD, buffers[2]),
            (attribute::NORMAL, buffers[3]),
            (attribute::WIRE, buffers[4]),
        ])?;

        Ok(Self {
            positions,
            tex_coords,
            normals,
            wires,
            corners,
            buffers,
            vertex_array,
        })
    }

    /// Issue one 3-vertex draw
    pub fn render(&self, ctx: &mut dyn RenderContext) -> RenderResult<()> {
        ctx.draw_triangles(self.vertex_array, 3)
    }

    /// Vertex positions in normalized model space
    pub fn positions(&self) -> &[Vec3; 3] {
        &self.positions
    }

    /// Texture coordinates
    pub fn tex_coords(&self) -> &[Vec2; 3] {
        &self.tex_coords
    }

    /// Corner normals
    pub fn normals(&self) -> &[Vec3; 3] {
        &self.normals
    }

    /// Wire tags, indexed by opposite corner
    pub fn wires(&self) -> [bool; 3] {
        self.wires
    }

    /// Source polygon corner of each vertex
    pub fn corners(&self) -> [usize; 3] {
        self.corners
    }

    /// Polygon corners bounding the edge opposite vertex `k`
    pub fn edge_opposite(&self, k: usize) -> (usize, usize) {
        (self.corners[(k + 1) % 3], self.corners[(k + 2) % 3])
    }

    /// Buffers at attribute locations 0 through 4
    pub fn buffers(&self) -> &[BufferId; 5] {
        &self.buffers
    }

    /// Vertex array drawn by [`render`](Self::render)
    pub fn vertex_array(&self) -> VertexArrayId {
        self.vertex_array
    }
}
