//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait a graphics context must implement so the
//! shape, sphere and scene code can render through it.

use thiserror::Error;

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Result type for backend operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Handle to a compiled shader program owned by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// Handle to a vertex buffer owned by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Handle to a vertex array (attribute bindings) owned by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u64);

/// Blend factors used by the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    /// Source alpha
    SrcAlpha,
    /// One minus source alpha
    OneMinusSrcAlpha,
}

/// Value bound to a named uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// `float`
    Float(f32),
    /// `int` / sampler slot
    Int(i32),
    /// `vec3`
    Vec3(Vec3),
    /// `vec4`
    Vec4(Vec4),
    /// `vec4[]`
    Vec4Array(Vec<Vec4>),
    /// `mat4`
    Mat4(Mat4),
}

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Program handle not known to the context
    #[error("Unknown program {0:?}")]
    UnknownProgram(ProgramId),
    /// Vertex array handle not known to the context
    #[error("Unknown vertex array {0:?}")]
    UnknownVertexArray(VertexArrayId),
    /// Buffer handle not known to the context
    #[error("Unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
    /// Buffer data length does not match the component count
    #[error("Buffer of {len} floats is not a whole number of {components}-component vertices")]
    BufferLayout {
        /// Number of floats supplied
        len: usize,
        /// Components per vertex
        components: usize,
    },
    /// Program has no uniform with this name
    #[error("Program {program:?} has no uniform named '{name}'")]
    UnknownUniform {
        /// Program the uniform was looked up in
        program: ProgramId,
        /// Uniform name
        name: String,
    },
    /// Shader source was rejected
    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),
    /// Value does not fit the uniform's GPU type
    #[error("Value {value} does not fit uniform '{name}'")]
    UniformOutOfRange {
        /// Uniform name
        name: String,
        /// Rejected value
        value: u64,
    },
    /// Draw call asked for more vertices than the bound buffers hold
    #[error("Draw of {requested} vertices exceeds the {available} available")]
    VertexCountMismatch {
        /// Vertices requested by the draw
        requested: usize,
        /// Vertices in the smallest bound buffer
        available: usize,
    },
}

/// Render-target contract
///
/// Programs, buffers and vertex arrays are owned by the context; callers hold
/// only the opaque handles it returns.
pub trait RenderContext {
    /// Compile and link a vertex + fragment shader pair
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> RenderResult<ProgramId>;

    /// Make `program` current for subsequent draws
    fn use_program(&mut self, program: ProgramId) -> RenderResult<()>;

    /// Bind a value to a named uniform of `program`
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) -> RenderResult<()>;

    /// Upload vertex data with `components` floats per vertex
    fn create_vertex_buffer(&mut self, components: usize, data: &[f32]) -> RenderResult<BufferId>;

    /// Bind buffers to attribute locations, `(location, buffer)` pairs
    fn create_vertex_array(&mut self, attributes: &[(u32, BufferId)]) -> RenderResult<VertexArrayId>;

    /// Draw `vertex_count` vertices of `vertex_array` as a triangle list
    fn draw_triangles(&mut self, vertex_array: VertexArrayId, vertex_count: usize) -> RenderResult<()>;

    /// Clear the color buffer
    fn clear(&mut self, color: [f32; 4]);

    /// Enable blending with the given factors
    fn enable_blending(&mut self, source: BlendFactor, destination: BlendFactor);
}
