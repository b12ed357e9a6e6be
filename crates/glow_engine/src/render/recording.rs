//! Command-recording render context
//!
//! Validates handles and uniform names the way a real driver would reject
//! them, then records each call. Tests and the headless demo inspect the
//! recorded stream instead of pixels.

use std::collections::{HashMap, HashSet};

use super::backend::{
    BlendFactor, BufferId, ProgramId, RenderContext, RenderError, RenderResult, UniformValue,
    VertexArrayId,
};

/// One recorded call against the context
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Color buffer cleared
    Clear([f32; 4]),
    /// Blending enabled
    EnableBlending {
        /// Source factor
        source: BlendFactor,
        /// Destination factor
        destination: BlendFactor,
    },
    /// Program compiled
    CompileProgram(ProgramId),
    /// Program made current
    UseProgram(ProgramId),
    /// Uniform bound
    SetUniform {
        /// Target program
        program: ProgramId,
        /// Uniform name
        name: String,
        /// Bound value
        value: UniformValue,
    },
    /// Vertex buffer uploaded
    CreateVertexBuffer {
        /// New buffer
        buffer: BufferId,
        /// Floats per vertex
        components: usize,
        /// Number of vertices
        vertices: usize,
    },
    /// Vertex array created
    CreateVertexArray {
        /// New vertex array
        vertex_array: VertexArrayId,
        /// `(location, buffer)` bindings
        attributes: Vec<(u32, BufferId)>,
    },
    /// Triangles drawn
    DrawTriangles {
        /// Vertex array drawn
        vertex_array: VertexArrayId,
        /// Vertices drawn
        vertex_count: usize,
    },
}

#[derive(Debug)]
struct BufferRecord {
    components: usize,
    data: Vec<f32>,
}

/// [`RenderContext`] that records instead of rasterizing
#[derive(Debug, Default)]
pub struct RecordingContext {
    next_handle: u64,
    programs: HashMap<ProgramId, HashSet<String>>,
    buffers: HashMap<BufferId, BufferRecord>,
    vertex_arrays: HashMap<VertexArrayId, Vec<(u32, BufferId)>>,
    uniforms: HashMap<(ProgramId, String), UniformValue>,
    current_program: Option<ProgramId>,
    blending: Option<(BlendFactor, BlendFactor)>,
    commands: Vec<RenderCommand>,
}

impl RecordingContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// All commands recorded since creation or the last [`take_commands`](Self::take_commands)
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Remove and return the recorded commands
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Vertex arrays drawn, in draw order
    pub fn draw_sequence(&self) -> Vec<VertexArrayId> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawTriangles { vertex_array, .. } => Some(*vertex_array),
                _ => None,
            })
            .collect()
    }

    /// Last value bound to `name` on `program`
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(&(program, name.to_string()))
    }

    /// Data uploaded to a buffer
    pub fn buffer_data(&self, buffer: BufferId) -> Option<&[f32]> {
        self.buffers.get(&buffer).map(|record| record.data.as_slice())
    }

    /// Attribute bindings of a vertex array
    pub fn vertex_array_bindings(&self, vertex_array: VertexArrayId) -> Option<&[(u32, BufferId)]> {
        self.vertex_arrays.get(&vertex_array).map(Vec::as_slice)
    }

    /// Currently bound program
    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    /// Active blend factors, if blending is enabled
    pub fn blending(&self) -> Option<(BlendFactor, BlendFactor)> {
        self.blending
    }
}

/// Names declared with `uniform <type> <name>[...];` in GLSL source
fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let mut tokens = line.trim().strip_prefix("uniform ")?.split_whitespace();
        let _ty = tokens.next()?;
        let name = tokens.next()?;
        let name = name.trim_end_matches(';');
        Some(name.split('[').next().unwrap_or(name).to_string())
    })
}

impl RenderContext for RecordingContext {
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> RenderResult<ProgramId> {
        for (stage, source) in [("vertex", vertex_source), ("fragment", fragment_source)] {
            if !source.contains("void main") {
                return Err(RenderError::ShaderCompilation(format!("{stage} shader has no entry point")));
            }
        }

        let program = ProgramId(self.allocate());
        let names = declared_uniforms(vertex_source)
            .chain(declared_uniforms(fragment_source))
            .collect();
        self.programs.insert(program, names);
        self.commands.push(RenderCommand::CompileProgram(program));
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramId) -> RenderResult<()> {
        if !self.programs.contains_key(&program) {
            return Err(RenderError::UnknownProgram(program));
        }
        self.current_program = Some(program);
        self.commands.push(RenderCommand::UseProgram(program));
        Ok(())
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) -> RenderResult<()> {
        let names = self.programs.get(&program).ok_or(RenderError::UnknownProgram(program))?;
        if !names.contains(name) {
            return Err(RenderError::UnknownUniform { program, name: name.to_string() });
        }

        self.uniforms.insert((program, name.to_string()), value.clone());
        self.commands.push(RenderCommand::SetUniform { program, name: name.to_string(), value });
        Ok(())
    }

    fn create_vertex_buffer(&mut self, components: usize, data: &[f32]) -> RenderResult<BufferId> {
        if components == 0 || data.is_empty() || data.len() % components != 0 {
            return Err(RenderError::BufferLayout { len: data.len(), components });
        }

        let buffer = BufferId(self.allocate());
        self.buffers.insert(buffer, BufferRecord { components, data: data.to_vec() });
        self.commands.push(RenderCommand::CreateVertexBuffer {
            buffer,
            components,
            vertices: data.len() / components,
        });
        Ok(buffer)
    }

    fn create_vertex_array(&mut self, attributes: &[(u32, BufferId)]) -> RenderResult<VertexArrayId> {
        if let Some((_, missing)) = attributes.iter().find(|(_, buffer)| !self.buffers.contains_key(buffer)) {
            return Err(RenderError::UnknownBuffer(*missing));
        }

        let vertex_array = VertexArrayId(self.allocate());
        self.vertex_arrays.insert(vertex_array, attributes.to_vec());
        self.commands.push(RenderCommand::CreateVertexArray {
            vertex_array,
            attributes: attributes.to_vec(),
        });
        Ok(vertex_array)
    }

    fn draw_triangles(&mut self, vertex_array: VertexArrayId, vertex_count: usize) -> RenderResult<()> {
        let bindings = self
            .vertex_arrays
            .get(&vertex_array)
            .ok_or(RenderError::UnknownVertexArray(vertex_array))?;

        let available = bindings
            .iter()
            .filter_map(|(_, buffer)| self.buffers.get(buffer))
            .map(|record| record.data.len() / record.components)
            .min()
            .unwrap_or(0);
        if vertex_count > available {
            return Err(RenderError::VertexCountMismatch { requested: vertex_count, available });
        }

        self.commands.push(RenderCommand::DrawTriangles { vertex_array, vertex_count });
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(RenderCommand::Clear(color));
    }

    fn enable_blending(&mut self, source: BlendFactor, destination: BlendFactor) {
        self.blending = Some((source, destination));
        self.commands.push(RenderCommand::EnableBlending { source, destination });
    }
}
