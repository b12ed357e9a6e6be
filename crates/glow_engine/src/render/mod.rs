//! Rendering abstraction
//!
//! The scene never talks to a graphics API directly. It drives a
//! [`RenderContext`], the render-target contract: compile a program, bind
//! named uniforms, create vertex buffers and vertex arrays, clear, and issue
//! non-indexed triangle draws with standard alpha blending.
//!
//! [`RecordingContext`] implements the contract by recording every call as a
//! [`RenderCommand`], which is what the headless demo and the tests run on.

pub mod backend;
pub mod recording;
pub mod shaders;

pub use backend::{
    BlendFactor,
    BufferId,
    ProgramId,
    RenderContext,
    RenderError,
    RenderResult,
    UniformValue,
    VertexArrayId,
};
pub use recording::{RecordingContext, RenderCommand};
