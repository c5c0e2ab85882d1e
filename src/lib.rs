//! Draw one static triangle with the programmable pipeline.
//!
//! The work happens in three steps, always in this order:
//!
//! 1. **Build**: compile a vertex and a fragment shader and link them
//!    ([`compile_shader`], [`link_program`]).
//! 2. **Upload**: copy the vertex positions into a buffer object
//!    ([`upload_positions`]).
//! 3. **Submit**: set the viewport, clear, bind the program and the
//!    position attribute, and issue a single draw ([`configure_and_draw`]).
//!
//! [`TriangleRenderer`] bundles the three; [`render_triangle`] runs them once
//! for a [`TriangleConfig`].
//!
//! Every step talks to a [`GraphicsContext`], an explicit value standing in
//! for the GL context's bind points. Two are provided:
//!
//! - [`GlowContext`] (feature `glow`, on by default) forwards to a real
//!   OpenGL, GLES or WebGL context through [glow].
//! - [`SoftContext`] runs the same shaders on the CPU, parsing them with
//!   [naga], and renders into an in-memory [`ColorBuffer`].
//!
//! # Example
//!
//! ```no_run
//! use basic_triangle::{render_triangle, SoftContext, TriangleConfig};
//!
//! let config = TriangleConfig::default();
//! let mut ctx = SoftContext::new(config.width, config.height);
//! render_triangle(&mut ctx, &config)?;
//! ctx.color_buffer().save_png("triangle.png")?;
//! # Ok::<(), basic_triangle::Error>(())
//! ```
//!
//! # Safety
//!
//! Creating a [`GlowContext`] requires a valid OpenGL context that is current
//! on the calling thread. [`SoftContext`] has no such requirement.
//!
//! [glow]: https://docs.rs/glow
//! [naga]: https://docs.rs/naga

mod context;
mod error;
mod geometry;
#[cfg(feature = "glow")]
mod glow_context;
mod render;
mod shaders;
pub mod soft;
mod types;

pub use context::GraphicsContext;
pub use error::Error;
pub use geometry::{upload_positions, VertexBuffer};
#[cfg(feature = "glow")]
pub use glow_context::GlowContext;
pub use render::{
    configure_and_draw, render_triangle, TriangleConfig, TriangleRenderer, RIGHT_TRIANGLE,
    TRANSPARENT,
};
pub use shaders::{
    compile_shader, link_program, CompiledShader, GlslVersion, ShaderProgram, ShaderSource,
    TRIANGLE_FRAGMENT_SRC, TRIANGLE_VERTEX_SRC,
};
pub use soft::{ColorBuffer, DrawStats, SoftContext};
pub use types::{AttributeBinding, Color, ShaderStage, Vertex, Viewport};
