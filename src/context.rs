//! The graphics-context seam.
//!
//! [`GraphicsContext`] is the slice of the OpenGL ES 2.0 / WebGL API that the
//! triangle pipeline touches. Bind points are still part of the model (there
//! is one array-buffer binding and one current program), but the context is an
//! explicit value handed to every call instead of ambient global state.

use std::fmt;

use crate::types::{AttributeBinding, Color, ShaderStage, Viewport};

/// A rendering context able to build shader programs, hold vertex data, and
/// rasterize triangles.
///
/// Query methods mirror their GL counterparts: compilation and linking never
/// fail by themselves, the outcome is read back with the `*_status` and
/// `*_info_log` methods.
pub trait GraphicsContext {
    /// Handle to a shader object.
    type Shader: Copy + fmt::Debug;
    /// Handle to a program object.
    type Program: Copy + fmt::Debug;
    /// Handle to a buffer object.
    type Buffer: Copy + fmt::Debug;

    /// Create an empty shader object for `stage`.
    ///
    /// # Errors
    ///
    /// Returns the driver's reason if no shader object could be created.
    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String>;

    /// Replace the source text of `shader`.
    fn shader_source(&mut self, shader: Self::Shader, source: &str);

    /// Compile the current source of `shader`.
    fn compile_shader(&mut self, shader: Self::Shader);

    /// Whether the last compilation of `shader` succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;

    /// Diagnostics from the last compilation of `shader`.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Release a shader object.
    fn delete_shader(&mut self, shader: Self::Shader);

    /// Create an empty program object.
    ///
    /// # Errors
    ///
    /// Returns the driver's reason if no program object could be created.
    fn create_program(&mut self) -> Result<Self::Program, String>;

    /// Attach a compiled shader to `program` for the next link.
    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader);

    /// Link the shaders attached to `program`.
    fn link_program(&mut self, program: Self::Program);

    /// Whether the last link of `program` succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;

    /// Diagnostics from the last link of `program`.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Release a program object.
    fn delete_program(&mut self, program: Self::Program);

    /// Location of the active vertex input called `name`, if any.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    /// Create an empty buffer object.
    ///
    /// # Errors
    ///
    /// Returns the driver's reason if no buffer object could be created.
    fn create_buffer(&mut self) -> Result<Self::Buffer, String>;

    /// Bind `buffer` to the array-buffer bind point.
    fn bind_array_buffer(&mut self, buffer: Option<Self::Buffer>);

    /// Replace the storage of the buffer bound to the array-buffer bind point
    /// with a copy of `data`, hinting that it is written once and drawn many
    /// times (`STATIC_DRAW`).
    fn array_buffer_data(&mut self, data: &[u8]);

    /// Set the rectangle that normalized device coordinates map onto.
    fn viewport(&mut self, viewport: Viewport);

    /// Set the color used by [`clear_color_buffer`](Self::clear_color_buffer).
    fn clear_color(&mut self, color: Color);

    /// Fill the whole color buffer with the clear color.
    fn clear_color_buffer(&mut self);

    /// Make `program` the current executable, or unbind with `None`.
    fn use_program(&mut self, program: Option<Self::Program>);

    /// Turn on the attribute slot at `location`.
    fn enable_vertex_attrib_array(&mut self, location: u32);

    /// Point the attribute slot named by `binding` at the buffer currently
    /// bound to the array-buffer bind point.
    fn vertex_attrib_pointer(&mut self, binding: &AttributeBinding);

    /// Rasterize `count` vertices starting at `first` as independent
    /// triangles (`TRIANGLES`) with the current program.
    fn draw_arrays(&mut self, first: u32, count: u32);

    /// Take the oldest pending error, if any.
    ///
    /// Call it until it returns `None` to clear every pending error.
    fn take_error(&mut self) -> Option<String>;
}
