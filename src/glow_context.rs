//! [`GraphicsContext`] on top of a live OpenGL / GLES / WebGL context.

use std::sync::Arc;

use glow::HasContext;

use crate::context::GraphicsContext;
use crate::types::{AttributeBinding, Color, ShaderStage, Viewport};

/// Forwards every call to a [`glow::Context`].
///
/// Errors are not checked after each call; [`take_error`] drains
/// `glGetError`.
///
/// [`take_error`]: GraphicsContext::take_error
pub struct GlowContext {
    gl: Arc<glow::Context>,
    /// Core profiles refuse to draw without a vertex array bound.
    vao: glow::VertexArray,
}

impl GlowContext {
    /// Wrap `gl` and bind a vertex array object for the attribute state.
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread for as long as the returned
    /// value is used, and every call on it happens on that thread.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no vertex array could be created.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Result<Self, String> {
        let vao = unsafe {
            let vao = gl.create_vertex_array()?;
            gl.bind_vertex_array(Some(vao));
            vao
        };
        log::debug!("GL version: {:?}", gl.version());
        Ok(Self { gl, vao })
    }

    /// The wrapped context.
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    /// Vertex array object holding the attribute state.
    pub fn vertex_array(&self) -> glow::VertexArray {
        self.vao
    }

    /// Read the color buffer back as top-row-first RGBA8 pixels.
    ///
    /// # Safety
    ///
    /// Same requirements as [`GlowContext::new`].
    #[expect(clippy::cast_possible_wrap)]
    pub unsafe fn read_pixels(&self, width: u32, height: u32) -> image::RgbaImage {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        unsafe {
            self.gl.read_pixels(
                0,
                0,
                width as i32,
                height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(&mut data[..])),
            );
        }
        let mut image = image::RgbaImage::from_raw(width, height, data)
            .unwrap_or_else(|| image::RgbaImage::new(width, height));
        // GL rows start at the bottom.
        image::imageops::flip_vertical_in_place(&mut image);
        image
    }
}

fn shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn error_name(code: u32) -> &'static str {
    match code {
        glow::INVALID_ENUM => "INVALID_ENUM",
        glow::INVALID_VALUE => "INVALID_VALUE",
        glow::INVALID_OPERATION => "INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        _ => "unknown error",
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// Every method relies on the contract of `GlowContext::new`.
impl GraphicsContext for GlowContext {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<glow::Shader, String> {
        unsafe { self.gl.create_shader(shader_type(stage)) }
    }

    fn shader_source(&mut self, shader: glow::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&mut self, shader: glow::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: glow::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: glow::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&mut self, shader: glow::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&mut self) -> Result<glow::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&mut self, program: glow::Program, shader: glow::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn link_program(&mut self, program: glow::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: glow::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: glow::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&mut self, program: glow::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attrib_location(&self, program: glow::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn create_buffer(&mut self) -> Result<glow::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_array_buffer(&mut self, buffer: Option<glow::Buffer>) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn array_buffer_data(&mut self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
        }
    }

    fn viewport(&mut self, viewport: Viewport) {
        unsafe {
            self.gl.viewport(
                viewport.x,
                viewport.y,
                to_i32(viewport.width),
                to_i32(viewport.height),
            );
        }
    }

    fn clear_color(&mut self, [r, g, b, a]: Color) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear_color_buffer(&mut self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn use_program(&mut self, program: Option<glow::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) }
    }

    fn vertex_attrib_pointer(&mut self, binding: &AttributeBinding) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                binding.location,
                i32::from(binding.size),
                glow::FLOAT,
                binding.normalize,
                to_i32(binding.stride),
                to_i32(binding.offset),
            );
        }
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(glow::TRIANGLES, to_i32(first), to_i32(count));
        }
    }

    fn take_error(&mut self) -> Option<String> {
        let code = unsafe { self.gl.get_error() };
        (code != glow::NO_ERROR).then(|| format!("{} (0x{code:04X})", error_name(code)))
    }
}
