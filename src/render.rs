//! Draw submission and the one-shot triangle renderer.
//!
//! Initialization (compile, link, upload, attribute lookup) happens in
//! [`TriangleRenderer::new`]; [`TriangleRenderer::render`] only sets state and
//! issues the draw.

use crate::{
    context::GraphicsContext,
    error::Error,
    geometry::{self, VertexBuffer},
    shaders::{self, GlslVersion, ShaderProgram, ShaderSource},
    types::{AttributeBinding, Color, Vertex, Viewport},
};

/// The right triangle drawn by default, in clip space.
pub const RIGHT_TRIANGLE: [Vertex; 3] = [
    Vertex::new(0.0, 1.0),
    Vertex::new(-1.0, 0.0),
    Vertex::new(0.0, 0.0),
];

/// Fully transparent black.
pub const TRANSPARENT: Color = [0.0, 0.0, 0.0, 0.0];

/// Everything that parameterizes the single render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Color the surface is cleared to before drawing.
    pub clear_color: Color,
    /// Clip-space positions, three per triangle.
    pub positions: Vec<Vertex>,
    /// Name of the position input in the vertex shader.
    pub position_attribute: String,
    /// GLSL dialect the embedded shaders are compiled as.
    pub glsl_version: GlslVersion,
}

impl Default for TriangleConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            clear_color: TRANSPARENT,
            positions: RIGHT_TRIANGLE.to_vec(),
            position_attribute: "a_position".to_owned(),
            glsl_version: GlslVersion::default(),
        }
    }
}

impl TriangleConfig {
    /// Viewport covering the whole surface.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::full(self.width, self.height)
    }
}

/// Set up the fixed pipeline state and draw `vertex_count` vertices as
/// triangles.
///
/// The steps always run in this order: viewport, clear, use program, enable
/// the attribute slot, bind the buffer and describe its layout, draw.
///
/// Errors the context was already holding are logged and dropped first, so
/// the result only describes this submission.
///
/// # Errors
///
/// Returns [`Error::Draw`] with every error the context reported during the
/// submission.
pub fn configure_and_draw<C: GraphicsContext>(
    ctx: &mut C,
    program: &ShaderProgram<C>,
    buffer: &VertexBuffer<C>,
    binding: &AttributeBinding,
    viewport: Viewport,
    clear_color: Color,
    vertex_count: u32,
) -> Result<(), Error> {
    while let Some(stale) = ctx.take_error() {
        log::warn!("dropping context error raised before the draw: {stale}");
    }

    ctx.viewport(viewport);

    ctx.clear_color(clear_color);
    ctx.clear_color_buffer();

    ctx.use_program(Some(program.handle()));

    ctx.enable_vertex_attrib_array(binding.location);
    ctx.bind_array_buffer(Some(buffer.handle()));
    ctx.vertex_attrib_pointer(binding);

    ctx.draw_arrays(0, vertex_count);

    let errors: Vec<String> = std::iter::from_fn(|| ctx.take_error()).collect();
    if errors.is_empty() {
        log::debug!("drew {vertex_count} vertices into {viewport:?}");
        Ok(())
    } else {
        let reason = errors.join("; ");
        log::error!("draw failed: {reason}");
        Err(Error::Draw { reason })
    }
}

/// A compiled program and uploaded vertex data, ready to be drawn.
pub struct TriangleRenderer<C: GraphicsContext> {
    program: ShaderProgram<C>,
    buffer: VertexBuffer<C>,
    binding: AttributeBinding,
    viewport: Viewport,
    clear_color: Color,
}

impl<C: GraphicsContext> TriangleRenderer<C> {
    /// Compile and link the embedded shaders, upload `config.positions`, and
    /// look up the position attribute.
    ///
    /// # Errors
    ///
    /// Returns the first failure among compilation, linking, buffer
    /// creation, and attribute lookup. Nothing is drawn in that case.
    pub fn new(ctx: &mut C, config: &TriangleConfig) -> Result<Self, Error> {
        let vertex = shaders::compile_shader(
            ctx,
            &ShaderSource::triangle_vertex(config.glsl_version),
        )?;
        let fragment = shaders::compile_shader(
            ctx,
            &ShaderSource::triangle_fragment(config.glsl_version),
        )?;
        let program = shaders::link_program(ctx, &vertex, &fragment)?;

        let location = ctx
            .attrib_location(program.handle(), &config.position_attribute)
            .ok_or_else(|| Error::MissingAttribute {
                name: config.position_attribute.clone(),
            })?;

        let buffer = geometry::upload_positions(ctx, &config.positions)?;

        Ok(Self {
            program,
            buffer,
            binding: AttributeBinding::float2(location),
            viewport: config.viewport(),
            clear_color: config.clear_color,
        })
    }

    /// Clear the surface and draw every uploaded vertex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Draw`] if the context reports a failure.
    pub fn render(&self, ctx: &mut C) -> Result<(), Error> {
        configure_and_draw(
            ctx,
            &self.program,
            &self.buffer,
            &self.binding,
            self.viewport,
            self.clear_color,
            self.buffer.vertex_count(),
        )
    }

    /// The linked program.
    pub fn program(&self) -> &ShaderProgram<C> {
        &self.program
    }

    /// The uploaded vertex buffer.
    pub fn buffer(&self) -> &VertexBuffer<C> {
        &self.buffer
    }

    /// Layout used to feed the position attribute.
    pub fn binding(&self) -> &AttributeBinding {
        &self.binding
    }
}

/// Build, upload, and draw once.
///
/// # Errors
///
/// See [`TriangleRenderer::new`] and [`TriangleRenderer::render`].
pub fn render_triangle<C: GraphicsContext>(
    ctx: &mut C,
    config: &TriangleConfig,
) -> Result<(), Error> {
    TriangleRenderer::new(ctx, config)?.render(ctx)
}
