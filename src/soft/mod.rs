//! A headless, CPU-only [`GraphicsContext`].
//!
//! [`SoftContext`] keeps the same object model and bind points as a GL
//! context. Shaders are parsed and validated with naga, linked by matching
//! stage interfaces, and executed by a small interpreter for every vertex and
//! every covered pixel. Results land in a [`ColorBuffer`] that tests can read
//! back and the binary can save as a PNG.

mod compile;
mod exec;
mod program;
mod raster;

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;

use slotmap::SlotMap;

pub use self::raster::{quantize, ColorBuffer};

use self::compile::CompiledStage;
use self::exec::{ExecError, Value, DEFAULT_ATTRIBUTE};
use self::program::{LinkedProgram, ShadedVertex, VertexInput};
use crate::context::GraphicsContext;
use crate::types::{AttributeBinding, Color, ShaderStage, Viewport};

/// Number of attribute slots, the minimum GLES 2.0 guarantees.
pub const MAX_VERTEX_ATTRIBS: usize = 16;

slotmap::new_key_type! {
    /// Handle to a shader object in a [`SoftContext`].
    pub struct ShaderId;
    /// Handle to a program object in a [`SoftContext`].
    pub struct ProgramId;
    /// Handle to a buffer object in a [`SoftContext`].
    pub struct BufferId;
}

struct SoftShader {
    stage: ShaderStage,
    source: String,
    compiled: Option<Arc<CompiledStage>>,
    info_log: String,
}

#[derive(Default)]
struct SoftProgram {
    attached: Vec<ShaderId>,
    linked: Option<Arc<LinkedProgram>>,
    info_log: String,
}

struct SoftBuffer {
    data: Vec<u8>,
}

#[derive(Copy, Clone, Debug, Default)]
struct AttributeSlot {
    enabled: bool,
    pointer: Option<(BufferId, AttributeBinding)>,
}

/// Work done by the most recent draw call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Times the vertex stage ran.
    pub vertex_invocations: u32,
    /// Times the fragment stage ran.
    pub fragment_invocations: u32,
    /// Triangles that reached the rasterizer.
    pub triangles: u32,
}

/// The software context. See the [module documentation](self).
pub struct SoftContext {
    shaders: SlotMap<ShaderId, SoftShader>,
    programs: SlotMap<ProgramId, SoftProgram>,
    buffers: SlotMap<BufferId, SoftBuffer>,

    array_buffer: Option<BufferId>,
    current_program: Option<ProgramId>,
    attributes: [AttributeSlot; MAX_VERTEX_ATTRIBS],
    viewport: Viewport,
    clear_color: Color,

    color_buffer: ColorBuffer,
    last_draw: DrawStats,
    errors: VecDeque<String>,
}

impl SoftContext {
    /// A context rendering into a `width` × `height` color buffer.
    ///
    /// The viewport starts out covering the whole buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            shaders: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            buffers: SlotMap::with_key(),
            array_buffer: None,
            current_program: None,
            attributes: [AttributeSlot::default(); MAX_VERTEX_ATTRIBS],
            viewport: Viewport::full(width, height),
            clear_color: [0.0; 4],
            color_buffer: ColorBuffer::new(width, height),
            last_draw: DrawStats::default(),
            errors: VecDeque::new(),
        }
    }

    /// The rendered pixels.
    #[must_use]
    pub fn color_buffer(&self) -> &ColorBuffer {
        &self.color_buffer
    }

    /// Counters from the most recent successful draw.
    #[must_use]
    pub fn last_draw(&self) -> DrawStats {
        self.last_draw
    }

    /// Number of shader objects not yet deleted.
    #[must_use]
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    /// Number of program objects not yet deleted.
    #[must_use]
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of buffer objects.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Size of `buffer`'s storage, or `None` if there is no such buffer.
    #[must_use]
    pub fn buffer_len(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(buffer).map(|b| b.data.len())
    }

    /// Contents of `buffer`.
    #[must_use]
    pub fn buffer_bytes(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(buffer).map(|b| b.data.as_slice())
    }

    /// Buffer bound to the array-buffer bind point.
    #[must_use]
    pub fn bound_array_buffer(&self) -> Option<BufferId> {
        self.array_buffer
    }

    /// The current program.
    #[must_use]
    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    /// The current viewport.
    #[must_use]
    pub fn current_viewport(&self) -> Viewport {
        self.viewport
    }

    fn record(&mut self, error: String) {
        log::warn!("{error}");
        self.errors.push_back(error);
    }

    fn fetch_attribute(&self, location: u32, index: u32) -> Result<[f32; 4], String> {
        let slot = self
            .attributes
            .get(location as usize)
            .ok_or_else(|| format!("attribute location {location} out of range"))?;
        if !slot.enabled {
            return Ok(DEFAULT_ATTRIBUTE);
        }
        let (buffer, binding) = slot
            .pointer
            .ok_or_else(|| format!("attribute {location} is enabled but has no buffer"))?;
        let data = &self
            .buffers
            .get(buffer)
            .ok_or_else(|| format!("buffer for attribute {location} was deleted"))?
            .data;

        let bytes = attribute_range(&binding, index)
            .and_then(|range| data.get(range))
            .ok_or_else(|| {
                format!("vertex {index} reads past the end of the buffer for attribute {location}")
            })?;

        let mut out = DEFAULT_ATTRIBUTE;
        for (slot, raw) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *slot = bytemuck::pod_read_unaligned::<f32>(raw);
        }
        Ok(out)
    }

    /// Reject a draw whose last vertex would read past the end of a buffer,
    /// before any vertex is shaded.
    fn check_vertex_range(&self, program: &LinkedProgram, last: u32) -> Result<(), String> {
        for input in program.vertex_inputs() {
            let VertexInput::Attribute { location, .. } = *input else {
                continue;
            };
            let Some(AttributeSlot {
                enabled: true,
                pointer: Some((buffer, binding)),
            }) = self.attributes.get(location as usize).copied()
            else {
                continue;
            };
            let len = self.buffers.get(buffer).map_or(0, |b| b.data.len());
            if attribute_range(&binding, last).is_none_or(|range| range.end > len) {
                return Err(format!(
                    "vertex {last} reads past the end of the buffer for attribute {location}"
                ));
            }
        }
        Ok(())
    }

    fn shade_vertex(&self, program: &LinkedProgram, index: u32) -> Result<ShadedVertex, String> {
        let inputs = program
            .vertex_inputs()
            .iter()
            .map(|input| match *input {
                VertexInput::Attribute { location, ty } => {
                    let components = self.fetch_attribute(location, index)?;
                    Value::from_components(program.vertex_type(ty), components)
                        .map_err(|e| e.to_string())
                }
                VertexInput::Zero(ty) => program.vertex_zero(ty).map_err(|e| e.to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        program
            .run_vertex(inputs)
            .map_err(|e| format!("vertex {index}: {e}"))
    }

    fn draw(&mut self, first: u32, count: u32) -> Result<DrawStats, String> {
        let program = self
            .current_program
            .and_then(|id| self.programs.get(id))
            .ok_or("no current program")?
            .linked
            .clone()
            .ok_or("current program is not linked")?;
        let end = first
            .checked_add(count)
            .ok_or("vertex range overflows")?;
        if count > 0 {
            self.check_vertex_range(&program, end - 1)?;
        }

        let mut stats = DrawStats::default();
        let mut vertices = Vec::new();
        for index in first..end {
            vertices.push(self.shade_vertex(&program, index)?);
            stats.vertex_invocations += 1;
        }

        let viewport = self.viewport;
        let size = (self.color_buffer.width(), self.color_buffer.height());
        let target = &mut self.color_buffer;
        for triangle in vertices.chunks_exact(3) {
            let corners = [&triangle[0], &triangle[1], &triangle[2]];
            stats.triangles += 1;
            raster::rasterize_triangle(
                viewport,
                size,
                corners.map(|v| v.position),
                |fragment| -> Result<(), ExecError> {
                    stats.fragment_invocations += 1;
                    if let Some(color) = program.run_fragment(corners, fragment)? {
                        target.put_window(fragment.x, fragment.y, quantize(color));
                    }
                    Ok(())
                },
            )
            .map_err(|e| format!("fragment shader: {e}"))?;
        }
        Ok(stats)
    }
}

/// Bytes `binding` reads for vertex `index`, or `None` if the offset
/// overflows.
fn attribute_range(binding: &AttributeBinding, index: u32) -> Option<Range<usize>> {
    let start = (index as usize)
        .checked_mul(binding.effective_stride())?
        .checked_add(binding.offset as usize)?;
    let end = start.checked_add(usize::from(binding.size) * 4)?;
    Some(start..end)
}

impl GraphicsContext for SoftContext {
    type Shader = ShaderId;
    type Program = ProgramId;
    type Buffer = BufferId;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, String> {
        Ok(self.shaders.insert(SoftShader {
            stage,
            source: String::new(),
            compiled: None,
            info_log: String::new(),
        }))
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) {
        match self.shaders.get_mut(shader) {
            Some(s) => s.source = source.to_owned(),
            None => self.record(format!("shader_source: no shader {shader:?}")),
        }
    }

    fn compile_shader(&mut self, shader: ShaderId) {
        let Some(s) = self.shaders.get_mut(shader) else {
            self.record(format!("compile_shader: no shader {shader:?}"));
            return;
        };
        match compile::compile(s.stage, &s.source) {
            Ok(stage) => {
                s.compiled = Some(Arc::new(stage));
                s.info_log.clear();
            }
            Err(log) => {
                s.compiled = None;
                s.info_log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.shaders
            .get(shader)
            .is_some_and(|s| s.compiled.is_some())
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.shaders
            .get(shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(shader);
    }

    fn create_program(&mut self) -> Result<ProgramId, String> {
        Ok(self.programs.insert(SoftProgram::default()))
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if !self.shaders.contains_key(shader) {
            self.record(format!("attach_shader: no shader {shader:?}"));
            return;
        }
        let error = match self.programs.get_mut(program) {
            Some(p) if p.attached.contains(&shader) => {
                format!("attach_shader: {shader:?} is already attached")
            }
            Some(p) => {
                p.attached.push(shader);
                return;
            }
            None => format!("attach_shader: no program {program:?}"),
        };
        self.record(error);
    }

    fn link_program(&mut self, program: ProgramId) {
        let Some(p) = self.programs.get(program) else {
            self.record(format!("link_program: no program {program:?}"));
            return;
        };

        let stage_of = |wanted: ShaderStage| -> Result<Arc<CompiledStage>, String> {
            let mut found = p
                .attached
                .iter()
                .filter_map(|&id| self.shaders.get(id))
                .filter(|s| s.stage == wanted);
            match (found.next(), found.next()) {
                (Some(s), None) => s
                    .compiled
                    .clone()
                    .ok_or_else(|| format!("attached {wanted} shader is not compiled")),
                (None, _) => Err(format!("no {wanted} shader attached")),
                (Some(_), Some(_)) => Err(format!("more than one {wanted} shader attached")),
            }
        };

        let outcome = stage_of(ShaderStage::Vertex)
            .and_then(|vs| Ok((vs, stage_of(ShaderStage::Fragment)?)))
            .and_then(|(vs, fs)| program::link(vs, fs));

        let Some(p) = self.programs.get_mut(program) else {
            return;
        };
        match outcome {
            Ok(linked) => {
                p.linked = Some(Arc::new(linked));
                p.info_log.clear();
            }
            Err(log) => {
                p.linked = None;
                p.info_log = log;
            }
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.programs
            .get(program)
            .is_some_and(|p| p.linked.is_some())
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.programs
            .get(program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.programs
            .get(program)?
            .linked
            .as_ref()?
            .attrib_location(name)
    }

    fn create_buffer(&mut self) -> Result<BufferId, String> {
        Ok(self.buffers.insert(SoftBuffer { data: Vec::new() }))
    }

    fn bind_array_buffer(&mut self, buffer: Option<BufferId>) {
        match buffer {
            Some(id) if !self.buffers.contains_key(id) => {
                self.record(format!("bind_array_buffer: no buffer {id:?}"));
            }
            _ => {
                log::trace!("ARRAY_BUFFER <- {buffer:?}");
                self.array_buffer = buffer;
            }
        }
    }

    fn array_buffer_data(&mut self, data: &[u8]) {
        match self.array_buffer.and_then(|id| self.buffers.get_mut(id)) {
            Some(buffer) => buffer.data = data.to_vec(),
            None => self.record("array_buffer_data: no buffer bound".to_owned()),
        }
    }

    fn viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn clear_color_buffer(&mut self) {
        self.color_buffer.fill(quantize(self.clear_color));
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        match program {
            Some(id) if !self.program_link_status(id) => {
                self.record(format!("use_program: {id:?} is not a linked program"));
            }
            _ => {
                log::trace!("current program <- {program:?}");
                self.current_program = program;
            }
        }
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        match self.attributes.get_mut(location as usize) {
            Some(slot) => slot.enabled = true,
            None => self.record(format!(
                "enable_vertex_attrib_array: location {location} out of range"
            )),
        }
    }

    fn vertex_attrib_pointer(&mut self, binding: &AttributeBinding) {
        if !(1..=4).contains(&binding.size) {
            self.record(format!(
                "vertex_attrib_pointer: size {} is not 1 to 4",
                binding.size
            ));
            return;
        }
        let Some(buffer) = self.array_buffer else {
            self.record("vertex_attrib_pointer: no buffer bound".to_owned());
            return;
        };
        match self.attributes.get_mut(binding.location as usize) {
            Some(slot) => {
                log::trace!("attribute {} <- {buffer:?} {binding:?}", binding.location);
                slot.pointer = Some((buffer, *binding));
            }
            None => self.record(format!(
                "vertex_attrib_pointer: location {} out of range",
                binding.location
            )),
        }
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        match self.draw(first, count) {
            Ok(stats) => {
                log::trace!("draw: {stats:?}");
                self.last_draw = stats;
            }
            Err(reason) => self.record(format!("draw_arrays: {reason}")),
        }
    }

    fn take_error(&mut self) -> Option<String> {
        self.errors.pop_front()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shaders::{self, GlslVersion, ShaderProgram, ShaderSource};

    const RED: [u8; 4] = [255, 0, 0, 255];

    const RED_FS: &str = r"#version 450 core
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(1.0, 0.0, 0.0, 1.0);
}
";

    const COLOR_VS: &str = r"#version 450 core
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec4 a_color;
layout(location = 0) out vec4 v_color;

void main() {
    v_color = a_color;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

    const COLOR_FS: &str = r"#version 450 core
layout(location = 0) in vec4 v_color;
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = v_color;
}
";

    fn program(ctx: &mut SoftContext, vs: &str, fs: &str) -> ShaderProgram<SoftContext> {
        let vs = shaders::compile_shader(ctx, &ShaderSource::new(ShaderStage::Vertex, vs)).unwrap();
        let fs =
            shaders::compile_shader(ctx, &ShaderSource::new(ShaderStage::Fragment, fs)).unwrap();
        shaders::link_program(ctx, &vs, &fs).unwrap()
    }

    fn triangle_program(ctx: &mut SoftContext) -> ShaderProgram<SoftContext> {
        let vs = ShaderSource::triangle_vertex(GlslVersion::Core450);
        program(ctx, vs.text(), RED_FS)
    }

    fn upload(ctx: &mut SoftContext, floats: &[f32]) -> BufferId {
        let buffer = ctx.create_buffer().unwrap();
        ctx.bind_array_buffer(Some(buffer));
        ctx.array_buffer_data(bytemuck::cast_slice(floats));
        buffer
    }

    fn red_pixels(ctx: &SoftContext) -> usize {
        ctx.color_buffer().pixels().iter().filter(|&&p| p == RED).count()
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut ctx = SoftContext::new(3, 2);
        ctx.clear_color([0.0, 1.0, 0.0, 1.0]);
        ctx.clear_color_buffer();
        assert!(ctx.color_buffer().pixels().iter().all(|&p| p == [0, 255, 0, 255]));
    }

    #[test]
    fn two_triangles_cover_the_full_quad() {
        let mut ctx = SoftContext::new(8, 8);
        let program = triangle_program(&mut ctx);
        upload(
            &mut ctx,
            &[
                -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, // lower right
                -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, // upper left
            ],
        );
        ctx.use_program(Some(program.handle()));
        ctx.enable_vertex_attrib_array(0);
        ctx.vertex_attrib_pointer(&AttributeBinding::float2(0));

        ctx.draw_arrays(0, 6);

        assert_eq!(ctx.take_error(), None);
        assert_eq!(red_pixels(&ctx), 64);
        assert_eq!(ctx.last_draw().triangles, 2);
        assert_eq!(ctx.last_draw().fragment_invocations, 64);
    }

    #[test]
    fn interleaved_color_feeds_a_varying() {
        let mut ctx = SoftContext::new(4, 4);
        let program = program(&mut ctx, COLOR_VS, COLOR_FS);
        // x, y, then an opaque green.
        #[rustfmt::skip]
        let vertices = [
            -1.0, -1.0, 0.0, 1.0, 0.0, 1.0,
            3.0, -1.0, 0.0, 1.0, 0.0, 1.0,
            -1.0, 3.0, 0.0, 1.0, 0.0, 1.0,
        ];
        upload(&mut ctx, &vertices);

        let stride = 24;
        ctx.use_program(Some(program.handle()));
        ctx.enable_vertex_attrib_array(0);
        ctx.vertex_attrib_pointer(&AttributeBinding {
            stride,
            ..AttributeBinding::float2(0)
        });
        ctx.enable_vertex_attrib_array(1);
        ctx.vertex_attrib_pointer(&AttributeBinding {
            location: 1,
            size: 4,
            normalize: false,
            stride,
            offset: 8,
        });
        ctx.draw_arrays(0, 3);

        assert_eq!(ctx.take_error(), None);
        assert!(ctx.color_buffer().pixels().iter().all(|&p| p == [0, 255, 0, 255]));
    }

    #[test]
    fn disabled_attribute_reads_the_default_value() {
        let mut ctx = SoftContext::new(4, 4);
        let program = program(&mut ctx, COLOR_VS, COLOR_FS);
        upload(&mut ctx, &[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0]);
        ctx.use_program(Some(program.handle()));
        ctx.enable_vertex_attrib_array(0);
        ctx.vertex_attrib_pointer(&AttributeBinding::float2(0));

        ctx.draw_arrays(0, 3);

        assert_eq!(ctx.take_error(), None);
        assert!(ctx.color_buffer().pixels().iter().all(|&p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn reading_past_the_buffer_is_an_error() {
        let mut ctx = SoftContext::new(4, 4);
        let program = triangle_program(&mut ctx);
        upload(&mut ctx, &[0.0, 1.0, -1.0, 0.0]);
        ctx.use_program(Some(program.handle()));
        ctx.enable_vertex_attrib_array(0);
        ctx.vertex_attrib_pointer(&AttributeBinding::float2(0));

        ctx.draw_arrays(0, 3);

        let error = ctx.take_error().unwrap();
        assert!(error.contains("past the end"), "{error}");
        assert_eq!(red_pixels(&ctx), 0);
    }

    #[test]
    fn oversized_count_is_rejected_before_shading() {
        let mut ctx = SoftContext::new(4, 4);
        let program = triangle_program(&mut ctx);
        upload(&mut ctx, &[0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);
        ctx.use_program(Some(program.handle()));
        ctx.enable_vertex_attrib_array(0);
        ctx.vertex_attrib_pointer(&AttributeBinding::float2(0));

        ctx.draw_arrays(0, u32::MAX);

        let error = ctx.take_error().unwrap();
        assert!(error.contains("past the end"), "{error}");
        assert_eq!(ctx.last_draw(), DrawStats::default());
        assert_eq!(ctx.take_error(), None);
    }

    #[test]
    fn drawing_without_a_program_is_an_error() {
        let mut ctx = SoftContext::new(4, 4);
        ctx.draw_arrays(0, 3);
        assert!(ctx.take_error().unwrap().contains("no current program"));
        assert_eq!(ctx.take_error(), None);
    }

    #[test]
    fn attribute_pointer_needs_a_bound_buffer() {
        let mut ctx = SoftContext::new(4, 4);
        ctx.vertex_attrib_pointer(&AttributeBinding::float2(0));
        assert!(ctx.take_error().is_some());
    }

    #[test]
    fn unlinked_program_cannot_be_made_current() {
        let mut ctx = SoftContext::new(4, 4);
        let program = ctx.create_program().unwrap();
        ctx.link_program(program);

        assert!(!ctx.program_link_status(program));
        assert!(ctx.program_info_log(program).contains("no vertex shader"));
        ctx.use_program(Some(program));
        assert!(ctx.take_error().is_some());
        assert_eq!(ctx.current_program(), None);
    }

    #[test]
    fn buffer_data_is_copied() {
        let mut ctx = SoftContext::new(1, 1);
        let buffer = ctx.create_buffer().unwrap();
        ctx.bind_array_buffer(Some(buffer));
        ctx.array_buffer_data(&[1, 2, 3]);
        assert_eq!(ctx.buffer_bytes(buffer), Some(&[1u8, 2, 3][..]));
        assert_eq!(ctx.buffer_len(buffer), Some(3));
    }

    #[test]
    fn viewport_limits_coverage() {
        let mut ctx = SoftContext::new(8, 8);
        let program = triangle_program(&mut ctx);
        upload(&mut ctx, &[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0]);
        ctx.viewport(Viewport { x: 0, y: 0, width: 4, height: 4 });
        ctx.use_program(Some(program.handle()));
        ctx.enable_vertex_attrib_array(0);
        ctx.vertex_attrib_pointer(&AttributeBinding::float2(0));

        ctx.draw_arrays(0, 3);

        assert_eq!(red_pixels(&ctx), 16);
        assert_eq!(ctx.color_buffer().pixel_at_window(0, 0), Some(RED));
        assert_eq!(ctx.color_buffer().pixel_at_window(4, 4), Some([0, 0, 0, 0]));
    }
}
