//! GLSL shader sources and the compile/link helpers.
//!
//! The embedded sources carry no `#version` line; [`GlslVersion`] supplies
//! the preamble for the context they are compiled on.

use std::fmt;

use crate::context::GraphicsContext;
use crate::error::Error;
use crate::types::ShaderStage;

/// Vertex shader for the triangle.
///
/// Copies the 2D position attribute straight into clip space.
///
/// # Inputs
///
/// | Name         | Location | Type   | Description                   |
/// |--------------|----------|--------|-------------------------------|
/// | `a_position` | 0        | `vec2` | Vertex position in clip space |
pub const TRIANGLE_VERTEX_SRC: &str = r"
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Fragment shader for the triangle.
///
/// Writes the same reddish-purple `(1, 0, 0.5, 1)` for every fragment.
pub const TRIANGLE_FRAGMENT_SRC: &str = r"
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(1.0, 0.0, 0.5, 1.0);
}
";

/// GLSL dialect to prepend to the embedded sources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum GlslVersion {
    /// `#version 450 core`, accepted by the headless context and GL 4.5.
    #[default]
    Core450,
    /// `#version 330 core`, for GL 3.3 desktop contexts.
    Core330,
    /// `#version 300 es`, for GLES 3.0 and WebGL 2.
    Es300,
}

impl GlslVersion {
    /// Lines that must precede the shader body.
    #[must_use]
    pub const fn preamble(self) -> &'static str {
        match self {
            Self::Core450 => "#version 450 core\n",
            Self::Core330 => "#version 330 core\n",
            // ES fragment shaders have no default float precision.
            Self::Es300 => "#version 300 es\nprecision highp float;\n",
        }
    }
}

/// Shading-language text tagged with the stage it is written for.
#[derive(Clone, PartialEq, Eq)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: String,
}

impl ShaderSource {
    /// Wrap complete source text, `#version` line included.
    pub fn new(stage: ShaderStage, text: impl Into<String>) -> Self {
        Self {
            stage,
            text: text.into(),
        }
    }

    /// Prefix a version-less `body` with the preamble for `version`.
    #[must_use]
    pub fn versioned(stage: ShaderStage, version: GlslVersion, body: &str) -> Self {
        Self::new(stage, format!("{}{body}", version.preamble()))
    }

    /// The built-in triangle vertex shader.
    #[must_use]
    pub fn triangle_vertex(version: GlslVersion) -> Self {
        Self::versioned(ShaderStage::Vertex, version, TRIANGLE_VERTEX_SRC)
    }

    /// The built-in triangle fragment shader.
    #[must_use]
    pub fn triangle_fragment(version: GlslVersion) -> Self {
        Self::versioned(ShaderStage::Fragment, version, TRIANGLE_FRAGMENT_SRC)
    }

    /// Stage this source targets.
    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for ShaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderSource")
            .field("stage", &self.stage)
            .field("len", &self.text.len())
            .finish()
    }
}

/// A successfully compiled shader object.
pub struct CompiledShader<C: GraphicsContext> {
    handle: C::Shader,
    stage: ShaderStage,
}

impl<C: GraphicsContext> CompiledShader<C> {
    /// Driver handle of the shader object.
    pub fn handle(&self) -> C::Shader {
        self.handle
    }

    /// Stage the shader was compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<C: GraphicsContext> fmt::Debug for CompiledShader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("handle", &self.handle)
            .field("stage", &self.stage)
            .finish()
    }
}

/// A linked vertex + fragment program, ready to be made current.
///
/// Only [`link_program`] creates one, so holding a `ShaderProgram` proves
/// that both stages compiled and linked.
pub struct ShaderProgram<C: GraphicsContext> {
    handle: C::Program,
}

impl<C: GraphicsContext> ShaderProgram<C> {
    /// Driver handle of the program object.
    pub fn handle(&self) -> C::Program {
        self.handle
    }
}

impl<C: GraphicsContext> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .finish()
    }
}

/// Compile one shader stage from source.
///
/// On failure the shader object is deleted before returning, so nothing is
/// left behind in the context.
///
/// # Errors
///
/// Returns [`Error::ShaderCompile`] with the driver's info log if the source
/// does not compile, or [`Error::ResourceCreation`] if no shader object could
/// be created.
pub fn compile_shader<C: GraphicsContext>(
    ctx: &mut C,
    source: &ShaderSource,
) -> Result<CompiledShader<C>, Error> {
    let stage = source.stage();
    let shader = ctx
        .create_shader(stage)
        .map_err(|reason| Error::ResourceCreation {
            resource: "shader",
            reason,
        })?;

    ctx.shader_source(shader, source.text());
    ctx.compile_shader(shader);

    if !ctx.shader_compile_status(shader) {
        let log = ctx.shader_info_log(shader);
        log::error!("{stage} shader compile error: {log}");
        ctx.delete_shader(shader);
        return Err(Error::ShaderCompile { stage, log });
    }

    log::debug!("compiled {stage} shader {shader:?}");
    Ok(CompiledShader {
        handle: shader,
        stage,
    })
}

/// Link a vertex and a fragment shader into a program.
///
/// The shaders stay alive; the program does not take ownership of them.
///
/// # Errors
///
/// Returns [`Error::ProgramLink`] if the stages are not one vertex and one
/// fragment shader or if the driver rejects the link, and
/// [`Error::ResourceCreation`] if no program object could be created.
pub fn link_program<C: GraphicsContext>(
    ctx: &mut C,
    vertex: &CompiledShader<C>,
    fragment: &CompiledShader<C>,
) -> Result<ShaderProgram<C>, Error> {
    if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
        let log = format!(
            "expected a vertex and a fragment shader, got {} and {}",
            vertex.stage(),
            fragment.stage()
        );
        log::error!("program link error: {log}");
        return Err(Error::ProgramLink { log });
    }

    let program = ctx
        .create_program()
        .map_err(|reason| Error::ResourceCreation {
            resource: "program",
            reason,
        })?;

    ctx.attach_shader(program, vertex.handle());
    ctx.attach_shader(program, fragment.handle());
    ctx.link_program(program);

    if !ctx.program_link_status(program) {
        let log = ctx.program_info_log(program);
        log::error!("program link error: {log}");
        ctx.delete_program(program);
        return Err(Error::ProgramLink { log });
    }

    log::debug!("linked program {program:?}");
    Ok(ShaderProgram { handle: program })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::soft::SoftContext;

    const BROKEN_VERTEX_SRC: &str = r"
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0)
}
";

    const BROKEN_FRAGMENT_SRC: &str = r"
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(1.0, 0.0, 0.5, 1.0;
}
";

    const COLORED_FRAGMENT_SRC: &str = r"
layout(location = 0) in vec3 v_color;
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(v_color, 1.0);
}
";

    fn vertex() -> ShaderSource {
        ShaderSource::triangle_vertex(GlslVersion::Core450)
    }

    fn fragment() -> ShaderSource {
        ShaderSource::triangle_fragment(GlslVersion::Core450)
    }

    #[test]
    fn valid_pair_links_without_diagnostics() {
        let mut ctx = SoftContext::new(4, 4);
        let vs = compile_shader(&mut ctx, &vertex()).unwrap();
        let fs = compile_shader(&mut ctx, &fragment()).unwrap();
        let program = link_program(&mut ctx, &vs, &fs).unwrap();

        assert!(ctx.program_link_status(program.handle()));
        assert!(ctx.program_info_log(program.handle()).is_empty());
        assert_eq!(ctx.attrib_location(program.handle(), "a_position"), Some(0));
    }

    #[test]
    fn syntax_error_reports_and_releases_shader() {
        let mut ctx = SoftContext::new(4, 4);
        let broken = ShaderSource::versioned(
            ShaderStage::Vertex,
            GlslVersion::Core450,
            BROKEN_VERTEX_SRC,
        );

        let err = compile_shader(&mut ctx, &broken).unwrap_err();
        match err {
            Error::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.trim().is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.live_shaders(), 0);

        // The context is still usable afterwards.
        compile_shader(&mut ctx, &vertex()).unwrap();
        assert_eq!(ctx.live_shaders(), 1);
    }

    #[test]
    fn fragment_syntax_error_reports_and_releases_shader() {
        let mut ctx = SoftContext::new(4, 4);
        let vs = compile_shader(&mut ctx, &vertex()).unwrap();
        let broken = ShaderSource::versioned(
            ShaderStage::Fragment,
            GlslVersion::Core450,
            BROKEN_FRAGMENT_SRC,
        );

        match compile_shader(&mut ctx, &broken).unwrap_err() {
            Error::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.trim().is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        // Only the vertex shader is left.
        assert_eq!(ctx.live_shaders(), 1);

        let fs = compile_shader(&mut ctx, &fragment()).unwrap();
        link_program(&mut ctx, &vs, &fs).unwrap();
    }

    #[test]
    fn swapped_stages_do_not_link() {
        let mut ctx = SoftContext::new(4, 4);
        let vs = compile_shader(&mut ctx, &vertex()).unwrap();
        let fs = compile_shader(&mut ctx, &fragment()).unwrap();

        let err = link_program(&mut ctx, &fs, &vs).unwrap_err();
        assert!(matches!(err, Error::ProgramLink { .. }));
        assert_eq!(ctx.live_programs(), 0);
    }

    #[test]
    fn unmatched_fragment_input_fails_link_and_releases_program() {
        let mut ctx = SoftContext::new(4, 4);
        let vs = compile_shader(&mut ctx, &vertex()).unwrap();
        let colored = ShaderSource::versioned(
            ShaderStage::Fragment,
            GlslVersion::Core450,
            COLORED_FRAGMENT_SRC,
        );
        let fs = compile_shader(&mut ctx, &colored).unwrap();

        match link_program(&mut ctx, &vs, &fs).unwrap_err() {
            Error::ProgramLink { log } => assert!(log.contains("v_color"), "{log}"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.live_programs(), 0);
    }

    #[test]
    fn preamble_precedes_body() {
        let source = ShaderSource::triangle_vertex(GlslVersion::Es300);
        assert!(source.text().starts_with("#version 300 es\n"));
        assert!(source.text().contains("a_position"));
        assert_eq!(source.stage(), ShaderStage::Vertex);
    }
}
