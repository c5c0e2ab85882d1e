//! GLSL front end for the headless context: parse and validate with naga.

use std::error::Error as StdError;
use std::fmt::Write as _;

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::types::ShaderStage;

/// A validated single-stage module and the index of its entry point.
#[derive(Debug)]
pub(crate) struct CompiledStage {
    pub module: naga::Module,
    pub entry: usize,
}

impl CompiledStage {
    pub(crate) fn entry_point(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry]
    }
}

pub(crate) fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    }
}

/// Render an error and everything it wraps on one line.
fn describe(error: &dyn StdError) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let _ = write!(out, ": {inner}");
        source = inner.source();
    }
    out
}

/// Parse `source` as a `stage` shader and validate the result.
///
/// The error string is the info log: one line per diagnostic.
pub(crate) fn compile(stage: ShaderStage, source: &str) -> Result<CompiledStage, String> {
    let naga_stage = naga_stage(stage);
    let options = glsl::Options {
        stage: naga_stage,
        defines: Default::default(),
    };

    let module = glsl::Frontend::default()
        .parse(&options, source)
        .map_err(|errors| {
            errors
                .errors
                .iter()
                .map(|error| describe(error))
                .collect::<Vec<_>>()
                .join("\n")
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| describe(&error))?;

    let entry = module
        .entry_points
        .iter()
        .position(|ep| ep.stage == naga_stage)
        .ok_or_else(|| format!("no {stage} entry point"))?;

    Ok(CompiledStage { module, entry })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shaders::{GlslVersion, ShaderSource};

    #[test]
    fn embedded_sources_compile() {
        let vs = ShaderSource::triangle_vertex(GlslVersion::Core450);
        let fs = ShaderSource::triangle_fragment(GlslVersion::Core450);
        compile(vs.stage(), vs.text()).unwrap();
        compile(fs.stage(), fs.text()).unwrap();
    }

    #[test]
    fn entry_point_matches_stage() {
        let vs = ShaderSource::triangle_vertex(GlslVersion::Core450);
        let stage = compile(ShaderStage::Vertex, vs.text()).unwrap();
        assert_eq!(stage.entry_point().stage, naga::ShaderStage::Vertex);
        assert_eq!(stage.entry_point().name, "main");
    }

    #[test]
    fn undeclared_identifier_is_reported() {
        let source = "#version 450 core\nvoid main() { gl_Position = vec4(missing, 0.0, 1.0); }\n";
        let log = compile(ShaderStage::Vertex, source).unwrap_err();
        assert!(!log.is_empty());
    }
}
