use thiserror::Error;

use crate::types::ShaderStage;

/// Everything that can go wrong while building and submitting the triangle.
#[derive(Debug, Error)]
pub enum Error {
    /// Shading-language source failed to compile for a stage.
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile {
        /// Stage the source was compiled for.
        stage: ShaderStage,
        /// Diagnostic text reported by the driver.
        log: String,
    },
    /// Two compiled shaders could not be linked into a program.
    #[error("program failed to link: {log}")]
    ProgramLink {
        /// Diagnostic text reported by the driver.
        log: String,
    },
    /// The driver refused to create an object.
    #[error("could not create {resource}: {reason}")]
    ResourceCreation {
        /// Kind of object, e.g. `"buffer"`.
        resource: &'static str,
        /// Reason reported by the driver.
        reason: String,
    },
    /// The linked program has no active input with this name.
    #[error("attribute `{name}` is not an active input of the program")]
    MissingAttribute {
        /// Name that was looked up.
        name: String,
    },
    /// The context reported an error after the draw was submitted.
    #[error("draw failed: {reason}")]
    Draw {
        /// Error reported by the context.
        reason: String,
    },
    /// Writing the rendered image failed.
    #[error("could not write image: {0}")]
    Image(#[from] image::ImageError),
}
