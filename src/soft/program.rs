//! Linking two compiled stages and running them per vertex and per fragment.

use std::sync::Arc;

use naga::{Binding, BuiltIn, Expression, Function, Handle, Module, Statement, Type, TypeInner};

use super::compile::CompiledStage;
use super::exec::{ExecError, Invocation, Value};
use super::raster::Fragment;
use crate::types::Color;

/// A vertex shader input, as the draw call has to supply it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum VertexInput {
    Attribute { location: u32, ty: Handle<Type> },
    /// Built-ins read as zero.
    Zero(Handle<Type>),
}

#[derive(Clone, Debug, PartialEq)]
enum FragmentInput {
    Varying { location: u32 },
    Zero(Handle<Type>),
}

/// One value in a stage's return type that carries a binding.
#[derive(Clone, Debug)]
struct Output {
    binding: Binding,
    /// Struct member index, or `None` when the whole result is bound.
    member: Option<usize>,
    name: Option<String>,
    ty: Handle<Type>,
}

impl Output {
    fn location(&self) -> Option<u32> {
        match self.binding {
            Binding::Location { location, .. } => Some(location),
            Binding::BuiltIn(_) => None,
        }
    }

    fn extract(&self, result: &Value) -> Result<Value, ExecError> {
        match (self.member, result) {
            (None, value) => Ok(value.clone()),
            (Some(index), Value::Composite(members)) => members
                .get(index)
                .cloned()
                .ok_or(ExecError::Unavailable("stage output")),
            (Some(_), _) => Err(ExecError::TypeMismatch("stage outputs")),
        }
    }
}

/// An active vertex input, for attribute lookups by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ActiveAttribute {
    pub name: String,
    pub location: u32,
}

/// Vertex shader results for one vertex.
#[derive(Clone, Debug)]
pub(crate) struct ShadedVertex {
    pub position: [f32; 4],
    varyings: Vec<(u32, Value)>,
}

impl ShadedVertex {
    fn varying(&self, location: u32) -> Option<&Value> {
        self.varyings
            .iter()
            .find_map(|(l, value)| (*l == location).then_some(value))
    }
}

/// Two stages whose interfaces have been matched up.
#[derive(Debug)]
pub(crate) struct LinkedProgram {
    vertex: Arc<CompiledStage>,
    fragment: Arc<CompiledStage>,
    attributes: Vec<ActiveAttribute>,
    vertex_inputs: Vec<VertexInput>,
    vertex_outputs: Vec<Output>,
    fragment_inputs: Vec<FragmentInput>,
    color_output: Option<Output>,
}

/// Name of entry point argument `index`.
///
/// GLSL inputs are globals; when the argument itself is unnamed, fall back
/// to the global it gets stored into.
fn argument_name(module: &Module, function: &Function, index: usize) -> Option<String> {
    if let Some(name) = function.arguments.get(index)?.name.clone() {
        return Some(name);
    }
    function.body.iter().find_map(|statement| match *statement {
        Statement::Store { pointer, value } => {
            match (&function.expressions[pointer], &function.expressions[value]) {
                (Expression::GlobalVariable(var), Expression::FunctionArgument(arg))
                    if *arg as usize == index =>
                {
                    module.global_variables[*var].name.clone()
                }
                _ => None,
            }
        }
        _ => None,
    })
}

fn outputs(module: &Module, function: &Function) -> Vec<Output> {
    let Some(result) = &function.result else {
        return Vec::new();
    };
    if let Some(binding) = &result.binding {
        return vec![Output {
            binding: binding.clone(),
            member: None,
            name: None,
            ty: result.ty,
        }];
    }
    match module.types[result.ty].inner {
        TypeInner::Struct { ref members, .. } => members
            .iter()
            .enumerate()
            .filter_map(|(index, member)| {
                member.binding.clone().map(|binding| Output {
                    binding,
                    member: Some(index),
                    name: member.name.clone(),
                    ty: member.ty,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_position(binding: &Binding) -> bool {
    matches!(binding, Binding::BuiltIn(BuiltIn::Position { .. }))
}

/// Match the vertex stage's outputs against the fragment stage's inputs.
///
/// The error string is the link info log: one line per problem.
pub(crate) fn link(
    vertex: Arc<CompiledStage>,
    fragment: Arc<CompiledStage>,
) -> Result<LinkedProgram, String> {
    let mut problems = Vec::new();
    if vertex.entry_point().stage != naga::ShaderStage::Vertex {
        problems.push("no vertex shader attached".to_owned());
    }
    if fragment.entry_point().stage != naga::ShaderStage::Fragment {
        problems.push("no fragment shader attached".to_owned());
    }
    if !problems.is_empty() {
        return Err(problems.join("\n"));
    }

    let vs_function = &vertex.entry_point().function;
    let fs_function = &fragment.entry_point().function;

    let vertex_outputs = outputs(&vertex.module, vs_function);
    if !vertex_outputs.iter().any(|o| is_position(&o.binding)) {
        log::warn!("vertex shader never writes gl_Position");
    }

    let mut attributes = Vec::new();
    let vertex_inputs = vs_function
        .arguments
        .iter()
        .enumerate()
        .map(|(index, arg)| match arg.binding {
            Some(Binding::Location { location, .. }) => {
                if let Some(name) = argument_name(&vertex.module, vs_function, index) {
                    attributes.push(ActiveAttribute { name, location });
                }
                VertexInput::Attribute {
                    location,
                    ty: arg.ty,
                }
            }
            _ => VertexInput::Zero(arg.ty),
        })
        .collect();

    let fragment_inputs = fs_function
        .arguments
        .iter()
        .enumerate()
        .map(|(index, arg)| match arg.binding {
            Some(Binding::Location { location, .. }) => {
                let name = argument_name(&fragment.module, fs_function, index)
                    .unwrap_or_else(|| format!("#{index}"));
                let written = vertex_outputs
                    .iter()
                    .find(|o| o.location() == Some(location));
                match written {
                    None => problems.push(format!(
                        "fragment input `{name}` at location {location} \
                         is not written by the vertex shader"
                    )),
                    Some(output)
                        if vertex.module.types[output.ty].inner
                            != fragment.module.types[arg.ty].inner =>
                    {
                        problems.push(format!(
                            "fragment input `{name}` at location {location} \
                             does not match the type of vertex output `{}`",
                            output.name.as_deref().unwrap_or("?")
                        ));
                    }
                    Some(_) => {}
                }
                FragmentInput::Varying { location }
            }
            _ => FragmentInput::Zero(arg.ty),
        })
        .collect();

    if !problems.is_empty() {
        return Err(problems.join("\n"));
    }

    let color_output = outputs(&fragment.module, fs_function)
        .into_iter()
        .find(|o| o.location() == Some(0));

    Ok(LinkedProgram {
        vertex,
        fragment,
        attributes,
        vertex_inputs,
        vertex_outputs,
        fragment_inputs,
        color_output,
    })
}

impl LinkedProgram {
    /// Location of the active vertex input called `name`.
    pub(crate) fn attrib_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.location)
    }

    /// Inputs the vertex stage expects, in argument order.
    pub(crate) fn vertex_inputs(&self) -> &[VertexInput] {
        &self.vertex_inputs
    }

    pub(crate) fn vertex_type(&self, ty: Handle<Type>) -> &TypeInner {
        &self.vertex.module.types[ty].inner
    }

    pub(crate) fn vertex_zero(&self, ty: Handle<Type>) -> Result<Value, ExecError> {
        Value::zero(&self.vertex.module, ty)
    }

    /// Run the vertex stage once.
    pub(crate) fn run_vertex(&self, inputs: Vec<Value>) -> Result<ShadedVertex, ExecError> {
        let module = &self.vertex.module;
        let result = Invocation::new(module)?
            .run(&self.vertex.entry_point().function, inputs)?
            .ok_or(ExecError::Unavailable("vertex shader output"))?;

        let mut position = None;
        let mut varyings = Vec::new();
        for output in &self.vertex_outputs {
            let value = output.extract(&result)?;
            if is_position(&output.binding) {
                position = Some(value.to_vec4()?);
            } else if let Some(location) = output.location() {
                varyings.push((location, value));
            }
        }
        Ok(ShadedVertex {
            position: position.ok_or(ExecError::Unavailable("gl_Position"))?,
            varyings,
        })
    }

    /// Run the fragment stage for one covered pixel of the triangle made of
    /// `vertices`. Returns `None` when the program writes no color.
    pub(crate) fn run_fragment(
        &self,
        vertices: [&ShadedVertex; 3],
        fragment: &Fragment,
    ) -> Result<Option<Color>, ExecError> {
        let module = &self.fragment.module;
        let inputs = self
            .fragment_inputs
            .iter()
            .map(|input| match *input {
                FragmentInput::Varying { location } => {
                    match [0, 1, 2].map(|i| vertices[i].varying(location)) {
                        [Some(a), Some(b), Some(c)] => {
                            Ok(Value::interpolate([a, b, c], fragment.weights))
                        }
                        _ => Err(ExecError::Unavailable("varying")),
                    }
                }
                FragmentInput::Zero(ty) => Value::zero(module, ty),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let result = Invocation::new(module)?.run(&self.fragment.entry_point().function, inputs)?;
        match (&self.color_output, result) {
            (Some(output), Some(result)) => Ok(Some(output.extract(&result)?.to_vec4()?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::soft::compile::compile;
    use crate::types::ShaderStage;

    const GRADIENT_VS: &str = r"#version 450 core
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec3 a_color;
layout(location = 0) out vec3 v_color;

void main() {
    v_color = a_color;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

    const GRADIENT_FS: &str = r"#version 450 core
layout(location = 0) in vec3 v_color;
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(v_color, 1.0);
}
";

    fn linked(vs: &str, fs: &str) -> LinkedProgram {
        link(
            Arc::new(compile(ShaderStage::Vertex, vs).unwrap()),
            Arc::new(compile(ShaderStage::Fragment, fs).unwrap()),
        )
        .unwrap()
    }

    fn vec_of(xs: &[f32]) -> Value {
        Value::Composite(xs.iter().copied().map(Value::Float).collect())
    }

    fn fragment_with(weights: [f32; 3]) -> Fragment {
        Fragment { x: 0, y: 0, weights }
    }

    #[test]
    fn attributes_are_found_by_name() {
        let program = linked(GRADIENT_VS, GRADIENT_FS);
        assert_eq!(program.attrib_location("a_position"), Some(0));
        assert_eq!(program.attrib_location("a_color"), Some(1));
        assert_eq!(program.attrib_location("v_color"), None);
    }

    #[test]
    fn vertex_stage_forwards_position_and_varyings() {
        let program = linked(GRADIENT_VS, GRADIENT_FS);
        let inputs = program
            .vertex_inputs()
            .iter()
            .map(|input| match *input {
                VertexInput::Attribute { location: 0, .. } => vec_of(&[0.25, -0.5]),
                VertexInput::Attribute { .. } => vec_of(&[1.0, 0.0, 0.0]),
                VertexInput::Zero(_) => panic!("unexpected built-in input"),
            })
            .collect();

        let vertex = program.run_vertex(inputs).unwrap();

        assert_eq!(vertex.position, [0.25, -0.5, 0.0, 1.0]);
        assert_eq!(vertex.varying(0), Some(&vec_of(&[1.0, 0.0, 0.0])));
    }

    #[test]
    fn fragment_stage_interpolates_varyings() {
        let program = linked(GRADIENT_VS, GRADIENT_FS);
        let corner = |color: &[f32]| ShadedVertex {
            position: [0.0, 0.0, 0.0, 1.0],
            varyings: vec![(0, vec_of(color))],
        };
        let r = corner(&[1.0, 0.0, 0.0]);
        let g = corner(&[0.0, 1.0, 0.0]);
        let b = corner(&[0.0, 0.0, 1.0]);

        let color = program
            .run_fragment([&r, &g, &b], &fragment_with([0.5, 0.25, 0.25]))
            .unwrap();

        assert_eq!(color, Some([0.5, 0.25, 0.25, 1.0]));
    }

    #[test]
    fn fragment_without_color_output_writes_nothing() {
        let silent = "#version 450 core\nvoid main() {}\n";
        let program = linked(GRADIENT_VS, silent);
        let corner = ShadedVertex {
            position: [0.0, 0.0, 0.0, 1.0],
            varyings: Vec::new(),
        };

        let weights = fragment_with([1.0, 0.0, 0.0]);
        let color = program.run_fragment([&corner, &corner, &corner], &weights);

        assert_eq!(color.unwrap(), None);
    }

    #[test]
    fn mismatched_varying_type_fails_link() {
        let fs = GRADIENT_FS.replace("in vec3 v_color", "in vec2 v_color").replace(
            "vec4(v_color, 1.0)",
            "vec4(v_color, 0.0, 1.0)",
        );
        let log = link(
            Arc::new(compile(ShaderStage::Vertex, GRADIENT_VS).unwrap()),
            Arc::new(compile(ShaderStage::Fragment, &fs).unwrap()),
        )
        .unwrap_err();
        assert!(log.contains("v_color"), "{log}");
        assert!(log.contains("type"), "{log}");
    }
}
