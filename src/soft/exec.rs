//! A small interpreter for naga IR.
//!
//! It covers the code naga's GLSL front end generates for pass-through
//! shaders: loads and stores, constructors, swizzles and conversions,
//! constants, and the call from the entry point wrapper into `main`.
//! Anything else is reported as unsupported.

use naga::{
    ArraySize, Block, Expression, Function, GlobalVariable, Handle, Literal, LocalVariable, Module,
    ScalarKind, Statement, Type, TypeInner,
};
use thiserror::Error;

/// Deepest call chain an invocation may build.
const MAX_CALL_DEPTH: usize = 64;

/// Value of an attribute component the buffer does not provide.
pub(crate) const DEFAULT_ATTRIBUTE: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Error)]
pub(crate) enum ExecError {
    #[error("unsupported {0}")]
    Unsupported(String),
    #[error("type mismatch in {0}")]
    TypeMismatch(&'static str),
    #[error("{0} is not available")]
    Unavailable(&'static str),
}

/// Where a pointer value points.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Root {
    Global(Handle<GlobalVariable>),
    Local {
        depth: usize,
        var: Handle<LocalVariable>,
    },
}

/// A variable plus a path of component indices into it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Pointer {
    root: Root,
    path: Vec<usize>,
}

/// A runtime value. Vectors, arrays and structs are all composites.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Value {
    Float(f32),
    Int(i32),
    Uint(u32),
    Bool(bool),
    Composite(Vec<Value>),
    Pointer(Pointer),
}

impl Value {
    pub(crate) fn zero(module: &Module, ty: Handle<Type>) -> Result<Self, ExecError> {
        Ok(match module.types[ty].inner {
            TypeInner::Scalar(scalar) => Self::zero_scalar(scalar.kind),
            TypeInner::Vector { size, scalar } => {
                Self::Composite(vec![Self::zero_scalar(scalar.kind); size as usize])
            }
            TypeInner::Array {
                base,
                size: ArraySize::Constant(len),
                ..
            } => Self::Composite(vec![Self::zero(module, base)?; len.get() as usize]),
            TypeInner::Struct { ref members, .. } => Self::Composite(
                members
                    .iter()
                    .map(|member| Self::zero(module, member.ty))
                    .collect::<Result<_, _>>()?,
            ),
            ref other => return Err(ExecError::Unsupported(format!("type {other:?}"))),
        })
    }

    fn zero_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Float | ScalarKind::AbstractFloat => Self::Float(0.0),
            ScalarKind::Sint | ScalarKind::AbstractInt => Self::Int(0),
            ScalarKind::Uint => Self::Uint(0),
            ScalarKind::Bool => Self::Bool(false),
        }
    }

    /// Build a float stage input of type `inner` from four fetched components.
    pub(crate) fn from_components(
        inner: &TypeInner,
        components: [f32; 4],
    ) -> Result<Self, ExecError> {
        match *inner {
            TypeInner::Scalar(scalar) if scalar.kind == ScalarKind::Float => {
                Ok(Self::Float(components[0]))
            }
            TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float => {
                let floats = components[..size as usize].iter().copied();
                Ok(Self::Composite(floats.map(Self::Float).collect()))
            }
            ref other => Err(ExecError::Unsupported(format!("attribute type {other:?}"))),
        }
    }

    /// Blend three per-vertex values with barycentric `weights`.
    ///
    /// Only floats are interpolated; anything else takes the value of the
    /// last (provoking) vertex.
    pub(crate) fn interpolate(values: [&Self; 3], weights: [f32; 3]) -> Self {
        match values {
            [Self::Float(a), Self::Float(b), Self::Float(c)] => {
                Self::Float(a * weights[0] + b * weights[1] + c * weights[2])
            }
            [Self::Composite(a), Self::Composite(b), Self::Composite(c)]
                if a.len() == b.len() && b.len() == c.len() =>
            {
                Self::Composite(
                    a.iter()
                        .zip(b)
                        .zip(c)
                        .map(|((a, b), c)| Self::interpolate([a, b, c], weights))
                        .collect(),
                )
            }
            [_, _, last] => last.clone(),
        }
    }

    /// The value as a `vec4`, padding missing components with `(0, 0, 0, 1)`.
    pub(crate) fn to_vec4(&self) -> Result<[f32; 4], ExecError> {
        let floats = match self {
            Self::Float(x) => vec![*x],
            Self::Composite(items) => items
                .iter()
                .map(|item| match item {
                    Self::Float(x) => Ok(*x),
                    _ => Err(ExecError::TypeMismatch("vec4 component")),
                })
                .collect::<Result<_, _>>()?,
            _ => return Err(ExecError::TypeMismatch("vec4")),
        };
        let mut out = DEFAULT_ATTRIBUTE;
        for (slot, value) in out.iter_mut().zip(floats) {
            *slot = value;
        }
        Ok(out)
    }

    fn components(&self) -> Result<&[Self], ExecError> {
        match self {
            Self::Composite(items) => Ok(items),
            _ => Err(ExecError::TypeMismatch("component access")),
        }
    }

    fn into_pointer(self) -> Result<Pointer, ExecError> {
        match self {
            Self::Pointer(pointer) => Ok(pointer),
            _ => Err(ExecError::TypeMismatch("pointer")),
        }
    }

    fn access(self, index: usize) -> Result<Self, ExecError> {
        match self {
            Self::Pointer(mut pointer) => {
                pointer.path.push(index);
                Ok(Self::Pointer(pointer))
            }
            Self::Composite(items) => items
                .into_iter()
                .nth(index)
                .ok_or(ExecError::Unavailable("component index")),
            _ => Err(ExecError::TypeMismatch("access")),
        }
    }
}

enum Flow {
    Next,
    Return(Option<Value>),
}

struct Frame<'m> {
    function: &'m Function,
    args: Vec<Value>,
    cache: Vec<Option<Value>>,
    depth: usize,
}

/// State of one shader invocation: private globals and the call stack.
pub(crate) struct Invocation<'m> {
    module: &'m Module,
    globals: Vec<Value>,
    frames: Vec<Vec<Value>>,
}

impl<'m> Invocation<'m> {
    pub(crate) fn new(module: &'m Module) -> Result<Self, ExecError> {
        let globals = module
            .global_variables
            .iter()
            .map(|(_, var)| match var.init {
                Some(init) => const_value(module, init),
                None => Value::zero(module, var.ty),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            module,
            globals,
            frames: Vec::new(),
        })
    }

    /// Run `function` (normally an entry point) with `args` and return its
    /// result.
    pub(crate) fn run(
        &mut self,
        function: &'m Function,
        args: Vec<Value>,
    ) -> Result<Option<Value>, ExecError> {
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(ExecError::Unsupported(format!(
                "call depth beyond {MAX_CALL_DEPTH}"
            )));
        }
        let locals = function
            .local_variables
            .iter()
            .map(|(_, var)| Value::zero(self.module, var.ty))
            .collect::<Result<_, _>>()?;
        let depth = self.frames.len();
        self.frames.push(locals);

        let mut frame = Frame {
            function,
            args,
            cache: vec![None; function.expressions.len()],
            depth,
        };
        let flow = self.enter(&mut frame);
        self.frames.pop();
        Ok(match flow? {
            Flow::Return(value) => value,
            Flow::Next => None,
        })
    }

    fn enter(&mut self, frame: &mut Frame<'m>) -> Result<Flow, ExecError> {
        let function = frame.function;
        for (handle, var) in function.local_variables.iter() {
            if let Some(init) = var.init {
                let value = self.eval(frame, init)?;
                self.frames[frame.depth][handle.index()] = value;
            }
        }
        self.exec_block(frame, &function.body)
    }

    fn exec_block(&mut self, frame: &mut Frame<'m>, block: &'m Block) -> Result<Flow, ExecError> {
        for statement in block.iter() {
            if let Flow::Return(value) = self.exec(frame, statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn exec(&mut self, frame: &mut Frame<'m>, statement: &'m Statement) -> Result<Flow, ExecError> {
        let module = self.module;
        match *statement {
            Statement::Emit(ref range) => {
                for handle in range.clone() {
                    let value = self.eval_uncached(frame, handle)?;
                    frame.cache[handle.index()] = Some(value);
                }
            }
            Statement::Block(ref block) => return self.exec_block(frame, block),
            Statement::Store { pointer, value } => {
                let pointer = self.eval(frame, pointer)?.into_pointer()?;
                let value = self.eval(frame, value)?;
                self.store(&pointer, value)?;
            }
            Statement::Call {
                function,
                ref arguments,
                result,
            } => {
                let args = arguments
                    .iter()
                    .map(|&arg| self.eval(frame, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let returned = self.run(&module.functions[function], args)?;
                if let (Some(result), Some(value)) = (result, returned) {
                    frame.cache[result.index()] = Some(value);
                }
            }
            Statement::Return { value } => {
                let value = value.map(|value| self.eval(frame, value)).transpose()?;
                return Ok(Flow::Return(value));
            }
            ref other => return Err(ExecError::Unsupported(format!("statement {other:?}"))),
        }
        Ok(Flow::Next)
    }

    fn eval(
        &mut self,
        frame: &mut Frame<'m>,
        handle: Handle<Expression>,
    ) -> Result<Value, ExecError> {
        if let Some(value) = &frame.cache[handle.index()] {
            return Ok(value.clone());
        }
        let value = self.eval_uncached(frame, handle)?;
        frame.cache[handle.index()] = Some(value.clone());
        Ok(value)
    }

    fn eval_uncached(
        &mut self,
        frame: &mut Frame<'m>,
        handle: Handle<Expression>,
    ) -> Result<Value, ExecError> {
        let module = self.module;
        let function = frame.function;
        Ok(match function.expressions[handle] {
            Expression::Literal(literal) => literal_value(literal)?,
            Expression::Constant(constant) => {
                const_value(module, module.constants[constant].init)?
            }
            Expression::ZeroValue(ty) => Value::zero(module, ty)?,
            Expression::Compose { ty, ref components } => {
                let values = components
                    .iter()
                    .map(|&component| self.eval(frame, component))
                    .collect::<Result<Vec<_>, _>>()?;
                compose(module, ty, values)
            }
            Expression::Splat { size, value } => {
                Value::Composite(vec![self.eval(frame, value)?; size as usize])
            }
            Expression::Swizzle {
                size,
                vector,
                pattern,
            } => {
                let vector = self.eval(frame, vector)?;
                let components = vector.components()?;
                Value::Composite(
                    pattern[..size as usize]
                        .iter()
                        .map(|&c| {
                            components
                                .get(c as usize)
                                .cloned()
                                .ok_or(ExecError::Unavailable("swizzle component"))
                        })
                        .collect::<Result<_, _>>()?,
                )
            }
            Expression::FunctionArgument(index) => frame
                .args
                .get(index as usize)
                .cloned()
                .ok_or(ExecError::Unavailable("function argument"))?,
            Expression::GlobalVariable(var) => Value::Pointer(Pointer {
                root: Root::Global(var),
                path: Vec::new(),
            }),
            Expression::LocalVariable(var) => Value::Pointer(Pointer {
                root: Root::Local {
                    depth: frame.depth,
                    var,
                },
                path: Vec::new(),
            }),
            Expression::Load { pointer } => {
                let pointer = self.eval(frame, pointer)?.into_pointer()?;
                self.load(&pointer)?
            }
            Expression::AccessIndex { base, index } => {
                self.eval(frame, base)?.access(index as usize)?
            }
            Expression::As {
                expr,
                kind,
                convert: Some(_),
            } => convert(self.eval(frame, expr)?, kind)?,
            Expression::CallResult(_) => return Err(ExecError::Unavailable("call result")),
            ref other => return Err(ExecError::Unsupported(format!("expression {other:?}"))),
        })
    }

    fn load(&self, pointer: &Pointer) -> Result<Value, ExecError> {
        let mut value = match pointer.root {
            Root::Global(var) => self.globals.get(var.index()),
            Root::Local { depth, var } => self.frames.get(depth).and_then(|f| f.get(var.index())),
        }
        .ok_or(ExecError::Unavailable("variable"))?;
        for &index in &pointer.path {
            value = value
                .components()?
                .get(index)
                .ok_or(ExecError::Unavailable("component index"))?;
        }
        Ok(value.clone())
    }

    fn store(&mut self, pointer: &Pointer, new: Value) -> Result<(), ExecError> {
        let mut slot = match pointer.root {
            Root::Global(var) => self.globals.get_mut(var.index()),
            Root::Local { depth, var } => self
                .frames
                .get_mut(depth)
                .and_then(|f| f.get_mut(var.index())),
        }
        .ok_or(ExecError::Unavailable("variable"))?;
        for &index in &pointer.path {
            slot = match slot {
                Value::Composite(items) => items
                    .get_mut(index)
                    .ok_or(ExecError::Unavailable("component index"))?,
                _ => return Err(ExecError::TypeMismatch("store")),
            };
        }
        *slot = new;
        Ok(())
    }
}

/// Evaluate a constant expression from the module's global arena.
fn const_value(module: &Module, handle: Handle<Expression>) -> Result<Value, ExecError> {
    Ok(match module.global_expressions[handle] {
        Expression::Literal(literal) => literal_value(literal)?,
        Expression::Constant(constant) => const_value(module, module.constants[constant].init)?,
        Expression::ZeroValue(ty) => Value::zero(module, ty)?,
        Expression::Compose { ty, ref components } => compose(
            module,
            ty,
            components
                .iter()
                .map(|&component| const_value(module, component))
                .collect::<Result<_, _>>()?,
        ),
        Expression::Splat { size, value } => {
            Value::Composite(vec![const_value(module, value)?; size as usize])
        }
        ref other => return Err(ExecError::Unsupported(format!("constant {other:?}"))),
    })
}

/// Vector constructors may take vectors as arguments; flatten them.
fn compose(module: &Module, ty: Handle<Type>, values: Vec<Value>) -> Value {
    match module.types[ty].inner {
        TypeInner::Vector { .. } => Value::Composite(
            values
                .into_iter()
                .flat_map(|value| match value {
                    Value::Composite(items) => items,
                    scalar => vec![scalar],
                })
                .collect(),
        ),
        _ => Value::Composite(values),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn literal_value(literal: Literal) -> Result<Value, ExecError> {
    Ok(match literal {
        Literal::F32(x) => Value::Float(x),
        Literal::F64(x) | Literal::AbstractFloat(x) => Value::Float(x as f32),
        Literal::I32(x) => Value::Int(x),
        Literal::U32(x) => Value::Uint(x),
        Literal::AbstractInt(x) => Value::Int(x as i32),
        Literal::Bool(b) => Value::Bool(b),
        other => return Err(ExecError::Unsupported(format!("literal {other:?}"))),
    })
}

/// Numeric conversion, as done by constructors such as `float(i)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn convert(value: Value, kind: ScalarKind) -> Result<Value, ExecError> {
    Ok(match (kind, value) {
        (_, Value::Composite(items)) => Value::Composite(
            items
                .into_iter()
                .map(|item| convert(item, kind))
                .collect::<Result<_, _>>()?,
        ),
        (ScalarKind::Float, Value::Float(x)) => Value::Float(x),
        (ScalarKind::Float, Value::Int(x)) => Value::Float(x as f32),
        (ScalarKind::Float, Value::Uint(x)) => Value::Float(x as f32),
        (ScalarKind::Sint, Value::Float(x)) => Value::Int(x as i32),
        (ScalarKind::Sint, Value::Int(x)) => Value::Int(x),
        (ScalarKind::Sint, Value::Uint(x)) => Value::Int(x as i32),
        (ScalarKind::Uint, Value::Float(x)) => Value::Uint(x as u32),
        (ScalarKind::Uint, Value::Int(x)) => Value::Uint(x as u32),
        (ScalarKind::Uint, Value::Uint(x)) => Value::Uint(x),
        _ => return Err(ExecError::TypeMismatch("conversion")),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vec_of(xs: &[f32]) -> Value {
        Value::Composite(xs.iter().copied().map(Value::Float).collect())
    }

    #[test]
    fn interpolation_blends_floats_and_keeps_provoking_ints() {
        let a = vec_of(&[0.0, 1.0]);
        let b = vec_of(&[1.0, 1.0]);
        let c = vec_of(&[0.0, 0.0]);
        let mid = Value::interpolate([&a, &b, &c], [0.25, 0.5, 0.25]);
        assert_eq!(mid, vec_of(&[0.5, 0.75]));

        let ints = [Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(
            Value::interpolate([&ints[0], &ints[1], &ints[2]], [0.3, 0.3, 0.4]),
            Value::Int(3)
        );
    }

    #[test]
    fn missing_components_take_attribute_defaults() {
        assert_eq!(vec_of(&[0.5, -0.5]).to_vec4().unwrap(), [0.5, -0.5, 0.0, 1.0]);
        assert!(Value::Bool(true).to_vec4().is_err());
    }

    #[test]
    fn vector_constructors_flatten_their_arguments() {
        let mut module = Module::default();
        let vec4 = module.types.insert(
            Type {
                name: None,
                inner: TypeInner::Vector {
                    size: naga::VectorSize::Quad,
                    scalar: naga::Scalar::F32,
                },
            },
            naga::Span::UNDEFINED,
        );
        let value = compose(
            &module,
            vec4,
            vec![vec_of(&[0.25, -0.5]), Value::Float(0.0), Value::Float(1.0)],
        );
        assert_eq!(value, vec_of(&[0.25, -0.5, 0.0, 1.0]));
    }

    #[test]
    fn conversions_truncate_toward_zero() {
        let converted = convert(vec_of(&[2.7, -2.7]), ScalarKind::Sint).unwrap();
        assert_eq!(converted, Value::Composite(vec![Value::Int(2), Value::Int(-2)]));
        assert!(convert(Value::Bool(true), ScalarKind::Float).is_err());
    }

    #[test]
    fn integer_attributes_are_rejected() {
        let inner = TypeInner::Vector {
            size: naga::VectorSize::Bi,
            scalar: naga::Scalar::I32,
        };
        assert!(matches!(
            Value::from_components(&inner, [1.0, 2.0, 0.0, 1.0]),
            Err(ExecError::Unsupported(_))
        ));
    }
}
