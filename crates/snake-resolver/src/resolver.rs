use std::fmt;
use std::sync::Arc;

use crate::error::InvokeError;
use crate::handler::{Handler, HandlerFn};
use crate::middleware::{Middleware, Next};
use crate::type_key::TypeKey;
use crate::value::{Args, Values};

/// Marker output that asks for a resolver to run at most once per execution.
///
/// Declaring it never makes `Shared` itself resolvable; it only affects how
/// the resolver is classified.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shared;

/// Where the value for a declared input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
  /// Produced by another resolver in the registry.
  Graph,
  /// Supplied by the caller at invocation time (e.g. a parsed flag).
  Argument,
}

/// A declared input of a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
  pub key: TypeKey,
  pub source: InputSource,
}

impl Input {
  pub fn graph(key: TypeKey) -> Self {
    Self {
      key,
      source: InputSource::Graph,
    }
  }

  pub fn argument(key: TypeKey) -> Self {
    Self {
      key,
      source: InputSource::Argument,
    }
  }
}

/// A producer function with its declared inputs, outputs, and middlewares.
#[derive(Clone)]
pub struct Resolver {
  name: String,
  inputs: Vec<Input>,
  outputs: Vec<TypeKey>,
  middlewares: Vec<Arc<dyn Middleware>>,
  handler: Arc<HandlerFn>,
  placeholder: bool,
}

impl Resolver {
  /// Start building a resolver with an untyped handler.
  pub fn builder(name: impl Into<String>) -> ResolverBuilder {
    ResolverBuilder {
      name: name.into(),
      inputs: Vec::new(),
      outputs: Vec::new(),
      middlewares: Vec::new(),
      placeholder: false,
    }
  }

  /// Create a resolver from a typed function.
  ///
  /// Each `Arc<T>` parameter becomes a graph input; the `Ok` type becomes the
  /// single output unless it is `()`, in which case the resolver is a leaf
  /// command with no outputs.
  pub fn from_fn<P, H: Handler<P>>(name: impl Into<String>, handler: H) -> Self {
    let output = TypeKey::of::<H::Output>();
    let produces = !output.is::<()>();
    let outputs = if produces { vec![output] } else { Vec::new() };

    Self {
      name: name.into(),
      inputs: H::inputs().into_iter().map(Input::graph).collect(),
      outputs,
      middlewares: Vec::new(),
      handler: Arc::new(move |args: &Args<'_>| {
        let value = handler.call(args)?;
        let mut values = Values::new();
        if produces {
          values.insert(value);
        }
        Ok(values)
      }),
      placeholder: false,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn inputs(&self) -> &[Input] {
    &self.inputs
  }

  /// Inputs that must be produced by other resolvers.
  pub fn graph_inputs(&self) -> impl Iterator<Item = TypeKey> + '_ {
    self
      .inputs
      .iter()
      .filter(|input| input.source == InputSource::Graph)
      .map(|input| input.key)
  }

  /// Inputs the caller must supply at invocation time.
  pub fn arguments(&self) -> impl Iterator<Item = TypeKey> + '_ {
    self
      .inputs
      .iter()
      .filter(|input| input.source == InputSource::Argument)
      .map(|input| input.key)
  }

  /// Every declared output, including the [`Shared`] marker.
  pub fn outputs(&self) -> &[TypeKey] {
    &self.outputs
  }

  /// Declared outputs that other resolvers can consume.
  pub fn produced(&self) -> impl Iterator<Item = TypeKey> + '_ {
    self.outputs.iter().copied().filter(|key| !key.is::<Shared>())
  }

  pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
    &self.middlewares
  }

  /// A resolver with no outputs is a leaf command, never a dependency target.
  pub fn is_command(&self) -> bool {
    self.outputs.is_empty()
  }

  /// Whether this resolver is a built-in stand-in that real registrations may shadow.
  pub fn is_placeholder(&self) -> bool {
    self.placeholder
  }

  /// Declare the [`Shared`] marker output.
  pub fn shared(mut self) -> Self {
    if !self.outputs.iter().any(|key| key.is::<Shared>()) {
      self.outputs.push(TypeKey::of::<Shared>());
    }
    self
  }

  /// Append a middleware; the first one added is the outermost wrapper.
  pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
    self.middlewares.push(Arc::new(middleware));
    self
  }

  /// Mark the input of type `T` as caller-supplied, declaring it if needed.
  pub fn with_argument<T: std::any::Any + Send + Sync>(mut self) -> Self {
    let key = TypeKey::of::<T>();
    match self.inputs.iter_mut().find(|input| input.key == key) {
      Some(input) => input.source = InputSource::Argument,
      None => self.inputs.push(Input::argument(key)),
    }
    self
  }

  pub fn as_placeholder(mut self) -> Self {
    self.placeholder = true;
    self
  }

  pub fn renamed(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Run the middleware chain and handler against `values`.
  ///
  /// `values` must hold every declared input plus every middleware input.
  /// Fails if the handler returns without one of the consumable outputs.
  pub fn invoke(&self, values: &Values) -> Result<Values, InvokeError> {
    let args = Args::new(&self.name, values);
    let outputs = Next::new(&self.middlewares, self.handler.as_ref(), args).run()?;

    if let Some(missing) = self.produced().find(|key| !outputs.contains(key)) {
      return Err(InvokeError::MissingOutput {
        resolver: self.name.clone(),
        type_name: missing.name(),
      });
    }

    Ok(outputs)
  }
}

impl fmt::Debug for Resolver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Resolver")
      .field("name", &self.name)
      .field("inputs", &self.inputs)
      .field("outputs", &self.outputs)
      .field("middlewares", &self.middlewares.len())
      .field("placeholder", &self.placeholder)
      .finish()
  }
}

/// Builder for resolvers whose handler works on [`Args`] directly.
///
/// Needed for producers with several outputs, which [`Resolver::from_fn`]
/// cannot express.
pub struct ResolverBuilder {
  name: String,
  inputs: Vec<Input>,
  outputs: Vec<TypeKey>,
  middlewares: Vec<Arc<dyn Middleware>>,
  placeholder: bool,
}

impl ResolverBuilder {
  pub fn input<T: std::any::Any + Send + Sync>(mut self) -> Self {
    self.inputs.push(Input::graph(TypeKey::of::<T>()));
    self
  }

  pub fn argument<T: std::any::Any + Send + Sync>(mut self) -> Self {
    self.inputs.push(Input::argument(TypeKey::of::<T>()));
    self
  }

  pub fn output<T: std::any::Any + Send + Sync>(mut self) -> Self {
    self.outputs.push(TypeKey::of::<T>());
    self
  }

  /// Declare an output by key, for producers whose type is only known at runtime.
  pub fn output_key(mut self, key: TypeKey) -> Self {
    self.outputs.push(key);
    self
  }

  pub fn shared(self) -> Self {
    self.output::<Shared>()
  }

  pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
    self.middlewares.push(Arc::new(middleware));
    self
  }

  pub fn placeholder(mut self) -> Self {
    self.placeholder = true;
    self
  }

  pub fn handler<F>(self, handler: F) -> Resolver
  where
    F: Fn(&Args<'_>) -> Result<Values, InvokeError> + Send + Sync + 'static,
  {
    Resolver {
      name: self.name,
      inputs: self.inputs,
      outputs: self.outputs,
      middlewares: self.middlewares,
      handler: Arc::new(handler),
      placeholder: self.placeholder,
    }
  }
}
