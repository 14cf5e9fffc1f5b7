use thiserror::Error;

/// Boxed error returned by producer functions and enum callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while invoking a resolver.
#[derive(Debug, Error)]
pub enum InvokeError {
  /// No named resolver with this name exists.
  #[error("unknown command: {0}")]
  UnknownCommand(String),

  /// An input declared as an argument was not supplied by the caller.
  #[error("missing argument {type_name} for resolver '{resolver}'")]
  MissingArgument {
    resolver: String,
    type_name: &'static str,
  },

  /// A declared input was not available when the resolver ran.
  #[error("value {type_name} is not available to resolver '{resolver}'")]
  MissingValue {
    resolver: String,
    type_name: &'static str,
  },

  /// A resolver returned without one of its declared outputs.
  #[error("resolver '{resolver}' did not produce declared output {type_name}")]
  MissingOutput {
    resolver: String,
    type_name: &'static str,
  },

  /// The enum callback chose a value outside the declared domain.
  #[error("enum '{name}' resolved to '{value}', expected one of: {}", .values.join(", "))]
  EnumOutOfDomain {
    name: String,
    value: String,
    values: Vec<String>,
  },

  /// The chosen enum value could not be converted into the enum type.
  #[error("enum '{name}' value '{value}' could not be parsed")]
  EnumParse {
    name: String,
    value: String,
    #[source]
    source: BoxError,
  },

  /// Error returned by a producer function, passed through untouched.
  #[error(transparent)]
  Resolver(BoxError),
}

impl InvokeError {
  /// Wrap an arbitrary error as a producer failure.
  pub fn custom(error: impl Into<BoxError>) -> Self {
    Self::Resolver(error.into())
  }

  /// Recover the original producer error, if this is one.
  pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
    match self {
      Self::Resolver(source) => source.downcast_ref::<E>(),
      _ => None,
    }
  }
}

impl From<BoxError> for InvokeError {
  fn from(error: BoxError) -> Self {
    Self::Resolver(error)
  }
}
