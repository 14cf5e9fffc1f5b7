use thiserror::Error;

/// Configuration errors raised while populating the type registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// Two resolvers produce the same type.
  #[error(
    "type {type_name} is already produced by resolver '{existing}', cannot register '{resolver}'"
  )]
  DuplicateProducer {
    type_name: &'static str,
    existing: String,
    resolver: String,
  },

  /// Two named resolvers share a name.
  #[error("duplicate command name: {name}")]
  DuplicateCommand { name: String },

  /// A resolver without consumable outputs was registered as a producer.
  #[error("resolver '{resolver}' declares no outputs and cannot be a dependency")]
  NoOutputs { resolver: String },

  /// A resolver declared the error type as one of its outputs.
  #[error("resolver '{resolver}' declares the error type as an output")]
  ErrorOutput { resolver: String },

  /// The engine was built without an enum resolution callback.
  #[error("no enum resolution callback configured")]
  MissingEnumResolver,

  /// An enum declares no values.
  #[error("enum '{name}' declares an empty value domain")]
  EmptyEnumDomain { name: String },
}

/// Errors raised while building a dependency graph.
#[derive(Debug, Error)]
pub enum GraphError {
  /// A declared input has no registered producer.
  #[error("missing dependency: no resolver produces type {type_name}, required by resolver '{requester}'")]
  MissingDependency {
    type_name: &'static str,
    requester: String,
  },

  /// A producer transitively requires its own output.
  #[error("dependency cycle detected: {}", .members.join(" -> "))]
  Cycle { members: Vec<String> },
}
