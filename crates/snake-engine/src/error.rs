use snake_graph::{GraphError, RegistryError};
use snake_resolver::BoxError;

/// Errors that can occur while constructing an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  /// Invalid registration (duplicate producer, missing enum callback, ...).
  #[error(transparent)]
  Registry(#[from] RegistryError),

  /// A command's dependency graph could not be built.
  #[error("failed to build command '{command}': {source}")]
  Graph {
    command: String,
    #[source]
    source: GraphError,
  },

  /// The implementation's post-build hook rejected the engine.
  #[error("engine initialization failed: {0}")]
  Initialize(#[source] BoxError),
}

/// Returned by [`crate::Cancellable`] when the cancellation token has fired.
#[derive(Debug, thiserror::Error)]
#[error("invocation cancelled")]
pub struct Cancelled;
