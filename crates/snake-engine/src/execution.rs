//! Command execution.

use std::collections::HashMap;

use snake_graph::{ResolverId, is_shared};
use snake_resolver::{Arguments, InputSource, InvokeError, Outputs, Resolver, Values};
use tracing::{debug, error, info, instrument, trace};

use crate::engine::Engine;

/// One top-level execution against an [`Engine`].
///
/// Shared resolvers run at most once per execution, no matter how many
/// commands invoked through it depend on them, and a shared command invoked
/// twice returns its first outputs. Transient resolvers run once per command
/// invocation.
pub struct Execution<'e> {
  engine: &'e Engine,
  id: String,
  shared: HashMap<ResolverId, Values>,
  commands: HashMap<String, Outputs>,
}

impl<'e> Execution<'e> {
  pub(crate) fn new(engine: &'e Engine) -> Self {
    Self {
      engine,
      id: uuid::Uuid::new_v4().to_string(),
      shared: HashMap::new(),
      commands: HashMap::new(),
    }
  }

  /// Unique execution ID.
  pub fn id(&self) -> &str {
    &self.id
  }

  /// Number of shared resolvers and shared commands that have run so far.
  pub fn shared_count(&self) -> usize {
    self.shared.len() + self.commands.len()
  }

  /// Run the named command, producing its dependencies first.
  #[instrument(name = "snake_invoke", skip(self, arguments), fields(execution_id = %self.id))]
  pub fn invoke(&mut self, name: &str, arguments: Arguments) -> Result<Outputs, InvokeError> {
    let engine = self.engine;
    let command = engine
      .command(name)
      .ok_or_else(|| InvokeError::UnknownCommand(name.to_string()))?;

    let shared = is_shared(&command.resolver);
    if let Some(outputs) = self.commands.get(name).filter(|_| shared) {
      trace!(command = %name, "reusing shared command outputs");
      return Ok(outputs.clone());
    }

    info!(command = %name, dependencies = command.graph.len(), "command_started");

    let mut available = Values::new();
    for key in command.graph.iter() {
      if available.contains(key) {
        continue;
      }

      let id = engine
        .registry()
        .lookup_id(key)
        .ok_or_else(|| InvokeError::MissingValue {
          resolver: name.to_string(),
          type_name: key.name(),
        })?;
      let producer = engine
        .registry()
        .get(id)
        .ok_or_else(|| InvokeError::MissingValue {
          resolver: name.to_string(),
          type_name: key.name(),
        })?;

      let outputs = self.produce(id, producer, &available, &arguments)?;
      available.extend(outputs);
    }

    let result = run(&command.resolver, &available, &arguments);

    match &result {
      Ok(outputs) => {
        info!(command = %name, outputs = outputs.len(), "command_completed");
        if shared {
          self.commands.insert(name.to_string(), outputs.clone());
        }
      }
      Err(e) => error!(command = %name, error = %e, "command_failed"),
    }

    result
  }

  fn produce(
    &mut self,
    id: ResolverId,
    resolver: &Resolver,
    available: &Values,
    arguments: &Arguments,
  ) -> Result<Values, InvokeError> {
    if !is_shared(resolver) {
      return run(resolver, available, arguments);
    }

    if let Some(outputs) = self.shared.get(&id) {
      trace!(resolver = %resolver.name(), "reusing shared value");
      return Ok(outputs.clone());
    }

    let outputs = run(resolver, available, arguments)?;
    debug!(resolver = %resolver.name(), "memoized shared value");
    self.shared.insert(id, outputs.clone());
    Ok(outputs)
  }
}

/// Gather a resolver's inputs and invoke it.
fn run(resolver: &Resolver, available: &Values, arguments: &Arguments) -> Result<Values, InvokeError> {
  let mut inputs = Values::new();

  for input in resolver.inputs() {
    let value = match input.source {
      InputSource::Graph => available.get_raw(&input.key).ok_or_else(|| InvokeError::MissingValue {
        resolver: resolver.name().to_string(),
        type_name: input.key.name(),
      })?,
      InputSource::Argument => {
        arguments
          .get_raw(&input.key)
          .ok_or_else(|| InvokeError::MissingArgument {
            resolver: resolver.name().to_string(),
            type_name: input.key.name(),
          })?
      }
    };
    inputs.insert_raw(input.key, value.clone());
  }

  for middleware in resolver.middlewares() {
    for key in middleware.inputs() {
      let value = available
        .get_raw(&key)
        .ok_or_else(|| InvokeError::MissingValue {
          resolver: format!("{} (middleware '{}')", resolver.name(), middleware.name()),
          type_name: key.name(),
        })?;
      inputs.insert_raw(key, value.clone());
    }
  }

  trace!(resolver = %resolver.name(), inputs = inputs.len(), "invoking resolver");
  resolver.invoke(&inputs)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::implementation::StandardImplementation;
  use snake_resolver::BoxError;

  struct Token(String);
  struct Session(String);

  fn engine(counter: Arc<AtomicUsize>) -> Engine {
    Engine::builder(StandardImplementation::default())
      .register(
        Resolver::from_fn("session", move |token: Arc<Token>| -> Result<Session, BoxError> {
          counter.fetch_add(1, Ordering::SeqCst);
          Ok(Session(format!("session for {}", token.0)))
        })
        .with_argument::<Token>(),
      )
      .command(Resolver::from_fn(
        "whoami",
        |session: Arc<Session>| -> Result<String, BoxError> { Ok(session.0.clone()) },
      ))
      .build()
      .unwrap()
  }

  #[test]
  fn test_unknown_command() {
    let engine = engine(Arc::new(AtomicUsize::new(0)));
    let err = engine.invoke("missing", Arguments::new()).unwrap_err();
    assert!(matches!(err, InvokeError::UnknownCommand(ref name) if name == "missing"));
  }

  #[test]
  fn test_arguments_reach_producers() {
    let engine = engine(Arc::new(AtomicUsize::new(0)));
    let outputs = engine
      .invoke("whoami", Arguments::new().with(Token("alice".to_string())))
      .unwrap();
    assert_eq!(*outputs.get::<String>().unwrap(), "session for alice");
  }

  #[test]
  fn test_missing_argument() {
    let engine = engine(Arc::new(AtomicUsize::new(0)));
    let err = engine.invoke("whoami", Arguments::new()).unwrap_err();
    assert!(matches!(err, InvokeError::MissingArgument { ref resolver, .. } if resolver == "session"));
  }

  #[test]
  fn test_transient_runs_per_invocation() {
    let counter = Arc::new(AtomicUsize::new(0));
    let engine = engine(counter.clone());
    let mut execution = engine.execution();

    for _ in 0..2 {
      execution
        .invoke("whoami", Arguments::new().with(Token("bob".to_string())))
        .unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(execution.shared_count(), 0);
  }

  #[test]
  fn test_executions_have_distinct_ids() {
    let engine = engine(Arc::new(AtomicUsize::new(0)));
    assert_ne!(engine.execution().id(), engine.execution().id());
  }

  #[test]
  fn test_shared_command_runs_once_per_execution() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let engine = Engine::builder(StandardImplementation::default())
      .command(Resolver::builder("init").shared().handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Values::new())
      }))
      .build()
      .unwrap();

    let mut execution = engine.execution();
    execution.invoke("init", Arguments::new()).unwrap();
    execution.invoke("init", Arguments::new()).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(execution.shared_count(), 1);

    engine.invoke("init", Arguments::new()).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
  }
}
