//! Engine construction and introspection.

use std::collections::BTreeMap;
use std::sync::Arc;

use snake_graph::{DependencyGraph, RegistryError, TypeRegistry, build_inputs, classify};
use snake_resolver::{Arguments, Enum, EnumResolver, InvokeError, Outputs, Resolver};
use tracing::{debug, info};

use crate::dependants::DependantsIndex;
use crate::error::EngineError;
use crate::execution::Execution;
use crate::implementation::Implementation;

/// A named resolver together with its built dependency graph.
pub(crate) struct Command {
  pub(crate) resolver: Arc<Resolver>,
  pub(crate) graph: DependencyGraph,
}

/// A fully wired set of commands.
///
/// Built once through [`Engine::builder`] or [`Engine::new`] and read-only
/// afterwards. Every command's dependency graph is known to be satisfiable.
pub struct Engine {
  registry: TypeRegistry,
  commands: BTreeMap<String, Command>,
  enums: Vec<Enum>,
  dependants: DependantsIndex,
}

impl Engine {
  /// Start registering resolvers for a new engine.
  pub fn builder(implementation: impl Implementation + 'static) -> EngineBuilder {
    EngineBuilder {
      implementation: Box::new(implementation),
      resolvers: Vec::new(),
      commands: Vec::new(),
      enums: Vec::new(),
      enum_resolver: None,
    }
  }

  /// Build an engine where every resolver is a named command.
  ///
  /// Commands are entry points only; producers they depend on come from the
  /// implementation's built-in resolvers.
  pub fn new(
    implementation: impl Implementation + 'static,
    commands: impl IntoIterator<Item = Resolver>,
  ) -> Result<Self, EngineError> {
    commands
      .into_iter()
      .fold(Self::builder(implementation), EngineBuilder::command)
      .build()
  }

  /// Names of all commands, sorted.
  pub fn resolver_names(&self) -> Vec<&str> {
    self.commands.keys().map(String::as_str).collect()
  }

  /// Look up a command, or any registered producer, by name.
  pub fn resolve(&self, name: &str) -> Option<&Resolver> {
    self
      .commands
      .get(name)
      .map(|command| command.resolver.as_ref())
      .or_else(|| self.registry.by_name(name).map(Arc::as_ref))
  }

  pub fn enums(&self) -> &[Enum] {
    &self.enums
  }

  /// Commands that transitively depend on the resolver called `name`.
  pub fn dependants_of(&self, name: &str) -> Vec<&str> {
    self.dependants.dependants_of(name)
  }

  /// The built dependency graph of a command.
  pub fn graph_of(&self, name: &str) -> Option<&DependencyGraph> {
    self.commands.get(name).map(|command| &command.graph)
  }

  pub fn registry(&self) -> &TypeRegistry {
    &self.registry
  }

  pub fn dependants(&self) -> &DependantsIndex {
    &self.dependants
  }

  /// Start an execution; shared resolvers run at most once within it.
  pub fn execution(&self) -> Execution<'_> {
    Execution::new(self)
  }

  /// Invoke a single command in a fresh execution.
  pub fn invoke(&self, name: &str, arguments: Arguments) -> Result<Outputs, InvokeError> {
    self.execution().invoke(name, arguments)
  }

  pub(crate) fn command(&self, name: &str) -> Option<&Command> {
    self.commands.get(name)
  }
}

impl std::fmt::Debug for Engine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Engine")
      .field("commands", &self.resolver_names())
      .field("resolvers", &self.registry.len())
      .field("enums", &self.enums.len())
      .finish()
  }
}

/// Collects resolvers until [`EngineBuilder::build`] wires them together.
///
/// Nothing is validated until `build`, which either returns a complete engine
/// or the first error found.
pub struct EngineBuilder {
  implementation: Box<dyn Implementation>,
  resolvers: Vec<Resolver>,
  commands: Vec<Resolver>,
  enums: Vec<Enum>,
  enum_resolver: Option<Arc<dyn EnumResolver>>,
}

impl EngineBuilder {
  /// Register a producer other resolvers can depend on.
  pub fn register(mut self, resolver: Resolver) -> Self {
    self.resolvers.push(resolver);
    self
  }

  pub fn register_enum(mut self, value: Enum) -> Self {
    self.enums.push(value);
    self
  }

  /// Register a named, invocable resolver.
  pub fn command(mut self, resolver: Resolver) -> Self {
    self.commands.push(resolver);
    self
  }

  /// Replace the implementation's enum resolution callback.
  pub fn enum_resolver(mut self, resolver: impl EnumResolver + 'static) -> Self {
    self.enum_resolver = Some(Arc::new(resolver));
    self
  }

  pub fn build(self) -> Result<Engine, EngineError> {
    let EngineBuilder {
      implementation,
      resolvers,
      commands,
      enums,
      enum_resolver,
    } = self;

    let mut registry = TypeRegistry::new();
    for resolver in implementation.resolvers() {
      registry.register(resolver)?;
    }
    for resolver in resolvers {
      registry.register(resolver)?;
    }

    let fallback = enum_resolver
      .or_else(|| implementation.enum_resolver())
      .ok_or(RegistryError::MissingEnumResolver)?;
    for value in &enums {
      if value.values().is_empty() {
        return Err(
          RegistryError::EmptyEnumDomain {
            name: value.name().to_string(),
          }
          .into(),
        );
      }
      let resolver = value
        .bind(Some(&fallback))
        .ok_or(RegistryError::MissingEnumResolver)?;
      registry.register(resolver)?;
    }

    let mut named: BTreeMap<String, Arc<Resolver>> = BTreeMap::new();
    for resolver in commands {
      if named.contains_key(resolver.name()) {
        return Err(
          RegistryError::DuplicateCommand {
            name: resolver.name().to_string(),
          }
          .into(),
        );
      }
      named.insert(resolver.name().to_string(), Arc::new(resolver));
    }

    let mut built = BTreeMap::new();
    for (name, resolver) in named {
      let graph = build_inputs(&registry, &resolver).map_err(|source| EngineError::Graph {
        command: name.clone(),
        source,
      })?;

      debug!(
        command = %name,
        sharing = ?classify(&resolver),
        dependencies = ?graph.type_names(),
        "wired command"
      );

      built.insert(name, Command { resolver, graph });
    }

    let dependants = DependantsIndex::build(
      &registry,
      built
        .iter()
        .map(|(name, command)| (name.as_str(), &command.graph)),
    );

    let engine = Engine {
      registry,
      commands: built,
      enums,
      dependants,
    };

    implementation
      .initialize(&engine)
      .map_err(EngineError::Initialize)?;

    info!(
      commands = engine.commands.len(),
      resolvers = engine.registry.len(),
      enums = engine.enums.len(),
      "engine built"
    );

    Ok(engine)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::implementation::StandardImplementation;
  use snake_resolver::BoxError;

  struct Config;
  struct Database;

  fn config() -> Resolver {
    Resolver::from_fn("config", || -> Result<Config, BoxError> { Ok(Config) })
  }

  fn database() -> Resolver {
    Resolver::from_fn("database", |_: Arc<Config>| -> Result<Database, BoxError> { Ok(Database) })
      .shared()
  }

  fn ping() -> Resolver {
    Resolver::from_fn("ping", |_: Arc<Database>| -> Result<(), BoxError> { Ok(()) })
  }

  #[test]
  fn test_build_and_introspect() {
    let engine = Engine::builder(StandardImplementation::default())
      .register(config())
      .register(database())
      .command(ping())
      .build()
      .unwrap();

    assert_eq!(engine.resolver_names(), vec!["ping"]);
    assert_eq!(engine.resolve("ping").unwrap().name(), "ping");
    assert_eq!(engine.resolve("database").unwrap().name(), "database");
    assert!(engine.resolve("missing").is_none());
    assert_eq!(engine.graph_of("ping").unwrap().len(), 2);
  }

  #[test]
  fn test_duplicate_command_rejected() {
    let result = Engine::builder(StandardImplementation::default())
      .register(config())
      .register(database())
      .command(ping())
      .command(ping())
      .build();

    assert!(matches!(
      result,
      Err(EngineError::Registry(RegistryError::DuplicateCommand { .. }))
    ));
  }

  #[test]
  fn test_missing_dependency_fails_build() {
    let result = Engine::builder(StandardImplementation::default())
      .register(database())
      .command(ping())
      .build();

    let err = result.unwrap_err();
    assert!(matches!(err, EngineError::Graph { ref command, .. } if command == "ping"));
    assert!(err.to_string().contains("required by resolver 'database'"));
  }

  #[test]
  fn test_new_wires_commands_against_builtins() {
    let hello = Resolver::from_fn(
      "hello",
      |out: Arc<crate::builtin::Stdout>| -> Result<(), BoxError> {
        out.write_line("hello")?;
        Ok(())
      },
    );
    let version = Resolver::from_fn("version", || -> Result<String, BoxError> {
      Ok("0.1.0".to_string())
    });

    let engine = Engine::new(StandardImplementation::default(), vec![hello, version]).unwrap();

    assert_eq!(engine.resolver_names(), vec!["hello", "version"]);
    assert_eq!(engine.dependants_of("stdout"), vec!["hello"]);
  }

  #[test]
  fn test_commands_returning_same_type_coexist() {
    let engine = Engine::builder(StandardImplementation::default())
      .command(Resolver::from_fn("version", || -> Result<String, BoxError> {
        Ok("0.1.0".to_string())
      }))
      .command(Resolver::from_fn("name", || -> Result<String, BoxError> {
        Ok("snake".to_string())
      }))
      .build()
      .unwrap();

    let mut execution = engine.execution();
    let version = execution.invoke("version", Arguments::new()).unwrap();
    let name = execution.invoke("name", Arguments::new()).unwrap();
    assert_eq!(*version.get::<String>().unwrap(), "0.1.0");
    assert_eq!(*name.get::<String>().unwrap(), "snake");
    assert!(!engine.registry().contains(&snake_resolver::TypeKey::of::<String>()));
  }

  #[test]
  fn test_command_may_return_its_input_type() {
    struct Level(u8);

    let engine = Engine::builder(StandardImplementation::default())
      .register(Resolver::from_fn("level", || -> Result<Level, BoxError> { Ok(Level(3)) }))
      .command(Resolver::from_fn("bump", |level: Arc<Level>| -> Result<Level, BoxError> {
        Ok(Level(level.0 + 1))
      }))
      .build()
      .unwrap();

    let outputs = engine.invoke("bump", Arguments::new()).unwrap();
    assert_eq!(outputs.get::<Level>().unwrap().0, 4);
  }
}
