use std::sync::Arc;

use snake_config::EngineConfig;
use snake_resolver::{BoxError, EnumResolver, Resolver};

use crate::builtin;
use crate::engine::Engine;
use crate::enums::ConfiguredEnums;

/// Host integration points consulted while an engine is built.
pub trait Implementation {
  /// Resolvers registered before any application resolver.
  fn resolvers(&self) -> Vec<Resolver> {
    builtin::placeholders()
  }

  /// Engine-wide enum resolution callback.
  ///
  /// Building fails when neither this nor [`crate::EngineBuilder::enum_resolver`]
  /// supplies one.
  fn enum_resolver(&self) -> Option<Arc<dyn EnumResolver>> {
    None
  }

  /// Called once the engine is fully built; an error aborts construction.
  fn initialize(&self, _engine: &Engine) -> Result<(), BoxError> {
    Ok(())
  }
}

/// Built-in placeholders plus enum values taken from an [`EngineConfig`].
#[derive(Clone)]
pub struct StandardImplementation {
  enums: Arc<ConfiguredEnums>,
}

impl StandardImplementation {
  pub fn new(config: EngineConfig) -> Self {
    Self {
      enums: Arc::new(ConfiguredEnums::new(&config)),
    }
  }
}

impl Default for StandardImplementation {
  fn default() -> Self {
    Self::new(EngineConfig::default())
  }
}

impl Implementation for StandardImplementation {
  fn enum_resolver(&self) -> Option<Arc<dyn EnumResolver>> {
    Some(self.enums.clone())
  }
}
