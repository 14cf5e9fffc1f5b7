use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use snake_resolver::{BoxError, InvokeError, Resolver, TypeKey};
use tracing::{debug, warn};

use crate::error::RegistryError;

/// Stable handle to a resolver stored in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolverId(usize);

/// Maps produced value types to the resolver that produces them.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
  resolvers: Vec<Arc<Resolver>>,
  bindings: HashMap<TypeKey, ResolverId>,
}

impl TypeRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind every consumable output of `resolver` to it.
  ///
  /// Placeholders give way to real producers in either registration order.
  /// Any other clash is rejected, and a rejected registration leaves the
  /// registry untouched.
  pub fn register(&mut self, resolver: Resolver) -> Result<(), RegistryError> {
    let produced: Vec<TypeKey> = resolver.produced().collect();
    if produced.is_empty() {
      return Err(RegistryError::NoOutputs {
        resolver: resolver.name().to_string(),
      });
    }
    if produced
      .iter()
      .any(|key| key.is::<InvokeError>() || key.is::<BoxError>())
    {
      return Err(RegistryError::ErrorOutput {
        resolver: resolver.name().to_string(),
      });
    }

    let mut bind = Vec::with_capacity(produced.len());
    for key in produced {
      match self.lookup(&key) {
        None => bind.push(key),
        Some(existing) if existing.is_placeholder() && !resolver.is_placeholder() => {
          warn!(
            type_name = %key,
            placeholder = %existing.name(),
            resolver = %resolver.name(),
            "shadowing placeholder resolver"
          );
          bind.push(key);
        }
        Some(existing) if resolver.is_placeholder() => {
          debug!(
            type_name = %key,
            existing = %existing.name(),
            placeholder = %resolver.name(),
            "ignoring placeholder for type that already has a producer"
          );
        }
        Some(existing) => {
          return Err(RegistryError::DuplicateProducer {
            type_name: key.name(),
            existing: existing.name().to_string(),
            resolver: resolver.name().to_string(),
          });
        }
      }
    }

    if bind.is_empty() {
      return Ok(());
    }

    let id = ResolverId(self.resolvers.len());
    debug!(resolver = %resolver.name(), types = ?bind, "registered resolver");
    self.resolvers.push(Arc::new(resolver));
    for key in bind {
      self.bindings.insert(key, id);
    }

    Ok(())
  }

  /// The resolver producing `key`, if any.
  pub fn lookup(&self, key: &TypeKey) -> Option<&Arc<Resolver>> {
    self.lookup_id(key).and_then(|id| self.get(id))
  }

  pub fn lookup_id(&self, key: &TypeKey) -> Option<ResolverId> {
    self.bindings.get(key).copied()
  }

  pub fn get(&self, id: ResolverId) -> Option<&Arc<Resolver>> {
    self.resolvers.get(id.0)
  }

  /// Find a resolver by name among those still bound to a type.
  ///
  /// Placeholders that were shadowed by a real producer are skipped.
  pub fn by_name(&self, name: &str) -> Option<&Arc<Resolver>> {
    self
      .bound()
      .map(|id| &self.resolvers[id.0])
      .find(|resolver| resolver.name() == name)
  }

  pub fn contains(&self, key: &TypeKey) -> bool {
    self.bindings.contains_key(key)
  }

  /// All bound types, sorted by name.
  pub fn types(&self) -> Vec<TypeKey> {
    let mut types: Vec<TypeKey> = self.bindings.keys().copied().collect();
    types.sort();
    types
  }

  /// Number of resolvers currently bound to at least one type.
  pub fn len(&self) -> usize {
    self.bound().count()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  /// Ids of resolvers holding at least one binding, in registration order.
  fn bound(&self) -> impl Iterator<Item = ResolverId> + '_ {
    let live: BTreeSet<ResolverId> = self.bindings.values().copied().collect();
    live.into_iter()
  }
}
