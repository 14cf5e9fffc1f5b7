use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::InvokeError;
use crate::type_key::TypeKey;

/// A type-erased value produced by a resolver.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Values supplied by the caller for inputs declared as arguments.
pub type Arguments = Values;

/// Values returned by a resolver.
pub type Outputs = Values;

/// A set of values keyed by their type.
#[derive(Clone, Default)]
pub struct Values {
  entries: HashMap<TypeKey, Value>,
}

impl Values {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a value, returning the value previously stored for its type.
  pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<Value> {
    self.insert_arc(Arc::new(value))
  }

  /// Insert a value that is already behind an `Arc`, keeping the allocation.
  pub fn insert_arc<T: Any + Send + Sync>(&mut self, value: Arc<T>) -> Option<Value> {
    self.entries.insert(TypeKey::of::<T>(), value)
  }

  /// Insert an erased value under an explicit key.
  ///
  /// The caller is responsible for `key` matching the value's concrete type;
  /// a mismatch surfaces as `None` from [`Values::get`].
  pub fn insert_raw(&mut self, key: TypeKey, value: Value) -> Option<Value> {
    self.entries.insert(key, value)
  }

  /// Builder-style [`Values::insert`].
  pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.insert(value);
    self
  }

  pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self
      .entries
      .get(&TypeKey::of::<T>())
      .and_then(|value| value.clone().downcast::<T>().ok())
  }

  pub fn get_raw(&self, key: &TypeKey) -> Option<&Value> {
    self.entries.get(key)
  }

  pub fn contains(&self, key: &TypeKey) -> bool {
    self.entries.contains_key(key)
  }

  pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
    self.entries.keys()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Move every entry of `other` into `self`, overwriting duplicates.
  pub fn extend(&mut self, other: Values) {
    self.entries.extend(other.entries);
  }
}

impl std::fmt::Debug for Values {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut keys: Vec<_> = self.entries.keys().collect();
    keys.sort();
    f.debug_set().entries(keys).finish()
  }
}

/// The inputs handed to a resolver (and its middlewares) for one invocation.
#[derive(Clone, Copy)]
pub struct Args<'a> {
  resolver: &'a str,
  values: &'a Values,
}

impl<'a> Args<'a> {
  pub fn new(resolver: &'a str, values: &'a Values) -> Self {
    Self { resolver, values }
  }

  /// Name of the resolver being invoked.
  pub fn resolver(&self) -> &'a str {
    self.resolver
  }

  /// Fetch a declared input by type.
  pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, InvokeError> {
    self.values.get::<T>().ok_or_else(|| InvokeError::MissingValue {
      resolver: self.resolver.to_string(),
      type_name: std::any::type_name::<T>(),
    })
  }

  pub fn values(&self) -> &'a Values {
    self.values
  }
}
