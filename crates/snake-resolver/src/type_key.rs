use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a value type flowing between resolvers.
///
/// Equality and hashing use the [`TypeId`] only; the type name is carried for
/// error messages and introspection.
#[derive(Clone, Copy)]
pub struct TypeKey {
  id: TypeId,
  name: &'static str,
}

impl TypeKey {
  pub fn of<T: Any + ?Sized>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  /// Fully qualified type name, e.g. `my_app::db::Database`.
  pub fn name(&self) -> &'static str {
    self.name
  }

  /// Type name without its module path, e.g. `Database`.
  ///
  /// Tuples, slices, references and pointers keep their full name.
  pub fn short_name(&self) -> &'static str {
    if !self
      .name
      .starts_with(|c: char| c.is_alphabetic() || c == '_')
    {
      return self.name;
    }
    let base = self.name.split('<').next().unwrap_or(self.name);
    match base.rfind("::") {
      Some(pos) => &self.name[pos + 2..],
      None => self.name,
    }
  }

  pub fn is<T: Any + ?Sized>(&self) -> bool {
    self.id == TypeId::of::<T>()
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl PartialOrd for TypeKey {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for TypeKey {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .name
      .cmp(other.name)
      .then_with(|| self.id.cmp(&other.id))
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

impl fmt::Display for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Database;

  #[test]
  fn test_same_type_same_key() {
    assert_eq!(TypeKey::of::<Database>(), TypeKey::of::<Database>());
    assert_ne!(TypeKey::of::<Database>(), TypeKey::of::<String>());
  }

  #[test]
  fn test_short_name_strips_module_path() {
    assert_eq!(TypeKey::of::<Database>().short_name(), "Database");
    assert_eq!(TypeKey::of::<u32>().short_name(), "u32");
  }

  #[test]
  fn test_short_name_keeps_compound_types() {
    let tuple = TypeKey::of::<(Database, String)>();
    assert_eq!(tuple.short_name(), tuple.name());
    let slice = TypeKey::of::<[Database]>();
    assert_eq!(slice.short_name(), slice.name());
    assert_eq!(
      TypeKey::of::<Vec<Database>>().short_name(),
      format!("Vec<{}>", std::any::type_name::<Database>())
    );
  }

  #[test]
  fn test_is() {
    let key = TypeKey::of::<String>();
    assert!(key.is::<String>());
    assert!(!key.is::<&str>());
  }
}
