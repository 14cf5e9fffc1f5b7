use snake_resolver::{Resolver, Shared};

/// How often a resolver runs within one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
  /// No outputs; only ever invoked by name.
  Command,
  /// Runs once per invocation of each named resolver that needs it.
  Transient,
  /// Runs at most once per execution; every dependant sees the same value.
  Shared,
}

/// Classify a resolver by the shape of its declared outputs.
///
/// Two or more consumable outputs, or the [`Shared`] marker, make a resolver
/// shared. A single output is transient. No outputs at all is a command.
pub fn classify(resolver: &Resolver) -> Sharing {
  let marked = resolver.outputs().iter().any(|key| key.is::<Shared>());
  match resolver.produced().count() {
    0 if !marked => Sharing::Command,
    1 if !marked => Sharing::Transient,
    _ => Sharing::Shared,
  }
}

pub fn is_shared(resolver: &Resolver) -> bool {
  classify(resolver) == Sharing::Shared
}
