//! Dependency graph construction.
//!
//! The graph for a resolver is the ordered list of types whose producers must
//! run before it. The walk is depth-first over declared inputs, in
//! declaration order, with a producer's middleware inputs resolved right
//! after its own inputs. A type is appended only once all of its producer's
//! dependencies are, and only once per graph.

use std::collections::HashSet;

use snake_resolver::{Resolver, TypeKey};
use tracing::debug;

use crate::error::GraphError;
use crate::registry::TypeRegistry;

/// Ordered, deduplicated producers required by a resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
  order: Vec<TypeKey>,
}

impl DependencyGraph {
  /// Types in execution order: every producer after its own dependencies.
  pub fn order(&self) -> &[TypeKey] {
    &self.order
  }

  pub fn iter(&self) -> impl Iterator<Item = &TypeKey> {
    self.order.iter()
  }

  pub fn contains(&self, key: &TypeKey) -> bool {
    self.order.contains(key)
  }

  /// Position of `key` in the execution order.
  pub fn position(&self, key: &TypeKey) -> Option<usize> {
    self.order.iter().position(|k| k == key)
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  pub fn type_names(&self) -> Vec<&'static str> {
    self.order.iter().map(TypeKey::name).collect()
  }
}

/// Build the dependency graph for `resolver` against `registry`.
///
/// Fails with [`GraphError::MissingDependency`] when a graph input has no
/// producer and with [`GraphError::Cycle`] when a producer transitively
/// requires its own output (including the root's own outputs).
pub fn build_inputs(
  registry: &TypeRegistry,
  resolver: &Resolver,
) -> Result<DependencyGraph, GraphError> {
  let mut walk = Walk {
    registry,
    order: Vec::new(),
    done: HashSet::new(),
    stack: resolver.produced().collect(),
  };

  walk.visit_inputs(resolver)?;

  debug!(
    resolver = %resolver.name(),
    dependencies = walk.order.len(),
    "built dependency graph"
  );

  Ok(DependencyGraph { order: walk.order })
}

struct Walk<'a> {
  registry: &'a TypeRegistry,
  order: Vec<TypeKey>,
  done: HashSet<TypeKey>,
  /// Types currently being resolved, outermost first.
  stack: Vec<TypeKey>,
}

impl Walk<'_> {
  fn visit_inputs(&mut self, resolver: &Resolver) -> Result<(), GraphError> {
    for key in resolver.graph_inputs() {
      self.visit(key, resolver.name())?;
    }

    for middleware in resolver.middlewares() {
      let requester = format!("{} (middleware '{}')", resolver.name(), middleware.name());
      for key in middleware.inputs() {
        self.visit(key, &requester)?;
      }
    }

    Ok(())
  }

  fn visit(&mut self, key: TypeKey, requester: &str) -> Result<(), GraphError> {
    if self.done.contains(&key) {
      return Ok(());
    }

    if let Some(start) = self.stack.iter().position(|k| *k == key) {
      let mut members: Vec<String> = self.stack[start..]
        .iter()
        .map(|k| k.name().to_string())
        .collect();
      members.push(key.name().to_string());
      return Err(GraphError::Cycle { members });
    }

    let registry = self.registry;
    let producer = registry
      .lookup(&key)
      .ok_or_else(|| GraphError::MissingDependency {
        type_name: key.name(),
        requester: requester.to_string(),
      })?;

    self.stack.push(key);
    self.visit_inputs(producer)?;
    self.stack.pop();

    self.done.insert(key);
    self.order.push(key);
    Ok(())
  }
}
