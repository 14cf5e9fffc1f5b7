use std::collections::{BTreeMap, BTreeSet};

use snake_graph::{DependencyGraph, TypeRegistry};

/// Reverse index from a resolver name to the commands that need it.
#[derive(Debug, Clone, Default)]
pub struct DependantsIndex {
  dependants: BTreeMap<String, BTreeSet<String>>,
}

impl DependantsIndex {
  /// Build the index from each command's dependency graph.
  ///
  /// A command never lists itself as its own dependant.
  pub fn build<'a>(
    registry: &TypeRegistry,
    graphs: impl IntoIterator<Item = (&'a str, &'a DependencyGraph)>,
  ) -> Self {
    let mut dependants: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (command, graph) in graphs {
      for key in graph.iter() {
        let Some(producer) = registry.lookup(key) else {
          continue;
        };
        if producer.name() == command {
          continue;
        }
        dependants
          .entry(producer.name().to_string())
          .or_default()
          .insert(command.to_string());
      }
    }

    Self { dependants }
  }

  /// Commands depending on `name`, sorted. Empty for unknown names.
  pub fn dependants_of(&self, name: &str) -> Vec<&str> {
    self
      .dependants
      .get(name)
      .map(|set| set.iter().map(String::as_str).collect())
      .unwrap_or_default()
  }

  /// Resolver names that at least one command depends on.
  pub fn resolvers(&self) -> impl Iterator<Item = &str> {
    self.dependants.keys().map(String::as_str)
  }
}
