use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Settings consumed when constructing an engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Chosen value per enum name, e.g. `"log-level": "debug"`.
  #[serde(default)]
  pub enums: HashMap<String, String>,

  /// When set, an enum without a configured value fails to resolve instead
  /// of falling back to the first value of its domain.
  #[serde(default)]
  pub strict_enums: bool,
}

impl EngineConfig {
  /// Parse a configuration from JSON.
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  /// Set the value for an enum, replacing any configured one.
  pub fn with_enum(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.enums.insert(name.into(), value.into());
    self
  }

  pub fn enum_value(&self, name: &str) -> Option<&str> {
    self.enums.get(name).map(String::as_str)
  }
}
