use std::collections::HashMap;

use snake_config::EngineConfig;
use snake_resolver::{BoxError, EnumResolver};
use tracing::debug;

/// Enum resolution backed by configured values.
///
/// Picks the configured value for the enum's name. Without one it falls back
/// to the first value of the domain, or fails when `strict_enums` is set.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredEnums {
  values: HashMap<String, String>,
  strict: bool,
}

impl ConfiguredEnums {
  pub fn new(config: &EngineConfig) -> Self {
    Self {
      values: config.enums.clone(),
      strict: config.strict_enums,
    }
  }
}

impl EnumResolver for ConfiguredEnums {
  fn resolve(&self, name: &str, values: &[String]) -> Result<String, BoxError> {
    if let Some(value) = self.values.get(name) {
      return Ok(value.clone());
    }

    if self.strict {
      return Err(format!("no value configured for enum '{name}'").into());
    }

    let first = values
      .first()
      .ok_or_else(|| format!("enum '{name}' has no values"))?;
    debug!(enum_name = %name, value = %first, "using default enum value");
    Ok(first.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn domain() -> Vec<String> {
    vec!["debug".to_string(), "info".to_string(), "error".to_string()]
  }

  #[test]
  fn test_configured_value_wins() {
    let enums = ConfiguredEnums::new(&EngineConfig::default().with_enum("log-level", "error"));
    assert_eq!(enums.resolve("log-level", &domain()).unwrap(), "error");
  }

  #[test]
  fn test_defaults_to_first_value() {
    let enums = ConfiguredEnums::default();
    assert_eq!(enums.resolve("log-level", &domain()).unwrap(), "debug");
  }

  #[test]
  fn test_strict_requires_configured_value() {
    let config = EngineConfig {
      strict_enums: true,
      ..Default::default()
    };
    let err = ConfiguredEnums::new(&config)
      .resolve("log-level", &domain())
      .unwrap_err();
    assert!(err.to_string().contains("log-level"));
  }

  #[test]
  fn test_configured_value_is_not_validated_here() {
    let enums = ConfiguredEnums::new(&EngineConfig::default().with_enum("log-level", "trace"));
    assert_eq!(enums.resolve("log-level", &domain()).unwrap(), "trace");
  }
}
