use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BoxError, InvokeError};
use crate::resolver::Resolver;
use crate::type_key::TypeKey;
use crate::value::{Value, Values};

/// Callback that picks one value out of an enum's domain.
///
/// Receives the enum's name and its valid values, in declaration order.
pub trait EnumResolver: Send + Sync {
  fn resolve(&self, name: &str, values: &[String]) -> Result<String, BoxError>;
}

impl<F> EnumResolver for F
where
  F: Fn(&str, &[String]) -> Result<String, BoxError> + Send + Sync,
{
  fn resolve(&self, name: &str, values: &[String]) -> Result<String, BoxError> {
    (self)(name, values)
  }
}

type ParseFn = dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync;

/// A resolver whose output is one of a finite set of textual values.
///
/// The value is chosen at invocation time by an [`EnumResolver`]: either the
/// one attached with [`Enum::with_resolver`] or the engine-wide callback.
#[derive(Clone)]
pub struct Enum {
  name: String,
  output: TypeKey,
  values: Vec<String>,
  parse: Arc<ParseFn>,
  resolver: Option<Arc<dyn EnumResolver>>,
}

impl Enum {
  /// Declare an enum producing `T`, parsed from the chosen value.
  pub fn new<T, I, S>(name: impl Into<String>, values: I) -> Self
  where
    T: FromStr + Any + Send + Sync,
    T::Err: Into<BoxError>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      name: name.into(),
      output: TypeKey::of::<T>(),
      values: values.into_iter().map(Into::into).collect(),
      parse: Arc::new(|raw: &str| -> Result<Value, BoxError> {
        T::from_str(raw)
          .map(|value| Arc::new(value) as Value)
          .map_err(Into::into)
      }),
      resolver: None,
    }
  }

  /// Override the engine-wide callback for this enum only.
  pub fn with_resolver(mut self, resolver: impl EnumResolver + 'static) -> Self {
    self.resolver = Some(Arc::new(resolver));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn output(&self) -> TypeKey {
    self.output
  }

  pub fn values(&self) -> &[String] {
    &self.values
  }

  pub fn has_resolver(&self) -> bool {
    self.resolver.is_some()
  }

  /// Turn this enum into a resolver bound to a resolution callback.
  ///
  /// The instance-level callback wins over `fallback`. Returns `None` when
  /// neither is available.
  pub fn bind(&self, fallback: Option<&Arc<dyn EnumResolver>>) -> Option<Resolver> {
    let callback = self.resolver.clone().or_else(|| fallback.cloned())?;
    let name = self.name.clone();
    let values = self.values.clone();
    let output = self.output;
    let parse = self.parse.clone();

    let resolver = Resolver::builder(self.name.clone())
      .output_key(output)
      .handler(move |_| {
        let chosen = callback.resolve(&name, &values).map_err(InvokeError::Resolver)?;
        if !values.contains(&chosen) {
          return Err(InvokeError::EnumOutOfDomain {
            name: name.clone(),
            value: chosen,
            values: values.clone(),
          });
        }

        debug!(enum_name = %name, value = %chosen, "resolved enum");

        let value = parse(&chosen).map_err(|source| InvokeError::EnumParse {
          name: name.clone(),
          value: chosen.clone(),
          source,
        })?;

        let mut outputs = Values::new();
        outputs.insert_raw(output, value);
        Ok(outputs)
      });

    Some(resolver)
  }
}

impl fmt::Debug for Enum {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Enum")
      .field("name", &self.name)
      .field("output", &self.output)
      .field("values", &self.values)
      .field("has_resolver", &self.resolver.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, PartialEq)]
  enum Level {
    Debug,
    Info,
    Error,
  }

  impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s {
        "debug" => Ok(Level::Debug),
        "info" => Ok(Level::Info),
        "error" => Ok(Level::Error),
        other => Err(format!("unsupported level '{other}'")),
      }
    }
  }

  fn level_enum() -> Enum {
    Enum::new::<Level, _, _>("level", ["debug", "info", "error"])
  }

  fn fixed(value: &'static str) -> Arc<dyn EnumResolver> {
    Arc::new(move |_: &str, _: &[String]| -> Result<String, BoxError> { Ok(value.to_string()) })
  }

  #[test]
  fn test_bind_without_callback() {
    assert!(level_enum().bind(None).is_none());
  }

  #[test]
  fn test_resolves_through_fallback() {
    let fallback = fixed("error");
    let resolver = level_enum().bind(Some(&fallback)).unwrap();
    assert_eq!(resolver.outputs(), &[TypeKey::of::<Level>()]);

    let outputs = resolver.invoke(&Values::new()).unwrap();
    assert_eq!(*outputs.get::<Level>().unwrap(), Level::Error);
  }

  #[test]
  fn test_instance_resolver_wins() {
    let fallback = fixed("error");
    let resolver = level_enum()
      .with_resolver(|name: &str, values: &[String]| -> Result<String, BoxError> {
        assert_eq!(name, "level");
        Ok(values[0].clone())
      })
      .bind(Some(&fallback))
      .unwrap();

    let outputs = resolver.invoke(&Values::new()).unwrap();
    assert_eq!(*outputs.get::<Level>().unwrap(), Level::Debug);
  }

  #[test]
  fn test_value_outside_domain_fails() {
    let fallback = fixed("warn");
    let resolver = level_enum().bind(Some(&fallback)).unwrap();

    let err = resolver.invoke(&Values::new()).unwrap_err();
    assert!(matches!(err, InvokeError::EnumOutOfDomain { ref value, .. } if value == "warn"));
    assert_eq!(
      err.to_string(),
      "enum 'level' resolved to 'warn', expected one of: debug, info, error"
    );
  }

  #[test]
  fn test_parse_failure_is_reported() {
    let fallback = fixed("trace");
    let resolver = Enum::new::<Level, _, _>("level", ["trace"])
      .bind(Some(&fallback))
      .unwrap();

    let err = resolver.invoke(&Values::new()).unwrap_err();
    assert!(matches!(err, InvokeError::EnumParse { .. }));
  }
}
