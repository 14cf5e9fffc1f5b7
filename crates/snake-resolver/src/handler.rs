//! Typed producer functions.
//!
//! [`Handler`] is implemented for plain functions and closures that take their
//! inputs as `Arc<T>` parameters and return `Result<O, BoxError>`. The
//! parameter types become the resolver's declared inputs and `O` becomes its
//! single declared output (`()` declares none).

use std::any::Any;
use std::sync::Arc;

use crate::error::{BoxError, InvokeError};
use crate::type_key::TypeKey;
use crate::value::{Args, Values};

/// Uniform call shape every resolver is reduced to.
pub type HandlerFn = dyn Fn(&Args<'_>) -> Result<Values, InvokeError> + Send + Sync;

/// A producer function with statically known inputs and output.
pub trait Handler<Params>: Send + Sync + 'static {
  type Output: Any + Send + Sync;

  /// Input types in parameter order.
  fn inputs() -> Vec<TypeKey>;

  fn call(&self, args: &Args<'_>) -> Result<Self::Output, InvokeError>;
}

macro_rules! impl_handler {
  ($($param:ident),*) => {
    impl<F, O, $($param,)*> Handler<($($param,)*)> for F
    where
      F: Fn($(Arc<$param>),*) -> Result<O, BoxError> + Send + Sync + 'static,
      O: Any + Send + Sync,
      $($param: Any + Send + Sync,)*
    {
      type Output = O;

      fn inputs() -> Vec<TypeKey> {
        vec![$(TypeKey::of::<$param>()),*]
      }

      #[allow(non_snake_case, unused_variables)]
      fn call(&self, args: &Args<'_>) -> Result<O, InvokeError> {
        $(let $param = args.get::<$param>()?;)*
        (self)($($param),*).map_err(InvokeError::Resolver)
      }
    }
  };
}

impl_handler!();
impl_handler!(A);
impl_handler!(A, B);
impl_handler!(A, B, C);
impl_handler!(A, B, C, D);
impl_handler!(A, B, C, D, E);

#[cfg(test)]
mod tests {
  use super::*;

  struct Host(String);
  struct Port(u16);

  fn address(host: Arc<Host>, port: Arc<Port>) -> Result<String, BoxError> {
    Ok(format!("{}:{}", host.0, port.0))
  }

  fn inputs_of<P, H: Handler<P>>(_: &H) -> Vec<TypeKey> {
    H::inputs()
  }

  #[test]
  fn test_inputs_follow_parameter_order() {
    assert_eq!(
      inputs_of(&address),
      vec![TypeKey::of::<Host>(), TypeKey::of::<Port>()]
    );
  }

  #[test]
  fn test_call_reads_args() {
    let values = Values::new()
      .with(Host("localhost".to_string()))
      .with(Port(5432));
    let args = Args::new("address", &values);
    assert_eq!(Handler::call(&address, &args).unwrap(), "localhost:5432");
  }

  #[test]
  fn test_call_propagates_producer_error() {
    let failing = |_: Arc<Host>| -> Result<String, BoxError> { Err("unreachable host".into()) };
    let values = Values::new().with(Host("nowhere".to_string()));
    let args = Args::new("failing", &values);
    let err = Handler::call(&failing, &args).unwrap_err();
    assert_eq!(err.to_string(), "unreachable host");
  }
}
