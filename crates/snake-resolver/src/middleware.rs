//! Middleware wrapping resolver invocation.
//!
//! Middlewares form a chain around the resolver's handler. The first
//! middleware attached to a resolver is the outermost one: it sees the call
//! first and the result last. A middleware calls [`Next::run`] to continue the
//! chain and may run work before and after it.

use std::any::Any;
use std::sync::Arc;

use crate::error::InvokeError;
use crate::handler::HandlerFn;
use crate::type_key::TypeKey;
use crate::value::{Args, Values};

/// A wrapper around a resolver's invocation.
pub trait Middleware: Send + Sync {
  /// Name used in logs and error messages.
  fn name(&self) -> &str {
    "middleware"
  }

  /// Types this middleware needs resolved before the wrapped resolver runs.
  fn inputs(&self) -> Vec<TypeKey> {
    Vec::new()
  }

  fn handle(&self, args: &Args<'_>, next: Next<'_>) -> Result<Values, InvokeError>;
}

/// The remainder of a middleware chain.
pub struct Next<'a> {
  chain: &'a [Arc<dyn Middleware>],
  handler: &'a HandlerFn,
  args: Args<'a>,
}

impl<'a> Next<'a> {
  pub(crate) fn new(chain: &'a [Arc<dyn Middleware>], handler: &'a HandlerFn, args: Args<'a>) -> Self {
    Self {
      chain,
      handler,
      args,
    }
  }

  /// Run the next middleware, or the handler once the chain is exhausted.
  pub fn run(self) -> Result<Values, InvokeError> {
    match self.chain.split_first() {
      Some((middleware, rest)) => {
        tracing::trace!(
          resolver = %self.args.resolver(),
          middleware = %middleware.name(),
          "entering middleware"
        );
        middleware.handle(&self.args, Next::new(rest, self.handler, self.args))
      }
      None => (self.handler)(&self.args),
    }
  }
}

/// A middleware built from a closure.
pub struct FnMiddleware<F> {
  name: String,
  inputs: Vec<TypeKey>,
  handle: F,
}

/// Build a middleware from a closure taking the invocation args and the rest of the chain.
pub fn from_fn<F>(name: impl Into<String>, handle: F) -> FnMiddleware<F>
where
  F: Fn(&Args<'_>, Next<'_>) -> Result<Values, InvokeError> + Send + Sync,
{
  FnMiddleware {
    name: name.into(),
    inputs: Vec::new(),
    handle,
  }
}

impl<F> FnMiddleware<F> {
  /// Declare an input this middleware reads through [`Args::get`].
  pub fn requires<T: Any + Send + Sync>(mut self) -> Self {
    self.inputs.push(TypeKey::of::<T>());
    self
  }
}

impl<F> Middleware for FnMiddleware<F>
where
  F: Fn(&Args<'_>, Next<'_>) -> Result<Values, InvokeError> + Send + Sync,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn inputs(&self) -> Vec<TypeKey> {
    self.inputs.clone()
  }

  fn handle(&self, args: &Args<'_>, next: Next<'_>) -> Result<Values, InvokeError> {
    (self.handle)(args, next)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::error::BoxError;
  use crate::resolver::Resolver;

  fn recording(log: Arc<Mutex<Vec<String>>>, label: &'static str) -> impl Middleware {
    from_fn(label, move |_, next| {
      log.lock().unwrap().push(format!("{label}:before"));
      let result = next.run();
      log.lock().unwrap().push(format!("{label}:after"));
      result
    })
  }

  #[test]
  fn test_first_declared_is_outermost() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let inner_log = log.clone();

    let resolver = Resolver::from_fn("work", move || -> Result<(), BoxError> {
      inner_log.lock().unwrap().push("handler".to_string());
      Ok(())
    })
    .with_middleware(recording(log.clone(), "outer"))
    .with_middleware(recording(log.clone(), "inner"));

    resolver.invoke(&Values::new()).unwrap();

    assert_eq!(
      *log.lock().unwrap(),
      vec![
        "outer:before",
        "inner:before",
        "handler",
        "inner:after",
        "outer:after"
      ]
    );
  }

  #[derive(Debug, thiserror::Error)]
  #[error("database offline")]
  struct Offline;

  #[test]
  fn test_error_passes_through_unchanged() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let resolver = Resolver::from_fn("work", || -> Result<u32, BoxError> { Err(Box::new(Offline)) })
      .with_middleware(recording(log, "outer"));

    let err = resolver.invoke(&Values::new()).unwrap_err();
    assert!(err.downcast_ref::<Offline>().is_some());
    assert_eq!(err.to_string(), "database offline");
  }

  #[test]
  fn test_middleware_can_short_circuit() {
    struct Limit(u32);

    let resolver = Resolver::from_fn("count", || -> Result<u32, BoxError> { Ok(1) }).with_middleware(
      from_fn("limit", |args, next| {
        if args.get::<Limit>()?.0 == 0 {
          return Err(InvokeError::custom("limit reached"));
        }
        next.run()
      })
      .requires::<Limit>(),
    );

    let blocked = resolver.invoke(&Values::new().with(Limit(0)));
    assert_eq!(blocked.unwrap_err().to_string(), "limit reached");

    let allowed = resolver.invoke(&Values::new().with(Limit(3))).unwrap();
    assert_eq!(*allowed.get::<u32>().unwrap(), 1);
  }
}
