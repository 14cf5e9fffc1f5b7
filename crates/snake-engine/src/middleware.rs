use std::time::Instant;

use snake_resolver::{Args, InvokeError, Middleware, Next, TypeKey, Values};
use tracing::{error, info, warn};

use crate::builtin::CancellationToken;
use crate::error::Cancelled;

/// Logs each wrapped step's duration and outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct Traced;

impl Middleware for Traced {
  fn name(&self) -> &str {
    "traced"
  }

  fn handle(&self, args: &Args<'_>, next: Next<'_>) -> Result<Values, InvokeError> {
    let started = Instant::now();
    let result = next.run();
    let duration_ms = started.elapsed().as_millis() as u64;

    match &result {
      Ok(outputs) => info!(
        resolver = %args.resolver(),
        duration_ms,
        outputs = outputs.len(),
        "resolver_completed"
      ),
      Err(e) => error!(
        resolver = %args.resolver(),
        duration_ms,
        error = %e,
        "resolver_failed"
      ),
    }

    result
  }
}

/// Refuses to run the wrapped step once the execution's token is cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cancellable;

impl Middleware for Cancellable {
  fn name(&self) -> &str {
    "cancellable"
  }

  fn inputs(&self) -> Vec<TypeKey> {
    vec![TypeKey::of::<CancellationToken>()]
  }

  fn handle(&self, args: &Args<'_>, next: Next<'_>) -> Result<Values, InvokeError> {
    let token = args.get::<CancellationToken>()?;
    if token.is_cancelled() {
      warn!(resolver = %args.resolver(), "resolver cancelled");
      return Err(InvokeError::custom(Cancelled));
    }
    next.run()
  }
}
