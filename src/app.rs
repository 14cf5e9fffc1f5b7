//! Sample application served by the `snake` binary.
//!
//! A database handle is opened from a caller-supplied URL and shared by the
//! `ping` and `stats` commands, so running both in one execution connects
//! once. `stats` also reads the `log-level` enum.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use snake_engine::builtin::{Stdin, Stdout};
use snake_engine::{
  BoxError, Engine, EngineConfig, EngineError, Enum, Resolver, StandardImplementation, Traced,
};
use tracing::info;

/// Connection string passed on the command line.
pub struct DatabaseUrl(pub String);

pub struct Database {
  url: String,
  queries: AtomicUsize,
}

impl Database {
  fn query(&self) -> usize {
    self.queries.fetch_add(1, Ordering::SeqCst) + 1
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Debug,
  Info,
  Warn,
  Error,
}

impl FromStr for LogLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "debug" => Ok(Self::Debug),
      "info" => Ok(Self::Info),
      "warn" => Ok(Self::Warn),
      "error" => Ok(Self::Error),
      other => Err(format!("unknown log level '{other}'")),
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Debug => "debug",
      Self::Info => "info",
      Self::Warn => "warn",
      Self::Error => "error",
    };
    f.write_str(s)
  }
}

fn database() -> Resolver {
  Resolver::from_fn(
    "database",
    |url: Arc<DatabaseUrl>| -> Result<Database, BoxError> {
      info!(url = %url.0, "opening database");
      Ok(Database {
        url: url.0.clone(),
        queries: AtomicUsize::new(0),
      })
    },
  )
  .with_argument::<DatabaseUrl>()
  .shared()
  .with_middleware(Traced)
}

fn log_level() -> Enum {
  Enum::new::<LogLevel, _, _>("log-level", ["info", "debug", "warn", "error"])
}

fn ping() -> Resolver {
  Resolver::from_fn(
    "ping",
    |db: Arc<Database>, out: Arc<Stdout>| -> Result<(), BoxError> {
      db.query();
      out.write_line(&format!("pong from {}", db.url))?;
      Ok(())
    },
  )
}

fn stats() -> Resolver {
  Resolver::from_fn(
    "stats",
    |db: Arc<Database>, level: Arc<LogLevel>, out: Arc<Stdout>| -> Result<(), BoxError> {
      let queries = db.query();
      out.write_line(&format!(
        "{}: {queries} queries (log level {level})",
        db.url
      ))?;
      Ok(())
    },
  )
  .with_middleware(Traced)
}

fn echo() -> Resolver {
  Resolver::from_fn(
    "echo",
    |input: Arc<Stdin>, out: Arc<Stdout>| -> Result<(), BoxError> {
      out.write_all(input.read_to_string()?.as_bytes())?;
      Ok(())
    },
  )
}

/// Build the sample engine. `streams` shadow the built-in stdin/stdout.
pub fn engine(config: EngineConfig, streams: Vec<Resolver>) -> Result<Engine, EngineError> {
  streams
    .into_iter()
    .fold(
      Engine::builder(StandardImplementation::new(config)),
      |builder, resolver| builder.register(resolver),
    )
    .register(database())
    .register_enum(log_level())
    .command(ping())
    .command(stats())
    .command(echo())
    .build()
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use snake_engine::Arguments;

  fn captured_engine(config: EngineConfig, input: &str) -> (Engine, snake_engine::builtin::Captured) {
    let (stdout, captured) = Stdout::capture();
    let stdout = std::sync::Mutex::new(Some(stdout));
    let input = input.to_string();

    let streams = vec![
      Resolver::from_fn("stdin", move || -> Result<Stdin, BoxError> {
        Ok(Stdin::new(Cursor::new(input.clone().into_bytes())))
      })
      .shared(),
      Resolver::from_fn("stdout", move || -> Result<Stdout, BoxError> {
        stdout
          .lock()
          .unwrap()
          .take()
          .ok_or_else(|| "stdout already taken".into())
      })
      .shared(),
    ];

    (engine(config, streams).unwrap(), captured)
  }

  fn url() -> Arguments {
    Arguments::new().with(DatabaseUrl("sqlite::memory:".to_string()))
  }

  #[test]
  fn test_commands_share_database() {
    let (engine, captured) = captured_engine(EngineConfig::default(), "");
    let mut execution = engine.execution();

    execution.invoke("ping", url()).unwrap();
    execution.invoke("stats", url()).unwrap();

    assert_eq!(
      captured.contents(),
      "pong from sqlite::memory:\nsqlite::memory:: 2 queries (log level info)\n"
    );
  }

  #[test]
  fn test_log_level_from_config() {
    let config = EngineConfig::default().with_enum("log-level", "warn");
    let (engine, captured) = captured_engine(config, "");

    engine.invoke("stats", url()).unwrap();
    assert!(captured.contents().contains("log level warn"));
  }

  #[test]
  fn test_echo_copies_stdin() {
    let (engine, captured) = captured_engine(EngineConfig::default(), "hello snake");
    engine.invoke("echo", Arguments::new()).unwrap();
    assert_eq!(captured.contents(), "hello snake");
  }

  #[test]
  fn test_introspection() {
    let (engine, _) = captured_engine(EngineConfig::default(), "");
    assert_eq!(engine.resolver_names(), vec!["echo", "ping", "stats"]);
    assert_eq!(engine.dependants_of("database"), vec!["ping", "stats"]);
    assert_eq!(engine.dependants_of("log-level"), vec!["stats"]);
  }
}
