mod app;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use snake_config::EngineConfig;
use snake_engine::{Arguments, Engine, builtin};

use crate::app::DatabaseUrl;

/// Snake - typed dependency resolution for command-line tools
#[derive(Parser)]
#[command(name = "snake")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the config file (default: ~/.snake/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List commands and enums
  List,

  /// Show the resolvers a command needs, in execution order
  Graph {
    /// The command name
    name: String,
  },

  /// Show the commands that depend on a resolver (all resolvers if omitted)
  Dependants {
    /// The resolver name
    name: Option<String>,
  },

  /// Run commands in a single execution
  Run {
    /// Commands to run, in order
    #[arg(required = true)]
    names: Vec<String>,

    /// Connection string for the sample database
    #[arg(long, default_value = "sqlite::memory:")]
    database_url: String,

    /// Override the configured log-level enum
    #[arg(long)]
    log_level: Option<String>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let mut config = load_config(cli.config)?;

  match cli.command {
    Some(Commands::List) => list(&build(config.clone())?, &config),
    Some(Commands::Graph { name }) => graph(&build(config)?, &name)?,
    Some(Commands::Dependants { name }) => dependants(&build(config)?, name.as_deref())?,
    Some(Commands::Run {
      names,
      database_url,
      log_level,
    }) => {
      if let Some(level) = log_level {
        config = config.with_enum("log-level", level);
      }
      run(&build(config)?, &names, database_url)?;
    }
    None => {
      println!("snake - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig> {
  let Some(path) = path.or_else(|| dirs::home_dir().map(|home| home.join(".snake").join("config.json")))
  else {
    return Ok(EngineConfig::default());
  };

  if !path.exists() {
    tracing::debug!(path = %path.display(), "config file not found, using defaults");
    return Ok(EngineConfig::default());
  }

  let content = std::fs::read_to_string(&path)
    .with_context(|| format!("failed to read config file: {}", path.display()))?;
  EngineConfig::from_json(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))
}

fn build(config: EngineConfig) -> Result<Engine> {
  app::engine(config, builtin::host_streams()).context("failed to build engine")
}

fn list(engine: &Engine, config: &EngineConfig) {
  for name in engine.resolver_names() {
    println!("{name}");
  }
  for value in engine.enums() {
    let configured = config.enum_value(value.name()).unwrap_or("default");
    println!(
      "{} (enum: {}; configured: {configured})",
      value.name(),
      value.values().join(", ")
    );
  }
}

fn graph(engine: &Engine, name: &str) -> Result<()> {
  let graph = engine
    .graph_of(name)
    .with_context(|| format!("unknown command '{name}'"))?;

  for (i, key) in graph.iter().enumerate() {
    let producer = engine
      .registry()
      .lookup(key)
      .map(|resolver| resolver.name().to_string())
      .unwrap_or_default();
    println!("{:>3}. {} <- {}", i + 1, key.short_name(), producer);
  }
  println!("  -> {name}");

  Ok(())
}

fn dependants(engine: &Engine, name: Option<&str>) -> Result<()> {
  let Some(name) = name else {
    for resolver in engine.dependants().resolvers() {
      println!("{resolver}: {}", engine.dependants_of(resolver).join(", "));
    }
    return Ok(());
  };

  engine
    .resolve(name)
    .with_context(|| format!("unknown resolver '{name}'"))?;

  for dependant in engine.dependants_of(name) {
    println!("{dependant}");
  }

  Ok(())
}

fn run(engine: &Engine, names: &[String], database_url: String) -> Result<()> {
  let arguments = Arguments::new().with(DatabaseUrl(database_url));
  let mut execution = engine.execution();

  for name in names {
    execution
      .invoke(name, arguments.clone())
      .with_context(|| format!("command '{name}' failed"))?;
  }

  eprintln!(
    "Execution {} completed: {} command(s), {} shared resolver(s)",
    execution.id(),
    names.len(),
    execution.shared_count()
  );

  Ok(())
}
