//! Snake Engine
//!
//! This crate wires resolvers into invocable commands.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       EngineBuilder                         │
//! │  - register / register_enum / command                       │
//! │  - build() → Engine (or the first configuration error)      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │  - TypeRegistry + one DependencyGraph per command           │
//! │  - dependants index, enums, introspection                   │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Execution                           │
//! │  - invoke(name, arguments) runs a command's graph in order  │
//! │  - memoizes shared resolvers for its own lifetime           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use snake_engine::{Engine, StandardImplementation};
//!
//! let engine = Engine::builder(StandardImplementation::default())
//!   .register(database_resolver)
//!   .command(ping)
//!   .command(stats)
//!   .build()?;
//!
//! let mut execution = engine.execution();
//! execution.invoke("ping", Arguments::new())?;
//! execution.invoke("stats", Arguments::new())?; // reuses the shared database
//! ```

pub mod builtin;
mod dependants;
mod engine;
mod enums;
mod error;
mod execution;
mod implementation;
mod middleware;

pub use dependants::DependantsIndex;
pub use engine::{Engine, EngineBuilder};
pub use enums::ConfiguredEnums;
pub use error::{Cancelled, EngineError};
pub use execution::Execution;
pub use implementation::{Implementation, StandardImplementation};
pub use middleware::{Cancellable, Traced};

pub use snake_config::EngineConfig;
pub use snake_graph::{DependencyGraph, GraphError, RegistryError, Sharing};
pub use snake_resolver::{
  Args, Arguments, BoxError, Enum, EnumResolver, InvokeError, Middleware, Next, Outputs, Resolver,
  Shared, TypeKey, Values,
};
