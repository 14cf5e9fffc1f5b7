//! Snake Graph
//!
//! This crate turns a set of resolvers into dependency graphs.
//!
//! - [`TypeRegistry`] maps every produced type to the one resolver producing it.
//! - [`build_inputs`] walks a resolver's inputs depth-first and returns the
//!   ordered list of types whose producers must run before it.
//! - [`classify`] decides whether a producer is shared across an execution.

mod builder;
mod error;
mod registry;
mod sharing;

pub use builder::{DependencyGraph, build_inputs};
pub use error::{GraphError, RegistryError};
pub use registry::{ResolverId, TypeRegistry};
pub use sharing::{Sharing, classify, is_shared};
