//! Snake Resolver
//!
//! This crate contains the resolver model for snake. A resolver wraps a
//! producer function together with the value types it consumes and the value
//! types it produces. Resolvers are wired together by type: a resolver that
//! declares an input of type `T` is satisfied by whichever resolver declares
//! `T` as an output.
//!
//! Values are type-erased (`Arc<dyn Any + Send + Sync>`) while they travel
//! between resolvers and are recovered through typed accessors on [`Args`] and
//! [`Values`].
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use snake_resolver::{BoxError, Resolver};
//!
//! let database = Resolver::from_fn("database", |config: Arc<Config>| -> Result<_, BoxError> {
//!   Ok(Database::connect(&config.url)?)
//! })
//! .shared();
//! ```

mod enums;
mod error;
mod handler;
mod middleware;
mod resolver;
mod type_key;
mod value;

pub use enums::{Enum, EnumResolver};
pub use error::{BoxError, InvokeError};
pub use handler::{Handler, HandlerFn};
pub use middleware::{FnMiddleware, Middleware, Next, from_fn};
pub use resolver::{Input, InputSource, Resolver, ResolverBuilder, Shared};
pub use type_key::TypeKey;
pub use value::{Args, Arguments, Outputs, Value, Values};
