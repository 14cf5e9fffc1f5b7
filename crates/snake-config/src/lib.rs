//! Snake Config
//!
//! This crate contains the serializable configuration types for snake.
//! Configuration is loaded from JSON files (via CLI with `--config=snake.json`)
//! and handed to the engine, which uses it to answer enum resolution requests.
//!
//! # Example
//!
//! ```json
//! {
//!   "enums": { "log-level": "debug" },
//!   "strict_enums": false
//! }
//! ```

mod engine;

pub use engine::EngineConfig;
