//! Layered configuration for the `draw` command.
//!
//! Values are resolved from lowest to highest precedence: built-in defaults, the TOML
//! config file, `-S key=value` overrides, then dedicated command-line flags.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::build_config;
pub use models::AppConfig;
