//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ListenConfig)
//! - [`security`]: Session guard and admission settings (SecurityConfig)
//! - [`limits`]: Connection and framing limits (LimitsConfig)
//! - [`throttle`]: Per-command cooldown table (ThrottleConfig)
//! - [`validation`]: Startup checks returning every problem found

mod defaults;
mod limits;
mod security;
mod throttle;
mod types;
mod validation;

pub use limits::LimitsConfig;
pub use security::SecurityConfig;
pub use throttle::ThrottleConfig;
pub use types::{Config, ConfigError, DatabaseConfig, ListenConfig, ServerConfig, ServerKind};
pub use validation::{ValidationError, validate};
