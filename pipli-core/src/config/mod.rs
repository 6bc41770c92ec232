//! Device configuration
//!
//! Timing and link parameters. The firmware embeds `device.toml` and parses
//! it at boot with [`parse_config`]; every field has a compile-time default.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ConfigError};
pub use types::*;
