//! Configuration loading
//!
//! The device configuration is compiled in from `device.toml` and parsed at
//! boot with the core's TOML subset parser.

pub mod loader;

pub use loader::load_config;
