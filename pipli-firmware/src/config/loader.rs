//! Embedded configuration loader
//!
//! Falls back to compiled defaults if the embedded file does not parse.
//! `build.rs` already rejects an invalid device.toml, so the fallback only
//! triggers when the two parsers disagree.

use defmt::*;

use pipli_core::config::{parse_config, DeviceConfig};

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../device.toml");

/// Parse the embedded configuration
pub fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            DeviceConfig::default()
        }
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &DeviceConfig) {
    let reminder = &config.reminder;
    let link = &config.link;
    debug!(
        "  alert {} ms, response window {} ms",
        reminder.alert_duration_ms, reminder.response_window_ms
    );
    debug!(
        "  checkpoint every {} ms, tick {} ms",
        reminder.checkpoint_interval_ms, reminder.tick_ms
    );
    debug!(
        "  chunk {} bytes, pause {} ms, idle gap {} ms",
        link.chunk_size, link.chunk_pause_ms, link.idle_gap_ms
    );
}
