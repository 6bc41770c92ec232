//! Configuration type definitions

use heapless::String;

use pipli_protocol::{DEFAULT_CHUNK_SIZE, UPDATE_TOKEN};

/// Maximum update token length
pub const MAX_TOKEN_LEN: usize = 16;

/// Reminder timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReminderConfig {
    /// How long the vibration motor runs for one alert (ms)
    pub alert_duration_ms: u32,
    /// How long to wait for the button after the alert (ms)
    pub response_window_ms: u32,
    /// Interval between periodic counter checkpoints (ms)
    pub checkpoint_interval_ms: u32,
    /// Controller tick period (ms)
    pub tick_ms: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            alert_duration_ms: 5_000,
            response_window_ms: 60_000,
            checkpoint_interval_ms: 60_000,
            tick_ms: 100,
        }
    }
}

/// Wireless link parameters
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Report chunk size in bytes
    pub chunk_size: u16,
    /// Pause between report chunks (ms)
    pub chunk_pause_ms: u32,
    /// Line idle time that ends an unterminated payload (ms)
    pub idle_gap_ms: u32,
    /// Payload that requests an echo report
    pub update_token: String<MAX_TOKEN_LEN>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        let mut update_token = String::new();
        // Fits: the default token is shorter than MAX_TOKEN_LEN
        let _ = update_token.push_str(UPDATE_TOKEN);
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE as u16,
            chunk_pause_ms: 20,
            idle_gap_ms: 100,
            update_token,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub reminder: ReminderConfig,
    pub link: LinkConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.reminder.alert_duration_ms, 5_000);
        assert_eq!(config.reminder.response_window_ms, 60_000);
        assert_eq!(config.link.chunk_size, 200);
        assert_eq!(config.link.update_token.as_str(), "update");
    }
}
