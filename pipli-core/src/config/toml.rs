//! Simple TOML parser for device configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `device.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - `[reminder]` and `[link]` section headers
//! - Comments (# ...)
//!
//! Unknown keys are ignored so older firmware accepts newer files.

use heapless::String as HString;

use pipli_protocol::MAX_CHUNK_SIZE;

use super::types::{DeviceConfig, LinkConfig, ReminderConfig, MAX_TOKEN_LEN};

/// Configuration parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String value exceeds its capacity
    TooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Reminder,
    Link,
}

/// Parse TOML text into a [`DeviceConfig`]
///
/// Keys missing from the input keep their defaults.
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            match section {
                Section::Root => {}
                Section::Reminder => apply_reminder(&mut config.reminder, key, value)?,
                Section::Link => apply_link(&mut config.link, key, value)?,
            }
        }
    }

    validate(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header.trim() {
        "reminder" => Ok(Section::Reminder),
        "link" => Ok(Section::Link),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_reminder(cfg: &mut ReminderConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "alert_duration_ms" => cfg.alert_duration_ms = parse_int(value)?,
        "response_window_ms" => cfg.response_window_ms = parse_int(value)?,
        "checkpoint_interval_ms" => cfg.checkpoint_interval_ms = parse_int(value)?,
        "tick_ms" => cfg.tick_ms = parse_int(value)?,
        _ => {} // Ignore unknown keys
    }
    Ok(())
}

fn apply_link(cfg: &mut LinkConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "chunk_size" => cfg.chunk_size = parse_int(value)?,
        "chunk_pause_ms" => cfg.chunk_pause_ms = parse_int(value)?,
        "idle_gap_ms" => cfg.idle_gap_ms = parse_int(value)?,
        "update_token" => {
            cfg.update_token = HString::<MAX_TOKEN_LEN>::try_from(parse_string(value)?)
                .map_err(|_| ConfigError::TooLong)?;
        }
        _ => {}
    }
    Ok(())
}

fn validate(config: &DeviceConfig) -> Result<(), ConfigError> {
    let chunk = usize::from(config.link.chunk_size);
    if chunk == 0 || chunk > MAX_CHUNK_SIZE {
        return Err(ConfigError::InvalidValue);
    }
    if config.reminder.tick_ms == 0 {
        return Err(ConfigError::InvalidValue);
    }
    // Payloads are trimmed before matching
    let token = config.link.update_token.as_str();
    if token.is_empty() || token.trim() != token {
        return Err(ConfigError::InvalidValue);
    }
    Ok(())
}

/// Parse a key = value line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = match comment_start(value) {
        Some(hash_pos) => value[..hash_pos].trim(),
        None => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Position of the first `#` outside a quoted string
fn comment_start(value: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ConfigError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else if value.starts_with('"') {
        Err(ConfigError::InvalidValue)
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ConfigError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ConfigError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("tick_ms = 100"), Some(("tick_ms", "100")));
        assert_eq!(
            parse_key_value("update_token = \"a#b\" # trailing"),
            Some(("update_token", "\"a#b\""))
        );
        assert_eq!(parse_key_value("chunk_size = 200 # bytes"), Some(("chunk_size", "200")));
        assert_eq!(parse_key_value("novalue ="), None);
    }

    #[test]
    fn test_hash_inside_quotes_is_kept() {
        let config = parse_config(
            "[reminder]\nalert_duration_ms = 9000\n[link]\nupdate_token = \"a#b\" # note\n",
        )
        .unwrap();
        assert_eq!(config.reminder.alert_duration_ms, 9_000);
        assert_eq!(config.link.update_token.as_str(), "a#b");
    }

    #[test]
    fn test_padded_token_rejected() {
        for token in ["\"   \"", "\" update\"", "\"update \""] {
            let input = format!("[link]\nupdate_token = {}\n", token);
            assert_eq!(parse_config(&input), Err(ConfigError::InvalidValue), "{}", token);
        }
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int::<u32>("60_000"), Ok(60_000));
        assert_eq!(parse_int::<u16>("70000"), Err(ConfigError::InvalidValue));
        assert_eq!(parse_int::<u32>("-5"), Err(ConfigError::InvalidValue));
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Pipli device configuration
[reminder]
alert_duration_ms = 3_000
response_window_ms = 30000
checkpoint_interval_ms = 15000
tick_ms = 50

[link]
chunk_size = 180
chunk_pause_ms = 30   # bridge needs a little longer
idle_gap_ms = 80
update_token = "sync"
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.reminder.alert_duration_ms, 3_000);
        assert_eq!(config.reminder.response_window_ms, 30_000);
        assert_eq!(config.reminder.checkpoint_interval_ms, 15_000);
        assert_eq!(config.reminder.tick_ms, 50);
        assert_eq!(config.link.chunk_size, 180);
        assert_eq!(config.link.chunk_pause_ms, 30);
        assert_eq!(config.link.idle_gap_ms, 80);
        assert_eq!(config.link.update_token.as_str(), "sync");
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[link]\nchunk_size = 100\nfuture_key = 1\n").unwrap();
        assert_eq!(config.link.chunk_size, 100);
        assert_eq!(config.reminder, ReminderConfig::default());
        assert_eq!(config.link.update_token.as_str(), "update");
    }

    #[test]
    fn test_invalid_configs() {
        assert_eq!(parse_config("[heater]\n"), Err(ConfigError::InvalidSection));
        assert_eq!(
            parse_config("[reminder]\ntick_ms = fast\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(parse_config("[link]\nchunk_size = 0\n"), Err(ConfigError::InvalidValue));
        assert_eq!(parse_config("[link]\nchunk_size = 245\n"), Err(ConfigError::InvalidValue));
        assert_eq!(
            parse_config("[link]\nupdate_token = \"a-token-that-is-too-long\"\n"),
            Err(ConfigError::TooLong)
        );
        assert_eq!(parse_config("[link]\nupdate_token = \"\"\n"), Err(ConfigError::InvalidValue));
    }
}
