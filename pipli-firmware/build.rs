//! Build script for pipli-firmware
//!
//! - Installs memory.x and the linker scripts
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest report chunk the BLE bridge forwards in one notification
const MAX_CHUNK_SIZE: i64 = 244;

/// Longest accepted update token
const MAX_TOKEN_LEN: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("create memory.x");
    f.write_all(memory_x).expect("write memory.x");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds device.toml from the pipli-firmware         ║\n\
            ║  directory. Restore it or create one with [reminder] and [link]. ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_reminder(&config, &mut errors);
    validate_link(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in device.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The firmware parser only knows these two sections
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        match (name.as_str(), value) {
            ("reminder" | "link", toml::Value::Table(_)) => {}
            ("reminder" | "link", _) => errors.push(format!("[{}] must be a table", name)),
            _ => errors.push(format!("unknown section or key '{}'", name)),
        }
    }
}

fn validate_reminder(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(reminder) = config.get("reminder").and_then(|r| r.as_table()) else {
        return;
    };

    for key in [
        "alert_duration_ms",
        "response_window_ms",
        "checkpoint_interval_ms",
        "tick_ms",
    ] {
        check_u32(reminder, "reminder", key, errors);
    }

    if let Some(toml::Value::Integer(0)) = reminder.get("tick_ms") {
        errors.push("[reminder] tick_ms must be greater than 0".to_string());
    }
}

fn validate_link(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(link) = config.get("link").and_then(|l| l.as_table()) else {
        return;
    };

    for key in ["chunk_pause_ms", "idle_gap_ms"] {
        check_u32(link, "link", key, errors);
    }

    match link.get("chunk_size") {
        None => {}
        Some(toml::Value::Integer(n)) if (1..=MAX_CHUNK_SIZE).contains(n) => {}
        Some(_) => errors.push(format!(
            "[link] chunk_size must be an integer 1-{}",
            MAX_CHUNK_SIZE
        )),
    }

    match link.get("update_token") {
        None => {}
        Some(toml::Value::String(token)) if token.trim().is_empty() => {
            errors.push("[link] update_token must not be empty".to_string())
        }
        Some(toml::Value::String(token)) if token.trim() != token => {
            errors.push("[link] update_token must not start or end with spaces".to_string())
        }
        Some(toml::Value::String(token)) if token.len() > MAX_TOKEN_LEN => errors.push(format!(
            "[link] update_token longer than {} bytes",
            MAX_TOKEN_LEN
        )),
        Some(toml::Value::String(_)) => {}
        Some(_) => errors.push("[link] update_token must be a string".to_string()),
    }
}

fn check_u32(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(n)) if u32::try_from(*n).is_ok() => {}
        Some(_) => errors.push(format!("[{}] {} must be a non-negative integer", section, key)),
    }
}
