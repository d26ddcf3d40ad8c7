//! Build script for roller-firmware
//!
//! - Puts memory.x on the linker search path
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const SECTIONS: &[(&str, &[&str])] = &[
    ("device", &["client_id", "topic_prefix", "firmware_version"]),
    ("motor", &["wiring", "relay_a", "relay_b"]),
    ("pins", &["audio_relay", "end_sensor", "button"]),
    ("bridge", &["tx", "rx", "baud"]),
    (
        "timing",
        &[
            "tick_ms",
            "button_debounce_ms",
            "end_sensor_debounce_ms",
            "settle_ms",
            "rolling_timeout_ms",
            "reconnect_interval_ms",
            "liveness_timeout_ms",
            "update_timeout_ms",
            "update_failure_hold_ms",
            "restart_grace_ms",
            "watchdog_timeout_ms",
            "event_ttl_ms",
        ],
    ),
];

const PIN_KEYS: &[&str] = &[
    "relay_a",
    "relay_b",
    "audio_relay",
    "end_sensor",
    "button",
    "tx",
    "rx",
];

fn main() {
    setup_linker();
    validate_config();
}

fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    let mut f = File::create(out_dir.join("memory.x")).expect("cannot create memory.x");
    f.write_all(include_bytes!("memory.x"))
        .expect("cannot write memory.x");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let path = Path::new("device.toml");
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&[format!("cannot read device.toml: {}", e)]));

    let config: toml::Value = toml::from_str(&content)
        .unwrap_or_else(|e| fail(&[format!("invalid TOML syntax: {}", e)]));

    let mut errors = Vec::new();
    let root = match config.as_table() {
        Some(t) => t,
        None => fail(&["device.toml must be a table".into()]),
    };

    for (name, value) in root {
        let Some(known) = SECTIONS.iter().find(|(s, _)| s == name).map(|(_, k)| *k) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for (key, value) in table {
            if !known.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
                continue;
            }
            if PIN_KEYS.contains(&key.as_str()) {
                validate_pin(name, key, value, &mut errors);
            } else if name == "timing" || key == "baud" {
                match value.as_integer() {
                    Some(v) if v > 0 => {}
                    _ => errors.push(format!("[{}] '{}' must be a positive integer", name, key)),
                }
            } else if !value.is_str() {
                errors.push(format!("[{}] '{}' must be a string", name, key));
            }
        }
    }

    if let Some(wiring) = config
        .get("motor")
        .and_then(|m| m.get("wiring"))
        .and_then(|w| w.as_str())
    {
        if !["dual_relay", "power_direction"].contains(&wiring) {
            errors.push("[motor] wiring must be 'dual_relay' or 'power_direction'".into());
        }
    }

    if !errors.is_empty() {
        fail(&errors);
    }
    println!("cargo:warning=device.toml validated successfully");
}

fn validate_pin(section: &str, key: &str, value: &toml::Value, errors: &mut Vec<String>) {
    let Some(text) = value.as_str() else {
        errors.push(format!("[{}] '{}' must be a pin string", section, key));
        return;
    };
    let number = text.trim_start_matches(['!', '^']).strip_prefix("gpio");
    match number.and_then(|n| n.parse::<u8>().ok()) {
        Some(n) if n <= 29 => {}
        _ => errors.push(format!(
            "[{}] '{}' = \"{}\" is not a pin like \"gpio5\" or \"^!gpio5\" (0-29)",
            section, key, text
        )),
    }
}

fn fail(errors: &[String]) -> ! {
    let mut msg = String::from("\n  device.toml is invalid:\n");
    for e in errors {
        msg.push_str(&format!("  - {}\n", e));
    }
    panic!("{}", msg);
}
