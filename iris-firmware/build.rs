//! Build script for iris-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates wheel.toml at compile time, with the same parser the
//!   firmware runs at boot

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use iris_core::config::{parse_config, parse_pin_string};

/// Largest slot count the firmware supports
const MAX_SLOTS: i64 = 16;

/// GPIOs on the RP2040
const GPIO_COUNT: i64 = 30;

/// GPIOs taken by the command UART
const SERIAL_PINS: [i64; 2] = [0, 1];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("create memory.x");
    f.write_all(memory_x).expect("write memory.x");

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate wheel.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=wheel.toml");

    let config_path = Path::new("wheel.toml");

    if !config_path.exists() {
        fail(
            "wheel.toml not found",
            &["The firmware embeds wheel.toml from the iris-firmware directory."],
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read wheel.toml", &[&e.to_string()]),
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid TOML syntax in wheel.toml", &lines);
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_wheel(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_protocol(&config, &mut errors);

    // TOML accepts forms the boot parser does not (hex integers, signs)
    if errors.is_empty() {
        if let Err(e) = parse_config(&config_content) {
            errors.push(format!("rejected by the firmware config parser: {:?}", e));
        }
    }

    if !errors.is_empty() {
        let lines: Vec<&str> = errors.iter().map(String::as_str).collect();
        fail("Invalid configuration in wheel.toml", &lines);
    }

    println!("cargo:warning=wheel.toml validated successfully");
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[&str]) -> ! {
    let body = lines
        .iter()
        .map(|line| format!("║  • {:<62} ║", truncate(line, 62)))
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

/// Shorten `line` to at most `max` characters, marking the cut with `...`
fn truncate(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    let cut = line
        .char_indices()
        .nth(max - 3)
        .map_or(line.len(), |(i, _)| i);
    format!("{}...", &line[..cut])
}

/// Only the known sections and keys may appear
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    const KNOWN: [(&str, &[&str]); 4] = [
        ("wheel", &["slot_count", "home_slot"]),
        ("timing", &["settle_ms", "poll_interval_ms", "max_search_steps"]),
        (
            "pins",
            &[
                "motor_a",
                "motor_b",
                "motor_reversed",
                "home_sensor",
                "proximity_sensor",
            ],
        ),
        ("protocol", &["retry_attempts"]),
    ];

    let Some(root) = config.as_table() else {
        return;
    };

    for (name, section) in root {
        let Some((_, keys)) = KNOWN.iter().find(|(known, _)| *known == name.as_str()) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

/// Integer value of `section.key`, if present
fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match config.get(section).and_then(|s| s.get(key)) {
        None => None,
        Some(toml::Value::Integer(v)) => Some(*v),
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn validate_wheel(config: &toml::Value, errors: &mut Vec<String>) {
    let slot_count = integer(config, "wheel", "slot_count", errors).unwrap_or(5);
    if !(2..=MAX_SLOTS).contains(&slot_count) {
        errors.push(format!("[wheel] slot_count must be 2-{}", MAX_SLOTS));
    }

    if let Some(home) = integer(config, "wheel", "home_slot", errors) {
        if home < 0 || home >= slot_count {
            errors.push("[wheel] home_slot must be below slot_count".to_string());
        }
    }
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(settle) = integer(config, "timing", "settle_ms", errors) {
        if !(0..=u32::MAX as i64).contains(&settle) {
            errors.push("[timing] settle_ms out of range".to_string());
        }
    }

    for key in ["poll_interval_ms", "max_search_steps"] {
        if let Some(value) = integer(config, "timing", key, errors) {
            if !(1..=u32::MAX as i64).contains(&value) {
                errors.push(format!("[timing] {} must be at least 1", key));
            }
        }
    }
}

fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let mut used = Vec::new();

    for key in ["motor_a", "motor_b", "home_sensor", "proximity_sensor"] {
        let value = match config.get("pins").and_then(|s| s.get(key)) {
            None => continue,
            Some(toml::Value::String(s)) => s,
            Some(_) => {
                errors.push(format!("[pins] {} must be a string like \"gpio10\"", key));
                continue;
            }
        };

        let pin = parse_pin_string(value).map(|spec| i64::from(spec.pin));

        match pin {
            None => errors.push(format!("[pins] {} = \"{}\" is not gpioN", key, value)),
            Some(pin) if pin >= GPIO_COUNT => {
                errors.push(format!("[pins] {} uses gpio{} (max gpio29)", key, pin))
            }
            Some(pin) if SERIAL_PINS.contains(&pin) => {
                errors.push(format!("[pins] {} uses gpio{} (command UART)", key, pin))
            }
            Some(pin) if used.contains(&pin) => {
                errors.push(format!("[pins] gpio{} assigned twice", pin))
            }
            Some(pin) => used.push(pin),
        }
    }

    if let Some(value) = config.get("pins").and_then(|s| s.get("motor_reversed")) {
        if !value.is_bool() {
            errors.push("[pins] motor_reversed must be true or false".to_string());
        }
    }
}

fn validate_protocol(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(attempts) = integer(config, "protocol", "retry_attempts", errors) {
        if !(1..=u8::MAX as i64).contains(&attempts) {
            errors.push("[protocol] retry_attempts must be 1-255".to_string());
        }
    }
}
