//! Minimal TOML reader for `device.toml`
//!
//! Handles only the subset the device file uses:
//!
//! - `[section]` headers
//! - `key = value` pairs with string, integer or boolean values
//! - `#` comments, on their own line or after a value
//!
//! Anything else (arrays, inline tables, multi-line strings) is rejected.
//! The firmware build validates the same file with the full `toml` crate,
//! so errors here mean the file and this reader disagree.

use super::hardware::{HardwareConfig, MotorWiring, PinConfig};
use super::types::{ConfigError, DeviceConfig, TimingConfig};

/// Parse error, with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown `[section]`
    InvalidSection,
    /// Line is neither a header nor `key = value`
    Syntax,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or cannot be stored
    InvalidValue(ConfigError),
}

/// Everything `device.toml` describes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigFile {
    pub device: DeviceConfig,
    pub hardware: HardwareConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Device,
    Motor,
    Pins,
    Bridge,
    Timing,
}

/// Parse a device file, starting from defaults
///
/// Pin polarities from `[pins]` are copied into the device config so the
/// control loop and the board agree.
pub fn parse_config(input: &str) -> Result<ConfigFile, ParseError> {
    let mut file = ConfigFile::default();
    let mut section = Section::Root;
    let mut prefix_set = false;

    for (index, raw) in input.lines().enumerate() {
        let fail = |kind| ParseError {
            line: index + 1,
            kind,
        };
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = parse_section(header.trim()).ok_or(fail(ParseErrorKind::InvalidSection))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(fail(ParseErrorKind::Syntax))?;
        if section == Section::Device && key == "topic_prefix" {
            prefix_set = true;
        }
        apply(&mut file, section, key, value, prefix_set).map_err(fail)?;
    }

    file.device.polarity = file.hardware.polarity();
    Ok(file)
}

fn strip_comment(line: &str) -> &str {
    // A '#' inside a quoted string is not a comment
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_section(name: &str) -> Option<Section> {
    match name {
        "device" => Some(Section::Device),
        "motor" => Some(Section::Motor),
        "pins" => Some(Section::Pins),
        "bridge" => Some(Section::Bridge),
        "timing" => Some(Section::Timing),
        _ => None,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn string(value: &str) -> Result<&str, ParseErrorKind> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseErrorKind::InvalidValue(ConfigError::Invalid))
}

fn integer<T: core::str::FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    // TOML allows '_' as a digit separator
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits
            .push(c)
            .map_err(|_| ParseErrorKind::InvalidValue(ConfigError::OutOfRange))?;
    }
    digits
        .parse()
        .map_err(|_| ParseErrorKind::InvalidValue(ConfigError::Invalid))
}

fn pin(value: &str) -> Result<PinConfig, ParseErrorKind> {
    PinConfig::parse(string(value)?).map_err(ParseErrorKind::InvalidValue)
}

fn apply(
    file: &mut ConfigFile,
    section: Section,
    key: &str,
    value: &str,
    prefix_set: bool,
) -> Result<(), ParseErrorKind> {
    let device = &mut file.device;
    let hw = &mut file.hardware;

    match (section, key) {
        (Section::Device, "client_id") => {
            // An explicit prefix wins regardless of key order
            let prefix = device.topic_prefix.clone();
            device
                .set_client_id(string(value)?)
                .map_err(ParseErrorKind::InvalidValue)?;
            if prefix_set {
                device.topic_prefix = prefix;
            }
        }
        (Section::Device, "topic_prefix") => device
            .set_topic_prefix(string(value)?)
            .map_err(ParseErrorKind::InvalidValue)?,
        (Section::Device, "firmware_version") => device
            .set_firmware_version(string(value)?)
            .map_err(ParseErrorKind::InvalidValue)?,

        (Section::Motor, "wiring") => {
            hw.wiring = MotorWiring::parse(string(value)?).map_err(ParseErrorKind::InvalidValue)?
        }
        (Section::Motor, "relay_a") => hw.relay_a = pin(value)?,
        (Section::Motor, "relay_b") => hw.relay_b = pin(value)?,

        (Section::Pins, "audio_relay") => hw.audio_relay = pin(value)?,
        (Section::Pins, "end_sensor") => hw.end_sensor = pin(value)?,
        (Section::Pins, "button") => hw.button = pin(value)?,

        (Section::Bridge, "tx") => hw.bridge_tx = pin(value)?,
        (Section::Bridge, "rx") => hw.bridge_rx = pin(value)?,
        (Section::Bridge, "baud") => hw.bridge_baud = integer(value)?,

        (Section::Timing, _) => apply_timing(&mut device.timing, key, value)?,

        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

fn apply_timing(timing: &mut TimingConfig, key: &str, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        "tick_ms" => timing.tick_ms = integer(value)?,
        "button_debounce_ms" => timing.button_debounce_ms = integer(value)?,
        "end_sensor_debounce_ms" => timing.end_sensor_debounce_ms = integer(value)?,
        "settle_ms" => timing.settle_ms = integer(value)?,
        "rolling_timeout_ms" => timing.rolling_timeout_ms = integer(value)?,
        "reconnect_interval_ms" => timing.reconnect_interval_ms = integer(value)?,
        "liveness_timeout_ms" => timing.liveness_timeout_ms = integer(value)?,
        "update_timeout_ms" => timing.update_timeout_ms = integer(value)?,
        "update_failure_hold_ms" => timing.update_failure_hold_ms = integer(value)?,
        "restart_grace_ms" => timing.restart_grace_ms = integer(value)?,
        "watchdog_timeout_ms" => timing.watchdog_timeout_ms = integer(value)?,
        "event_ttl_ms" => timing.event_ttl_ms = integer(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Living room blind
[device]
client_id = "roller-lr"   # trailing comment

[motor]
wiring = "power_direction"
relay_a = "gpio20"
relay_b = "!gpio21"

[pins]
end_sensor = "gpio14"
button = "^!gpio15"

[bridge]
baud = 230_400

[timing]
settle_ms = 500
rolling_timeout_ms = 45000
"#;

    #[test]
    fn test_parse_sample() {
        let file = parse_config(SAMPLE).unwrap();
        assert_eq!(file.device.client_id.as_str(), "roller-lr");
        assert_eq!(file.device.topic_prefix.as_str(), "dev/roller-lr");
        assert_eq!(file.hardware.wiring, MotorWiring::PowerDirection);
        assert_eq!(file.hardware.relay_b, PinConfig::inverted(21));
        assert_eq!(file.hardware.bridge_baud, 230_400);
        assert_eq!(file.device.timing.settle_ms, 500);
        assert_eq!(file.device.timing.rolling_timeout_ms, 45_000);
        // Untouched values keep their defaults
        assert_eq!(file.device.timing.reconnect_interval_ms, 5_000);
        assert_eq!(file.hardware.audio_relay, PinConfig::new(18));
    }

    #[test]
    fn test_polarity_follows_pins() {
        let file = parse_config(SAMPLE).unwrap();
        assert!(!file.device.polarity.end_sensor_active_low);
        assert!(file.device.polarity.button_active_low);
    }

    #[test]
    fn test_explicit_prefix_wins_over_client_id() {
        let input = "[device]\ntopic_prefix = \"home/blinds/\"\nclient_id = \"x\"\n";
        let file = parse_config(input).unwrap();
        assert_eq!(file.device.client_id.as_str(), "x");
        assert_eq!(file.device.topic_prefix.as_str(), "home/blinds");
    }

    #[test]
    fn test_hash_inside_string_is_kept() {
        let input = "[device]\nfirmware_version = \"1.0#rc\"\n";
        let file = parse_config(input).unwrap();
        assert_eq!(file.device.firmware_version.as_str(), "1.0#rc");
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse_config("[device]\n\n[lights]\n"),
            Err(ParseError {
                line: 3,
                kind: ParseErrorKind::InvalidSection
            })
        );
        assert_eq!(
            parse_config("[timing]\nsettle_ms\n").map(|_| ()),
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::Syntax
            })
        );
        assert_eq!(
            parse_config("[pins]\nrelay_a = \"gpio3\"\n").map(|_| ()),
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::UnknownKey
            })
        );
        assert_eq!(
            parse_config("[timing]\nsettle_ms = fast\n").map(|_| ()),
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::InvalidValue(ConfigError::Invalid)
            })
        );
        assert_eq!(
            parse_config("[pins]\nbutton = \"gpio40\"\n").map(|_| ()),
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::InvalidValue(ConfigError::OutOfRange)
            })
        );
    }
}
