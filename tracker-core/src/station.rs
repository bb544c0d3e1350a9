//! On-disk station configuration: receiver name, antenna position, and a
//! replay source path, loaded from `~/.mode-s-tracker/config.yaml`.
//!
//! Distinct from [`crate::config::TrackerConfig`] (the narrower,
//! already-validated slice the position updater and maintainer consult):
//! this is the human-edited file. The format is a flat, two-level
//! key/value subset — no external YAML crate, same hand-rolled parser
//! style as the reference codebase's own `~/.adsb-decode/config.yaml`.

use std::path::PathBuf;

use crate::error::{Result, TrackerError};

#[derive(Debug, Clone)]
pub struct StationConfig {
    pub receiver: ReceiverConfig,
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_range_m: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub source_path: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            receiver: ReceiverConfig {
                name: "default".into(),
                lat: None,
                lon: None,
                max_range_m: None,
            },
            replay: ReplayConfig { source_path: None },
        }
    }
}

/// `~/.mode-s-tracker/config.yaml`'s parent directory.
pub fn config_dir() -> PathBuf {
    home_dir().join(".mode-s-tracker")
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load from `~/.mode-s-tracker/config.yaml`, falling back to defaults if
/// the file is absent.
pub fn load_config() -> StationConfig {
    let path = config_file();
    if !path.exists() {
        return StationConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(text) => parse_config(&text).unwrap_or_default(),
        Err(_) => StationConfig::default(),
    }
}

pub fn save_config(config: &StationConfig) -> Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(TrackerError::Io)?;
    let path = config_file();
    std::fs::write(&path, serialize_config(config)).map_err(TrackerError::Io)?;
    Ok(path)
}

fn parse_config(text: &str) -> Option<StationConfig> {
    let mut config = StationConfig::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = if val.is_empty() { Some(key.to_string()) } else { None };
            continue;
        }

        let Some(section) = current_section.as_deref() else {
            continue;
        };
        match (section, key) {
            ("receiver", "name") => {
                if let Some(v) = parse_string_value(val) {
                    config.receiver.name = v;
                }
            }
            ("receiver", "lat") => config.receiver.lat = parse_float_value(val),
            ("receiver", "lon") => config.receiver.lon = parse_float_value(val),
            ("receiver", "max_range_m") => config.receiver.max_range_m = parse_float_value(val),
            ("replay", "source_path") => config.replay.source_path = parse_string_value(val),
            _ => {}
        }
    }

    Some(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"')) || (val.starts_with('\'') && val.ends_with('\'')) {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

fn serialize_config(config: &StationConfig) -> String {
    let mut lines = vec!["# mode-s-tracker station configuration".to_string(), String::new()];

    lines.push("receiver:".into());
    lines.push(format!("  name: \"{}\"", config.receiver.name));
    match config.receiver.lat {
        Some(v) => lines.push(format!("  lat: {v}")),
        None => lines.push("  lat: null".into()),
    }
    match config.receiver.lon {
        Some(v) => lines.push(format!("  lon: {v}")),
        None => lines.push("  lon: null".into()),
    }
    match config.receiver.max_range_m {
        Some(v) => lines.push(format!("  max_range_m: {v}")),
        None => lines.push("  max_range_m: null".into()),
    }
    lines.push(String::new());

    lines.push("replay:".into());
    match &config.replay.source_path {
        Some(p) => lines.push(format!("  source_path: \"{p}\"")),
        None => lines.push("  source_path: null".into()),
    }

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_location() {
        let config = StationConfig::default();
        assert_eq!(config.receiver.name, "default");
        assert!(config.receiver.lat.is_none());
    }

    #[test]
    fn parses_a_populated_file() {
        let text = r#"
receiver:
  name: "rooftop"
  lat: 52.25
  lon: 3.92
  max_range_m: 400000

replay:
  source_path: "/var/log/mode-s/capture.jsonl"
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.receiver.name, "rooftop");
        assert_eq!(config.receiver.lat, Some(52.25));
        assert_eq!(config.receiver.lon, Some(3.92));
        assert_eq!(config.receiver.max_range_m, Some(400000.0));
        assert_eq!(config.replay.source_path, Some("/var/log/mode-s/capture.jsonl".into()));
    }

    #[test]
    fn parses_null_values_as_none() {
        let text = "receiver:\n  name: \"test\"\n  lat: null\n  lon: ~\n";
        let config = parse_config(text).unwrap();
        assert!(config.receiver.lat.is_none());
        assert!(config.receiver.lon.is_none());
    }

    #[test]
    fn round_trips_through_serialize_and_parse() {
        let config = StationConfig {
            receiver: ReceiverConfig {
                name: "test".into(),
                lat: Some(52.25),
                lon: Some(3.92),
                max_range_m: Some(250_000.0),
            },
            replay: ReplayConfig {
                source_path: Some("capture.jsonl".into()),
            },
        };
        let text = serialize_config(&config);
        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed.receiver.name, "test");
        assert_eq!(parsed.receiver.lat, Some(52.25));
        assert_eq!(parsed.replay.source_path, Some("capture.jsonl".into()));
    }
}
