//! Runtime configuration for stratux-core consumers.
//!
//! Reads `~/.stratux-feed/config.yaml` (or an explicit path) holding the hub
//! host, the traffic stale timeout, and the traffic display filter. The file
//! is only ever read; nothing here writes configuration back.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::tracker::{TrafficFilter, STALE_TIMEOUT};
use crate::types::{Channel, Result, StratuxError};

/// Default hub address on its own Wi-Fi network.
pub const DEFAULT_HUB_HOST: &str = "192.168.10.1";

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub hub: HubConfig,
    pub traffic: TrafficConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficConfig {
    pub stale_timeout: f64,
    pub filter: TrafficFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hub: HubConfig {
                host: DEFAULT_HUB_HOST.into(),
            },
            traffic: TrafficConfig {
                stale_timeout: STALE_TIMEOUT,
                filter: TrafficFilter::All,
            },
        }
    }
}

impl HubConfig {
    /// Websocket URL of one hub stream.
    pub fn url(&self, channel: Channel) -> String {
        format!("ws://{}/{}", self.host, channel.name())
    }
}

/// Get the config directory path (`~/.stratux-feed/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".stratux-feed")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from the default location.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config() -> Config {
    let path = config_file();
    if !path.exists() {
        return Config::default();
    }
    load_config_from(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring unreadable config");
        Config::default()
    })
}

/// Load config from an explicit path. A missing file is an error here.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| StratuxError::Config(format!("{}: {e}", path.display())))?;
    Ok(parse_config(&text))
}

/// Parse simple YAML-like config text. Bad values keep their defaults.
pub fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
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
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }

        match (current_section.as_deref(), key) {
            (Some("hub"), "host") => {
                if let Some(v) = parse_string_value(val) {
                    config.hub.host = v;
                }
            }
            (Some("traffic"), "stale_timeout") => match parse_float_value(val) {
                Some(v) if v > 0.0 => config.traffic.stale_timeout = v,
                _ => warn!(value = val, "invalid traffic.stale_timeout, keeping default"),
            },
            (Some("traffic"), "filter") => {
                match parse_string_value(val).map(|v| v.parse::<TrafficFilter>()) {
                    Some(Ok(filter)) => config.traffic.filter = filter,
                    _ => warn!(value = val, "invalid traffic.filter, keeping default"),
                }
            }
            _ => {}
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"') && val.len() >= 2)
        || (val.starts_with('\'') && val.ends_with('\'') && val.len() >= 2)
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok().filter(|v: &f64| v.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.hub.host, "192.168.10.1");
        assert_eq!(config.traffic.stale_timeout, 60.0);
        assert_eq!(config.traffic.filter, TrafficFilter::All);
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
# cockpit tablet
hub:
  host: "10.0.0.5"

traffic:
  stale_timeout: 30.5
  filter: positioned
"#;
        let config = parse_config(text);
        assert_eq!(config.hub.host, "10.0.0.5");
        assert_eq!(config.traffic.stale_timeout, 30.5);
        assert_eq!(config.traffic.filter, TrafficFilter::PositionedOnly);
    }

    #[test]
    fn test_parse_config_bad_values_keep_defaults() {
        let text = r#"
hub:
  host: null
traffic:
  stale_timeout: -4
  filter: sometimes
"#;
        let config = parse_config(text);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_keys_outside_section_ignored() {
        let text = "host: 1.2.3.4\nstale_timeout: 5\n";
        assert_eq!(parse_config(text), Config::default());
    }

    #[test]
    fn test_hub_url() {
        let hub = HubConfig {
            host: "192.168.10.1".into(),
        };
        assert_eq!(hub.url(Channel::Traffic), "ws://192.168.10.1/traffic");
        assert_eq!(hub.url(Channel::Situation), "ws://192.168.10.1/situation");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "traffic:\n  stale_timeout: 45\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.traffic.stale_timeout, 45.0);
        assert_eq!(config.hub.host, DEFAULT_HUB_HOST);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(StratuxError::Config(_))));
    }
}
