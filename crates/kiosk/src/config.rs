//! Kiosk configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use domain::DEFAULT_DEMO_TABLE;

/// Kiosk configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `SUBMIT_LATENCY_MS`: simulated order submission delay (default: `1500`)
/// - `DEMO_TABLE`: table code accepted without scanning (default: `"Demo-123"`)
/// - `MENU_PATH`: JSON menu file (default: built-in demo menu)
/// - `SCAN_FRAMES`: decodes the simulated camera reports per scan (default: `3`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `json` for JSON log lines, anything else for text
#[derive(Debug, Clone)]
pub struct Config {
    pub submit_latency: Duration,
    pub demo_table: String,
    pub menu_path: Option<PathBuf>,
    pub scan_frames: u32,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            submit_latency: lookup("SUBMIT_LATENCY_MS")
                .and_then(|ms| ms.trim().parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.submit_latency),
            demo_table: lookup("DEMO_TABLE")
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(defaults.demo_table),
            menu_path: lookup("MENU_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            scan_frames: lookup("SCAN_FRAMES")
                .and_then(|n| n.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.scan_frames),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_json: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submit_latency: Duration::from_millis(1500),
            demo_table: DEFAULT_DEMO_TABLE.to_string(),
            menu_path: None,
            scan_frames: 3,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.submit_latency, Duration::from_millis(1500));
        assert_eq!(config.demo_table, "Demo-123");
        assert!(config.menu_path.is_none());
        assert_eq!(config.scan_frames, 3);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.submit_latency, Duration::from_millis(1500));
        assert_eq!(config.demo_table, "Demo-123");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SUBMIT_LATENCY_MS", "250"),
            ("DEMO_TABLE", "Walk-In"),
            ("MENU_PATH", "/etc/qr-order/menu.json"),
            ("SCAN_FRAMES", "5"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.submit_latency, Duration::from_millis(250));
        assert_eq!(config.demo_table, "Walk-In");
        assert_eq!(
            config.menu_path,
            Some(PathBuf::from("/etc/qr-order/menu.json"))
        );
        assert_eq!(config.scan_frames, 5);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("SUBMIT_LATENCY_MS", "soon"),
            ("DEMO_TABLE", "  "),
            ("SCAN_FRAMES", "0"),
        ]));
        assert_eq!(config.submit_latency, Duration::from_millis(1500));
        assert_eq!(config.demo_table, "Demo-123");
        assert_eq!(config.scan_frames, 3);
    }
}
