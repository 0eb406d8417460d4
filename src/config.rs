//! Bridge configuration (`astbridge.toml`)

use crate::errors::{BridgeError, Result};
use crate::logging::{parse_level, LogConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up by [`BridgeConfig::discover`]
pub const CONFIG_FILE: &str = "astbridge.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "ASTBRIDGE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub calls: CallConfig,

    #[serde(default)]
    pub resources: ResourceConfig,

    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallConfig {
    /// Verify every incoming handle is still live before the backend sees it
    #[serde(default = "default_true")]
    pub check_liveness: bool,

    /// Log the duration of every call
    #[serde(default = "default_false")]
    pub time_calls: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "default_true")]
    pub report_leaks: bool,

    /// Cap on live strings (and, separately, live sequences)
    #[serde(default)]
    pub max_live: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub json: bool,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default = "default_false")]
    pub spans: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self { check_liveness: true, time_calls: false }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self { report_leaks: true, max_live: None }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: default_level(), json: false, file: None, spans: false }
    }
}

fn default_true() -> bool { true }
fn default_false() -> bool { false }
fn default_level() -> String { "info".to_string() }

impl LogSettings {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: parse_level(&self.level),
            log_path: self.file.clone(),
            json_format: self.json,
            show_spans: self.spans,
            ..LogConfig::default()
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BridgeError::Config(format!("failed to parse config: {}", e)))
    }

    /// Find `astbridge.toml` in the current directory or its parents
    pub fn discover() -> Self {
        std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_from(&dir))
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Nearest `astbridge.toml` at or above `start`
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    /// `ASTBRIDGE_CONFIG` if set, discovery otherwise
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::discover()),
        }
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BridgeError::Config(format!("failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert!(config.calls.check_liveness);
        assert!(!config.calls.time_calls);
        assert!(config.resources.report_leaks);
        assert_eq!(config.resources.max_live, None);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[calls]
check_liveness = false
time_calls = true

[resources]
max_live = 64

[log]
level = "debug"
json = true
"#;

        let config = BridgeConfig::parse(toml).unwrap();
        assert!(!config.calls.check_liveness);
        assert!(config.calls.time_calls);
        assert!(config.resources.report_leaks);
        assert_eq!(config.resources.max_live, Some(64));

        let log = config.log.to_log_config();
        assert_eq!(log.level, crate::logging::Level::DEBUG);
        assert!(log.json_format);
        assert!(log.log_path.is_none());
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = BridgeConfig::parse("[calls]\ncheck_liveness = 3").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
        assert_eq!(err.code(), -14);
    }

    #[test]
    fn test_load_and_find_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let mut file = fs::File::create(dir.path().join(CONFIG_FILE)).unwrap();
        writeln!(file, "[calls]\ntime_calls = true").unwrap();

        let found = BridgeConfig::find_from(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
        assert!(BridgeConfig::load(&found).unwrap().calls.time_calls);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = BridgeConfig::default();
        config.resources.max_live = Some(8);
        let text = config.to_toml().unwrap();
        assert_eq!(BridgeConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
