use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

use crate::elements::DEFAULT_SOURCE_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub elements: ElementsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementsConfig {
    /// `http(s)://` feed URL, `file://` URL or plain path
    #[serde(default = "default_source_url")]
    pub source_url: String,
    #[serde(
        default = "default_fetch_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub fetch_timeout: Duration,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(15)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_use_defaults() {
        let config = Config::from_yaml("web: {}\n").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:5000");
        assert_eq!(config.elements.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.elements.fetch_timeout, Duration::from_secs(15));
    }

    #[test]
    fn reads_all_fields() {
        let yaml = r#"
web:
  bind: "127.0.0.1:8080"
elements:
  source_url: "file:///var/lib/tle/stations.txt"
  fetch_timeout: "2m 30s"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.web.bind, "127.0.0.1:8080");
        assert_eq!(config.elements.source_url, "file:///var/lib/tle/stations.txt");
        assert_eq!(config.elements.fetch_timeout, Duration::from_secs(150));
    }

    #[test]
    fn rejects_bad_duration() {
        let yaml = "elements:\n  fetch_timeout: \"soon\"\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }
}
