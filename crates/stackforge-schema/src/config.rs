use crate::types::EngineId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("lock.ping_timeout_secs must be greater than zero")]
    ZeroPingTimeout,
    #[error("template.digest_algorithms must not be empty")]
    NoDigestAlgorithms,
}

/// Engine-wide settings, read from a TOML file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine identity; generated once when the config leaves it out.
    #[serde(default = "EngineId::generate")]
    pub engine_id: EngineId,
    #[serde(default)]
    pub lock: LockSection,
    #[serde(default)]
    pub template: TemplateSection,
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LockSection {
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,
}

impl Default for LockSection {
    fn default() -> Self {
        Self {
            ping_timeout_secs: default_ping_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TemplateSection {
    /// Hash algorithms the `digest` function may use.
    #[serde(default = "default_digest_algorithms")]
    pub digest_algorithms: Vec<String>,
}

impl Default for TemplateSection {
    fn default() -> Self {
        Self {
            digest_algorithms: default_digest_algorithms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Root of the file-backed store; in-memory stores are used when unset.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_ping_timeout() -> u64 {
    2
}

fn default_digest_algorithms() -> Vec<String> {
    ["md5", "sha1", "sha224", "sha256", "sha384", "sha512", "blake3"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_id: EngineId::generate(),
            lock: LockSection::default(),
            template: TemplateSection::default(),
            store: StoreSection::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock.ping_timeout_secs == 0 {
            return Err(ConfigError::ZeroPingTimeout);
        }
        if self.template.digest_algorithms.is_empty() {
            return Err(ConfigError::NoDigestAlgorithms);
        }
        Ok(())
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.lock.ping_timeout_secs)
    }

    pub fn engine_id(&self) -> &EngineId {
        &self.engine_id
    }
}

pub fn parse_config_str(input: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(input)?;
    config.validate()?;
    Ok(config)
}

pub fn parse_config_file(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let input = r#"
engine_id = "engine-a"

[lock]
ping_timeout_secs = 5

[template]
digest_algorithms = ["sha256"]

[store]
root = "/var/lib/stackforge"
"#;
        let config = parse_config_str(input).expect("should parse");
        assert_eq!(config.engine_id(), "engine-a");
        assert_eq!(config.ping_timeout(), Duration::from_secs(5));
        assert_eq!(config.template.digest_algorithms, vec!["sha256"]);
        assert_eq!(config.store.root, Some(PathBuf::from("/var/lib/stackforge")));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config_str("").expect("should parse");
        assert_eq!(config.ping_timeout(), Duration::from_secs(2));
        assert!(config
            .template
            .digest_algorithms
            .contains(&"sha256".to_owned()));
        assert!(config.store.root.is_none());
    }

    #[test]
    fn generated_engine_id_is_stable() {
        let config = parse_config_str("").expect("should parse");
        assert_eq!(config.engine_id(), config.engine_id());
        assert_eq!(config.clone().engine_id(), config.engine_id());
        assert!(uuid::Uuid::parse_str(config.engine_id()).is_ok());
        assert_ne!(
            config.engine_id(),
            parse_config_str("").expect("should parse").engine_id()
        );

        let fallback = EngineConfig::default();
        assert_eq!(fallback.engine_id(), fallback.engine_id());
    }

    #[test]
    fn rejects_unknown_fields() {
        let input = r"
[lock]
ping_timeout_secs = 2
retries = 3
";
        assert!(parse_config_str(input).is_err());
    }

    #[test]
    fn rejects_zero_ping_timeout() {
        let input = r"
[lock]
ping_timeout_secs = 0
";
        assert!(matches!(
            parse_config_str(input),
            Err(ConfigError::ZeroPingTimeout)
        ));
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stackforge.toml");
        fs::write(&path, "[lock]\nping_timeout_secs = 3\n").unwrap();
        let config = parse_config_file(&path).unwrap();
        assert_eq!(config.lock.ping_timeout_secs, 3);
    }
}
