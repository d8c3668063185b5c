//! Harness configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use shakedown_transport::{TlsHandshakeConfig, CHANNEL_CAPACITY};

use crate::error::{HarnessError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Capacity of each direction's in-memory channel.
    pub channel_capacity: usize,
    pub tls: TlsHandshakeConfig,
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self {
            channel_capacity: CHANNEL_CAPACITY,
            tls: TlsHandshakeConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(HarnessError::Config {
                reason: "channel_capacity must be greater than zero".to_string(),
            });
        }
        if self.tls.rng_seed.is_empty() {
            return Err(HarnessError::Config {
                reason: "tls.rng_seed must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Loads a `.toml` or `.json` config file, picked by extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let config: HarnessConfig = match ext.to_lowercase().as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| HarnessError::Config {
                reason: e.to_string(),
            })?,
            "json" => serde_json::from_str(&contents).map_err(|e| HarnessError::Config {
                reason: e.to_string(),
            })?,
            _ => return Err(HarnessError::UnsupportedConfigFormat(ext.to_string())),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.channel_capacity, 16384);
        assert_eq!(config.tls.rng_seed, "test");
        assert_eq!(config.tls.credential.identity, "42");
        assert_eq!(config.tls.credential.secret, "galaxy");
        assert_eq!(config.tls.server_name, "localhost");
        assert!(config.tls.identity_pem.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = HarnessConfig {
            channel_capacity: 0,
            ..HarnessConfig::default()
        };
        assert!(matches!(config.validate(), Err(HarnessError::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_seed() {
        let mut config = HarnessConfig::default();
        config.tls.rng_seed.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_toml() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
channel_capacity = 4096

[tls]
rng_seed = "replay"
server_name = "fuzz.example"

[tls.credential]
identity = "7"
"#
        )
        .unwrap();

        let config = HarnessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.channel_capacity, 4096);
        assert_eq!(config.tls.rng_seed, "replay");
        assert_eq!(config.tls.server_name, "fuzz.example");
        assert_eq!(config.tls.credential.identity, "7");
        assert_eq!(config.tls.credential.secret, "galaxy");
    }

    #[test]
    fn test_from_file_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{ "channel_capacity": 1024 }}"#).unwrap();

        let config = HarnessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.tls, TlsHandshakeConfig::default());
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let file = NamedTempFile::with_suffix(".yaml").unwrap();
        assert!(matches!(
            HarnessConfig::from_file(file.path()),
            Err(HarnessError::UnsupportedConfigFormat(_))
        ));
    }

    #[test]
    fn test_from_file_validates() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{ "channel_capacity": 0 }}"#).unwrap();
        assert!(HarnessConfig::from_file(file.path()).is_err());
    }
}
