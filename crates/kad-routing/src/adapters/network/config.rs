use crate::domain::DhtConfig;
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider with hardcoded values.
///
/// Useful for testing and development. For production, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: DhtConfig,
}

impl StaticConfigProvider {
    /// Create with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with the specified config.
    #[must_use]
    pub fn with_config(mut self, config: DhtConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn get_dht_config(&self) -> DhtConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading (requires "config" feature)
// ============================================================================

#[cfg(feature = "config")]
mod toml_config {
    use super::*;
    use crate::domain::ConfigError;
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    /// Configuration file structure.
    #[derive(Debug, Deserialize)]
    struct ConfigFile {
        #[serde(default)]
        dht: DhtConfigFile,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct DhtConfigFile {
        refresh_interval_secs: Option<u64>,
        stale_threshold_secs: Option<u64>,
        max_peers: Option<usize>,
        k: Option<usize>,
        probe_timeout_ms: Option<u64>,
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [dht]
    /// refresh_interval_secs = 60
    /// stale_threshold_secs = 300
    /// max_peers = 1000
    /// k = 20
    /// probe_timeout_ms = 2000
    /// ```
    ///
    /// Missing keys take their default values.
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        config: DhtConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if the file cannot be read, parsed or validated.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                reason: e.to_string(),
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let defaults = DhtConfig::default();
            let dc = file.dht;
            let config = DhtConfig {
                refresh_interval: dc
                    .refresh_interval_secs
                    .map_or(defaults.refresh_interval, Duration::from_secs),
                stale_threshold: dc
                    .stale_threshold_secs
                    .map_or(defaults.stale_threshold, Duration::from_secs),
                max_peers: dc.max_peers.unwrap_or(defaults.max_peers),
                k: dc.k.unwrap_or(defaults.k),
                probe_timeout: dc
                    .probe_timeout_ms
                    .map_or(defaults.probe_timeout, Duration::from_millis),
            };
            config.validate()?;

            Ok(Self { config })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn get_dht_config(&self) -> DhtConfig {
            self.config.clone()
        }
    }
}

#[cfg(feature = "config")]
pub use toml_config::TomlConfigProvider;
