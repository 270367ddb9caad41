//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`TLS13_COMPAT_*`), applied as overrides
//! - CLI arguments (for the generator)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, Result};
use crate::program::{PskIdentity, DEFAULT_PSK_IDENTITY, DEFAULT_PSK_KEY};
use crate::suites::{GenerateOptions, TestSuite};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// PSK used by PSK handshakes
    #[serde(default)]
    pub psk: PskSettings,

    /// Test generation settings
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| CompatError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| CompatError::Config(format!("Failed to parse config: {e}")))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file location (`<config dir>/tls13-compat/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tls13-compat").join("config.toml"))
    }

    /// Read overrides from environment variables
    pub fn from_env() -> EnvOverrides {
        // Non-UTF-8 variables cannot be one of ours
        EnvOverrides::from_vars(
            std::env::vars_os().filter_map(|(name, value)| {
                Some((name.into_string().ok()?, value.into_string().ok()?))
            }),
        )
    }

    /// Apply overrides on top of this config. Every override that was set
    /// wins, even when it equals the default.
    pub fn merge(mut self, overrides: EnvOverrides) -> Self {
        if let Some(identity) = overrides.psk_identity {
            self.psk.identity = identity;
        }
        if let Some(key) = overrides.psk_key {
            self.psk.key = key;
        }
        if let Some(compat_mode) = overrides.compat_mode {
            self.generator.compat_mode = compat_mode;
        }
        self
    }

    /// Generation options derived from this config
    pub fn generate_options(&self) -> Result<GenerateOptions> {
        Ok(GenerateOptions {
            psk_identity: self.psk.to_identity()?,
            compat_mode: self.generator.compat_mode,
        })
    }
}

/// PSK identity override
pub const ENV_PSK_IDENTITY: &str = "TLS13_COMPAT_PSK_IDENTITY";
/// Hex-encoded PSK key
pub const ENV_PSK_KEY: &str = "TLS13_COMPAT_PSK_KEY";
/// Compat mode override (`true` / `false`)
pub const ENV_COMPAT_MODE: &str = "TLS13_COMPAT_MODE";

/// Settings taken from the environment; `None` means the variable was unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// From `TLS13_COMPAT_PSK_IDENTITY`
    pub psk_identity: Option<String>,
    /// From `TLS13_COMPAT_PSK_KEY`
    pub psk_key: Option<String>,
    /// From `TLS13_COMPAT_MODE`
    pub compat_mode: Option<bool>,
}

impl EnvOverrides {
    /// Collect overrides from `(name, value)` pairs
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut overrides = Self::default();
        for (name, value) in vars {
            match name.as_str() {
                ENV_PSK_IDENTITY => overrides.psk_identity = Some(value),
                ENV_PSK_KEY => overrides.psk_key = Some(value),
                ENV_COMPAT_MODE => match value.trim().parse() {
                    Ok(compat_mode) => overrides.compat_mode = Some(compat_mode),
                    Err(_) => tracing::warn!("ignoring {ENV_COMPAT_MODE}={value}"),
                },
                _ => {},
            }
        }
        overrides
    }
}

/// PSK identity and key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PskSettings {
    /// Identity string
    pub identity: String,

    /// Key, hex encoded
    pub key: String,
}

impl Default for PskSettings {
    fn default() -> Self {
        Self {
            identity: DEFAULT_PSK_IDENTITY.to_string(),
            key: hex::encode(DEFAULT_PSK_KEY),
        }
    }
}

impl PskSettings {
    /// Decode into a [`PskIdentity`]
    pub fn to_identity(&self) -> Result<PskIdentity> {
        if self.identity.is_empty() {
            return Err(CompatError::Config("PSK identity is empty".to_string()));
        }
        let key = hex::decode(&self.key)?;
        if key.is_empty() {
            return Err(CompatError::InvalidPskKey("key is empty".to_string()));
        }
        Ok(PskIdentity::new(self.identity.clone(), key))
    }
}

/// Test generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Middlebox compatibility mode for every generated handshake
    pub compat_mode: bool,

    /// Suites to generate when none are given on the command line
    /// (empty = all)
    pub suites: Vec<TestSuite>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            compat_mode: true,
            suites: Vec::new(),
        }
    }
}
