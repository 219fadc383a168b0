//! Configuration types for the SND system
//!
//! This module defines all configuration structures used throughout the crate.
//! A [`SndConfig`] is built once at process start and passed into the provider
//! and store constructors; nothing here reads the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Prefix of every store file name
pub const STORE_FILE_PREFIX: &str = "snd_";

/// Extension of every store file name
pub const STORE_FILE_EXT: &str = "json";

/// Main SND configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SndConfig {
    /// Region (server) this invocation works against
    pub region: Region,

    /// Provider configuration
    pub provider: ProviderConfig,

    /// History store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl SndConfig {
    /// Create a new configuration for a region with defaults
    pub fn new(region: Region, api_key: impl Into<String>) -> Self {
        Self {
            region,
            provider: ProviderConfig::new(api_key),
            store: StoreConfig::default(),
        }
    }

    /// Set the store configuration
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.store.validate()?;
        Ok(())
    }

    /// Path of the store file for this configuration's region, if file-backed
    pub fn store_path(&self) -> Option<PathBuf> {
        match &self.store {
            StoreConfig::File { dir } => Some(dir.join(self.region.store_file_name())),
            StoreConfig::Memory => None,
        }
    }
}

/// Game region (server), one history store per region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Br,
    Eune,
    Euw,
    Jp,
    Kr,
    Lan,
    Las,
    Na,
    Oce,
    Tr,
    Ru,
    Pbe,
}

impl Region {
    /// Every supported region
    pub const ALL: [Region; 12] = [
        Region::Br,
        Region::Eune,
        Region::Euw,
        Region::Jp,
        Region::Kr,
        Region::Lan,
        Region::Las,
        Region::Na,
        Region::Oce,
        Region::Tr,
        Region::Ru,
        Region::Pbe,
    ];

    /// Short identifier used on the command line and in store file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Br => "br",
            Region::Eune => "eune",
            Region::Euw => "euw",
            Region::Jp => "jp",
            Region::Kr => "kr",
            Region::Lan => "lan",
            Region::Las => "las",
            Region::Na => "na",
            Region::Oce => "oce",
            Region::Tr => "tr",
            Region::Ru => "ru",
            Region::Pbe => "pbe",
        }
    }

    /// Platform API host for this region
    pub fn api_host(&self) -> &'static str {
        match self {
            Region::Br => "br1.api.riotgames.com",
            Region::Eune => "eun1.api.riotgames.com",
            Region::Euw => "euw1.api.riotgames.com",
            Region::Jp => "jp1.api.riotgames.com",
            Region::Kr => "kr.api.riotgames.com",
            Region::Lan => "la1.api.riotgames.com",
            Region::Las => "la2.api.riotgames.com",
            Region::Na => "na1.api.riotgames.com",
            Region::Oce => "oc1.api.riotgames.com",
            Region::Tr => "tr1.api.riotgames.com",
            Region::Ru => "ru.api.riotgames.com",
            Region::Pbe => "pbe1.api.riotgames.com",
        }
    }

    /// Subdomain of the ladder site for this region (Korea lives on `www`)
    pub fn ladder_subdomain(&self) -> &'static str {
        match self {
            Region::Kr => "www",
            other => other.as_str(),
        }
    }

    /// File name of this region's history store
    pub fn store_file_name(&self) -> String {
        format!("{}{}.{}", STORE_FILE_PREFIX, self.as_str(), STORE_FILE_EXT)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Region::ALL
            .iter()
            .copied()
            .find(|region| region.as_str() == lower)
            .ok_or_else(|| {
                crate::Error::config(format!(
                    "Unknown server '{}'. Supported servers: {}",
                    s,
                    Region::ALL.map(|r| r.as_str()).join(", ")
                ))
            })
    }
}

/// API key tier, which determines the provider's request ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyTier {
    /// Development key: 20 requests/second, 100 requests/2 minutes
    Development,
    /// Production key: 50 requests/second
    #[default]
    Production,
}

impl KeyTier {
    /// Minimum delay enforced after every provider request
    pub fn request_interval(&self) -> Duration {
        match self {
            KeyTier::Development => Duration::from_millis(1400),
            KeyTier::Production => Duration::from_millis(80),
        }
    }
}

impl FromStr for KeyTier {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(KeyTier::Development),
            "production" | "prod" => Ok(KeyTier::Production),
            other => Err(crate::Error::config(format!(
                "Unknown key tier '{}'. Supported tiers: development, production",
                other
            ))),
        }
    }
}

/// Provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,

    /// Key tier (drives the default request interval)
    #[serde(default)]
    pub key_tier: KeyTier,

    /// Explicit request interval in milliseconds, overriding the key tier
    #[serde(default)]
    pub request_interval_ms: Option<u64>,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// The API key must never end up in logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<REDACTED>")
            .field("key_tier", &self.key_tier)
            .field("request_interval_ms", &self.request_interval_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a provider configuration with a production key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            key_tier: KeyTier::default(),
            request_interval_ms: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the key tier
    pub fn with_key_tier(mut self, key_tier: KeyTier) -> Self {
        self.key_tier = key_tier;
        self
    }

    /// Override the request interval
    pub fn with_request_interval_ms(mut self, interval_ms: u64) -> Self {
        self.request_interval_ms = Some(interval_ms);
        self
    }

    /// Delay enforced after every provider request
    pub fn request_interval(&self) -> Duration {
        self.request_interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.key_tier.request_interval())
    }

    /// HTTP request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("API key cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("HTTP timeout must be > 0"));
        }
        Ok(())
    }
}

/// History store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// JSON file per region inside `dir`
    File {
        /// Directory holding the `snd_<region>.json` files
        dir: PathBuf,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { dir } if dir.as_os_str().is_empty() => {
                Err(crate::Error::config("Store directory cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            dir: PathBuf::from("."),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
