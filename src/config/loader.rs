//! Configuration Loader
//!
//! Loads and validates configuration from a TOML file. Every section is
//! optional and falls back to defaults.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::jupiter::{
    JupiterConfig, DEFAULT_QUOTE_API_URL, DEFAULT_SWAP_API_URL, DEFAULT_TOKEN_LIST_URL,
};
use crate::adapters::solana::parse_commitment;
use crate::application::{PollPolicy, SwapSettings};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jupiter: JupiterSection,
    #[serde(default)]
    pub solana: SolanaSection,
    #[serde(default)]
    pub connection: ConnectionSection,
    #[serde(default)]
    pub swap: SwapSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JupiterSection {
    /// Quote API base URL
    pub api_url: String,
    /// Swap API base URL
    pub swap_api_url: String,
    pub token_list_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Slippage tolerance in basis points (0.5% = 50 bps)
    pub slippage_bps: u16,
    pub timeout_secs: u64,
    /// Attempts per request
    pub max_retries: u32,
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_QUOTE_API_URL.to_string(),
            swap_api_url: DEFAULT_SWAP_API_URL.to_string(),
            token_list_url: DEFAULT_TOKEN_LIST_URL.to_string(),
            api_key: None,
            slippage_bps: 50,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolanaSection {
    pub rpc_url: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    pub commitment: String,
    /// Wallet keypair path (NEVER commit this file!)
    pub keypair_path: String,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            keypair_path: "~/.config/solana/id.json".to_string(),
        }
    }
}

impl SolanaSection {
    /// Keypair path with `~` and `$VARS` expanded
    pub fn expanded_keypair_path(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.keypair_path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.keypair_path.clone());
        PathBuf::from(expanded)
    }
}

/// Wallet readiness polling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            poll_interval_ms: policy.interval.as_millis() as u64,
            max_poll_attempts: policy.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwapSection {
    pub quote_debounce_ms: u64,
    /// Fallback quote jitter in percent (2.0 = ±2 %)
    pub fallback_jitter_pct: Decimal,
    pub require_verification: bool,
    /// 0 disables the timeout
    pub swap_timeout_secs: u64,
}

impl Default for SwapSection {
    fn default() -> Self {
        let settings = SwapSettings::default();
        Self {
            quote_debounce_ms: settings.quote_debounce.as_millis() as u64,
            fallback_jitter_pct: settings.fallback_jitter * Decimal::ONE_HUNDRED,
            require_verification: settings.require_verification,
            swap_timeout_secs: settings.swap_timeout.map_or(0, |t| t.as_secs()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file, apply env overrides and validate
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Apply `SOLANA_RPC_URL`, `SOLANA_KEYPAIR_PATH` and `JUPITER_API_KEY`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(url) = lookup("SOLANA_RPC_URL") {
            self.solana.rpc_url = url;
        }
        if let Some(path) = lookup("SOLANA_KEYPAIR_PATH") {
            self.solana.keypair_path = path;
        }
        // Config value wins for the API key
        if self.jupiter.api_key.as_deref().map_or(true, str::is_empty) {
            self.jupiter.api_key = lookup("JUPITER_API_KEY");
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("jupiter.api_url", &self.jupiter.api_url),
            ("jupiter.swap_api_url", &self.jupiter.swap_api_url),
            ("jupiter.token_list_url", &self.jupiter.token_list_url),
            ("solana.rpc_url", &self.solana.rpc_url),
        ] {
            if url.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        if self.jupiter.slippage_bps > 10_000 {
            return Err(ConfigError::ValidationError(format!(
                "slippage_bps must be 0-10000, got {}",
                self.jupiter.slippage_bps
            )));
        }

        if self.jupiter.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "max_retries must be > 0".to_string(),
            ));
        }

        if self.jupiter.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if parse_commitment(&self.solana.commitment).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "commitment must be processed, confirmed or finalized, got {:?}",
                self.solana.commitment
            )));
        }

        if self.solana.keypair_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "keypair_path cannot be empty".to_string(),
            ));
        }

        if self.connection.max_poll_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_poll_attempts must be > 0".to_string(),
            ));
        }

        if self.connection.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        let jitter = self.swap.fallback_jitter_pct;
        if jitter < Decimal::ZERO || jitter >= Decimal::ONE_HUNDRED {
            return Err(ConfigError::ValidationError(format!(
                "fallback_jitter_pct must be in [0, 100), got {}",
                jitter
            )));
        }

        Ok(())
    }
}

impl From<&Config> for PollPolicy {
    fn from(config: &Config) -> Self {
        PollPolicy::new(
            config.connection.max_poll_attempts,
            Duration::from_millis(config.connection.poll_interval_ms),
        )
    }
}

impl From<&Config> for SwapSettings {
    fn from(config: &Config) -> Self {
        SwapSettings {
            slippage_bps: config.jupiter.slippage_bps,
            quote_debounce: Duration::from_millis(config.swap.quote_debounce_ms),
            require_verification: config.swap.require_verification,
            swap_timeout: (config.swap.swap_timeout_secs > 0)
                .then(|| Duration::from_secs(config.swap.swap_timeout_secs)),
            fallback_jitter: config.swap.fallback_jitter_pct / Decimal::ONE_HUNDRED,
        }
    }
}

impl From<&Config> for JupiterConfig {
    fn from(config: &Config) -> Self {
        JupiterConfig {
            api_base_url: config.jupiter.api_url.trim_end_matches('/').to_string(),
            swap_api_url: config.jupiter.swap_api_url.trim_end_matches('/').to_string(),
            token_list_url: config.jupiter.token_list_url.clone(),
            api_key: config.jupiter.api_key.clone().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(config.jupiter.timeout_secs),
            max_retries: config.jupiter.max_retries,
        }
    }
}
