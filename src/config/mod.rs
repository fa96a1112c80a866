//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, Config, ConfigError, ConnectionSection, JupiterSection, LoggingSection,
    SolanaSection, SwapSection,
};
