//! Wallet SDK port.
//!
//! The passkey wallet is an opaque capability provider: it connects,
//! disconnects, signs, and exposes observable `connected` / `address` /
//! `error` fields that may settle some time after `connect()` resolves.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletSdkError {
    #[error("Wallet rejected the request: {0}")]
    Rejected(String),

    #[error("Request cancelled by user")]
    Cancelled,

    #[error("Wallet request timed out")]
    Timeout,

    #[error("Wallet unavailable: {0}")]
    Unavailable(String),
}

/// Observable wallet fields at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub connected: bool,
    pub address: Option<String>,
    pub error: Option<String>,
}

impl WalletSnapshot {
    pub fn ready(address: impl Into<String>) -> Self {
        Self {
            connected: true,
            address: Some(address.into()),
            error: None,
        }
    }

    /// Connected with a non-empty address
    pub fn is_ready(&self) -> bool {
        self.connected && self.address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

#[async_trait]
pub trait WalletSdk: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Start authentication. Resolving does not imply `snapshot()` is ready.
    async fn connect(&self) -> Result<(), WalletSdkError>;

    async fn disconnect(&self) -> Result<(), WalletSdkError>;

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletSdkError>;

    fn snapshot(&self) -> WalletSnapshot;
}
