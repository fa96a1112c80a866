//! Balance query port.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Invalid public key: {0}")]
    InvalidAddress(String),

    #[error("RPC request failed: {0}")]
    Rpc(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Native balance in the smallest unit (lamports)
    async fn get_balance(&self, address: &str) -> Result<u64, BalanceError>;
}
