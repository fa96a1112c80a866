//! Signature verification port.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Signature rejected by verifier")]
    Rejected,

    #[error("Verification failed: {0}")]
    Failed(String),
}

/// Checks that `signature` over `message` belongs to `address`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        address: &str,
    ) -> Result<bool, VerificationError>;
}
