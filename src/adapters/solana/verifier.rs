use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::str::FromStr;

use crate::ports::{SignatureVerifier, VerificationError};

/// Checks ed25519 signatures against a base58 Solana address
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

#[async_trait]
impl SignatureVerifier for Ed25519Verifier {
    async fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        address: &str,
    ) -> Result<bool, VerificationError> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|e| VerificationError::Failed(format!("Invalid address {}: {}", address, e)))?;

        let Ok(signature) = Signature::try_from(signature) else {
            tracing::debug!("Signature has {} bytes, expected 64", signature.len());
            return Ok(false);
        };

        Ok(signature.verify(pubkey.as_ref(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::{Keypair, Signer};

    #[tokio::test]
    async fn test_valid_signature() {
        let keypair = Keypair::new();
        let message = b"swap payload";
        let signature = keypair.sign_message(message);

        let verified = Ed25519Verifier
            .verify(signature.as_ref(), message, &keypair.pubkey().to_string())
            .await
            .unwrap();
        assert!(verified);
    }

    #[tokio::test]
    async fn test_tampered_message() {
        let keypair = Keypair::new();
        let signature = keypair.sign_message(b"swap payload");

        let verified = Ed25519Verifier
            .verify(signature.as_ref(), b"swap payloaD", &keypair.pubkey().to_string())
            .await
            .unwrap();
        assert!(!verified);
    }

    #[tokio::test]
    async fn test_wrong_signer_and_malformed_input() {
        let keypair = Keypair::new();
        let other = Keypair::new();
        let signature = keypair.sign_message(b"msg");
        let address = other.pubkey().to_string();

        assert_eq!(
            Ed25519Verifier.verify(signature.as_ref(), b"msg", &address).await,
            Ok(false)
        );
        assert_eq!(Ed25519Verifier.verify(b"short", b"msg", &address).await, Ok(false));
        assert!(matches!(
            Ed25519Verifier.verify(signature.as_ref(), b"msg", "bad").await,
            Err(VerificationError::Failed(_))
        ));
    }
}
