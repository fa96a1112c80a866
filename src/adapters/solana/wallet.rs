use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::ports::{WalletSdk, WalletSdkError, WalletSnapshot};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
}

/// Wallet backed by a local Solana keypair file.
///
/// Stands in for the passkey SDK: `connect()` flips the wallet to connected
/// and the address is observable immediately afterwards.
pub struct KeypairWallet {
    keypair: Keypair,
    connected: AtomicBool,
}

impl KeypairWallet {
    /// Load keypair from a file path (JSON array format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| WalletError::LoadError(format!("Failed to read file: {}", e)))?;

        // Parse JSON array of bytes
        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair =
            Keypair::try_from(bytes).map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;

        Ok(Self::from_keypair(keypair))
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            connected: AtomicBool::new(false),
        }
    }

    /// Create a new random keypair (for testing)
    pub fn new_random() -> Self {
        Self::from_keypair(Keypair::new())
    }

    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.keypair.to_bytes().to_vec()
    }
}

#[async_trait]
impl WalletSdk for KeypairWallet {
    fn name(&self) -> &str {
        "keypair"
    }

    async fn connect(&self) -> Result<(), WalletSdkError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletSdkError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletSdkError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletSdkError::Unavailable("wallet not connected".to_string()));
        }
        Ok(self.keypair.sign_message(message).as_ref().to_vec())
    }

    fn snapshot(&self) -> WalletSnapshot {
        if self.connected.load(Ordering::SeqCst) {
            WalletSnapshot::ready(self.public_key())
        } else {
            WalletSnapshot::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_random_wallet() {
        let wallet = KeypairWallet::new_random();
        let pubkey = wallet.public_key();
        assert!(!pubkey.is_empty());
        assert_eq!(pubkey, wallet.pubkey().to_string());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let wallet1 = KeypairWallet::new_random();

        let json = serde_json::to_string(&wallet1.to_bytes()).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let wallet2 = KeypairWallet::from_file(temp_file.path()).unwrap();
        assert_eq!(wallet1.public_key(), wallet2.public_key());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(KeypairWallet::from_bytes(&[0u8; 10]).is_err());

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not valid json").unwrap();
        temp_file.flush().unwrap();
        assert!(matches!(
            KeypairWallet::from_file(temp_file.path()),
            Err(WalletError::LoadError(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_and_sign() {
        let wallet = KeypairWallet::new_random();
        assert!(!wallet.snapshot().is_ready());
        assert!(wallet.sign_message(b"hi").await.is_err());

        wallet.connect().await.unwrap();
        assert_eq!(wallet.snapshot(), WalletSnapshot::ready(wallet.public_key()));

        let signature = wallet.sign_message(b"Hello, Solana!").await.unwrap();
        assert_eq!(signature.len(), 64);

        wallet.disconnect().await.unwrap();
        assert!(!wallet.snapshot().connected);
    }
}
