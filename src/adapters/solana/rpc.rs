use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

use crate::ports::{BalanceError, BalanceProvider};

/// Parse "processed" / "confirmed" / "finalized"
pub fn parse_commitment(level: &str) -> Option<CommitmentConfig> {
    CommitmentLevel::from_str(level)
        .ok()
        .map(|commitment| CommitmentConfig { commitment })
}

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, commitment));
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Get SOL balance in lamports for a public key
    pub async fn get_balance(&self, pubkey: &str) -> Result<u64, BalanceError> {
        let pubkey = Pubkey::from_str(pubkey)
            .map_err(|e| BalanceError::InvalidAddress(format!("{}: {}", pubkey, e)))?;

        // Spawn blocking to make sync RPC call async-compatible
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_balance(&pubkey)
                .map_err(|e| BalanceError::Rpc(e.to_string()))
        })
        .await
        .map_err(|e| BalanceError::Rpc(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl BalanceProvider for SolanaClient {
    async fn get_balance(&self, address: &str) -> Result<u64, BalanceError> {
        SolanaClient::get_balance(self, address).await
    }
}
