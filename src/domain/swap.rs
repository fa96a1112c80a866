//! Swap Payloads and Receipts
//!
//! A prepared swap is the signable message returned by the aggregator (or a
//! local placeholder when it is unreachable). A receipt exists only for the
//! attempt that produced it.

use base64::Engine;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::source::DataSource;

/// Transaction id used when the aggregator returns none
pub const PENDING_TXID: &str = "pending_transaction";

/// Prefix of locally generated transaction ids
pub const MOCK_TXID_PREFIX: &str = "mock_transaction_id_";

/// Placeholder message signed in degraded mode ("Hello World")
pub const MOCK_SWAP_MESSAGE: &str = "SGVsbG8gV29ybGQ=";

const MOCK_TXID_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unsigned swap ready for the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedSwap {
    pub txid: String,
    /// Base64 encoded transaction or message
    pub message: String,
    pub source: DataSource,
}

impl PreparedSwap {
    pub fn live(txid: Option<String>, message: String) -> Self {
        Self {
            txid: txid.unwrap_or_else(|| PENDING_TXID.to_string()),
            message,
            source: DataSource::Live,
        }
    }

    /// Placeholder payload with a random id
    pub fn mock() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..MOCK_TXID_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();

        Self {
            txid: format!("{}{}", MOCK_TXID_PREFIX, suffix),
            message: MOCK_SWAP_MESSAGE.to_string(),
            source: DataSource::Fallback,
        }
    }

    /// Decoded bytes handed to the signer
    pub fn message_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.message)
    }
}

/// How a signature was confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationOutcome {
    Verified,
    /// Verification disabled by configuration
    Skipped,
}

/// Successful swap attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReceipt {
    pub txid: String,
    /// Base64 message that was signed
    pub message: String,
    pub signature: Vec<u8>,
    pub verification: VerificationOutcome,
    /// Provenance of the signed payload
    pub source: DataSource,
    pub input_symbol: String,
    pub output_symbol: String,
    pub input_amount: Decimal,
    pub completed_at: DateTime<Utc>,
}

impl SwapReceipt {
    pub fn signature_base58(&self) -> String {
        bs58::encode(&self.signature).into_string()
    }

    pub fn success_message(&self) -> String {
        format!("Swap successful! Transaction ID: {}", self.txid)
    }
}
