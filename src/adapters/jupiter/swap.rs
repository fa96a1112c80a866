//! Jupiter Swap Types
//!
//! Request and response structures for the Jupiter V6 swap API.

use serde::{Deserialize, Serialize};

use crate::ports::SwapPayload;

/// Body of `POST /swap`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// User's public key (wallet address)
    pub user_public_key: String,
    /// The full quote response from /quote
    pub quote_response: serde_json::Value,
    /// Wrap SOL into wSOL on input and unwrap on output
    #[serde(default = "default_true")]
    pub wrap_and_unwrap_sol: bool,
    #[serde(default = "default_true")]
    pub dynamic_compute_unit_limit: bool,
}

fn default_true() -> bool {
    true
}

impl SwapRequest {
    pub fn new(user_public_key: String, quote_response: serde_json::Value) -> Self {
        Self {
            user_public_key,
            quote_response,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 encoded serialized transaction ready to sign
    pub swap_transaction: String,
    #[serde(default)]
    pub last_valid_block_height: u64,
    /// Transaction id when the API already knows it
    #[serde(default)]
    pub txid: Option<String>,
}

impl From<SwapResponse> for SwapPayload {
    fn from(response: SwapResponse) -> Self {
        Self {
            txid: response.txid.filter(|t| !t.is_empty()),
            transaction: response.swap_transaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_request_serialization() {
        let req = SwapRequest::new(
            "Wallet1111".to_string(),
            serde_json::json!({ "outAmount": "1" }),
        );
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["userPublicKey"], "Wallet1111");
        assert_eq!(json["wrapAndUnwrapSol"], true);
        assert_eq!(json["quoteResponse"]["outAmount"], "1");
    }

    #[test]
    fn test_swap_response_to_payload() {
        let response: SwapResponse = serde_json::from_str(
            r#"{"swapTransaction": "AQIDBA==", "lastValidBlockHeight": 279632475}"#,
        )
        .unwrap();
        let payload = SwapPayload::from(response);

        assert_eq!(payload.txid, None);
        assert_eq!(payload.transaction, "AQIDBA==");

        let response: SwapResponse =
            serde_json::from_str(r#"{"swapTransaction": "AQ==", "txid": "abc"}"#).unwrap();
        assert_eq!(SwapPayload::from(response).txid.as_deref(), Some("abc"));
    }
}
