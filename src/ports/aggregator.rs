//! Swap aggregator port.
//!
//! Token list, quote and swap-prepare endpoints of a DEX aggregator. Callers
//! are expected to mask failures with local fallbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TokenDescriptor;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl AggregatorError {
    /// Worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            AggregatorError::Network(_) | AggregatorError::RateLimited => true,
            AggregatorError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Quote request in base units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteParams {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    /// 1 = 0.01%
    pub slippage_bps: u16,
}

/// Aggregator's answer to a quote request
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorQuote {
    /// Output in base units of the output token
    pub out_amount: u64,
    pub price_impact_pct: f64,
    /// DEX labels along the route
    pub route: Vec<String>,
    /// Raw response, echoed back when preparing the swap
    pub raw: serde_json::Value,
}

/// Unsigned swap returned by the prepare endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPayload {
    pub txid: Option<String>,
    /// Base64 encoded transaction
    pub transaction: String,
}

#[async_trait]
pub trait SwapAggregator: Send + Sync {
    async fn fetch_tokens(&self) -> Result<Vec<TokenDescriptor>, AggregatorError>;

    async fn quote(&self, params: &QuoteParams) -> Result<AggregatorQuote, AggregatorError>;

    async fn prepare_swap(
        &self,
        quote: &AggregatorQuote,
        user_public_key: &str,
    ) -> Result<SwapPayload, AggregatorError>;
}
