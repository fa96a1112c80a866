//! Jupiter Quote Types
//!
//! Request and response structures for the Jupiter V6 quote API.

use serde::{Deserialize, Serialize};

use crate::ports::{AggregatorError, AggregatorQuote, QuoteParams};

/// Query parameters for `GET /quote`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Amount in base units (lamports for SOL)
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
}

impl From<&QuoteParams> for QuoteRequest {
    fn from(params: &QuoteParams) -> Self {
        Self {
            input_mint: params.input_mint.clone(),
            output_mint: params.output_mint.clone(),
            amount: params.amount,
            slippage_bps: params.slippage_bps,
        }
    }
}

impl QuoteRequest {
    pub fn query(&self) -> [(&'static str, String); 4] {
        [
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
            ("slippageBps", self.slippage_bps.to_string()),
        ]
    }
}

/// Response from the Jupiter quote API.
///
/// Only the fields read here are typed. The full JSON is kept separately
/// because `/swap` expects it back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: String,
    /// Output amount in base units
    pub out_amount: String,
    #[serde(default)]
    pub other_amount_threshold: Option<String>,
    #[serde(default)]
    pub swap_mode: Option<String>,
    /// Price impact percentage (as string)
    #[serde(default)]
    pub price_impact_pct: Option<String>,
    #[serde(default)]
    pub route_plan: Vec<RoutePlanStep>,
}

impl QuoteResponse {
    pub fn output_amount(&self) -> Result<u64, AggregatorError> {
        self.out_amount
            .parse()
            .map_err(|_| AggregatorError::Parse(format!("outAmount {:?}", self.out_amount)))
    }

    pub fn price_impact(&self) -> f64 {
        self.price_impact_pct
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0.0)
    }

    /// DEX labels in route order
    pub fn route_labels(&self) -> Vec<String> {
        self.route_plan
            .iter()
            .map(|step| step.swap_info.label.clone())
            .collect()
    }

    /// Typed view plus the raw payload for the swap request
    pub fn into_aggregator_quote(
        self,
        raw: serde_json::Value,
    ) -> Result<AggregatorQuote, AggregatorError> {
        Ok(AggregatorQuote {
            out_amount: self.output_amount()?,
            price_impact_pct: self.price_impact(),
            route: self.route_labels(),
            raw,
        })
    }
}

/// A step in the route plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanStep {
    pub swap_info: SwapInfo,
    /// Percentage of the trade going through this route
    #[serde(default)]
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    #[serde(default)]
    pub amm_key: String,
    /// Label for the DEX (e.g., "Raydium", "Orca")
    #[serde(default)]
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE_JSON: &str = r#"{
        "inputMint": "So11111111111111111111111111111111111111112",
        "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        "inAmount": "500000000",
        "outAmount": "50125000",
        "otherAmountThreshold": "49874375",
        "swapMode": "ExactIn",
        "slippageBps": 50,
        "priceImpactPct": "0.0012",
        "routePlan": [
            {"swapInfo": {"ammKey": "pool1", "label": "Raydium", "inputMint": "a", "outputMint": "b"}, "percent": 100},
            {"swapInfo": {"ammKey": "pool2", "label": "Orca"}, "percent": 100}
        ],
        "contextSlot": 123
    }"#;

    #[test]
    fn test_quote_response_parsing() {
        let raw: serde_json::Value = serde_json::from_str(QUOTE_JSON).unwrap();
        let quote: QuoteResponse = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(quote.route_labels(), vec!["Raydium", "Orca"]);

        let converted = quote.into_aggregator_quote(raw.clone()).unwrap();
        assert_eq!(converted.out_amount, 50_125_000);
        assert!((converted.price_impact_pct - 0.0012).abs() < 1e-9);
        assert_eq!(converted.raw["contextSlot"], 123);
    }

    #[test]
    fn test_invalid_out_amount() {
        let quote: QuoteResponse = serde_json::from_str(
            r#"{"inputMint":"a","outputMint":"b","inAmount":"1","outAmount":"lots"}"#,
        )
        .unwrap();
        assert!(matches!(quote.output_amount(), Err(AggregatorError::Parse(_))));
        assert_eq!(quote.price_impact(), 0.0);
    }

    #[test]
    fn test_query_from_params() {
        let params = QuoteParams {
            input_mint: "in".into(),
            output_mint: "out".into(),
            amount: 1_000_000_000,
            slippage_bps: 50,
        };
        let query = QuoteRequest::from(&params).query();
        assert_eq!(query[2], ("amount", "1000000000".to_string()));
        assert_eq!(query[3], ("slippageBps", "50".to_string()));
    }
}
