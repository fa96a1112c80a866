//! Jupiter Token List
//!
//! Entries returned by the `token.jup.ag/all` endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::TokenDescriptor;

/// Token information from the Jupiter token list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupiterToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: Option<String>,
    /// Null in some entries
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl From<JupiterToken> for TokenDescriptor {
    fn from(token: JupiterToken) -> Self {
        TokenDescriptor {
            address: token.address,
            symbol: token.symbol,
            name: token.name,
            decimals: token.decimals,
            logo_uri: token.logo_uri,
            tags: token.tags.unwrap_or_default(),
        }
    }
}
