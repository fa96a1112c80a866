//! Token Descriptors and Catalogs
//!
//! A catalog is the set of tokens a swap form can select from. It is either
//! fetched from the aggregator's token list or built from the static fallback
//! set below, so the form always has something selectable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::{self, AmountError};
use super::source::DataSource;

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
pub const STSOL_MINT: &str = "7dHbWXmci3dT8UFYWYZweBLXgycu7Y3iL6trKn1Y7ARj";
pub const MSOL_MINT: &str = "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So";

/// Symbols kept when filtering a fetched token list
pub const POPULAR_SYMBOLS: [&str; 9] = [
    "SOL", "USDC", "USDT", "mSOL", "stSOL", "BTC", "ETH", "BONK", "JUP",
];

/// Tag the token list uses for well-known tokens
pub const POPULAR_TAG: &str = "popular";

/// Tokens kept when a fetched list has no popular entries
pub const UNFILTERED_LIMIT: usize = 20;

const LOGO_BASE_URL: &str =
    "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet";

/// Immutable description of a selectable token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Mint address
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Icon reference
    #[serde(rename = "logoURI", default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TokenDescriptor {
    pub fn new(address: &str, symbol: &str, name: &str, decimals: u8) -> Self {
        Self {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            logo_uri: None,
            tags: Vec::new(),
        }
    }

    pub fn with_logo(mut self, logo_uri: impl Into<String>) -> Self {
        self.logo_uri = Some(logo_uri.into());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Popular symbol carrying the `popular` tag
    pub fn is_popular(&self) -> bool {
        POPULAR_SYMBOLS.contains(&self.symbol.as_str())
            && self.tags.iter().any(|t| t == POPULAR_TAG)
    }

    /// Display amount to base units for this token's precision
    pub fn to_base_units(&self, amount: Decimal) -> Result<u64, AmountError> {
        amount::to_base_units(amount, self.decimals)
    }

    /// Base units to display amount for this token's precision
    pub fn from_base_units(&self, raw: u64) -> Decimal {
        amount::from_base_units(raw, self.decimals)
    }
}

fn builtin(address: &str, symbol: &str, name: &str, decimals: u8) -> TokenDescriptor {
    TokenDescriptor::new(address, symbol, name, decimals)
        .with_logo(format!("{}/{}/logo.png", LOGO_BASE_URL, address))
        .with_tag(POPULAR_TAG)
}

/// Static fallback token set
pub fn builtin_tokens() -> Vec<TokenDescriptor> {
    vec![
        builtin(SOL_MINT, "SOL", "Solana", 9),
        builtin(USDC_MINT, "USDC", "USD Coin", 6),
        builtin(USDT_MINT, "USDT", "USDT", 6),
        builtin(STSOL_MINT, "stSOL", "Lido Staked SOL", 9),
        builtin(MSOL_MINT, "mSOL", "Marinade staked SOL", 9),
    ]
}

/// Narrow a fetched token list to something a form can present.
///
/// Keeps popular tokens; if none qualify, keeps the first [`UNFILTERED_LIMIT`].
pub fn select_popular(tokens: Vec<TokenDescriptor>) -> Vec<TokenDescriptor> {
    let popular: Vec<TokenDescriptor> = tokens.iter().filter(|t| t.is_popular()).cloned().collect();
    if !popular.is_empty() {
        return popular;
    }

    tokens.into_iter().take(UNFILTERED_LIMIT).collect()
}

/// Selectable tokens plus where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct TokenCatalog {
    tokens: Vec<TokenDescriptor>,
    source: DataSource,
}

impl TokenCatalog {
    pub fn new(tokens: Vec<TokenDescriptor>, source: DataSource) -> Self {
        Self { tokens, source }
    }

    /// Catalog built from the static fallback set
    pub fn builtin() -> Self {
        Self::new(builtin_tokens(), DataSource::Fallback)
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn find_by_address(&self, address: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| t.address == address)
    }

    /// Symbol lookup, case-insensitive
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens
            .iter()
            .find(|t| t.symbol == symbol)
            .or_else(|| self.tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol)))
    }

    /// Resolve either a symbol or a mint address
    pub fn resolve(&self, symbol_or_address: &str) -> Option<&TokenDescriptor> {
        self.find_by_address(symbol_or_address)
            .or_else(|| self.find_by_symbol(symbol_or_address))
    }
}
