//! Swap Quotes
//!
//! A quote is recomputed whenever the pair or amount changes and is never
//! merged with a previous one. When the aggregator cannot be reached the
//! [`FallbackPricer`] derives one from a small table of base rates.

use std::collections::HashMap;

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use super::amount::{format_token_amount, AmountError};
use super::source::DataSource;
use super::token::{builtin_tokens, TokenDescriptor};

/// Price impact reported for locally derived quotes
pub const FALLBACK_PRICE_IMPACT_PCT: f64 = 0.1;

/// Default jitter applied to fallback rates (2%)
pub const DEFAULT_FALLBACK_JITTER: Decimal = dec!(0.02);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("No fallback pricing for token: {0}")]
    UnknownToken(String),

    #[error("Invalid quote amount: {0}")]
    Amount(#[from] AmountError),
}

/// A priced swap of `input_amount` of one token into another
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub input_token: TokenDescriptor,
    pub output_token: TokenDescriptor,
    /// Display units
    pub input_amount: Decimal,
    /// Base units sent to the aggregator
    pub input_base_units: u64,
    /// Display units
    pub output_amount: Decimal,
    pub price_impact_pct: f64,
    /// DEX labels along the route
    pub route: Vec<String>,
    pub source: DataSource,
}

impl Quote {
    /// Output amount rendered at the output token's precision
    pub fn output_display(&self) -> String {
        format_token_amount(self.output_amount, self.output_token.decimals)
    }

    /// Output per unit of input
    pub fn rate(&self) -> Option<Decimal> {
        if self.input_amount.is_zero() {
            return None;
        }
        self.output_amount.checked_div(self.input_amount)
    }

    pub fn route_description(&self) -> String {
        if self.route.is_empty() {
            return "direct".to_string();
        }
        self.route.join(" → ")
    }
}

/// Result of asking for a quote
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// Inputs incomplete or amount not positive; nothing was requested
    Empty,
    Priced(Quote),
}

impl QuoteOutcome {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteOutcome::Priced(q) => Some(q),
            QuoteOutcome::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QuoteOutcome::Empty)
    }

    pub fn output_display(&self) -> String {
        match self {
            QuoteOutcome::Priced(q) => q.output_display(),
            QuoteOutcome::Empty => "0".to_string(),
        }
    }

    pub fn source(&self) -> Option<DataSource> {
        self.quote().map(|q| q.source)
    }
}

/// Derives degraded-mode quotes from per-pair base rates.
///
/// Only tokens in its known set can be priced. Pairs without an explicit rate
/// trade at 1:1. Each derived rate is scaled by a random factor in
/// `[1 - jitter, 1 + jitter]`.
#[derive(Debug, Clone)]
pub struct FallbackPricer {
    known: Vec<TokenDescriptor>,
    rates: HashMap<(String, String), Decimal>,
    jitter: Decimal,
}

impl Default for FallbackPricer {
    fn default() -> Self {
        Self::new(builtin_tokens())
            .with_rate("SOL", "USDC", dec!(100))
            .with_rate("USDC", "SOL", dec!(0.01))
            .with_rate("SOL", "stSOL", dec!(0.95))
            .with_rate("stSOL", "SOL", dec!(1.05))
    }
}

impl FallbackPricer {
    /// Pricer over `known` tokens with no rates and default jitter
    pub fn new(known: Vec<TokenDescriptor>) -> Self {
        Self {
            known,
            rates: HashMap::new(),
            jitter: DEFAULT_FALLBACK_JITTER,
        }
    }

    pub fn with_rate(mut self, from_symbol: &str, to_symbol: &str, rate: Decimal) -> Self {
        self.rates
            .insert((from_symbol.to_string(), to_symbol.to_string()), rate);
        self
    }

    pub fn with_jitter(mut self, jitter: Decimal) -> Self {
        self.jitter = jitter.max(Decimal::ZERO);
        self
    }

    pub fn jitter(&self) -> Decimal {
        self.jitter
    }

    /// Base rate for a pair before jitter
    pub fn base_rate(&self, from_symbol: &str, to_symbol: &str) -> Decimal {
        self.rates
            .get(&(from_symbol.to_string(), to_symbol.to_string()))
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Derive a fallback quote with a freshly sampled jitter factor
    pub fn derive(
        &self,
        input: &TokenDescriptor,
        output: &TokenDescriptor,
        amount: Decimal,
    ) -> Result<Quote, QuoteError> {
        let factor = self.sample_factor();
        self.derive_with_factor(input, output, amount, factor)
    }

    /// Derive a fallback quote with an explicit jitter factor
    pub fn derive_with_factor(
        &self,
        input: &TokenDescriptor,
        output: &TokenDescriptor,
        amount: Decimal,
        factor: Decimal,
    ) -> Result<Quote, QuoteError> {
        let from = self.lookup(input)?;
        let to = self.lookup(output)?;

        let rate = self.base_rate(&from.symbol, &to.symbol) * factor;
        let input_base_units = input.to_base_units(amount)?;

        Ok(Quote {
            input_token: input.clone(),
            output_token: output.clone(),
            input_amount: amount,
            input_base_units,
            output_amount: amount * rate,
            price_impact_pct: FALLBACK_PRICE_IMPACT_PCT,
            route: Vec::new(),
            source: DataSource::Fallback,
        })
    }

    fn lookup(&self, token: &TokenDescriptor) -> Result<&TokenDescriptor, QuoteError> {
        self.known
            .iter()
            .find(|t| t.address == token.address)
            .ok_or_else(|| QuoteError::UnknownToken(token.address.clone()))
    }

    fn sample_factor(&self) -> Decimal {
        if self.jitter.is_zero() {
            return Decimal::ONE;
        }

        let unit: f64 = rand::thread_rng().gen();
        let spread = Decimal::from_f64(unit).unwrap_or(Decimal::ZERO) * self.jitter * Decimal::TWO;
        Decimal::ONE - self.jitter + spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{TokenCatalog, SOL_MINT, USDC_MINT};

    fn sol() -> TokenDescriptor {
        TokenCatalog::builtin().find_by_address(SOL_MINT).unwrap().clone()
    }

    fn usdc() -> TokenDescriptor {
        TokenCatalog::builtin().find_by_address(USDC_MINT).unwrap().clone()
    }

    #[test]
    fn test_fallback_scenario_half_sol() {
        let pricer = FallbackPricer::default()
            .with_rate("SOL", "USDC", dec!(100.25))
            .with_jitter(Decimal::ZERO);

        let quote = pricer.derive(&sol(), &usdc(), dec!(0.5)).unwrap();
        assert_eq!(quote.output_display(), "50.125");
        assert_eq!(quote.input_base_units, 500_000_000);
        assert_eq!(quote.source, DataSource::Fallback);
        assert_eq!(quote.price_impact_pct, FALLBACK_PRICE_IMPACT_PCT);
        assert_eq!(quote.route_description(), "direct");
    }

    #[test]
    fn test_fallback_default_rates() {
        let pricer = FallbackPricer::default();
        assert_eq!(pricer.base_rate("SOL", "USDC"), dec!(100));
        assert_eq!(pricer.base_rate("USDC", "SOL"), dec!(0.01));
        assert_eq!(pricer.base_rate("stSOL", "SOL"), dec!(1.05));
        assert_eq!(pricer.base_rate("USDT", "mSOL"), Decimal::ONE);
    }

    #[test]
    fn test_fallback_jitter_bounds() {
        let pricer = FallbackPricer::default();
        for _ in 0..200 {
            let quote = pricer.derive(&sol(), &usdc(), dec!(1)).unwrap();
            assert!(quote.output_amount >= dec!(98), "{}", quote.output_amount);
            assert!(quote.output_amount <= dec!(102), "{}", quote.output_amount);
        }
    }

    #[test]
    fn test_fallback_unknown_token() {
        let bonk = TokenDescriptor::new("BonkMint", "BONK", "Bonk", 5);
        let err = FallbackPricer::default()
            .derive(&sol(), &bonk, dec!(1))
            .unwrap_err();
        assert_eq!(err, QuoteError::UnknownToken("BonkMint".to_string()));
    }

    #[test]
    fn test_quote_rate_and_outcome() {
        let quote = FallbackPricer::default()
            .derive_with_factor(&sol(), &usdc(), dec!(2), Decimal::ONE)
            .unwrap();
        assert_eq!(quote.rate(), Some(dec!(100)));

        let outcome = QuoteOutcome::Priced(quote);
        assert_eq!(outcome.output_display(), "200");
        assert_eq!(outcome.source(), Some(DataSource::Fallback));

        assert_eq!(QuoteOutcome::Empty.output_display(), "0");
        assert!(QuoteOutcome::Empty.quote().is_none());
    }

    #[test]
    fn test_route_description() {
        let mut quote = FallbackPricer::default().derive(&sol(), &usdc(), dec!(1)).unwrap();
        quote.route = vec!["Raydium".to_string(), "Orca".to_string()];
        assert_eq!(quote.route_description(), "Raydium → Orca");
    }
}
