//! Swap form state: selected tokens and the two amount fields.

use rust_decimal::Decimal;

use crate::domain::{parse_amount, QuoteOutcome, TokenCatalog, TokenDescriptor};

pub const DEFAULT_FROM_AMOUNT: &str = "0.1";
pub const DEFAULT_TO_AMOUNT: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapForm {
    pub from_token: Option<TokenDescriptor>,
    pub to_token: Option<TokenDescriptor>,
    pub from_amount: String,
    /// Estimated output, filled from the latest quote
    pub to_amount: String,
}

impl Default for SwapForm {
    fn default() -> Self {
        Self {
            from_token: None,
            to_token: None,
            from_amount: DEFAULT_FROM_AMOUNT.to_string(),
            to_amount: DEFAULT_TO_AMOUNT.to_string(),
        }
    }
}

impl SwapForm {
    /// SOL -> USDC when the catalog has them, else its first two tokens
    pub fn with_defaults(catalog: &TokenCatalog) -> Self {
        let tokens = catalog.tokens();
        let from_token = catalog
            .find_by_symbol("SOL")
            .or_else(|| tokens.first())
            .cloned();
        let to_token = catalog
            .find_by_symbol("USDC")
            .or_else(|| tokens.get(1))
            .cloned();

        Self {
            from_token,
            to_token,
            ..Self::default()
        }
    }

    /// Exchange both token selections and both amounts
    pub fn flip_tokens(&mut self) {
        std::mem::swap(&mut self.from_token, &mut self.to_token);
        std::mem::swap(&mut self.from_amount, &mut self.to_amount);
    }

    pub fn apply_quote(&mut self, outcome: &QuoteOutcome) {
        self.to_amount = outcome.output_display();
    }

    fn positive(value: &str) -> Option<Decimal> {
        parse_amount(value).ok()
    }

    /// "1 SOL ≈ 100.000000 USDC", or a prompt when there is nothing to show
    pub fn rate_display(&self) -> String {
        let (Some(from), Some(to)) = (&self.from_token, &self.to_token) else {
            return "Enter an amount".to_string();
        };

        match (Self::positive(&self.from_amount), Self::positive(&self.to_amount)) {
            (Some(input), Some(output)) => {
                let rate = output / input;
                format!("1 {} ≈ {:.6} {}", from.symbol, rate, to.symbol)
            }
            _ => "Enter an amount".to_string(),
        }
    }

    /// Whether the swap button is enabled
    pub fn can_submit(&self, busy: bool) -> bool {
        !busy
            && self.from_token.is_some()
            && self.to_token.is_some()
            && Self::positive(&self.from_amount).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSource, Quote};
    use rust_decimal_macros::dec;

    fn form() -> SwapForm {
        SwapForm::with_defaults(&TokenCatalog::builtin())
    }

    #[test]
    fn test_defaults_to_sol_usdc() {
        let form = form();
        assert_eq!(form.from_token.as_ref().unwrap().symbol, "SOL");
        assert_eq!(form.to_token.as_ref().unwrap().symbol, "USDC");
        assert_eq!(form.from_amount, "0.1");
        assert_eq!(form.to_amount, "0");
    }

    #[test]
    fn test_defaults_without_sol() {
        let tokens = vec![
            TokenDescriptor::new("A111", "AAA", "A", 6),
            TokenDescriptor::new("B111", "BBB", "B", 6),
        ];
        let form = SwapForm::with_defaults(&TokenCatalog::new(tokens, DataSource::Live));
        assert_eq!(form.from_token.unwrap().symbol, "AAA");
        assert_eq!(form.to_token.unwrap().symbol, "BBB");
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let mut form = form();
        form.to_amount = "10.5".to_string();
        let original = form.clone();

        form.flip_tokens();
        assert_eq!(form.from_token.as_ref().unwrap().symbol, "USDC");
        assert_eq!(form.from_amount, "10.5");
        assert_eq!(form.to_amount, "0.1");

        form.flip_tokens();
        assert_eq!(form, original);
    }

    #[test]
    fn test_rate_display() {
        let mut form = form();
        assert_eq!(form.rate_display(), "Enter an amount");

        let quote = Quote {
            input_token: form.from_token.clone().unwrap(),
            output_token: form.to_token.clone().unwrap(),
            input_amount: dec!(0.1),
            input_base_units: 100_000_000,
            output_amount: dec!(10),
            price_impact_pct: 0.1,
            route: Vec::new(),
            source: DataSource::Fallback,
        };
        form.apply_quote(&QuoteOutcome::Priced(quote));

        assert_eq!(form.to_amount, "10");
        assert_eq!(form.rate_display(), "1 SOL ≈ 100.000000 USDC");

        form.apply_quote(&QuoteOutcome::Empty);
        assert_eq!(form.rate_display(), "Enter an amount");
    }

    #[test]
    fn test_can_submit() {
        let mut form = form();
        assert!(form.can_submit(false));
        assert!(!form.can_submit(true));

        form.from_amount = "0".to_string();
        assert!(!form.can_submit(false));

        form.from_amount = "1".to_string();
        form.to_token = None;
        assert!(!form.can_submit(false));
    }
}
