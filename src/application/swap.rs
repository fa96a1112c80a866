//! Swap Workflow
//!
//! Token catalog loading, quoting with degraded-mode fallback, and the
//! quote -> prepare -> sign -> verify swap chain. Aggregator failures never
//! surface to the caller: they are logged and replaced by fallback data
//! tagged [`DataSource::Fallback`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Mutex;

use super::connection::{SessionHandle, SigningError};
use super::debounce::{Debounced, Debouncer};
use crate::domain::quote::DEFAULT_FALLBACK_JITTER;
use crate::domain::{
    builtin_tokens, parse_amount, select_popular, AmountError, DataSource, FallbackPricer,
    PreparedSwap, Quote, QuoteError, QuoteOutcome, SwapReceipt, TokenCatalog, TokenDescriptor,
    VerificationOutcome,
};
use crate::ports::{QuoteParams, SignatureVerifier, SwapAggregator, VerificationError};

pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;
pub const DEFAULT_QUOTE_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_SWAP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwapError {
    #[error("Wallet session is not ready")]
    NotReady,

    #[error("Wallet address is missing")]
    MissingAddress,

    #[error("A swap is already in progress")]
    InProgress,

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Select both tokens before swapping")]
    TokenNotSelected,

    #[error("No tokens available")]
    TokenLoad,

    #[error("Quote failed: {0}")]
    Quote(#[from] QuoteError),

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Signature verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("Swap did not complete within {secs}s")]
    TimedOut { secs: u64 },
}

impl SwapError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SwapError::NotReady | SwapError::MissingAddress => {
                "Please connect your wallet first."
            }
            SwapError::InProgress => "A swap is already in progress.",
            SwapError::InvalidAmount(_) => "Please enter a valid amount.",
            SwapError::TokenNotSelected => "Please select both tokens.",
            SwapError::TokenLoad => "Failed to load tokens. Please try again.",
            SwapError::Quote(_) => {
                "Failed to get swap quote. Please try different tokens or amount."
            }
            SwapError::Signing(SigningError::Cancelled) => "Swap cancelled.",
            SwapError::Signing(_)
            | SwapError::Verification(_)
            | SwapError::TimedOut { .. } => "Swap failed. Please try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapSettings {
    pub slippage_bps: u16,
    pub quote_debounce: Duration,
    /// Report success only after the verifier accepts the signature
    pub require_verification: bool,
    /// Upper bound on one swap; `None` waits indefinitely
    pub swap_timeout: Option<Duration>,
    /// Fallback quote jitter as a fraction (0.02 = ±2 %)
    pub fallback_jitter: Decimal,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            quote_debounce: DEFAULT_QUOTE_DEBOUNCE,
            require_verification: true,
            swap_timeout: Some(DEFAULT_SWAP_TIMEOUT),
            fallback_jitter: DEFAULT_FALLBACK_JITTER,
        }
    }
}

pub struct SwapWorkflow {
    aggregator: Arc<dyn SwapAggregator>,
    verifier: Arc<dyn SignatureVerifier>,
    pricer: FallbackPricer,
    fallback_tokens: Vec<TokenDescriptor>,
    settings: SwapSettings,
    /// Loaded once, replaced by `refresh_tokens`
    catalog: Mutex<Option<TokenCatalog>>,
    debouncer: Debouncer,
    /// Held for the full span of a swap
    swap_lock: Mutex<()>,
}

impl SwapWorkflow {
    pub fn new(
        aggregator: Arc<dyn SwapAggregator>,
        verifier: Arc<dyn SignatureVerifier>,
        settings: SwapSettings,
    ) -> Self {
        let pricer = FallbackPricer::default().with_jitter(settings.fallback_jitter);
        Self {
            aggregator,
            verifier,
            pricer,
            fallback_tokens: builtin_tokens(),
            debouncer: Debouncer::new(settings.quote_debounce),
            settings,
            catalog: Mutex::new(None),
            swap_lock: Mutex::new(()),
        }
    }

    pub fn with_pricer(mut self, pricer: FallbackPricer) -> Self {
        self.pricer = pricer;
        self
    }

    pub fn with_fallback_tokens(mut self, tokens: Vec<TokenDescriptor>) -> Self {
        self.fallback_tokens = tokens;
        self
    }

    pub fn settings(&self) -> &SwapSettings {
        &self.settings
    }

    /// Cached catalog, fetched on first use
    pub async fn load_tokens(&self) -> Result<TokenCatalog, SwapError> {
        let mut cache = self.catalog.lock().await;
        if let Some(ref catalog) = *cache {
            return Ok(catalog.clone());
        }

        let catalog = self.fetch_catalog().await?;
        *cache = Some(catalog.clone());
        Ok(catalog)
    }

    /// Discard the cached catalog and fetch again
    pub async fn refresh_tokens(&self) -> Result<TokenCatalog, SwapError> {
        let mut cache = self.catalog.lock().await;
        let catalog = self.fetch_catalog().await?;
        *cache = Some(catalog.clone());
        Ok(catalog)
    }

    async fn fetch_catalog(&self) -> Result<TokenCatalog, SwapError> {
        match self.aggregator.fetch_tokens().await {
            Ok(tokens) if !tokens.is_empty() => {
                let total = tokens.len();
                let selected = select_popular(tokens);
                tracing::info!("Loaded {} of {} tokens", selected.len(), total);
                return Ok(TokenCatalog::new(selected, DataSource::Live));
            }
            Ok(_) => tracing::warn!("Token list was empty, using built-in tokens"),
            Err(e) => tracing::warn!("Token list fetch failed, using built-in tokens: {}", e),
        }

        if self.fallback_tokens.is_empty() {
            return Err(SwapError::TokenLoad);
        }
        Ok(TokenCatalog::new(
            self.fallback_tokens.clone(),
            DataSource::Fallback,
        ))
    }

    /// Quote `amount` of `input` for `output`.
    ///
    /// Missing tokens or a non-positive amount yield [`QuoteOutcome::Empty`]
    /// without touching the aggregator.
    pub async fn get_quote(
        &self,
        input: Option<&TokenDescriptor>,
        output: Option<&TokenDescriptor>,
        amount: &str,
    ) -> Result<QuoteOutcome, QuoteError> {
        let Some((input, output, amount)) = quote_inputs(input, output, amount) else {
            return Ok(QuoteOutcome::Empty);
        };

        let base_units = input.to_base_units(amount)?;
        if base_units == 0 {
            return Ok(QuoteOutcome::Empty);
        }

        let params = QuoteParams {
            input_mint: input.address.clone(),
            output_mint: output.address.clone(),
            amount: base_units,
            slippage_bps: self.settings.slippage_bps,
        };

        match self.aggregator.quote(&params).await {
            Ok(live) => {
                tracing::debug!(
                    "Quote {} {} -> {} {} via {:?}",
                    amount,
                    input.symbol,
                    live.out_amount,
                    output.symbol,
                    live.route
                );
                Ok(QuoteOutcome::Priced(Quote {
                    input_token: input.clone(),
                    output_token: output.clone(),
                    input_amount: amount,
                    input_base_units: base_units,
                    output_amount: output.from_base_units(live.out_amount),
                    price_impact_pct: live.price_impact_pct,
                    route: live.route,
                    source: DataSource::Live,
                }))
            }
            Err(e) => {
                tracing::warn!(
                    "Quote {} -> {} failed, using fallback rate: {}",
                    input.symbol,
                    output.symbol,
                    e
                );
                let quote = self.pricer.derive(input, output, amount)?;
                Ok(QuoteOutcome::Priced(quote))
            }
        }
    }

    /// Debounced [`get_quote`](Self::get_quote); older pending calls resolve to `Superseded`
    pub async fn quote_debounced(
        &self,
        input: Option<&TokenDescriptor>,
        output: Option<&TokenDescriptor>,
        amount: &str,
    ) -> Result<Debounced<QuoteOutcome>, QuoteError> {
        if quote_inputs(input, output, amount).is_none() {
            self.debouncer.cancel_pending();
            return Ok(Debounced::Completed(QuoteOutcome::Empty));
        }

        match self
            .debouncer
            .run(|| self.get_quote(input, output, amount))
            .await
        {
            Debounced::Completed(result) => result.map(Debounced::Completed),
            Debounced::Superseded => Ok(Debounced::Superseded),
        }
    }

    pub fn is_swapping(&self) -> bool {
        self.swap_lock.try_lock().is_err()
    }

    /// Prepare, sign and verify a swap of `amount` `input` into `output`
    pub async fn swap(
        &self,
        input: Option<&TokenDescriptor>,
        output: Option<&TokenDescriptor>,
        amount: &str,
        session: &SessionHandle,
    ) -> Result<SwapReceipt, SwapError> {
        let _lock = self
            .swap_lock
            .try_lock()
            .map_err(|_| SwapError::InProgress)?;

        if !session.is_ready() {
            return Err(SwapError::NotReady);
        }
        let address = session.address().ok_or(SwapError::MissingAddress)?;
        let (input, output) = match (input, output) {
            (Some(i), Some(o)) => (i, o),
            _ => return Err(SwapError::TokenNotSelected),
        };
        let amount = parse_amount(amount)?;
        let base_units = input.to_base_units(amount)?;
        if base_units == 0 {
            return Err(AmountError::BelowPrecision {
                amount: amount.to_string(),
                decimals: input.decimals,
            }
            .into());
        }

        tracing::info!(
            "Swapping {} {} -> {} for {}",
            amount,
            input.symbol,
            output.symbol,
            address
        );

        let chain = self.execute_swap(input, output, amount, base_units, &address, session);
        let receipt = match self.settings.swap_timeout {
            Some(limit) => tokio::time::timeout(limit, chain)
                .await
                .map_err(|_| SwapError::TimedOut {
                    secs: limit.as_secs(),
                })??,
            None => chain.await?,
        };

        tracing::info!("{}", receipt.success_message());
        Ok(receipt)
    }

    async fn execute_swap(
        &self,
        input: &TokenDescriptor,
        output: &TokenDescriptor,
        amount: Decimal,
        base_units: u64,
        address: &str,
        session: &SessionHandle,
    ) -> Result<SwapReceipt, SwapError> {
        let prepared = self.prepare(input, output, base_units, address).await;

        let message = prepared
            .message_bytes()
            .map_err(|e| SigningError::InvalidPayload(e.to_string()))?;
        let signature = session.sign_message(&message).await?;

        let verification = if self.settings.require_verification {
            match self.verifier.verify(&signature, &message, address).await? {
                true => VerificationOutcome::Verified,
                false => return Err(VerificationError::Rejected.into()),
            }
        } else {
            VerificationOutcome::Skipped
        };

        Ok(SwapReceipt {
            txid: prepared.txid,
            message: prepared.message,
            signature,
            verification,
            source: prepared.source,
            input_symbol: input.symbol.clone(),
            output_symbol: output.symbol.clone(),
            input_amount: amount,
            completed_at: Utc::now(),
        })
    }

    /// Live swap payload, or the placeholder when the aggregator fails
    async fn prepare(
        &self,
        input: &TokenDescriptor,
        output: &TokenDescriptor,
        base_units: u64,
        address: &str,
    ) -> PreparedSwap {
        let params = QuoteParams {
            input_mint: input.address.clone(),
            output_mint: output.address.clone(),
            amount: base_units,
            slippage_bps: self.settings.slippage_bps,
        };

        let payload = match self.aggregator.quote(&params).await {
            Ok(quote) => self.aggregator.prepare_swap(&quote, address).await,
            Err(e) => Err(e),
        };

        match payload {
            Ok(payload) => PreparedSwap::live(payload.txid, payload.transaction),
            Err(e) => {
                tracing::warn!("Swap preparation failed, using placeholder payload: {}", e);
                PreparedSwap::mock()
            }
        }
    }
}

/// Both tokens selected and a positive amount
fn quote_inputs<'a>(
    input: Option<&'a TokenDescriptor>,
    output: Option<&'a TokenDescriptor>,
    amount: &str,
) -> Option<(&'a TokenDescriptor, &'a TokenDescriptor, Decimal)> {
    let amount = parse_amount(amount).ok()?;
    Some((input?, output?, amount))
}
