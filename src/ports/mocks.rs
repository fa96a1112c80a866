//! Recording mocks for the port traits.
//!
//! Used by unit tests and the integration tests under `tests/`. Each mock
//! records the calls it receives and answers from builder-configured results.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::aggregator::{AggregatorError, AggregatorQuote, QuoteParams, SwapAggregator, SwapPayload};
use super::verifier::{SignatureVerifier, VerificationError};
use super::wallet::{WalletSdk, WalletSdkError, WalletSnapshot};
use crate::domain::{builtin_tokens, TokenDescriptor};

/// Deterministic signature produced by [`MockWallet`]
pub fn mock_signature(message: &[u8]) -> Vec<u8> {
    let mut sig = b"signed:".to_vec();
    sig.extend_from_slice(message);
    sig
}

#[derive(Debug, Default)]
struct MockWalletState {
    connect_requested: bool,
    probes: u32,
    calls: Vec<String>,
    signed: Vec<Vec<u8>>,
}

/// Wallet SDK whose state settles after a configurable number of probes
#[derive(Debug, Clone)]
pub struct MockWallet {
    address: String,
    connect_error: Option<WalletSdkError>,
    sign_error: Option<WalletSdkError>,
    sign_delay: Duration,
    /// Probes after connect before `connected` flips; `None` = never
    connected_after: Option<u32>,
    /// Probes after connect before the address appears; `None` = never
    address_after: Option<u32>,
    state: Arc<Mutex<MockWalletState>>,
}

impl MockWallet {
    /// Wallet that is ready on the first probe after connect
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            connect_error: None,
            sign_error: None,
            sign_delay: Duration::ZERO,
            connected_after: Some(0),
            address_after: Some(0),
            state: Arc::new(Mutex::new(MockWalletState::default())),
        }
    }

    pub fn with_connect_error(mut self, error: WalletSdkError) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn with_sign_error(mut self, error: WalletSdkError) -> Self {
        self.sign_error = Some(error);
        self
    }

    pub fn with_sign_delay(mut self, delay: Duration) -> Self {
        self.sign_delay = delay;
        self
    }

    pub fn settles_after(mut self, connected: Option<u32>, address: Option<u32>) -> Self {
        self.connected_after = connected;
        self.address_after = address;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn signed_messages(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().signed.clone()
    }

    /// Snapshot reads since the last connect
    pub fn probe_count(&self) -> u32 {
        self.state.lock().unwrap().probes
    }
}

#[async_trait]
impl WalletSdk for MockWallet {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> Result<(), WalletSdkError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("connect".to_string());
        if let Some(ref err) = self.connect_error {
            return Err(err.clone());
        }
        state.connect_requested = true;
        state.probes = 0;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletSdkError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("disconnect".to_string());
        state.connect_requested = false;
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletSdkError> {
        self.state.lock().unwrap().calls.push("sign_message".to_string());
        if !self.sign_delay.is_zero() {
            tokio::time::sleep(self.sign_delay).await;
        }
        if let Some(ref err) = self.sign_error {
            return Err(err.clone());
        }
        self.state.lock().unwrap().signed.push(message.to_vec());
        Ok(mock_signature(message))
    }

    fn snapshot(&self) -> WalletSnapshot {
        let mut state = self.state.lock().unwrap();
        if !state.connect_requested {
            return WalletSnapshot::default();
        }

        state.probes += 1;
        let probes = state.probes;
        let connected = self.connected_after.is_some_and(|n| probes > n);
        let has_address = connected && self.address_after.is_some_and(|n| probes > n);

        WalletSnapshot {
            connected,
            address: has_address.then(|| self.address.clone()),
            error: None,
        }
    }
}

#[derive(Debug, Default)]
struct MockAggregatorState {
    token_fetches: u32,
    quote_calls: Vec<QuoteParams>,
    prepare_calls: Vec<String>,
}

/// Aggregator answering from fixed results
#[derive(Debug, Clone)]
pub struct MockAggregator {
    tokens: Result<Vec<TokenDescriptor>, AggregatorError>,
    quote: Result<AggregatorQuote, AggregatorError>,
    payload: Result<SwapPayload, AggregatorError>,
    quote_delay: Duration,
    prepare_delay: Duration,
    state: Arc<Mutex<MockAggregatorState>>,
}

impl Default for MockAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAggregator {
    /// Builtin token list, 100 USDC-unit quotes and a small swap payload
    pub fn new() -> Self {
        Self {
            tokens: Ok(builtin_tokens()),
            quote: Ok(AggregatorQuote {
                out_amount: 100_000_000,
                price_impact_pct: 0.05,
                route: vec!["Raydium".to_string()],
                raw: serde_json::json!({ "outAmount": "100000000" }),
            }),
            payload: Ok(SwapPayload {
                txid: Some("tx123".to_string()),
                transaction: "AQIDBA==".to_string(),
            }),
            quote_delay: Duration::ZERO,
            prepare_delay: Duration::ZERO,
            state: Arc::new(Mutex::new(MockAggregatorState::default())),
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<TokenDescriptor>) -> Self {
        self.tokens = Ok(tokens);
        self
    }

    pub fn failing_tokens(mut self, error: AggregatorError) -> Self {
        self.tokens = Err(error);
        self
    }

    pub fn with_quote_out(mut self, out_amount: u64) -> Self {
        if let Ok(ref mut quote) = self.quote {
            quote.out_amount = out_amount;
        }
        self
    }

    pub fn failing_quotes(mut self, error: AggregatorError) -> Self {
        self.quote = Err(error);
        self
    }

    pub fn with_quote_delay(mut self, delay: Duration) -> Self {
        self.quote_delay = delay;
        self
    }

    pub fn with_payload(mut self, payload: SwapPayload) -> Self {
        self.payload = Ok(payload);
        self
    }

    pub fn failing_prepare(mut self, error: AggregatorError) -> Self {
        self.payload = Err(error);
        self
    }

    pub fn with_prepare_delay(mut self, delay: Duration) -> Self {
        self.prepare_delay = delay;
        self
    }

    pub fn token_fetches(&self) -> u32 {
        self.state.lock().unwrap().token_fetches
    }

    pub fn quote_calls(&self) -> Vec<QuoteParams> {
        self.state.lock().unwrap().quote_calls.clone()
    }

    pub fn prepare_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().prepare_calls.clone()
    }
}

#[async_trait]
impl SwapAggregator for MockAggregator {
    async fn fetch_tokens(&self) -> Result<Vec<TokenDescriptor>, AggregatorError> {
        self.state.lock().unwrap().token_fetches += 1;
        self.tokens.clone()
    }

    async fn quote(&self, params: &QuoteParams) -> Result<AggregatorQuote, AggregatorError> {
        self.state.lock().unwrap().quote_calls.push(params.clone());
        if !self.quote_delay.is_zero() {
            tokio::time::sleep(self.quote_delay).await;
        }
        self.quote.clone()
    }

    async fn prepare_swap(
        &self,
        _quote: &AggregatorQuote,
        user_public_key: &str,
    ) -> Result<SwapPayload, AggregatorError> {
        self.state
            .lock()
            .unwrap()
            .prepare_calls
            .push(user_public_key.to_string());
        if !self.prepare_delay.is_zero() {
            tokio::time::sleep(self.prepare_delay).await;
        }
        self.payload.clone()
    }
}

/// Verifier returning a fixed answer
#[derive(Debug, Clone)]
pub struct MockVerifier {
    result: Result<bool, VerificationError>,
    calls: Arc<Mutex<Vec<(Vec<u8>, Vec<u8>, String)>>>,
}

impl MockVerifier {
    pub fn accepting() -> Self {
        Self::answering(Ok(true))
    }

    pub fn rejecting() -> Self {
        Self::answering(Ok(false))
    }

    pub fn failing(reason: &str) -> Self {
        Self::answering(Err(VerificationError::Failed(reason.to_string())))
    }

    fn answering(result: Result<bool, VerificationError>) -> Self {
        Self {
            result,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// (signature, message, address) per call
    pub fn calls(&self) -> Vec<(Vec<u8>, Vec<u8>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignatureVerifier for MockVerifier {
    async fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        address: &str,
    ) -> Result<bool, VerificationError> {
        self.calls
            .lock()
            .unwrap()
            .push((signature.to_vec(), message.to_vec(), address.to_string()));
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_wallet_settles_after_probes() {
        let wallet = MockWallet::new("addr").settles_after(Some(0), Some(2));
        assert_eq!(wallet.snapshot(), WalletSnapshot::default());

        wallet.connect().await.unwrap();
        assert!(!wallet.snapshot().is_ready());
        assert!(!wallet.snapshot().is_ready());
        assert!(wallet.snapshot().is_ready());
        assert_eq!(wallet.probe_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_wallet_signing() {
        let wallet = MockWallet::new("addr");
        let sig = wallet.sign_message(b"hi").await.unwrap();
        assert_eq!(sig, mock_signature(b"hi"));
        assert_eq!(wallet.signed_messages(), vec![b"hi".to_vec()]);
        assert_eq!(wallet.calls(), vec!["sign_message".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_aggregator_records_calls() {
        let aggregator = MockAggregator::new().with_quote_out(42);
        let params = QuoteParams {
            input_mint: "a".into(),
            output_mint: "b".into(),
            amount: 1,
            slippage_bps: 50,
        };

        let quote = aggregator.quote(&params).await.unwrap();
        assert_eq!(quote.out_amount, 42);
        assert_eq!(aggregator.quote_calls(), vec![params]);
    }

    #[tokio::test]
    async fn test_mock_verifier() {
        let verifier = MockVerifier::rejecting();
        assert_eq!(verifier.verify(b"s", b"m", "a").await, Ok(false));
        assert_eq!(verifier.calls().len(), 1);
    }
}
