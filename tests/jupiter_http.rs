//! Jupiter Adapter Integration Tests
//!
//! Runs the real `JupiterClient`, `KeypairWallet` and `Ed25519Verifier` against
//! a `wiremock` server that answers canned Jupiter responses.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use defipass::adapters::jupiter::JupiterConfig;
use defipass::adapters::{Ed25519Verifier, JupiterClient, KeypairWallet};
use defipass::application::{ConnectionManager, PollPolicy, SwapSettings, SwapWorkflow};
use defipass::domain::token::{SOL_MINT, USDC_MINT};
use defipass::domain::{DataSource, TokenDescriptor, VerificationOutcome};
use defipass::ports::{AggregatorError, SwapAggregator};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

fn client(server: &MockServer) -> JupiterClient {
    JupiterClient::with_config(JupiterConfig {
        api_base_url: server.uri(),
        swap_api_url: server.uri(),
        token_list_url: format!("{}/all", server.uri()),
        api_key: None,
        timeout: Duration::from_secs(5),
        max_retries: 1,
    })
    .unwrap()
}

fn sol() -> TokenDescriptor {
    TokenDescriptor::new(SOL_MINT, "SOL", "Solana", 9)
}

fn usdc() -> TokenDescriptor {
    TokenDescriptor::new(USDC_MINT, "USDC", "USD Coin", 6)
}

fn quote_json() -> serde_json::Value {
    serde_json::json!({
        "inputMint": SOL_MINT,
        "outputMint": USDC_MINT,
        "inAmount": "500000000",
        "outAmount": "50125000",
        "otherAmountThreshold": "49874375",
        "swapMode": "ExactIn",
        "priceImpactPct": "0.0012",
        "routePlan": [
            { "swapInfo": { "ammKey": "amm1", "label": "Orca" }, "percent": 100 }
        ]
    })
}

fn token_list_json() -> serde_json::Value {
    serde_json::json!([
        { "address": SOL_MINT, "symbol": "SOL", "name": "Wrapped SOL", "decimals": 9,
          "logoURI": "https://example.com/sol.png", "tags": ["popular", "verified"] },
        { "address": USDC_MINT, "symbol": "USDC", "name": "USD Coin", "decimals": 6,
          "tags": ["popular"] },
        { "address": "Bonk1111111111111111111111111111111111111111", "symbol": "BONK",
          "name": "Bonk", "decimals": 5, "tags": null }
    ])
}

fn workflow(client: JupiterClient) -> SwapWorkflow {
    SwapWorkflow::new(
        Arc::new(client),
        Arc::new(Ed25519Verifier),
        SwapSettings {
            quote_debounce: Duration::from_millis(1),
            ..SwapSettings::default()
        },
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_quote_server_error_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(500).set_body_string("{\"error\":\"boom\"}"))
        .expect(1)
        .mount(&server)
        .await;
    let workflow = workflow(client(&server));

    let outcome = workflow
        .get_quote(Some(&sol()), Some(&usdc()), "0.5")
        .await
        .unwrap();

    let quote = outcome.quote().unwrap();
    assert_eq!(quote.source, DataSource::Fallback);
    assert!(quote.output_amount > rust_decimal::Decimal::ZERO);
}

#[tokio::test]
async fn test_live_quote_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("inputMint", SOL_MINT))
        .and(query_param("outputMint", USDC_MINT))
        .and(query_param("amount", "500000000"))
        .and(query_param("slippageBps", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_json()))
        .expect(1)
        .mount(&server)
        .await;
    let workflow = workflow(client(&server));

    let outcome = workflow
        .get_quote(Some(&sol()), Some(&usdc()), "0.5")
        .await
        .unwrap();

    let quote = outcome.quote().unwrap();
    assert_eq!(quote.source, DataSource::Live);
    assert_eq!(outcome.output_display(), "50.125");
    assert_eq!(quote.route, vec!["Orca".to_string()]);
    assert!((quote.price_impact_pct - 0.0012).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_token_list_keeps_popular_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_list_json()))
        .mount(&server)
        .await;
    let workflow = workflow(client(&server));

    let catalog = workflow.load_tokens().await.unwrap();
    assert_eq!(catalog.source(), DataSource::Live);
    let symbols: Vec<&str> = catalog.tokens().iter().map(|t| t.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["SOL", "USDC"]);
}

#[tokio::test]
async fn test_rate_limit_surfaces_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = client(&server).fetch_tokens().await;
    assert!(matches!(result, Err(AggregatorError::RateLimited)));
}

#[tokio::test]
async fn test_live_swap_signed_and_verified() {
    let server = MockServer::start().await;
    let transaction = base64::engine::general_purpose::STANDARD.encode(b"unsigned swap transaction");

    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/swap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "swapTransaction": transaction,
            "lastValidBlockHeight": 279_000_000u64,
            "txid": "3nbTkv6XUqBfTQHpTdPQFmDtVBKoPUqUXJqpvVYRdM6E"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let wallet = KeypairWallet::new_random();
    let address = wallet.public_key();
    let manager = ConnectionManager::new(
        Arc::new(wallet),
        PollPolicy::new(2, Duration::from_millis(5)),
    );
    let session = manager.connect().await.unwrap().session().cloned().unwrap();
    let workflow = workflow(client(&server));

    let receipt = workflow
        .swap(Some(&sol()), Some(&usdc()), "0.5", &session)
        .await
        .unwrap();

    assert_eq!(receipt.source, DataSource::Live);
    assert_eq!(receipt.txid, "3nbTkv6XUqBfTQHpTdPQFmDtVBKoPUqUXJqpvVYRdM6E");
    assert_eq!(receipt.verification, VerificationOutcome::Verified);
    assert_eq!(receipt.signature.len(), 64);

    let requests = server.received_requests().await.unwrap();
    let swap_request = requests
        .iter()
        .find(|request| request.url.path() == "/swap")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&swap_request.body).unwrap();
    assert_eq!(body["userPublicKey"], address);
    assert_eq!(body["quoteResponse"]["outAmount"], "50125000");
    assert_eq!(body["wrapAndUnwrapSol"], true);
}
