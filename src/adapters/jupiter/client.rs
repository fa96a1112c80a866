//! Jupiter API Client
//!
//! HTTP client for the Jupiter DEX aggregator V6 API.
//! Handles token list, quote fetching and swap transaction building.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::quote::{QuoteRequest, QuoteResponse};
use super::swap::{SwapRequest, SwapResponse};
use super::token_list::JupiterToken;
use crate::domain::TokenDescriptor;
use crate::ports::{AggregatorError, AggregatorQuote, QuoteParams, SwapAggregator, SwapPayload};

pub const DEFAULT_QUOTE_API_URL: &str = "https://quote-api.jup.ag/v6";
pub const DEFAULT_SWAP_API_URL: &str = "https://jup.ag/api/v6";
pub const DEFAULT_TOKEN_LIST_URL: &str = "https://token.jup.ag/all";

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for `/quote`
    pub api_base_url: String,
    /// Base URL for `/swap`
    pub swap_api_url: String,
    pub token_list_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Attempts per request, including the first
    pub max_retries: u32,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_QUOTE_API_URL.to_string(),
            swap_api_url: DEFAULT_SWAP_API_URL.to_string(),
            token_list_url: DEFAULT_TOKEN_LIST_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    /// Create a new Jupiter client with default configuration
    pub fn new() -> Result<Self, AggregatorError> {
        Self::with_config(JupiterConfig::default())
    }

    pub fn with_config(config: JupiterConfig) -> Result<Self, AggregatorError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AggregatorError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &JupiterConfig {
        &self.config
    }

    /// Full token list, unfiltered
    pub async fn get_token_list(&self) -> Result<Vec<JupiterToken>, AggregatorError> {
        tracing::debug!("Fetching token list from {}", self.config.token_list_url);
        let req = self.with_api_key(self.http.get(&self.config.token_list_url));
        let response = self.send(req).await?;
        self.handle_response(response).await
    }

    /// Returns the typed quote and the raw JSON the swap endpoint expects back
    pub async fn get_quote(
        &self,
        request: &QuoteRequest,
    ) -> Result<(QuoteResponse, serde_json::Value), AggregatorError> {
        let url = format!("{}/quote", self.config.api_base_url);
        tracing::debug!(
            "Fetching quote {} -> {} amount={}",
            request.input_mint,
            request.output_mint,
            request.amount
        );

        let req = self.with_api_key(self.http.get(&url).query(&request.query()));
        let response = self.send(req).await?;
        let raw: serde_json::Value = self.handle_response(response).await?;
        let quote = serde_json::from_value(raw.clone())
            .map_err(|e| AggregatorError::Parse(e.to_string()))?;

        Ok((quote, raw))
    }

    /// Build the swap transaction for a previously fetched quote
    pub async fn get_swap_transaction(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, AggregatorError> {
        let url = format!("{}/swap", self.config.swap_api_url);
        tracing::debug!("Preparing swap for {}", request.user_public_key);

        let req = self.with_api_key(self.http.post(&url).json(request));
        let response = self.send(req).await?;
        self.handle_response(response).await
    }

    fn with_api_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("x-api-key", api_key),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, AggregatorError> {
        self.execute_with_retry(|| async {
            req.try_clone()
                .ok_or_else(|| AggregatorError::InvalidParameters("Failed to clone request".into()))?
                .send()
                .await
                .map_err(|e| AggregatorError::Network(e.to_string()))
        })
        .await
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, AggregatorError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, AggregatorError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() || status == StatusCode::BAD_REQUEST {
                        return Ok(response);
                    }

                    // Rate limited: exponential backoff
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_secs(2u64.pow(attempt + 1)); // 2s, 4s, 8s
                        tracing::warn!(
                            "Rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(AggregatorError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        tracing::warn!(
                            "Server error {} (attempt {}/{})",
                            status,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(AggregatorError::Api {
                            status: status.as_u16(),
                            message: format!("Server error: {}", status),
                        });
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    tracing::debug!("Request failed (attempt {}): {}", attempt + 1, e);
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AggregatorError::Network("Max retries exceeded".into())))
    }

    /// Handle API response and deserialize
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AggregatorError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AggregatorError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if error_text.contains("SlippageToleranceExceeded") || error_text.contains("6001") {
                return Err(AggregatorError::SlippageExceeded);
            }

            return Err(AggregatorError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AggregatorError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SwapAggregator for JupiterClient {
    async fn fetch_tokens(&self) -> Result<Vec<TokenDescriptor>, AggregatorError> {
        let tokens = self.get_token_list().await?;
        tracing::debug!("Fetched {} tokens", tokens.len());
        Ok(tokens.into_iter().map(TokenDescriptor::from).collect())
    }

    async fn quote(&self, params: &QuoteParams) -> Result<AggregatorQuote, AggregatorError> {
        let (quote, raw) = self.get_quote(&QuoteRequest::from(params)).await?;
        quote.into_aggregator_quote(raw)
    }

    async fn prepare_swap(
        &self,
        quote: &AggregatorQuote,
        user_public_key: &str,
    ) -> Result<SwapPayload, AggregatorError> {
        let request = SwapRequest::new(user_public_key.to_string(), quote.raw.clone());
        let response = self.get_swap_transaction(&request).await?;
        Ok(response.into())
    }
}
