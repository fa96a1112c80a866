//! Jupiter Adapter
//!
//! Implementation of the SwapAggregator port for the Jupiter DEX aggregator.
//! Handles the token list, quote fetching and swap building.

mod client;
mod quote;
mod swap;
mod token_list;

pub use client::{
    JupiterClient, JupiterConfig, DEFAULT_QUOTE_API_URL, DEFAULT_SWAP_API_URL,
    DEFAULT_TOKEN_LIST_URL,
};
pub use quote::{QuoteRequest, QuoteResponse};
pub use swap::{SwapRequest, SwapResponse};
pub use token_list::JupiterToken;
