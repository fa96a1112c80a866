//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - The passkey wallet SDK (connect, sign)
//! - The swap aggregator (tokens, quotes, swap payloads)
//! - Signature verification
//! - Balance queries against the chain

pub mod aggregator;
pub mod balance;
pub mod mocks;
pub mod verifier;
pub mod wallet;

pub use aggregator::{AggregatorError, AggregatorQuote, QuoteParams, SwapAggregator, SwapPayload};
pub use balance::{BalanceError, BalanceProvider};
pub use verifier::{SignatureVerifier, VerificationError};
pub use wallet::{WalletSdk, WalletSdkError, WalletSnapshot};
