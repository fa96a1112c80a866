//! DeFiPass - Walletless Solana DeFi Library
//!
//! Passkey-style wallet sessions and Jupiter swaps with degraded-mode fallbacks.
//!
//! # Modules
//!
//! - `domain`: Core types (tokens, amounts, quotes, session state, receipts)
//! - `ports`: Trait abstractions (WalletSdk, SwapAggregator, SignatureVerifier, BalanceProvider)
//! - `application`: Connection manager, swap workflow, form and balance state
//! - `adapters`: External implementations (Jupiter, Solana, CLI)
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
