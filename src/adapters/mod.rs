//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Jupiter: DEX aggregator API client
//! - Solana: RPC balance client, keypair wallet and signature verification
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod jupiter;
pub mod solana;

pub use cli::CliApp;
pub use jupiter::JupiterClient;
pub use solana::{Ed25519Verifier, KeypairWallet, SolanaClient};
