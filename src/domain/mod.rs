//! Domain Layer - Core types for the swap workflow
//!
//! Pure data and arithmetic with no I/O. All external interactions happen
//! through the ports layer.

pub mod amount;
pub mod format;
pub mod quote;
pub mod session;
pub mod source;
pub mod swap;
pub mod token;

pub use amount::{format_token_amount, from_base_units, parse_amount, to_base_units, AmountError};
pub use format::{explorer_address_url, explorer_tx_url, format_amount, truncate_address};
pub use quote::{FallbackPricer, Quote, QuoteError, QuoteOutcome};
pub use session::ConnectionState;
pub use source::DataSource;
pub use swap::{PreparedSwap, SwapReceipt, VerificationOutcome};
pub use token::{builtin_tokens, select_popular, TokenCatalog, TokenDescriptor};
