//! Application Layer - Session and swap use cases
//!
//! Coordinates the ports:
//! - Connection manager: wallet lifecycle and readiness polling
//! - Swap workflow: token catalog, quotes, swap execution
//! - Swap form and balance display state

pub mod balance;
pub mod connection;
pub mod debounce;
pub mod form;
pub mod polling;
pub mod swap;

pub use balance::{Balance, BalanceReader, LAMPORTS_PER_SOL};
pub use connection::{ConnectOutcome, ConnectionError, ConnectionManager, SessionHandle, SigningError};
pub use debounce::{Debounced, Debouncer};
pub use form::SwapForm;
pub use polling::{poll_for_ready, PollOutcome, PollPolicy};
pub use swap::{SwapError, SwapSettings, SwapWorkflow};
