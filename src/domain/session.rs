//! Wallet Session State
//!
//! ```text
//! Disconnected -> Connecting -> PollingForReady(1..=N) -> Ready
//!                     |                  |
//!                     v                  +--> AwaitingManualProceed
//!                   Failed               +--> TimedOut
//! ```
//!
//! `Failed` and `TimedOut` recover through another connect. `Ready` returns
//! to `Disconnected` only on an explicit disconnect.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Waiting for the wallet SDK to finish authentication
    Connecting,
    /// SDK accepted the connect call; waiting for connected + address
    PollingForReady { attempt: u32, max_attempts: u32 },
    /// Session usable for signing
    Ready { address: String },
    /// Connected but no address appeared; user may proceed manually
    AwaitingManualProceed,
    /// SDK rejected the connect call
    Failed { reason: String },
    /// Polling exhausted without the wallet ever reporting connected
    TimedOut { attempts: u32 },
}

impl ConnectionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready { .. })
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            ConnectionState::Ready { address } => Some(address),
            _ => None,
        }
    }

    /// True while a connect attempt is still running
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::PollingForReady { .. }
        )
    }

    /// True when another `connect()` is the expected next step
    pub fn can_retry(&self) -> bool {
        matches!(
            self,
            ConnectionState::Disconnected
                | ConnectionState::Failed { .. }
                | ConnectionState::TimedOut { .. }
        )
    }

    pub fn error(&self) -> Option<String> {
        match self {
            ConnectionState::Failed { reason } => Some(reason.clone()),
            ConnectionState::TimedOut { attempts } => Some(format!(
                "wallet did not connect after {} checks",
                attempts
            )),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::PollingForReady { attempt, max_attempts } => {
                write!(f, "waiting for wallet ({}/{})", attempt, max_attempts)
            }
            ConnectionState::Ready { address } => write!(f, "ready ({})", address),
            ConnectionState::AwaitingManualProceed => write!(f, "connected, address pending"),
            ConnectionState::Failed { reason } => write!(f, "failed: {}", reason),
            ConnectionState::TimedOut { attempts } => {
                write!(f, "timed out after {} checks", attempts)
            }
        }
    }
}
