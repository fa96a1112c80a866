//! Readiness Polling
//!
//! The wallet SDK resolves `connect()` before its observable state settles.
//! [`poll_for_ready`] waits one interval, probes, and repeats for at most
//! `max_attempts` ticks. Ticks are strictly sequential. The tick callback can
//! stop the loop early, in which case the remaining ticks are skipped.

use std::ops::ControlFlow;
use std::time::Duration;

use crate::ports::WalletSnapshot;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on time spent polling
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { address: String, attempts: u32 },
    /// Wallet reported connected but never an address
    ConnectedWithoutAddress { attempts: u32 },
    NeverConnected {
        attempts: u32,
        last_error: Option<String>,
    },
    /// `on_tick` broke out before this tick's probe
    Cancelled { attempts: u32 },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts, .. }
            | PollOutcome::ConnectedWithoutAddress { attempts }
            | PollOutcome::NeverConnected { attempts, .. }
            | PollOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

/// Poll `probe` until it reports a ready wallet or the attempt ceiling is hit.
///
/// `on_tick` runs with the 1-based attempt number before each probe; returning
/// `ControlFlow::Break` ends polling with [`PollOutcome::Cancelled`].
pub async fn poll_for_ready<P, T>(policy: PollPolicy, mut probe: P, mut on_tick: T) -> PollOutcome
where
    P: FnMut() -> WalletSnapshot,
    T: FnMut(u32) -> ControlFlow<()>,
{
    let mut last = WalletSnapshot::default();
    let mut seen_connected = false;

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        if on_tick(attempt).is_break() {
            return PollOutcome::Cancelled {
                attempts: attempt - 1,
            };
        }

        last = probe();
        tracing::debug!(
            "Readiness check {}/{}: connected={} address={:?}",
            attempt,
            policy.max_attempts,
            last.connected,
            last.address
        );

        if last.is_ready() {
            return PollOutcome::Ready {
                address: last.address.unwrap_or_default(),
                attempts: attempt,
            };
        }
        seen_connected |= last.connected;
    }

    if seen_connected {
        PollOutcome::ConnectedWithoutAddress {
            attempts: policy.max_attempts,
        }
    } else {
        PollOutcome::NeverConnected {
            attempts: policy.max_attempts,
            last_error: last.error,
        }
    }
}
