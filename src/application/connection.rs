//! Connection Manager
//!
//! Owns the wallet session lifecycle:
//! 1. `connect()` starts passkey authentication through the [`WalletSdk`]
//! 2. Readiness is polled until an address is observable
//! 3. State changes are published on a `watch` channel
//! 4. Dependents hold a [`SessionHandle`] for the address and signing
//!
//! The manager is the only writer of [`ConnectionState`].

use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};

use super::polling::{poll_for_ready, PollOutcome, PollPolicy};
use crate::domain::ConnectionState;
use crate::ports::{WalletSdk, WalletSdkError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Wallet rejected the connection: {0}")]
    Rejected(String),

    #[error("Wallet did not become ready after {attempts} checks")]
    TimedOut { attempts: u32 },

    #[error("Wallet still reports no address")]
    AddressUnavailable,

    #[error("No connection is awaiting confirmation")]
    NotAwaitingProceed,

    #[error("Connection attempt aborted by disconnect")]
    Aborted,
}

impl ConnectionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConnectionError::Rejected(_) => "Failed to connect wallet. Please try again.",
            ConnectionError::TimedOut { .. } => {
                "Wallet connection timed out. Please try again."
            }
            ConnectionError::AddressUnavailable => {
                "Wallet address is not available yet. Please try again."
            }
            ConnectionError::NotAwaitingProceed | ConnectionError::Aborted => {
                "Failed to reconnect wallet. Please try again."
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Wallet session is not ready")]
    NotReady,

    #[error("Signing cancelled by user")]
    Cancelled,

    #[error("Signing rejected: {0}")]
    Rejected(String),

    #[error("Invalid signing payload: {0}")]
    InvalidPayload(String),
}

impl From<WalletSdkError> for SigningError {
    fn from(err: WalletSdkError) -> Self {
        match err {
            WalletSdkError::Cancelled => SigningError::Cancelled,
            WalletSdkError::Rejected(reason) => SigningError::Rejected(reason),
            other => SigningError::Rejected(other.to_string()),
        }
    }
}

/// Result of a successful `connect()`
#[derive(Debug, Clone)]
pub enum ConnectOutcome {
    Ready(SessionHandle),
    /// Connected without an address; call `proceed_anyway()` to continue
    AwaitingManualProceed,
}

impl ConnectOutcome {
    pub fn session(&self) -> Option<&SessionHandle> {
        match self {
            ConnectOutcome::Ready(session) => Some(session),
            ConnectOutcome::AwaitingManualProceed => None,
        }
    }
}

/// Read-only view of the current session
#[derive(Clone)]
pub struct SessionHandle {
    sdk: Arc<dyn WalletSdk>,
    state: watch::Receiver<ConnectionState>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("wallet", &self.sdk.name())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl SessionHandle {
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    pub fn address(&self) -> Option<String> {
        self.state.borrow().address().map(str::to_string)
    }

    /// Sign `message` with the session's wallet
    pub async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        if !self.is_ready() {
            return Err(SigningError::NotReady);
        }
        if message.is_empty() {
            return Err(SigningError::InvalidPayload("empty message".to_string()));
        }

        let signature = self.sdk.sign_message(message).await?;
        tracing::debug!("Signed {} byte message", message.len());
        Ok(signature)
    }
}

pub struct ConnectionManager {
    sdk: Arc<dyn WalletSdk>,
    policy: PollPolicy,
    state_tx: watch::Sender<ConnectionState>,
    /// Serializes connect attempts
    connect_lock: Mutex<()>,
    /// Bumped on disconnect so in-flight attempts stop publishing
    epoch: AtomicU64,
}

impl ConnectionManager {
    pub fn new(sdk: Arc<dyn WalletSdk>, policy: PollPolicy) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            sdk,
            policy,
            state_tx,
            connect_lock: Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn session(&self) -> SessionHandle {
        SessionHandle {
            sdk: Arc::clone(&self.sdk),
            state: self.state_tx.subscribe(),
        }
    }

    fn publish(&self, state: ConnectionState) {
        tracing::debug!("Connection state -> {}", state);
        self.state_tx.send_replace(state);
    }

    /// Publish only if no disconnect happened since `epoch` was read
    fn publish_if_current(&self, epoch: u64, state: ConnectionState) -> bool {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        self.publish(state);
        true
    }

    /// Authenticate and wait for the wallet to report an address
    pub async fn connect(&self) -> Result<ConnectOutcome, ConnectionError> {
        let _guard = self.connect_lock.lock().await;

        if self.state().is_ready() {
            return Ok(ConnectOutcome::Ready(self.session()));
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        tracing::info!("Connecting wallet via {}", self.sdk.name());
        self.publish(ConnectionState::Connecting);

        if let Err(e) = self.sdk.connect().await {
            tracing::warn!("Wallet connect failed: {}", e);
            self.publish_if_current(
                epoch,
                ConnectionState::Failed {
                    reason: e.to_string(),
                },
            );
            return Err(ConnectionError::Rejected(e.to_string()));
        }

        let max_attempts = self.policy.max_attempts;
        let sdk = Arc::clone(&self.sdk);
        let outcome = poll_for_ready(
            self.policy,
            || sdk.snapshot(),
            |attempt| {
                let current = self.publish_if_current(
                    epoch,
                    ConnectionState::PollingForReady {
                        attempt,
                        max_attempts,
                    },
                );
                if current {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            },
        )
        .await;

        match outcome {
            PollOutcome::Cancelled { attempts } => {
                tracing::info!("Connect abandoned after {} checks: wallet disconnected", attempts);
                Err(ConnectionError::Aborted)
            }
            PollOutcome::Ready { address, attempts } => {
                if !self.publish_if_current(
                    epoch,
                    ConnectionState::Ready {
                        address: address.clone(),
                    },
                ) {
                    return Err(ConnectionError::Aborted);
                }
                tracing::info!("Wallet ready after {} checks: {}", attempts, address);
                Ok(ConnectOutcome::Ready(self.session()))
            }
            PollOutcome::ConnectedWithoutAddress { attempts } => {
                if !self.publish_if_current(epoch, ConnectionState::AwaitingManualProceed) {
                    return Err(ConnectionError::Aborted);
                }
                tracing::warn!(
                    "Wallet connected but no address after {} checks, awaiting manual proceed",
                    attempts
                );
                Ok(ConnectOutcome::AwaitingManualProceed)
            }
            PollOutcome::NeverConnected {
                attempts,
                last_error,
            } => {
                if !self.publish_if_current(epoch, ConnectionState::TimedOut { attempts }) {
                    return Err(ConnectionError::Aborted);
                }
                tracing::warn!(
                    "Wallet never connected after {} checks (last error: {:?})",
                    attempts,
                    last_error
                );
                Err(ConnectionError::TimedOut { attempts })
            }
        }
    }

    /// Re-check the wallet once after the user chose to continue without an address
    pub fn proceed_anyway(&self) -> Result<SessionHandle, ConnectionError> {
        if self.state() != ConnectionState::AwaitingManualProceed {
            return Err(ConnectionError::NotAwaitingProceed);
        }

        match self.sdk.snapshot().address.filter(|a| !a.is_empty()) {
            Some(address) => {
                tracing::info!("Proceeding with wallet {}", address);
                self.publish(ConnectionState::Ready { address });
                Ok(self.session())
            }
            None => Err(ConnectionError::AddressUnavailable),
        }
    }

    /// Drop the session. Takes effect before the SDK call completes.
    pub async fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.publish(ConnectionState::Disconnected);

        if let Err(e) = self.sdk.disconnect().await {
            tracing::warn!("Wallet disconnect reported an error: {}", e);
        } else {
            tracing::info!("Wallet disconnected");
        }
    }

    pub async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.session().sign_message(message).await
    }
}
