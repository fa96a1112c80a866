//! Native SOL balance for the connected session.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use super::connection::SessionHandle;
use crate::domain::DataSource;
use crate::ports::BalanceProvider;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub lamports: u64,
    /// `Fallback` when the RPC query failed and zero was substituted
    pub source: DataSource,
}

impl Balance {
    pub fn sol(&self) -> Decimal {
        Decimal::from(self.lamports) / Decimal::from(LAMPORTS_PER_SOL)
    }

    /// "1.2346 SOL"
    pub fn display(&self) -> String {
        let sol = self
            .sol()
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.4} SOL", sol)
    }
}

pub struct BalanceReader {
    provider: Arc<dyn BalanceProvider>,
}

impl BalanceReader {
    pub fn new(provider: Arc<dyn BalanceProvider>) -> Self {
        Self { provider }
    }

    /// Balance of the session address; `None` without an address
    pub async fn sol_balance(&self, session: &SessionHandle) -> Option<Balance> {
        let address = session.address()?;

        match self.provider.get_balance(&address).await {
            Ok(lamports) => Some(Balance {
                lamports,
                source: DataSource::Live,
            }),
            Err(e) => {
                tracing::warn!("Balance query for {} failed, showing 0: {}", address, e);
                Some(Balance {
                    lamports: 0,
                    source: DataSource::Fallback,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::connection::ConnectionManager;
    use crate::application::polling::PollPolicy;
    use crate::ports::balance::MockBalanceProvider;
    use crate::ports::mocks::MockWallet;
    use crate::ports::BalanceError;

    #[test]
    fn test_balance_display() {
        let balance = Balance {
            lamports: 1_234_567_890,
            source: DataSource::Live,
        };
        assert_eq!(balance.display(), "1.2346 SOL");
        assert_eq!(
            Balance {
                lamports: 0,
                source: DataSource::Fallback
            }
            .display(),
            "0.0000 SOL"
        );
    }

    #[test]
    fn test_balance_display_rounds_half_up() {
        let at = |lamports| Balance {
            lamports,
            source: DataSource::Live,
        };
        assert_eq!(at(1_000_050_000).display(), "1.0001 SOL");
        assert_eq!(at(1_000_049_999).display(), "1.0000 SOL");
        assert_eq!(at(999_990_000).display(), "1.0000 SOL");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_session_address() {
        let mut provider = MockBalanceProvider::new();
        provider
            .expect_get_balance()
            .withf(|address: &str| address == "Wallet1111")
            .times(1)
            .returning(|_| Ok(2_500_000_000));

        let manager =
            ConnectionManager::new(Arc::new(MockWallet::new("Wallet1111")), PollPolicy::default());
        let reader = BalanceReader::new(Arc::new(provider));
        assert_eq!(reader.sol_balance(&manager.session()).await, None);

        manager.connect().await.unwrap();
        let balance = reader.sol_balance(&manager.session()).await.unwrap();
        assert_eq!(balance.source, DataSource::Live);
        assert_eq!(balance.display(), "2.5000 SOL");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rpc_failure_shows_zero() {
        let mut provider = MockBalanceProvider::new();
        provider
            .expect_get_balance()
            .returning(|_| Err(BalanceError::Rpc("connection refused".into())));

        let manager = ConnectionManager::new(Arc::new(MockWallet::new("w")), PollPolicy::default());
        manager.connect().await.unwrap();

        let balance = BalanceReader::new(Arc::new(provider))
            .sol_balance(&manager.session())
            .await
            .unwrap();
        assert_eq!(balance.lamports, 0);
        assert_eq!(balance.source, DataSource::Fallback);
    }
}
