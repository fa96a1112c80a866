pub mod rpc;
pub mod verifier;
pub mod wallet;

pub use rpc::{parse_commitment, SolanaClient};
pub use verifier::Ed25519Verifier;
pub use wallet::{KeypairWallet, WalletError};
