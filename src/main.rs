//! DeFiPass - Walletless Solana swaps through Jupiter
//!
//! Command-line front end over the session and swap workflow.

use anyhow::Result;
use defipass::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the TOML config)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
