// ABOUTME: Entry point for chainclaw: a terminal front-end for wallet-scoped AI agents.
// ABOUTME: Parses CLI args, loads config, sets up logging and the wallet provider, and launches the app.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use chainclaw::app::App;
use chainclaw::config::Config;
use chainclaw::logging::init_logging;
use chainclaw::wallet::{JsonRpcProvider, WalletProvider};

#[derive(Debug, Parser)]
#[command(name = "chainclaw", version, about = "Chat with your wallet's AI agents")]
struct Cli {
    /// Agent backend base URL.
    #[arg(long)]
    backend_url: Option<String>,

    /// Wallet JSON-RPC endpoint.
    #[arg(long)]
    wallet_rpc: Option<String>,

    /// Run without a wallet provider.
    #[arg(long)]
    no_wallet: bool,

    /// Config file to read instead of ~/.chainclaw/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    config.apply_overrides(cli.backend_url, cli.wallet_rpc);
    if cli.no_wallet {
        config.wallet.rpc_url.clear();
    }

    init_logging(&Config::log_path())?;
    info!(backend = %config.backend.base_url, "chainclaw starting");

    let provider = match config.wallet.provider_config() {
        Some(provider_config) => {
            let provider: Arc<dyn WalletProvider> = Arc::new(JsonRpcProvider::new(provider_config)?);
            Some(provider)
        }
        None => None,
    };

    App::new(&config, provider)?.run().await
}
