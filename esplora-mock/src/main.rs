/// Esplora Mock Server
///
/// A lightweight mock server that answers Esplora API calls from an
/// in-memory chain, optionally seeded from a JSON fixture.
/// Designed for local development of the wallet without a live network.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use esplora_mock::{run_server, MockChain};

#[derive(Debug)]
struct Config {
    // Optional JSON fixture with addresses and raw transactions
    fixture_path: Option<PathBuf>,

    // Server
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let fixture_path = env::var("FIXTURE_PATH").ok().map(PathBuf::from);

        let server_host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            fixture_path,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting Esplora Mock Server...");

    // Load configuration
    let config = Config::from_env()
        .context("Failed to load configuration")?;

    let chain = match &config.fixture_path {
        Some(path) => MockChain::load_fixture(path).context("Failed to load fixture")?,
        None => {
            log::info!("No FIXTURE_PATH set, starting with an empty chain");
            MockChain::new()
        }
    };

    log::info!("Server will listen on {}:{}", config.server_host, config.server_port);

    // Run server
    run_server(chain.into_state(), config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
