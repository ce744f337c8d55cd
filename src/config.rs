/// Wallet configuration
///
/// Controls Bitcoin network type, Esplora API endpoint, the fixed fee and
/// the derivation path. Built explicitly from the network flag, or from
/// environment variables. Defaults to Testnet.
use std::env;

use bitcoin::Network;

/// Fixed per-transaction fee in sats
pub const DEFAULT_FEE_SATS: u64 = 1000;

/// BIP44 path used on every network
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/0'/0'/0/0";

const MAINNET_ESPLORA_URL: &str = "https://blockstream.info/api";
const TESTNET_ESPLORA_URL: &str = "https://blockstream.info/testnet/api";

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Bitcoin network type (for address encoding and key serialization)
    pub network: Network,
    /// Esplora API base URL
    pub esplora_url: String,
    /// Fee paid by every transaction, independent of its size
    pub fee_sats: u64,
    /// Path from the BIP32 master key to the wallet key
    pub derivation_path: String,
}

impl WalletConfig {
    /// Build the configuration for mainnet (`true`) or testnet (`false`)
    pub fn new(mainnet: bool) -> Self {
        let (network, esplora_url) = if mainnet {
            (Network::Bitcoin, MAINNET_ESPLORA_URL)
        } else {
            (Network::Testnet, TESTNET_ESPLORA_URL)
        };

        Self {
            network,
            esplora_url: esplora_url.to_string(),
            fee_sats: DEFAULT_FEE_SATS,
            derivation_path: DEFAULT_DERIVATION_PATH.to_string(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `MAINNET`: `1` selects mainnet, anything else testnet
    /// - `ESPLORA_URL`: Esplora API endpoint (optional, defaults per network)
    /// - `FEE_SATS`: fixed fee in sats (optional, default 1000)
    /// - `DERIVATION_PATH`: BIP32 path (optional, default `m/44'/0'/0'/0/0`)
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Testnet (default)
    /// WORDS="..." phrase-wallet balance
    ///
    /// # Mainnet against a local Esplora
    /// MAINNET=1 ESPLORA_URL=http://localhost:3000 phrase-wallet balance
    /// ```
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mainnet = env::var("MAINNET").map(|v| v.trim() == "1").unwrap_or(false);
        Self::new(mainnet).with_env_overrides()
    }

    /// Apply `ESPLORA_URL`, `FEE_SATS` and `DERIVATION_PATH` on top of the
    /// network defaults
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("ESPLORA_URL") {
            self.esplora_url = url;
        }

        if let Ok(raw) = env::var("FEE_SATS") {
            match raw.trim().parse::<u64>() {
                Ok(fee) => self.fee_sats = fee,
                Err(e) => log::warn!(
                    "Ignoring FEE_SATS={:?} ({}), using {} sats",
                    raw,
                    e,
                    self.fee_sats
                ),
            }
        }

        if let Ok(path) = env::var("DERIVATION_PATH") {
            self.derivation_path = path;
        }

        match self.network {
            Network::Bitcoin => log::info!("Using MAINNET network"),
            _ => log::info!("Using TESTNET network"),
        }
        log::info!("Esplora URL: {}", self.esplora_url);

        self
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self.network, Network::Bitcoin)
    }
}

impl Default for WalletConfig {
    /// Default configuration (Testnet)
    fn default() -> Self {
        Self::new(false)
    }
}
