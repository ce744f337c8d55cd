use bitcoin::Address;

use crate::config::WalletConfig;
use crate::esplora::EsploraClient;
use crate::keys::{parse_address, KeyMaterial};
use crate::mnemonic::Phrase;
use crate::send::{send_bitcoin, SendReceipt};
use crate::signer::PrivateKeySigner;
use crate::source::{AddressBalance, Broadcaster, UtxoSource};
use crate::Result;

/// Orchestrator for a single-address wallet
///
/// Owns the configuration, the key material derived from one phrase and the
/// chain client. Holds no state between requests.
pub struct WalletManager<C = EsploraClient> {
    config: WalletConfig,
    keys: KeyMaterial,
    client: C,
}

impl WalletManager<EsploraClient> {
    /// Derive keys from `phrase` and talk to the configured Esplora endpoint
    pub fn new(config: WalletConfig, phrase: &Phrase) -> Result<Self> {
        let client = EsploraClient::from_config(&config);
        Self::with_client(config, phrase, client)
    }
}

impl<C: UtxoSource + Broadcaster> WalletManager<C> {
    pub fn with_client(config: WalletConfig, phrase: &Phrase, client: C) -> Result<Self> {
        let keys = KeyMaterial::derive(phrase, &config)?;
        log::info!("Wallet address: {}", keys.address);
        Ok(Self {
            config,
            keys,
            client,
        })
    }

    pub fn address(&self) -> &Address {
        &self.keys.address
    }

    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn balance(&self) -> Result<AddressBalance> {
        let balance = self.client.get_balance(&self.keys.address).await?;
        log::info!(
            "{} - {} [{}]",
            balance.funded_sats,
            balance.spent_sats,
            balance.tx_count
        );
        Ok(balance)
    }

    /// Send `amount_sats` to `to_address` with the configured fixed fee
    pub async fn send(&self, to_address: &str, amount_sats: u64) -> Result<SendReceipt> {
        let destination = parse_address(to_address, self.config.network)?;

        send_bitcoin(
            &self.client,
            &self.client,
            &self.keys,
            PrivateKeySigner::from_keys(&self.keys),
            &destination,
            amount_sats,
            self.config.fee_sats,
        )
        .await
    }
}
