use std::str::FromStr;

use async_trait::async_trait;
use bitcoin::{Address, Txid};
use serde::Deserialize;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::source::{AddressBalance, Broadcaster, UnspentOutput, UtxoSource};
use crate::Result;

/// Esplora REST client (Blockstream-compatible API)
#[derive(Clone)]
pub struct EsploraClient {
    client: reqwest::Client,
    base_url: String,
}

/// Response of `GET /address/{address}`
#[derive(Debug, Deserialize)]
struct AddressInfo {
    chain_stats: ChainStats,
}

#[derive(Debug, Deserialize)]
struct ChainStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
    tx_count: u64,
}

/// One entry of `GET /address/{address}/utxo`
#[derive(Debug, Deserialize)]
struct UtxoEntry {
    txid: Txid,
    vout: u32,
    value: u64,
}

impl EsploraClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.esplora_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WalletError::Network(format!(
                "GET {} failed with {}: {}",
                path,
                status,
                body.trim()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl UtxoSource for EsploraClient {
    async fn get_balance(&self, address: &Address) -> Result<AddressBalance> {
        let info: AddressInfo = self
            .get(&format!("/address/{}", address))
            .await?
            .json()
            .await
            .map_err(|e| WalletError::Network(format!("Malformed address stats: {}", e)))?;

        Ok(AddressBalance {
            funded_sats: info.chain_stats.funded_txo_sum,
            spent_sats: info.chain_stats.spent_txo_sum,
            tx_count: info.chain_stats.tx_count,
        })
    }

    async fn get_utxos(&self, address: &Address) -> Result<Vec<UnspentOutput>> {
        let entries: Vec<UtxoEntry> = self
            .get(&format!("/address/{}/utxo", address))
            .await?
            .json()
            .await
            .map_err(|e| WalletError::Network(format!("Malformed UTXO list: {}", e)))?;

        log::debug!("{} UTXOs listed for {}", entries.len(), address);

        Ok(entries
            .into_iter()
            .map(|entry| UnspentOutput {
                txid: entry.txid,
                vout: entry.vout,
                value_sats: entry.value,
            })
            .collect())
    }

    async fn get_raw_transaction(&self, txid: &Txid) -> Result<Vec<u8>> {
        let body = self.get(&format!("/tx/{}/hex", txid)).await?.text().await?;

        hex::decode(body.trim())
            .map_err(|e| WalletError::Network(format!("Malformed transaction hex for {}: {}", txid, e)))
    }
}

#[async_trait]
impl Broadcaster for EsploraClient {
    async fn submit(&self, tx_bytes: &[u8]) -> Result<Txid> {
        let url = format!("{}/tx", self.base_url);
        log::debug!("Broadcasting transaction to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/plain")
            .body(hex::encode(tx_bytes))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WalletError::BroadcastRejected(error_text.trim().to_string()));
        }

        let body = response.text().await?;
        Txid::from_str(body.trim())
            .map_err(|e| WalletError::Network(format!("Malformed txid in broadcast response: {}", e)))
    }
}
