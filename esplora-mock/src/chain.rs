/// In-memory chain state behind the mock
///
/// Holds per-address stats and UTXO lists, a raw transaction store and
/// every transaction accepted by POST /tx. State can be seeded from a JSON
/// fixture or built up programmatically by tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use bitcoin::consensus::encode;
use bitcoin::{Address, Transaction, Txid};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AddressStats, UtxoResponse, UtxoStatus};

/// Shared application state
pub type AppState = Arc<RwLock<MockChain>>;

#[derive(Error, Debug)]
pub enum MockError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] encode::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("Fixture error: {0}")]
    Fixture(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressEntry {
    #[serde(default)]
    pub chain_stats: AddressStats,
    #[serde(default)]
    pub utxos: Vec<UtxoResponse>,
}

/// JSON fixture layout: addresses keyed by address string, raw transactions
/// keyed by txid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub addresses: HashMap<String, AddressEntry>,
    #[serde(default)]
    pub transactions: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct MockChain {
    fixture: Fixture,
    broadcasts: Vec<Transaction>,
    reject_reason: Option<String>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        Self {
            fixture,
            ..Self::default()
        }
    }

    pub fn load_fixture(path: &Path) -> Result<Self, MockError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MockError::Fixture(format!("{}: {}", path.display(), e)))?;
        let fixture: Fixture = serde_json::from_str(&text)
            .map_err(|e| MockError::Fixture(format!("{}: {}", path.display(), e)))?;
        log::info!(
            "Loaded fixture with {} addresses and {} transactions",
            fixture.addresses.len(),
            fixture.transactions.len()
        );
        Ok(Self::from_fixture(fixture))
    }

    pub fn into_state(self) -> AppState {
        Arc::new(RwLock::new(self))
    }

    /// Store a transaction so GET /tx/{txid}/hex can serve it
    pub fn add_transaction(&mut self, tx: &Transaction) -> Txid {
        let txid = tx.compute_txid();
        self.fixture
            .transactions
            .insert(txid.to_string(), encode::serialize_hex(tx));
        txid
    }

    /// Store `tx` and list each of its outputs paying `address` as a
    /// confirmed UTXO, in output order
    pub fn fund_address(&mut self, address: &Address, tx: &Transaction) -> Txid {
        let txid = self.add_transaction(tx);
        let script_pubkey = address.script_pubkey();
        let entry = self
            .fixture
            .addresses
            .entry(address.to_string())
            .or_default();

        let mut funded = false;
        for (vout, output) in tx.output.iter().enumerate() {
            if output.script_pubkey != script_pubkey {
                continue;
            }
            funded = true;
            entry.chain_stats.funded_txo_count += 1;
            entry.chain_stats.funded_txo_sum += output.value.to_sat();
            entry.utxos.push(UtxoResponse {
                txid: txid.to_string(),
                vout: vout as u32,
                value: output.value.to_sat(),
                status: UtxoStatus {
                    confirmed: true,
                    block_height: Some(1),
                },
            });
        }
        if funded {
            entry.chain_stats.tx_count += 1;
        }

        txid
    }

    /// Replace the raw hex served for `txid`
    pub fn set_raw_transaction(&mut self, txid: &Txid, hex: impl Into<String>) {
        self.fixture.transactions.insert(txid.to_string(), hex.into());
    }

    pub fn address_stats(&self, address: &str) -> AddressStats {
        self.fixture
            .addresses
            .get(address)
            .map(|entry| entry.chain_stats)
            .unwrap_or_default()
    }

    pub fn utxos(&self, address: &str) -> Vec<UtxoResponse> {
        self.fixture
            .addresses
            .get(address)
            .map(|entry| entry.utxos.clone())
            .unwrap_or_default()
    }

    pub fn raw_transaction(&self, txid: &str) -> Option<String> {
        self.fixture.transactions.get(txid).cloned()
    }

    /// Make every following POST /tx fail with `reason`
    pub fn reject_broadcasts(&mut self, reason: impl Into<String>) {
        self.reject_reason = Some(reason.into());
    }

    /// Decode and accept a broadcast, returning its txid
    pub fn broadcast(&mut self, tx_hex: &str) -> Result<Txid, MockError> {
        if let Some(reason) = &self.reject_reason {
            return Err(MockError::Rejected(reason.clone()));
        }

        let bytes = hex::decode(tx_hex.trim())?;
        let tx: Transaction = encode::deserialize(&bytes)?;
        let txid = self.add_transaction(&tx);
        self.broadcasts.push(tx);

        log::info!("Accepted broadcast {}", txid);
        Ok(txid)
    }

    pub fn broadcasts(&self) -> &[Transaction] {
        &self.broadcasts
    }
}
