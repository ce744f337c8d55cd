//! Chain capabilities consumed by the send pipeline
//!
//! - [`UtxoSource`] answers balance, UTXO and raw-transaction queries
//! - [`Broadcaster`] submits finalized transactions
//!
//! [`crate::esplora::EsploraClient`] implements both over HTTP. Transport,
//! retry and auth live behind these traits and never leak into the core.

use async_trait::async_trait;
use bitcoin::{Address, Txid};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Confirmed activity of one address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressBalance {
    pub funded_sats: u64,
    pub spent_sats: u64,
    pub tx_count: u64,
}

impl AddressBalance {
    pub fn balance_sats(&self) -> u64 {
        self.funded_sats.saturating_sub(self.spent_sats)
    }
}

/// An unspent output as listed by the chain service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: Txid,
    pub vout: u32,
    pub value_sats: u64,
}

#[async_trait]
pub trait UtxoSource: Send + Sync {
    async fn get_balance(&self, address: &Address) -> Result<AddressBalance>;

    /// UTXOs in the order the service returns them
    async fn get_utxos(&self, address: &Address) -> Result<Vec<UnspentOutput>>;

    /// Consensus-encoded bytes of a full transaction
    async fn get_raw_transaction(&self, txid: &Txid) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Submit consensus-encoded transaction bytes, returning the id the
    /// service assigned
    async fn submit(&self, tx_bytes: &[u8]) -> Result<Txid>;
}
