//! In-progress and finalized transactions
//!
//! A [`TransactionDraft`] lives for exactly one send request. The builder
//! fills it, the signer consumes it, and it either becomes a
//! [`FinalizedTransaction`] or is dropped with the error that aborted it.

use bitcoin::blockdata::script::ScriptBuf;
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut};
use bitcoin::blockdata::witness::Witness;
use bitcoin::consensus::encode;
use bitcoin::transaction::{OutPoint, Sequence};
use bitcoin::{absolute, Address, Amount, Txid};

use crate::error::WalletError;
use crate::source::UnspentOutput;
use crate::Result;

/// A selected UTXO together with the full transaction that created it
#[derive(Debug, Clone)]
pub struct DraftInput {
    utxo: UnspentOutput,
    previous_tx: Transaction,
}

impl DraftInput {
    /// Pair a UTXO with its previous transaction, checking that the bytes
    /// really are that transaction and that the referenced output matches
    pub fn new(utxo: UnspentOutput, previous_tx: Transaction) -> Result<Self> {
        let txid = previous_tx.compute_txid();
        if txid != utxo.txid {
            return Err(WalletError::Network(format!(
                "Raw transaction hashes to {}, expected {}",
                txid, utxo.txid
            )));
        }

        let output = previous_tx.output.get(utxo.vout as usize).ok_or_else(|| {
            WalletError::Network(format!(
                "Transaction {} has no output {}",
                utxo.txid, utxo.vout
            ))
        })?;

        if output.value.to_sat() != utxo.value_sats {
            return Err(WalletError::Network(format!(
                "Output {}:{} holds {} sats, UTXO list reported {}",
                utxo.txid,
                utxo.vout,
                output.value.to_sat(),
                utxo.value_sats
            )));
        }

        Ok(Self { utxo, previous_tx })
    }

    /// Decode consensus bytes fetched from the chain service
    pub fn from_raw(utxo: UnspentOutput, raw_previous_tx: &[u8]) -> Result<Self> {
        let previous_tx: Transaction = encode::deserialize(raw_previous_tx).map_err(|e| {
            WalletError::Network(format!("Malformed raw transaction {}: {}", utxo.txid, e))
        })?;
        Self::new(utxo, previous_tx)
    }

    pub fn utxo(&self) -> &UnspentOutput {
        &self.utxo
    }

    /// The output this input spends
    pub fn spent_output(&self) -> &TxOut {
        &self.previous_tx.output[self.utxo.vout as usize]
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.utxo.txid,
            vout: self.utxo.vout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOutput {
    pub address: Address,
    pub value_sats: u64,
}

/// Mutable accumulator of inputs and outputs for one send request
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    inputs: Vec<DraftInput>,
    outputs: Vec<DraftOutput>,
    fee_sats: u64,
}

impl TransactionDraft {
    pub fn new(fee_sats: u64) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            fee_sats,
        }
    }

    pub fn add_input(&mut self, input: DraftInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, address: Address, value_sats: u64) {
        self.outputs.push(DraftOutput {
            address,
            value_sats,
        });
    }

    pub fn inputs(&self) -> &[DraftInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[DraftOutput] {
        &self.outputs
    }

    pub fn fee_sats(&self) -> u64 {
        self.fee_sats
    }

    /// Sum of input values; fails on a total no real chain can hold
    pub fn total_input_sats(&self) -> Result<u64> {
        self.inputs
            .iter()
            .try_fold(0u64, |total, input| total.checked_add(input.utxo.value_sats))
            .ok_or_else(|| WalletError::Network("input total overflows".to_string()))
    }

    pub fn total_output_sats(&self) -> u64 {
        self.outputs.iter().map(|o| o.value_sats).sum()
    }

    /// Version 2, locktime 0, final sequence numbers and empty scripts
    pub fn unsigned_transaction(&self) -> Transaction {
        Transaction {
            version: bitcoin::transaction::Version::TWO,
            lock_time: absolute::LockTime::ZERO,
            input: self
                .inputs
                .iter()
                .map(|input| TxIn {
                    previous_output: input.outpoint(),
                    script_sig: ScriptBuf::new(),
                    sequence: Sequence::MAX,
                    witness: Witness::new(),
                })
                .collect(),
            output: self
                .outputs
                .iter()
                .map(|output| TxOut {
                    value: Amount::from_sat(output.value_sats),
                    script_pubkey: output.address.script_pubkey(),
                })
                .collect(),
        }
    }
}

/// A fully signed transaction; there is no way to modify it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedTransaction {
    tx: Transaction,
}

impl FinalizedTransaction {
    pub(crate) fn new(tx: Transaction) -> Self {
        Self { tx }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn txid(&self) -> Txid {
        self.tx.compute_txid()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode::serialize(&self.tx)
    }

    pub fn to_hex(&self) -> String {
        encode::serialize_hex(&self.tx)
    }
}
