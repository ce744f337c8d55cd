//! Shared test utilities for wallet integration tests
//!
//! - Logger setup
//! - The "abandon ... about" test wallet
//! - Funding transactions and a background Esplora mock
//! - Independent P2PKH signature checks for broadcast transactions

#![allow(dead_code)]

use bitcoin::blockdata::script::Instruction;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::{OutPoint, TxIn, TxOut, Version};
use bitcoin::{absolute, Address, Amount, Network, PubkeyHash, PublicKey, Transaction};
use esplora_mock::{spawn_server, AppState, MockChain};
use phrase_wallet::{english_wordlist, EsploraClient, Phrase, WalletConfig, WalletManager};

pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Eleven "abandon" words; the recovered 12th word is "about"
pub fn test_phrase() -> Phrase {
    Phrase::from_words(&["abandon"; 11], english_wordlist()).expect("valid prefix")
}

pub fn test_config() -> WalletConfig {
    WalletConfig::new(false)
}

/// A testnet P2PKH address nobody in the tests holds a key for
pub fn foreign_address(tag: u8) -> Address {
    Address::p2pkh(PubkeyHash::from_byte_array([tag; 20]), Network::Testnet)
}

/// A transaction paying each of `values` to `to`, one output per value
pub fn funding_tx(to: &Address, values: &[u64], nonce: u32) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: absolute::LockTime::from_consensus(nonce),
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            ..Default::default()
        }],
        output: values
            .iter()
            .map(|value| TxOut {
                value: Amount::from_sat(*value),
                script_pubkey: to.script_pubkey(),
            })
            .collect(),
    }
}

/// Running Esplora mock plus a wallet pointed at it
pub struct TestEnvironment {
    pub state: AppState,
    pub wallet: WalletManager<EsploraClient>,
    server: tokio::task::JoinHandle<()>,
}

impl TestEnvironment {
    pub async fn new() -> anyhow::Result<Self> {
        init_logging();

        let state = MockChain::new().into_state();
        let (addr, server) = spawn_server(state.clone()).await?;
        log::info!("Esplora mock: http://{}", addr);

        let client = EsploraClient::new(format!("http://{}", addr));
        let wallet = WalletManager::with_client(test_config(), &test_phrase(), client)?;

        Ok(Self {
            state,
            wallet,
            server,
        })
    }

    /// Fund the wallet address with one output per value, in order
    pub fn fund(&self, values: &[u64]) -> Transaction {
        let tx = funding_tx(self.wallet.address(), values, 0);
        self.state
            .write()
            .unwrap()
            .fund_address(self.wallet.address(), &tx);
        tx
    }

    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.state.read().unwrap().broadcasts().to_vec()
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Check every input of `tx` as a P2PKH spend of the matching output in
/// `spent`, returning the public key used by each input
pub fn verify_p2pkh_inputs(tx: &Transaction, spent: &[TxOut]) -> Vec<PublicKey> {
    let secp = Secp256k1::verification_only();
    assert_eq!(tx.input.len(), spent.len());

    tx.input
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let pushes: Vec<Instruction> = input
                .script_sig
                .instructions()
                .collect::<Result<_, _>>()
                .expect("script_sig parses");
            assert_eq!(pushes.len(), 2, "input {} script_sig shape", index);

            let (sig, key) = match (&pushes[0], &pushes[1]) {
                (Instruction::PushBytes(sig), Instruction::PushBytes(key)) => {
                    (sig.as_bytes(), key.as_bytes())
                }
                _ => panic!("input {} script_sig is not two pushes", index),
            };

            let signature = bitcoin::ecdsa::Signature::from_slice(sig).expect("DER signature");
            assert_eq!(signature.sighash_type, EcdsaSighashType::All);
            let public_key = PublicKey::from_slice(key).expect("public key");

            let script_pubkey = &spent[index].script_pubkey;
            assert_eq!(
                *script_pubkey,
                bitcoin::ScriptBuf::new_p2pkh(&public_key.pubkey_hash())
            );

            let sighash = SighashCache::new(tx)
                .legacy_signature_hash(index, script_pubkey, EcdsaSighashType::All.to_u32())
                .expect("sighash");
            let message = Message::from_digest(sighash.to_byte_array());
            secp.verify_ecdsa(&message, &signature.signature, &public_key.inner)
                .unwrap_or_else(|e| panic!("input {} signature invalid: {}", index, e));

            public_key
        })
        .collect()
}
