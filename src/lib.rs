//! Phrase Wallet: checksum-word recovery and single-address Bitcoin sends
//!
//! This crate recovers the missing 12th word of an 11-word recovery phrase
//! and, from a complete phrase, derives one P2PKH keypair, builds and signs
//! a transaction against UTXOs reported by an Esplora service, and submits
//! it for broadcast.
//!
//! # Architecture
//!
//! - **Checksum resolver** (`mnemonic`): exhaustive search of the wordlist
//!   for a word that completes a valid entropy + checksum encoding
//! - **Key material** (`keys`): phrase -> seed -> BIP32 key -> address
//! - **Chain capabilities** (`source`, `esplora`): balance, UTXOs, raw
//!   transactions and broadcast
//! - **Transaction builder** (`builder`): greedy source-order selection with
//!   a fixed fee and optional change output
//! - **Transaction signer** (`signer`): per-input sign-then-validate,
//!   finalization into consensus bytes
//!
//! # Example
//!
//! ```ignore
//! use phrase_wallet::{english_wordlist, Phrase, WalletConfig, WalletManager};
//!
//! let phrase = Phrase::parse(&eleven_words, english_wordlist())?;
//! println!("New: {}", phrase.resolved_word().unwrap_or("-"));
//!
//! let wallet = WalletManager::new(WalletConfig::new(false), &phrase)?;
//! let receipt = wallet.send("mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn", 1000).await?;
//! println!("TXID: {}", receipt.txid);
//! ```

pub mod builder;
pub mod config;
pub mod draft;
pub mod error;
pub mod esplora;
pub mod keys;
pub mod manager;
pub mod mnemonic;
pub mod send;
pub mod signer;
pub mod source;

pub use builder::{compute_change, select_utxos, validate_amount, Selection, TransactionBuilder};
pub use config::WalletConfig;
pub use draft::{DraftInput, DraftOutput, FinalizedTransaction, TransactionDraft};
pub use error::{ErrorKind, WalletError};
pub use esplora::EsploraClient;
pub use keys::{parse_address, KeyMaterial};
pub use manager::WalletManager;
pub use mnemonic::{english_wordlist, resolve_checksum_word, validate_phrase, Phrase};
pub use send::{send_bitcoin, SendReceipt};
pub use signer::{EcdsaSigner, PrivateKeySigner, TransactionSigner};
pub use source::{AddressBalance, Broadcaster, UnspentOutput, UtxoSource};

pub type Result<T> = std::result::Result<T, WalletError>;
