//! Per-input signing with immediate validation
//!
//! Inputs are legacy P2PKH. Each input is signed with SIGHASH_ALL and then
//! checked before the next one is touched: the spent output must pay the
//! signer's key, the script_sig must be `<sig> <pubkey>` and the signature
//! must verify against a freshly computed sighash. The first failure aborts
//! the whole draft.

use bitcoin::blockdata::script::{Instruction, PushBytesBuf, Script, ScriptBuf};
use bitcoin::blockdata::transaction::Transaction;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{ecdsa, All, Message, Secp256k1, VerifyOnly};
use bitcoin::sighash::{EcdsaSighashType, LegacySighash, SighashCache};
use bitcoin::{PrivateKey, PublicKey};

use crate::draft::{FinalizedTransaction, TransactionDraft};
use crate::error::WalletError;
use crate::keys::KeyMaterial;
use crate::Result;

/// ECDSA signing capability for a single key
pub trait EcdsaSigner {
    fn public_key(&self) -> PublicKey;

    fn sign(&self, sighash: LegacySighash) -> Result<ecdsa::Signature>;
}

/// Signs with an in-memory private key
pub struct PrivateKeySigner {
    secp: Secp256k1<All>,
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl PrivateKeySigner {
    pub fn new(private_key: PrivateKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_private_key(&secp, &private_key);
        Self {
            secp,
            private_key,
            public_key,
        }
    }

    pub fn from_keys(keys: &KeyMaterial) -> Self {
        Self::new(keys.private_key)
    }
}

impl EcdsaSigner for PrivateKeySigner {
    fn public_key(&self) -> PublicKey {
        self.public_key
    }

    fn sign(&self, sighash: LegacySighash) -> Result<ecdsa::Signature> {
        let message = Message::from_digest(sighash.to_byte_array());
        Ok(self.secp.sign_ecdsa(&message, &self.private_key.inner))
    }
}

pub struct TransactionSigner<K> {
    key: K,
    secp: Secp256k1<VerifyOnly>,
}

impl<K: EcdsaSigner> TransactionSigner<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            secp: Secp256k1::verification_only(),
        }
    }

    /// Sign every input in draft order, validating each one as soon as it is
    /// signed, and finalize the result
    pub fn sign(&self, draft: TransactionDraft) -> Result<FinalizedTransaction> {
        let mut tx = draft.unsigned_transaction();

        for (input_index, input) in draft.inputs().iter().enumerate() {
            let script_pubkey = &input.spent_output().script_pubkey;

            let sighash = legacy_sighash(&tx, input_index, script_pubkey)?;
            let signature = self.key.sign(sighash).map_err(|e| match e {
                WalletError::SigningFailure { .. } => e,
                other => WalletError::signing(input_index, other.to_string()),
            })?;

            tx.input[input_index].script_sig =
                p2pkh_script_sig(input_index, signature, &self.key.public_key())?;

            if let Err(e) = self.validate_input(&tx, input_index, script_pubkey) {
                log::error!("Aborting draft: {}", e);
                return Err(e);
            }

            log::debug!("Signed and validated input {} ({})", input_index, input.outpoint());
        }

        Ok(FinalizedTransaction::new(tx))
    }

    fn validate_input(&self, tx: &Transaction, input_index: usize, script_pubkey: &Script) -> Result<()> {
        if !script_pubkey.is_p2pkh() {
            return Err(WalletError::signing(
                input_index,
                format!("spent output is not P2PKH: {}", script_pubkey),
            ));
        }

        let script_sig = &tx.input[input_index].script_sig;
        let pushes = script_sig
            .instructions()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| WalletError::signing(input_index, format!("unparseable script_sig: {}", e)))?;

        let (sig_bytes, key_bytes) = match pushes.as_slice() {
            [Instruction::PushBytes(sig), Instruction::PushBytes(key)] => (sig.as_bytes(), key.as_bytes()),
            _ => {
                return Err(WalletError::signing(
                    input_index,
                    "script_sig is not <signature> <pubkey>",
                ))
            }
        };

        let signature = bitcoin::ecdsa::Signature::from_slice(sig_bytes)
            .map_err(|e| WalletError::signing(input_index, format!("bad signature encoding: {}", e)))?;
        if signature.sighash_type != EcdsaSighashType::All {
            return Err(WalletError::signing(
                input_index,
                format!("unexpected sighash type {}", signature.sighash_type),
            ));
        }

        let public_key = PublicKey::from_slice(key_bytes)
            .map_err(|e| WalletError::signing(input_index, format!("bad public key: {}", e)))?;
        if ScriptBuf::new_p2pkh(&public_key.pubkey_hash()).as_script() != script_pubkey {
            return Err(WalletError::signing(
                input_index,
                "public key does not match the spent output",
            ));
        }

        let sighash = legacy_sighash(tx, input_index, script_pubkey)?;
        let message = Message::from_digest(sighash.to_byte_array());
        self.secp
            .verify_ecdsa(&message, &signature.signature, &public_key.inner)
            .map_err(|e| WalletError::signing(input_index, format!("signature does not verify: {}", e)))
    }
}

fn legacy_sighash(tx: &Transaction, input_index: usize, script_pubkey: &Script) -> Result<LegacySighash> {
    SighashCache::new(tx)
        .legacy_signature_hash(input_index, script_pubkey, EcdsaSighashType::All.to_u32())
        .map_err(|e| WalletError::signing(input_index, e.to_string()))
}

fn p2pkh_script_sig(
    input_index: usize,
    signature: ecdsa::Signature,
    public_key: &PublicKey,
) -> Result<ScriptBuf> {
    let signature = bitcoin::ecdsa::Signature {
        signature,
        sighash_type: EcdsaSighashType::All,
    };
    let sig_push = PushBytesBuf::try_from(signature.to_vec())
        .map_err(|e| WalletError::signing(input_index, e.to_string()))?;

    Ok(ScriptBuf::builder()
        .push_slice(sig_push)
        .push_key(public_key)
        .into_script())
}
