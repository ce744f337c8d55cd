//! Bitcoin sending operations

use bitcoin::{Address, Txid};

use crate::builder::{validate_amount, TransactionBuilder};
use crate::keys::KeyMaterial;
use crate::signer::{EcdsaSigner, TransactionSigner};
use crate::source::{Broadcaster, UtxoSource};
use crate::Result;

/// What a successful send produced
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub txid: Txid,
    pub tx_hex: String,
    pub amount_sats: u64,
    pub fee_sats: u64,
    pub change_sats: u64,
    pub input_count: usize,
}

/// Send `amount_sats` from the key's address to `destination`
///
/// UTXO query -> per-input raw fetch and selection -> signing -> broadcast.
/// The amount is checked before any network call. Every step runs once, in
/// order; the first error ends the request and nothing is broadcast unless
/// every input signed and validated.
pub async fn send_bitcoin<S, B, K>(
    source: &S,
    broadcaster: &B,
    keys: &KeyMaterial,
    signer: K,
    destination: &Address,
    amount_sats: u64,
    fee_sats: u64,
) -> Result<SendReceipt>
where
    S: UtxoSource + ?Sized,
    B: Broadcaster + ?Sized,
    K: EcdsaSigner,
{
    validate_amount(amount_sats)?;

    log::info!(
        "Sending {} sats from {} to {}",
        amount_sats,
        keys.address,
        destination
    );

    let utxos = source.get_utxos(&keys.address).await?;

    let draft = TransactionBuilder::new(fee_sats)
        .build(source, &utxos, destination, amount_sats, &keys.address)
        .await?;

    let input_count = draft.inputs().len();
    let change_sats = draft
        .outputs()
        .get(1)
        .map(|change| change.value_sats)
        .unwrap_or(0);

    let finalized = TransactionSigner::new(signer).sign(draft)?;
    let tx_hex = finalized.to_hex();
    log::debug!("Signed transaction: {}", tx_hex);

    let txid = broadcaster.submit(&finalized.to_bytes()).await?;
    log::info!("Transaction broadcasted! TXID: {}", txid);

    if txid != finalized.txid() {
        log::warn!(
            "Service reported txid {}, locally computed {}",
            txid,
            finalized.txid()
        );
    }

    Ok(SendReceipt {
        txid,
        tx_hex,
        amount_sats,
        fee_sats,
        change_sats,
        input_count,
    })
}
