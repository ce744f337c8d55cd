use bitcoin::{Address, Amount};

use crate::draft::{DraftInput, TransactionDraft};
use crate::error::WalletError;
use crate::source::{UnspentOutput, UtxoSource};
use crate::Result;

/// UTXOs picked by [`select_utxos`], in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub selected: Vec<UnspentOutput>,
    pub total_sats: u64,
}

/// Reject amounts that cannot be a payment output
///
/// Zero and anything above the 21M BTC supply fail with `InvalidAmount`.
pub fn validate_amount(amount_sats: u64) -> Result<()> {
    if amount_sats == 0 || amount_sats > Amount::MAX_MONEY.to_sat() {
        return Err(WalletError::InvalidAmount(amount_sats));
    }
    Ok(())
}

/// Greedy accumulation in source order
///
/// Takes UTXOs in the order given until their sum reaches `target + fee`.
/// When the list runs out first, everything is returned and the shortfall
/// is left for [`compute_change`] to report. A listing whose values
/// overflow u64 is a malformed service response.
pub fn select_utxos(utxos: &[UnspentOutput], target_sats: u64, fee_sats: u64) -> Result<Selection> {
    let threshold = target_sats
        .checked_add(fee_sats)
        .ok_or(WalletError::InvalidAmount(target_sats))?;
    let mut selected = Vec::new();
    let mut total_sats = 0u64;

    for utxo in utxos {
        selected.push(utxo.clone());
        total_sats = total_sats
            .checked_add(utxo.value_sats)
            .ok_or_else(|| WalletError::Network("input total overflows".to_string()))?;
        if total_sats >= threshold {
            break;
        }
    }

    Ok(Selection {
        selected,
        total_sats,
    })
}

/// `total_input - target - fee`, failing when that would be negative
pub fn compute_change(total_input_sats: u64, target_sats: u64, fee_sats: u64) -> Result<u64> {
    let needed = target_sats
        .checked_add(fee_sats)
        .ok_or(WalletError::InvalidAmount(target_sats))?;
    total_input_sats
        .checked_sub(needed)
        .ok_or(WalletError::InsufficientFunds {
            needed,
            have: total_input_sats,
        })
}

/// Assembles a [`TransactionDraft`] from a UTXO listing
pub struct TransactionBuilder {
    fee_sats: u64,
}

impl TransactionBuilder {
    /// Create a builder that charges `fee_sats` on every transaction
    pub fn new(fee_sats: u64) -> Self {
        Self { fee_sats }
    }

    /// Build a draft paying `amount_sats` to `destination`, returning any
    /// change to `change_address`
    ///
    /// One raw-transaction fetch is made per selected input, in input order.
    /// Any failure drops the partial draft.
    pub async fn build<S: UtxoSource + ?Sized>(
        &self,
        source: &S,
        utxos: &[UnspentOutput],
        destination: &Address,
        amount_sats: u64,
        change_address: &Address,
    ) -> Result<TransactionDraft> {
        validate_amount(amount_sats)?;
        if utxos.is_empty() {
            return Err(WalletError::NoUtxosAvailable);
        }

        let selection = select_utxos(utxos, amount_sats, self.fee_sats)?;
        log::info!(
            "Selected {} of {} UTXOs totalling {} sats",
            selection.selected.len(),
            utxos.len(),
            selection.total_sats
        );

        let mut draft = TransactionDraft::new(self.fee_sats);

        for utxo in selection.selected {
            let raw = source.get_raw_transaction(&utxo.txid).await?;
            draft.add_input(DraftInput::from_raw(utxo, &raw)?);
        }

        let change_sats = compute_change(draft.total_input_sats()?, amount_sats, self.fee_sats)?;

        draft.add_output(destination.clone(), amount_sats);
        if change_sats > 0 {
            draft.add_output(change_address.clone(), change_sats);
        }

        log::info!(
            "Draft: {} inputs, {} sats to {}, {} sats change, {} sats fee",
            draft.inputs().len(),
            amount_sats,
            destination,
            change_sats,
            self.fee_sats
        );

        Ok(draft)
    }
}
