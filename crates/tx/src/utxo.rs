//! Unspent outputs and first-fit coin selection.

use serde::{Deserialize, Serialize};

use bhp_core::{AmountError, AssetId, Fixed8, TxId};

use crate::{
    error::{TxError, TxResult},
    types::TransactionInput,
};

/// An output that can be spent: the asset, where it was created, and its value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Utxo {
    /// The asset held
    pub asset_id: AssetId,
    /// The transaction that created the output
    pub tx_id: TxId,
    /// The output's index in that transaction
    pub index: u16,
    /// The amount held
    pub value: Fixed8,
}

impl Utxo {
    /// Instantiate a UTXO
    pub fn new(asset_id: AssetId, tx_id: TxId, index: u16, value: Fixed8) -> Self {
        Self {
            asset_id,
            tx_id,
            index,
            value,
        }
    }

    /// The input that spends this output
    pub fn outpoint(&self) -> TransactionInput {
        TransactionInput::new(self.tx_id, self.index)
    }
}

/// The order UTXOs are considered in. Selection always stops at the first prefix that covers
/// the target.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// The order the provider returned them in
    #[default]
    InOrder,
    /// Ascending value. Ties keep the provider's order.
    SmallestFirst,
    /// Descending value. Ties keep the provider's order.
    LargestFirst,
}

/// The result of a selection
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    /// The UTXOs to spend, in the order they were taken
    pub selected: Vec<Utxo>,
    /// Their summed value
    pub total: Fixed8,
    /// `total - target`, to be paid back to the sender when positive
    pub change: Fixed8,
}

impl Selection {
    /// The inputs spending the selected UTXOs
    pub fn inputs(&self) -> Vec<TransactionInput> {
        self.selected.iter().map(Utxo::outpoint).collect()
    }
}

/// Take UTXOs of `asset` until their sum reaches `target`. UTXOs of other assets are skipped.
///
/// Errors with `InsufficientFunds` if every matching UTXO together is not enough.
pub fn select(
    utxos: &[Utxo],
    asset: AssetId,
    target: Fixed8,
    strategy: SelectionStrategy,
) -> TxResult<Selection> {
    if target.is_negative() {
        return Err(AmountError::Invalid(target.to_string()).into());
    }

    let mut candidates: Vec<&Utxo> = utxos.iter().filter(|u| u.asset_id == asset).collect();
    match strategy {
        SelectionStrategy::InOrder => {}
        SelectionStrategy::SmallestFirst => candidates.sort_by_key(|u| u.value),
        SelectionStrategy::LargestFirst => {
            candidates.sort_by_key(|u| std::cmp::Reverse(u.value))
        }
    }

    let mut selected = vec![];
    let mut total = Fixed8::ZERO;
    for utxo in candidates.iter() {
        if total >= target {
            break;
        }
        total = total.checked_add(utxo.value)?;
        selected.push(**utxo);
    }

    if total < target {
        let available = Fixed8::checked_sum(candidates.iter().map(|u| u.value))?;
        return Err(TxError::InsufficientFunds {
            asset,
            required: target,
            available,
        });
    }

    let change = total.checked_sub(target)?;
    tracing::debug!(
        %asset,
        %target,
        count = selected.len(),
        %change,
        "selected utxos"
    );
    Ok(Selection {
        selected,
        total,
        change,
    })
}
