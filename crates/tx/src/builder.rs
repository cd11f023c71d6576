//! A chained builder that assembles transactions and funds them from an account's UTXOs.

use serde::{Deserialize, Serialize};

use bhp_core::{AssetId, ByteFormat, Fixed8, ScriptHash};

use crate::{
    account::UtxoProvider,
    error::{TxError, TxResult},
    types::{
        AttributeUsage, ExclusiveData, Transaction, TransactionAttribute, TransactionInput,
        TransactionOutput, Witness,
    },
    utxo::{self, SelectionStrategy},
};

/// When the builder adds a `Script` attribute naming the sender.
///
/// A witness is matched to the script hashes that must sign. Spent inputs already name the
/// sender, so the attribute is only needed when there are none.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SenderAttributePolicy {
    /// Only when the transaction spends no inputs
    #[default]
    WhenNoInputs,
    /// On every transaction
    Always,
    /// Never
    Never,
}

/// Assembles a `Transaction`. Fields are written in the order they are added.
///
/// ```
/// use bhp_core::{AssetId, Fixed8, ScriptHash, TxId};
/// use bhp_tx::{builder::TransactionBuilder, types::TransactionInput};
///
/// let tx = TransactionBuilder::contract()
///     .spend(TransactionInput::new(TxId::default(), 0))
///     .pay(AssetId::BHP, Fixed8::from_units(1).unwrap(), ScriptHash::default())
///     .build();
/// assert_eq!(tx.inputs().len(), 1);
/// assert_eq!(tx.outputs().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    version: u8,
    data: ExclusiveData,
    attributes: Vec<TransactionAttribute>,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    witnesses: Vec<Witness>,
    sender: Option<ScriptHash>,
    sender_policy: SenderAttributePolicy,
}

impl TransactionBuilder {
    /// A builder for a transaction carrying `data`. Invocations default to version 1, so the
    /// system fee is serialized. Everything else defaults to version 0.
    pub fn new(data: ExclusiveData) -> Self {
        let version = match data {
            ExclusiveData::Invocation { .. } => 1,
            _ => 0,
        };
        Self {
            version,
            data,
            attributes: vec![],
            inputs: vec![],
            outputs: vec![],
            witnesses: vec![],
            sender: None,
            sender_policy: SenderAttributePolicy::default(),
        }
    }

    /// A builder for a plain transfer
    pub fn contract() -> Self {
        Self::new(ExclusiveData::Contract)
    }

    /// A builder for a script invocation paying `gas` system fee
    pub fn invocation(script: Vec<u8>, gas: Fixed8) -> Self {
        Self::new(ExclusiveData::Invocation { script, gas })
    }

    /// A builder holding every field of an existing transaction
    pub fn from_tx(tx: &Transaction) -> Self {
        Self {
            version: tx.version(),
            data: tx.exclusive_data().clone(),
            attributes: tx.attributes().to_vec(),
            inputs: tx.inputs().to_vec(),
            outputs: tx.outputs().to_vec(),
            witnesses: tx.witnesses().to_vec(),
            sender: None,
            sender_policy: SenderAttributePolicy::Never,
        }
    }

    /// Set the version byte
    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Replace the type-specific data
    pub fn exclusive_data(mut self, data: ExclusiveData) -> Self {
        self.data = data;
        self
    }

    /// Append an attribute
    pub fn attribute(mut self, attribute: TransactionAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append an input
    pub fn spend<I>(mut self, input: I) -> Self
    where
        I: Into<TransactionInput>,
    {
        self.inputs.push(input.into());
        self
    }

    /// Append several inputs
    pub fn extend_inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = TransactionInput>,
    {
        self.inputs.extend(inputs);
        self
    }

    /// Append an output paying `value` of `asset` to `to`
    pub fn pay(mut self, asset: AssetId, value: Fixed8, to: ScriptHash) -> Self {
        self.outputs.push(TransactionOutput::new(asset, value, to));
        self
    }

    /// Append several outputs
    pub fn extend_outputs<I>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = TransactionOutput>,
    {
        self.outputs.extend(outputs);
        self
    }

    /// Append a witness
    pub fn witness(mut self, witness: Witness) -> Self {
        self.witnesses.push(witness);
        self
    }

    /// The script hash of the account sending the transaction
    pub fn sender(mut self, sender: ScriptHash) -> Self {
        self.sender = Some(sender);
        self
    }

    /// When to name the sender in a `Script` attribute
    pub fn sender_policy(mut self, policy: SenderAttributePolicy) -> Self {
        self.sender_policy = policy;
        self
    }

    /// Spend enough of `asset` from `provider` to cover `amount`, paying any change to
    /// `change_to`. Inputs and the change output are appended after the ones already added.
    #[tracing::instrument(skip_all, err, fields(%asset, %amount))]
    pub fn fund<P>(
        mut self,
        provider: &P,
        change_to: ScriptHash,
        asset: AssetId,
        amount: Fixed8,
        strategy: SelectionStrategy,
    ) -> TxResult<Self>
    where
        P: UtxoProvider + ?Sized,
    {
        if amount.is_zero() {
            return Ok(self);
        }
        let utxos = provider.utxos_for_asset_amount(asset, amount, strategy)?;
        if let Some(stray) = utxos.iter().find(|u| u.asset_id != asset) {
            return Err(TxError::AssetMismatch {
                expected: asset,
                got: stray.asset_id,
            });
        }

        let selection = utxo::select(&utxos, asset, amount, strategy)?;
        self.inputs.extend(selection.inputs());
        if selection.change.is_positive() {
            self.outputs
                .push(TransactionOutput::new(asset, selection.change, change_to));
        }
        Ok(self)
    }

    /// Consume the builder and produce the transaction
    pub fn build(mut self) -> Transaction {
        if let Some(sender) = self.sender {
            let wanted = match self.sender_policy {
                SenderAttributePolicy::Always => true,
                SenderAttributePolicy::WhenNoInputs => self.inputs.is_empty(),
                SenderAttributePolicy::Never => false,
            };
            let present = self
                .attributes
                .iter()
                .any(|a| a.usage() == AttributeUsage::Script && a.data() == sender.as_ref());
            if wanted && !present {
                self.attributes.push(TransactionAttribute::script(&sender));
            }
        }

        let tx = Transaction::new(
            self.version,
            self.data,
            self.attributes,
            self.inputs,
            self.outputs,
            self.witnesses,
        );
        tracing::debug!(
            tx_type = ?tx.tx_type(),
            inputs = tx.inputs().len(),
            outputs = tx.outputs().len(),
            length = tx.serialized_length(),
            "assembled transaction"
        );
        tx
    }
}

impl From<&Transaction> for TransactionBuilder {
    fn from(tx: &Transaction) -> Self {
        Self::from_tx(tx)
    }
}
