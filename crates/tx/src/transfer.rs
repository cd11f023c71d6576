//! Plain asset transfers: a Contract transaction paying outputs, funded and signed by one
//! account.

use bhp_core::{AmountError, AssetId, Fixed8, ScriptHash};

use crate::{
    account::Account,
    builder::{SenderAttributePolicy, TransactionBuilder},
    error::TxResult,
    signer,
    types::{Transaction, TransactionAttribute, TransactionOutput},
    utxo::SelectionStrategy,
};

/// Pays one or more outputs from an account. GAS covering the network fee is taken from the
/// same account.
pub struct AssetTransfer<'a> {
    account: &'a dyn Account,
    outputs: Vec<TransactionOutput>,
    attributes: Vec<TransactionAttribute>,
    network_fee: Fixed8,
    strategy: SelectionStrategy,
    sender_policy: SenderAttributePolicy,
}

impl<'a> AssetTransfer<'a> {
    /// A transfer from `account` with no outputs and no network fee
    pub fn new(account: &'a dyn Account) -> Self {
        Self {
            account,
            outputs: vec![],
            attributes: vec![],
            network_fee: Fixed8::ZERO,
            strategy: SelectionStrategy::default(),
            sender_policy: SenderAttributePolicy::default(),
        }
    }

    /// Pay `value` of `asset` to `to`
    pub fn output(mut self, asset: AssetId, value: Fixed8, to: ScriptHash) -> Self {
        self.outputs.push(TransactionOutput::new(asset, value, to));
        self
    }

    /// Attach an attribute
    pub fn attribute(mut self, attribute: TransactionAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Pay a network fee in GAS
    pub fn network_fee(mut self, fee: Fixed8) -> Self {
        self.network_fee = fee;
        self
    }

    /// The order the account's UTXOs are spent in
    pub fn strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// When to name the sender in a `Script` attribute
    pub fn sender_policy(mut self, policy: SenderAttributePolicy) -> Self {
        self.sender_policy = policy;
        self
    }

    // Amount owed per asset, in the order assets first appear. GAS carries the network fee.
    fn required(&self) -> TxResult<Vec<(AssetId, Fixed8)>> {
        let mut required: Vec<(AssetId, Fixed8)> = vec![];
        for output in self.outputs.iter() {
            if !output.value.is_positive() {
                return Err(AmountError::Invalid(output.value.to_string()).into());
            }
            match required.iter_mut().find(|(a, _)| *a == output.asset_id) {
                Some((_, sum)) => *sum = sum.checked_add(output.value)?,
                None => required.push((output.asset_id, output.value)),
            }
        }

        if self.network_fee.is_negative() {
            return Err(AmountError::Invalid(self.network_fee.to_string()).into());
        }
        if self.network_fee.is_positive() {
            match required.iter_mut().find(|(a, _)| *a == AssetId::GAS) {
                Some((_, sum)) => *sum = sum.checked_add(self.network_fee)?,
                None => required.push((AssetId::GAS, self.network_fee)),
            }
        }
        Ok(required)
    }

    /// Assemble the unsigned transaction
    #[tracing::instrument(skip_all, err)]
    pub fn build(&self) -> TxResult<Transaction> {
        let sender = self.account.script_hash();
        let mut builder = TransactionBuilder::contract()
            .sender(sender)
            .sender_policy(self.sender_policy)
            .extend_outputs(self.outputs.iter().copied());
        for attribute in self.attributes.iter() {
            builder = builder.attribute(attribute.clone());
        }
        for (asset, amount) in self.required()? {
            builder = builder.fund(self.account, sender, asset, amount, self.strategy)?;
        }
        Ok(builder.build())
    }

    /// Assemble the transaction and sign it with the account's key
    #[tracing::instrument(skip_all, err)]
    pub fn sign(&self) -> TxResult<Transaction> {
        let mut tx = self.build()?;
        let witness = signer::sign_transaction(&tx, self.account.key_pair()?)?;
        tx.push_witness(witness);
        Ok(tx)
    }
}
