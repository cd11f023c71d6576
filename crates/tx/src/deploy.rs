//! Contract deployment: an Invocation transaction whose script registers a new contract.
//!
//! A deployment moves through `Built` and `Signed` states. Only a signed deployment can be
//! sent.

use std::marker::PhantomData;

use bhp_core::{AssetId, Fixed8, ScriptHash};

use crate::{
    account::{Account, Client},
    builder::{SenderAttributePolicy, TransactionBuilder},
    error::{Field, TxError, TxResult},
    fee::FeeSchedule,
    script::ContractDeploymentSpec,
    signer,
    types::{Transaction, Witness},
    utxo::SelectionStrategy,
};

/// Marker for a deployment that has been assembled but carries no witness
#[derive(Debug)]
pub struct Built;

/// Marker for a deployment with at least one witness
#[derive(Debug)]
pub struct Signed;

/// Everything needed to build a deployment. Validated in one step by
/// `ContractDeployment::build`.
pub struct DeploymentRequest<'a> {
    /// What to deploy
    pub spec: ContractDeploymentSpec,
    /// Funds and signs the deployment
    pub account: Option<&'a dyn Account>,
    /// Submits the deployment
    pub client: Option<&'a dyn Client>,
    /// The system fee schedule
    pub fees: FeeSchedule,
    /// The order the account's UTXOs are spent in
    pub strategy: SelectionStrategy,
    /// When to name the sender in a `Script` attribute
    pub sender_policy: SenderAttributePolicy,
}

impl<'a> DeploymentRequest<'a> {
    /// A request for `spec` with network fees, in-order selection, and no account or client
    pub fn new(spec: ContractDeploymentSpec) -> Self {
        Self {
            spec,
            account: None,
            client: None,
            fees: FeeSchedule::default(),
            strategy: SelectionStrategy::default(),
            sender_policy: SenderAttributePolicy::default(),
        }
    }

    /// Set the account
    pub fn account(mut self, account: &'a dyn Account) -> Self {
        self.account = Some(account);
        self
    }

    /// Set the client
    pub fn client(mut self, client: &'a dyn Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Override the fee schedule
    pub fn fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Override the selection strategy
    pub fn strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Override the sender attribute policy
    pub fn sender_policy(mut self, policy: SenderAttributePolicy) -> Self {
        self.sender_policy = policy;
        self
    }
}

/// A contract deployment transaction in state `S`.
pub struct ContractDeployment<'a, S> {
    spec: ContractDeploymentSpec,
    account: &'a dyn Account,
    client: &'a dyn Client,
    system_fee: Fixed8,
    tx: Transaction,
    state: PhantomData<S>,
}

impl<'a, S> ContractDeployment<'a, S> {
    /// The transaction as it stands
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Consume the deployment, returning the transaction
    pub fn into_transaction(self) -> Transaction {
        self.tx
    }

    /// What is being deployed
    pub fn spec(&self) -> &ContractDeploymentSpec {
        &self.spec
    }

    /// The hash the contract will be reachable at
    pub fn contract_hash(&self) -> ScriptHash {
        self.spec.contract_hash()
    }

    /// The system fee the deployment pays
    pub fn system_fee(&self) -> Fixed8 {
        self.system_fee
    }

    fn into_state<T>(self) -> ContractDeployment<'a, T> {
        ContractDeployment {
            spec: self.spec,
            account: self.account,
            client: self.client,
            system_fee: self.system_fee,
            tx: self.tx,
            state: PhantomData,
        }
    }
}

impl<'a> ContractDeployment<'a, Built> {
    /// Validate the request and assemble the deployment.
    ///
    /// Fails with `MissingField` for an empty AVM, then a missing account, then a missing
    /// client. The account is asked for GAS covering the system fee plus the network fee;
    /// change goes back to the account.
    #[tracing::instrument(skip_all, err)]
    pub fn build(request: DeploymentRequest<'a>) -> TxResult<Self> {
        let DeploymentRequest {
            spec,
            account,
            client,
            fees,
            strategy,
            sender_policy,
        } = request;

        if spec.avm.is_empty() {
            return Err(TxError::MissingField(Field::AvmScript));
        }
        let account = account.ok_or(TxError::MissingField(Field::Account))?;
        let client = client.ok_or(TxError::MissingField(Field::Client))?;
        if spec.network_fee.is_negative() {
            return Err(bhp_core::AmountError::Invalid(spec.network_fee.to_string()).into());
        }

        let system_fee = fees.deployment_fee(&spec.properties)?;
        let required = system_fee.checked_add(spec.network_fee)?;
        let sender = account.script_hash();
        tracing::debug!(
            contract = %spec.contract_hash(),
            %system_fee,
            %required,
            "building deployment"
        );

        let tx = TransactionBuilder::invocation(spec.deployment_script(), system_fee)
            .sender(sender)
            .sender_policy(sender_policy)
            .fund(account, sender, AssetId::GAS, required, strategy)?
            .build();

        Ok(Self {
            spec,
            account,
            client,
            system_fee,
            tx,
            state: PhantomData,
        })
    }

    /// Sign with the account's key and attach the witness
    #[tracing::instrument(skip_all, err)]
    pub fn sign(mut self) -> TxResult<ContractDeployment<'a, Signed>> {
        let key_pair = self.account.key_pair()?;
        let witness = signer::sign_transaction(&self.tx, key_pair)?;
        self.tx.push_witness(witness);
        Ok(self.into_state())
    }

    /// Attach a witness produced elsewhere
    pub fn add_witness(mut self, witness: Witness) -> ContractDeployment<'a, Signed> {
        self.tx.push_witness(witness);
        self.into_state()
    }
}

impl<'a> ContractDeployment<'a, Signed> {
    /// Attach another witness, after the ones already present
    pub fn add_witness(mut self, witness: Witness) -> Self {
        self.tx.push_witness(witness);
        self
    }

    /// Submit the deployment through the client
    #[tracing::instrument(skip_all, err)]
    pub fn send(&self) -> TxResult<bool> {
        self.client.send_transaction(&self.tx)
    }
}

impl<'a, S> std::fmt::Debug for ContractDeployment<'a, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractDeployment")
            .field("contract_hash", &self.contract_hash())
            .field("system_fee", &self.system_fee)
            .field("tx", &self.tx)
            .finish_non_exhaustive()
    }
}
