//! Re-exports the commonly used types.

pub use bhp_core::{AssetId, ByteFormat, Fixed8, ScriptHash, TxId};
pub use bhp_keys::{KeyPair, PrivateKey, PublicKey, SignatureData};

pub use crate::{
    account::{Account, Client, InMemoryAccount, UtxoProvider},
    builder::{SenderAttributePolicy, TransactionBuilder},
    deploy::{Built, ContractDeployment, DeploymentRequest, Signed},
    error::{Field, TxError, TxResult},
    fee::FeeSchedule,
    script::{
        ContractDeploymentSpec, ContractParameter, ContractParameterType, ContractProperties,
        InvocationScript, ScriptBuilder, VerificationScript,
    },
    signer::{sign_transaction, verify_witness},
    transfer::AssetTransfer,
    types::{ExclusiveData, Transaction, TransactionAttribute, Witness},
    utxo::{SelectionStrategy, Utxo},
};
