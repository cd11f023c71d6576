//! The error taxonomy for building, signing and submitting transactions.

use std::fmt;

use thiserror::Error;

use bhp_core::{AmountError, AssetId, Fixed8, SerError};
use bhp_keys::KeyError;

/// A mandatory field of a deployment that was not supplied
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Field {
    /// The contract's AVM bytecode
    AvmScript,
    /// The account that funds and signs the deployment
    Account,
    /// The client that submits the deployment
    Client,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::AvmScript => "AVM script",
            Field::Account => "account",
            Field::Client => "client",
        };
        f.write_str(name)
    }
}

/// Errors building, signing and submitting transactions
#[derive(Debug, Error)]
pub enum TxError {
    /// A mandatory field was absent at build time
    #[error("Missing {0}")]
    MissingField(Field),

    /// The UTXOs on offer cannot cover the requested amount
    #[error("Insufficient funds of asset {asset}. Required {required}, available {available}")]
    InsufficientFunds {
        /// The asset requested
        asset: AssetId,
        /// The amount requested
        required: Fixed8,
        /// The sum of all matching UTXOs on offer
        available: Fixed8,
    },

    /// Bubbled up from the wire codec
    #[error(transparent)]
    MalformedEncoding(#[from] SerError),

    /// Key material was invalid or a signature could not be produced
    #[error("Signing failed: {0}")]
    SigningFailure(#[from] KeyError),

    /// A UTXO provider handed back outputs of an asset that was not requested
    #[error("Asked for UTXOs of {expected}, got {got}")]
    AssetMismatch {
        /// The asset requested
        expected: AssetId,
        /// The asset supplied
        got: AssetId,
    },

    /// Amount arithmetic overflowed or an amount was negative where it must not be
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The account collaborator failed
    #[error("UTXO provider error: {0}")]
    Provider(String),

    /// The node client failed to accept the transaction
    #[error("Client error: {0}")]
    Client(String),

    /// A transaction without witnesses cannot be submitted
    #[error("Transaction has no witnesses")]
    Unsigned,

    /// A witness that is not a standard signature witness, or whose signatures do not verify
    #[error("Invalid witness: {0}")]
    InvalidWitness(&'static str),

    /// A multi-signature threshold outside `1..=keys`, or too many keys
    #[error("Invalid multi-signature: {threshold} of {keys}")]
    InvalidMultiSig {
        /// Signatures required
        threshold: usize,
        /// Keys supplied
        keys: usize,
    },

    /// A `Hash` or `Remark` index with no tag byte
    #[error("Attribute usage {0:?} has no tag byte")]
    InvalidAttributeUsage(crate::types::AttributeUsage),

    /// An attribute payload does not fit its usage's framing
    #[error("Attribute {usage:?} cannot carry {got} bytes as {framing:?}")]
    InvalidAttribute {
        /// The usage tag
        usage: crate::types::AttributeUsage,
        /// The framing the usage requires
        framing: crate::types::Framing,
        /// The length supplied
        got: usize,
    },
}

/// Type alias for transaction results
pub type TxResult<T> = Result<T, TxError>;

impl From<std::io::Error> for TxError {
    fn from(e: std::io::Error) -> Self {
        TxError::MalformedEncoding(e.into())
    }
}
