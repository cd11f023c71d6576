//! Build, serialize and sign BHP transactions.
//!
//! The pipeline runs leaf first: a `ScriptBuilder` emits the operation script, the selector
//! picks UTXOs from an `Account`, a `TransactionBuilder` assembles the unsigned transaction,
//! and the signer appends a witness over its unsigned form. `ContractDeployment` and
//! `AssetTransfer` run the whole pipeline.
//!
//! Every step is deterministic. The same inputs give byte-identical transactions, signatures
//! included.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod account;
pub mod builder;
pub mod deploy;
pub mod error;
pub mod fee;
pub mod prelude;
pub mod rpc;
pub mod script;
pub mod signer;
pub mod transfer;
pub mod types;
pub mod utxo;

pub use error::{Field, TxError, TxResult};
