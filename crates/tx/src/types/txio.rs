//! Inputs and outputs.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use bhp_core::{
    ser::{ByteFormat, SerError, SerResult},
    AssetId, Fixed8, ScriptHash, TxId,
};

/// A reference to an unspent output: the id of the transaction that created it and its index
/// in that transaction's outputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionInput {
    /// The creating transaction
    pub prev_hash: TxId,
    /// The output index
    pub prev_index: u16,
}

impl TransactionInput {
    /// Instantiate an input
    pub fn new(prev_hash: TxId, prev_index: u16) -> Self {
        Self {
            prev_hash,
            prev_index,
        }
    }
}

impl ByteFormat for TransactionInput {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        34
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            prev_hash: TxId::read_from(reader, 0)?,
            prev_index: Self::read_u16_le(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.prev_hash.write_to(writer)?;
        len += Self::write_u16_le(writer, self.prev_index)?;
        Ok(len)
    }
}

/// A new UTXO: an amount of one asset locked to a script hash.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// The asset
    pub asset_id: AssetId,
    /// The amount
    pub value: Fixed8,
    /// The address that may spend it
    pub script_hash: ScriptHash,
}

impl TransactionOutput {
    /// Instantiate an output
    pub fn new(asset_id: AssetId, value: Fixed8, script_hash: ScriptHash) -> Self {
        Self {
            asset_id,
            value,
            script_hash,
        }
    }
}

impl ByteFormat for TransactionOutput {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        60
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            asset_id: AssetId::read_from(reader, 0)?,
            value: Fixed8::read_from(reader, 0)?,
            script_hash: ScriptHash::read_from(reader, 0)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.asset_id.write_to(writer)?;
        len += self.value.write_to(writer)?;
        len += self.script_hash.write_to(writer)?;
        Ok(len)
    }
}
