//! Witnesses.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use bhp_core::{
    ser::{ByteFormat, SerError, SerResult},
    ScriptHash,
};
use bhp_keys::{PublicKey, SignatureData};

use crate::script::{InvocationScript, VerificationScript};

/// An invocation and verification script pair. Witnesses are matched to the script hashes that
/// must sign a transaction by position, so their order matters.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Witness {
    /// Pushes the signatures
    pub invocation: InvocationScript,
    /// Checks them
    pub verification: VerificationScript,
}

impl Witness {
    /// Instantiate a witness
    pub fn new(invocation: InvocationScript, verification: VerificationScript) -> Self {
        Self {
            invocation,
            verification,
        }
    }

    /// The single-signature witness for `key`
    pub fn from_signature(sig: &SignatureData, key: &PublicKey) -> Self {
        Self::new(
            InvocationScript::from_signature(sig),
            VerificationScript::from_public_key(key),
        )
    }

    /// The script hash this witness speaks for
    pub fn script_hash(&self) -> ScriptHash {
        self.verification.script_hash()
    }
}

impl ByteFormat for Witness {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.invocation.serialized_length() + self.verification.serialized_length()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self {
            invocation: InvocationScript::read_from(reader, 0)?,
            verification: VerificationScript::read_from(reader, 0)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.invocation.write_to(writer)?;
        len += self.verification.write_to(writer)?;
        Ok(len)
    }
}
