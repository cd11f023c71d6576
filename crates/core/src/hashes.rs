//! Holds utilites for working with cryptographic digests, and disambiguating digests via marked
//! newtypes.
//!
//! We wrap hashes in marked newtypes in order to prevent type-confusion between script hashes,
//! transaction ids, and asset ids.

use std::io::{Result as IOResult, Write};

use digest::Digest;
use ripemd::Ripemd160;
use sha2::Sha256;

marked_digest!(
    /// A 20-byte `ripemd160(sha256(script))` digest identifying a verification script, and so an
    /// address or a deployed contract.
    ScriptHash,
    20
);

marked_digest!(
    /// A 32-byte transaction id: `sha256(sha256(unsigned tx))`.
    TxId,
    32
);

marked_digest!(
    /// A 32-byte id of a UTXO-based asset. Global assets are identified by the id of the
    /// transaction that registered them.
    AssetId,
    32
);

/// `ripemd160(sha256(data))`
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// `sha256(sha256(data))`
pub fn hash256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

impl ScriptHash {
    /// The script hash of a verification or contract script
    pub fn from_script(script: &[u8]) -> Self {
        Self::new(hash160(script))
    }
}

impl TxId {
    /// The txid of an unsigned transaction serialization
    pub fn digest(unsigned_tx: &[u8]) -> Self {
        Self::new(hash256(unsigned_tx))
    }
}

impl AssetId {
    /// The governing token, BHP. Indivisible; carries voting and GAS generation.
    pub const BHP: AssetId = AssetId::new([
        0x9b, 0x7c, 0xff, 0xda, 0xa6, 0x74, 0xbe, 0xae, 0x0f, 0x93, 0x0e, 0xbe, 0x60, 0x85, 0xaf,
        0x90, 0x93, 0xe5, 0xfe, 0x56, 0xb3, 0x4a, 0x5c, 0x22, 0x0c, 0xcd, 0xcf, 0x6e, 0xfc, 0x33,
        0x6f, 0xc5,
    ]);

    /// The utility token, GAS. Pays system and network fees.
    pub const GAS: AssetId = AssetId::new([
        0xe7, 0x2d, 0x28, 0x69, 0x79, 0xee, 0x6c, 0xb1, 0xb7, 0xe6, 0x5d, 0xfd, 0xdf, 0xb2, 0xe3,
        0x84, 0x10, 0x0b, 0x8d, 0x14, 0x8e, 0x77, 0x58, 0xde, 0x42, 0xe4, 0x16, 0x8b, 0x71, 0x79,
        0x2c, 0x60,
    ]);
}

/// A struct that exposes a `sha256(sha256(x))` `Write` interface by wrapping an internal SHA2
/// instance. Lets a transaction be hashed without buffering its serialization.
///
/// ```
/// use std::io::Write;
/// use bhp_core::hashes::{hash256, Hash256Writer};
///
/// let mut w = Hash256Writer::default();
/// w.write_all(&[0u8; 32]).unwrap();
/// assert_eq!(w.finish(), hash256(&[0u8; 32]));
/// ```
#[derive(Default)]
pub struct Hash256Writer {
    internal: Sha256,
}

impl Write for Hash256Writer {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.internal.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IOResult<()> {
        Ok(())
    }
}

impl Hash256Writer {
    /// Consume the writer and produce the digest
    pub fn finish(self) -> [u8; 32] {
        let first = self.internal.finalize();
        Sha256::digest(first).into()
    }

    /// Consume the writer and produce a marked `TxId`
    pub fn finish_txid(self) -> TxId {
        TxId::new(self.finish())
    }
}
