//! secp256r1 (NIST P-256) keys and deterministic ECDSA signatures.
//!
//! Signatures are produced over `sha256(message)` with an RFC6979 nonce, so the same key and
//! message always give the same `(r, s)`. `s` is left as computed; the network does not require
//! the low-s form.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Private keys, public keys and key pairs
pub mod keys;

/// The `(r, s)` signature container
pub mod signature;

pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use signature::SignatureData;

use thiserror::Error;

/// Errors for this library
#[derive(Debug, Error)]
pub enum KeyError {
    /// Error bubbled up from the p256 ecdsa implementation. Covers zero or out-of-range
    /// scalars, off-curve points and failed verification.
    #[error(transparent)]
    EcdsaError(#[from] p256::ecdsa::Error),

    /// Private keys are 32-byte big-endian scalars
    #[error("Private key must be 32 bytes. Got {0}")]
    BadPrivkeyLength(usize),

    /// Public keys are SEC1 points tagged 0x02 or 0x03 (33 bytes) or 0x04 (65 bytes)
    #[error("Public key must be a 33-byte compressed or 65-byte uncompressed SEC1 point. Got tag {tag:#04x}, {len} bytes")]
    BadPubkeyEncoding {
        /// The leading byte
        tag: u8,
        /// The total length
        len: usize,
    },

    /// Signatures are 64 bytes, `r || s`
    #[error("Signature must be 64 bytes. Got {0}")]
    BadSignatureLength(usize),

    /// The holder of a public key has no private key to sign with
    #[error("No private key available for {0}")]
    NoPrivateKey(String),

    /// Bubbled up from hex decoding
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),
}
