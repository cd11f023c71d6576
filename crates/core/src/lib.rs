//! # BHP Core
//!
//! `bhp-core` contains the wire primitives shared by the `bhp-keys` and
//! `bhp-tx` crates.
//!
//! ## Crate Layout
//!
//! ### Ser
//!
//! The `ByteFormat` trait is a simple serialization API using
//! `std::io::{Read, Write}`. Implementers define the binary serialization
//! format of the type. The transaction type implements `ByteFormat`, as the
//! txid and signing logic assume access to the unsigned byte form.
//!
//! The `ser` module also holds the varint ("compact int") codec and the
//! length-prefixed blob framing. Decoding rejects truncated input and
//! non-minimal varints with a `SerError`.
//!
//! ### Hashes
//!
//! Fixed-width digests are wrapped in marked newtypes so that script hashes,
//! transaction ids and asset ids cannot be confused. Each is stored in the
//! internal (little-endian) byte order used on the wire, and displayed
//! byte-reversed, the way explorers and the node RPC print them.
//!
//! ### Fixed8
//!
//! Asset amounts are signed 64-bit counts of 10^-8 units.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[macro_use]
pub mod macros;

pub mod fixed8;
pub mod hashes;
pub mod ser;

pub use fixed8::{AmountError, Fixed8};
pub use hashes::{hash160, hash256, AssetId, Hash256Writer, ScriptHash, TxId};
pub use ser::{ByteFormat, SerError, SerResult};

#[doc(hidden)]
pub use hex as __hex;
#[doc(hidden)]
pub use serde as __serde;
