//! Transaction types: attributes, inputs and outputs, witnesses, and the transaction itself.

pub mod attribute;
pub mod tx;
pub mod txio;
pub mod witness;

pub use attribute::*;
pub use tx::*;
pub use txio::*;
pub use witness::*;
