//! AVM scripts: opcodes, the bytecode builder, contract deployment and invocation payloads, and
//! witness scripts.

pub mod builder;
pub mod contract;
pub mod opcode;
pub mod witness;

pub use builder::*;
pub use contract::*;
pub use opcode::*;
pub use witness::*;
