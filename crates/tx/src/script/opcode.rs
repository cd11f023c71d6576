//! The subset of the AVM instruction set this crate emits or recognizes.

/// `PUSHBYTES1` through `PUSHBYTES75` are the literal length bytes 0x01..=0x4b.
pub const PUSHBYTES_MAX: usize = 0x4b;

/// An AVM opcode.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OpCode {
    /// Push an empty array, the integer 0 or `false`
    PUSH0 = 0x00,
    /// The next byte is the number of bytes to push
    PUSHDATA1 = 0x4c,
    /// The next two bytes (LE) are the number of bytes to push
    PUSHDATA2 = 0x4d,
    /// The next four bytes (LE) are the number of bytes to push
    PUSHDATA4 = 0x4e,
    /// Push -1
    PUSHM1 = 0x4f,
    /// Push 1 or `true`
    PUSH1 = 0x51,
    #[allow(missing_docs)]
    PUSH2 = 0x52,
    #[allow(missing_docs)]
    PUSH3 = 0x53,
    #[allow(missing_docs)]
    PUSH4 = 0x54,
    #[allow(missing_docs)]
    PUSH5 = 0x55,
    #[allow(missing_docs)]
    PUSH6 = 0x56,
    #[allow(missing_docs)]
    PUSH7 = 0x57,
    #[allow(missing_docs)]
    PUSH8 = 0x58,
    #[allow(missing_docs)]
    PUSH9 = 0x59,
    #[allow(missing_docs)]
    PUSH10 = 0x5a,
    #[allow(missing_docs)]
    PUSH11 = 0x5b,
    #[allow(missing_docs)]
    PUSH12 = 0x5c,
    #[allow(missing_docs)]
    PUSH13 = 0x5d,
    #[allow(missing_docs)]
    PUSH14 = 0x5e,
    #[allow(missing_docs)]
    PUSH15 = 0x5f,
    /// Push 16
    PUSH16 = 0x60,
    /// Does nothing
    NOP = 0x61,
    /// Unconditional jump by a signed 2-byte offset
    JMP = 0x62,
    /// Jump if the top item is true
    JMPIF = 0x63,
    /// Jump if the top item is false
    JMPIFNOT = 0x64,
    /// Call a function at a signed 2-byte offset
    CALL = 0x65,
    /// Return from the current context
    RET = 0x66,
    /// Call another contract by its 20-byte script hash
    APPCALL = 0x67,
    /// Call an interop service by its var-bytes name
    SYSCALL = 0x68,
    /// Like `APPCALL`, replacing the current context
    TAILCALL = 0x69,
    /// Verify a signature against a public key
    CHECKSIG = 0xac,
    /// Verify a signature, message and public key
    VERIFY = 0xad,
    /// Verify m of n signatures
    CHECKMULTISIG = 0xae,
    /// Pack n items into an array
    PACK = 0xc1,
    /// Halt with a fault
    THROW = 0xf0,
    /// Halt with a fault unless the top item is true
    THROWIFNOT = 0xf1,
}

impl OpCode {
    /// The byte this opcode is encoded as
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_encodes_opcodes_as_bytes() {
        let cases = [
            (OpCode::PUSH0, 0x00),
            (OpCode::PUSHDATA2, 0x4d),
            (OpCode::PUSH7, 0x57),
            (OpCode::PUSH16, 0x60),
            (OpCode::SYSCALL, 0x68),
            (OpCode::CHECKSIG, 0xac),
            (OpCode::PACK, 0xc1),
        ];
        for (op, byte) in cases.iter() {
            assert_eq!(op.byte(), *byte);
            assert_eq!(u8::from(*op), *byte);
        }
    }
}
