//! A growable AVM bytecode buffer with push-data and integer encoding.

use bhp_core::{
    ser::{first_byte_from_len, prefix_byte_len},
    ScriptHash,
};

use crate::script::opcode::{OpCode, PUSHBYTES_MAX};

/// Encode `n` as minimal two's-complement little-endian bytes. Zero is the empty sequence.
pub fn integer_bytes(n: i64) -> Vec<u8> {
    if n == 0 {
        return vec![];
    }
    let bytes = n.to_le_bytes();
    let mut len = bytes.len();
    while len > 1 {
        let last = bytes[len - 1];
        let sign_below = bytes[len - 2] & 0x80 != 0;
        if (last == 0x00 && !sign_below) || (last == 0xff && sign_below) {
            len -= 1;
        } else {
            break;
        }
    }
    bytes[..len].to_vec()
}

/// Emits AVM bytecode. Every push picks the shortest encoding for its operand, so the same
/// sequence of calls always yields the same bytes.
///
/// ```
/// use bhp_tx::script::{OpCode, ScriptBuilder};
///
/// let script = ScriptBuilder::new()
///     .push_integer(5)
///     .push_data(&[0xaa; 3])
///     .op(OpCode::RET)
///     .build();
/// assert_eq!(script, vec![0x55, 0x03, 0xaa, 0xaa, 0xaa, 0x66]);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScriptBuilder {
    buf: Vec<u8>,
}

impl ScriptBuilder {
    /// An empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty builder that will not reallocate until `capacity` bytes are written
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append a bare opcode
    pub fn op(mut self, op: OpCode) -> Self {
        self.buf.push(op.byte());
        self
    }

    /// Append raw bytes without any framing
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Push a byte blob. Up to 75 bytes are prefixed with their literal length, longer blobs
    /// use the narrowest of `PUSHDATA1/2/4`. The empty blob is `PUSH0`.
    ///
    /// `PUSHDATA4` carries a u32 length, so blobs must be under 4 GiB. Debug builds assert this.
    pub fn push_data(mut self, data: &[u8]) -> Self {
        let len = data.len();
        debug_assert!(len <= u32::MAX as usize, "push of {len} bytes exceeds PUSHDATA4");
        match len {
            0 => self.buf.push(OpCode::PUSH0.byte()),
            1..=PUSHBYTES_MAX => self.buf.push(len as u8),
            0x4c..=0xff => {
                self.buf.push(OpCode::PUSHDATA1.byte());
                self.buf.push(len as u8);
            }
            0x100..=0xffff => {
                self.buf.push(OpCode::PUSHDATA2.byte());
                self.buf.extend_from_slice(&(len as u16).to_le_bytes());
            }
            _ => {
                self.buf.push(OpCode::PUSHDATA4.byte());
                self.buf.extend_from_slice(&(len as u32).to_le_bytes());
            }
        }
        self.buf.extend_from_slice(data);
        self
    }

    /// Push an integer. -1 through 16 have single-byte opcodes; anything else is pushed as
    /// its minimal little-endian two's-complement bytes.
    pub fn push_integer(self, n: i64) -> Self {
        match n {
            -1 => self.op(OpCode::PUSHM1),
            0 => self.op(OpCode::PUSH0),
            1..=16 => self.raw(&[OpCode::PUSH1.byte() + (n as u8 - 1)]),
            _ => self.push_data(&integer_bytes(n)),
        }
    }

    /// Push `true` as `PUSH1`, `false` as `PUSH0`
    pub fn push_bool(self, b: bool) -> Self {
        self.op(if b { OpCode::PUSH1 } else { OpCode::PUSH0 })
    }

    /// Push the UTF-8 bytes of a string
    pub fn push_string(self, s: &str) -> Self {
        self.push_data(s.as_bytes())
    }

    /// Call an interop service. The operand is the var-bytes encoded service name.
    pub fn syscall(mut self, api: &str) -> Self {
        self.buf.push(OpCode::SYSCALL.byte());
        let len = api.len() as u64;
        let prefix_len = prefix_byte_len(len) as usize;
        match first_byte_from_len(prefix_len as u8) {
            None => self.buf.push(len as u8),
            Some(prefix) => {
                self.buf.push(prefix);
                self.buf.extend_from_slice(&len.to_le_bytes()[..prefix_len - 1]);
            }
        }
        self.buf.extend_from_slice(api.as_bytes());
        self
    }

    /// Call a deployed contract by script hash
    pub fn app_call(mut self, contract: &ScriptHash) -> Self {
        self.buf.push(OpCode::APPCALL.byte());
        self.buf.extend_from_slice(contract.as_ref());
        self
    }

    /// Tail-call a deployed contract by script hash
    pub fn tail_call(mut self, contract: &ScriptHash) -> Self {
        self.buf.push(OpCode::TAILCALL.byte());
        self.buf.extend_from_slice(contract.as_ref());
        self
    }

    /// The number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the builder, returning the script
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}
