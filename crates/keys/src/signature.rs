use p256::ecdsa::Signature;

use crate::KeyError;

/// An ECDSA signature as the two 32-byte big-endian scalars `r` and `s`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SignatureData {
    r: [u8; 32],
    s: [u8; 32],
}

impl SignatureData {
    /// Instantiate from `r` and `s`
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Self { r, s }
    }

    /// Parse `r || s`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 64 {
            return Err(KeyError::BadSignatureLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Self { r, s })
    }

    /// The `r` scalar
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The `s` scalar
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// `r || s`, the form pushed by an invocation script
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&self.r);
        buf[32..].copy_from_slice(&self.s);
        buf
    }

    pub(crate) fn to_ecdsa(self) -> Result<Signature, KeyError> {
        Ok(Signature::from_slice(&self.to_bytes())?)
    }
}

impl From<Signature> for SignatureData {
    fn from(sig: Signature) -> Self {
        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Self { r, s }
    }
}
