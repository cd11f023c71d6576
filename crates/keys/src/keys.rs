//! Keys on the secp256r1 curve.
//!
//! A `PrivateKey` signs, a `PublicKey` verifies and identifies the account through its
//! compressed SEC1 encoding. A `KeyPair` holds both, with the public key computed once.

use std::{fmt, str::FromStr};

use p256::{
    ecdsa::{
        signature::{Signer, Verifier},
        SigningKey, VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
};

use crate::{KeyError, SignatureData};

/// A secp256r1 private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Parse a 32-byte big-endian scalar. Zero and values at or above the curve order are
    /// rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 32 {
            return Err(KeyError::BadPrivkeyLength(bytes.len()));
        }
        Ok(Self(SigningKey::from_slice(bytes)?))
    }

    /// Parse a hex-encoded 32-byte scalar
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        Self::from_bytes(&hex::decode(s)?)
    }

    /// The 32-byte big-endian scalar
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    /// Derive the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    /// Sign `sha256(message)` with an RFC6979 nonce. Deterministic: the same key and message
    /// always produce the same signature.
    pub fn sign_message(&self, message: &[u8]) -> Result<SignatureData, KeyError> {
        let sig: p256::ecdsa::Signature = self.0.try_sign(message)?;
        Ok(sig.into())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for PrivateKey {}

/// A secp256r1 public key.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parse a SEC1 point, compressed (33 bytes) or uncompressed (65 bytes). Other SEC1
    /// forms, such as the compact `0x05` tag, are rejected.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        match (bytes.first(), bytes.len()) {
            (Some(0x02), 33) | (Some(0x03), 33) | (Some(0x04), 65) => {}
            (tag, len) => {
                return Err(KeyError::BadPubkeyEncoding {
                    tag: tag.copied().unwrap_or_default(),
                    len,
                })
            }
        }
        Ok(Self(VerifyingKey::from_sec1_bytes(bytes)?))
    }

    /// Parse a hex-encoded SEC1 point
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        Self::from_sec1_bytes(&hex::decode(s)?)
    }

    /// The 33-byte compressed SEC1 encoding. This is the form embedded in verification scripts.
    pub fn to_compressed(&self) -> [u8; 33] {
        let mut buf = [0u8; 33];
        buf.copy_from_slice(self.0.as_affine().to_encoded_point(true).as_bytes());
        buf
    }

    /// The 65-byte uncompressed SEC1 encoding
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut buf = [0u8; 65];
        buf.copy_from_slice(self.0.as_affine().to_encoded_point(false).as_bytes());
        buf
    }

    /// Verify a signature over `sha256(message)`
    pub fn verify_message(&self, message: &[u8], sig: &SignatureData) -> Result<(), KeyError> {
        let sig = sig.to_ecdsa()?;
        Ok(self.0.verify(message, &sig)?)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_compressed()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_compressed()))
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl serde::Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<PublicKey, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A private key with its public key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Derive the public half of `private`
    pub fn new(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    /// Parse a 32-byte private scalar and derive its public key
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::new(PrivateKey::from_bytes(bytes)?))
    }

    /// The private half
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// The public half
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Sign `sha256(message)` deterministically
    pub fn sign_message(&self, message: &[u8]) -> Result<SignatureData, KeyError> {
        self.private.sign_message(message)
    }
}

impl From<PrivateKey> for KeyPair {
    fn from(private: PrivateKey) -> Self {
        Self::new(private)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    const PRIVKEY: &str = "1dd37fba80fec4e6a6f13fd708d8dcb3b29def768017052f6c930fa1c5d90bbb";
    const PUBKEY: &str = "031a6c6fbbdf02ca351745fa86b9ba5a9452d785ac4f7fc2b7548ca2a46c4fcf4a";

    #[test]
    fn it_derives_the_compressed_public_key() {
        let pair = KeyPair::new(PrivateKey::from_hex(PRIVKEY).unwrap());
        assert_eq!(pair.public_key().to_string(), PUBKEY);
        assert_eq!(pair.private_key().to_bytes().to_vec(), hex::decode(PRIVKEY).unwrap());

        let parsed: PublicKey = PUBKEY.parse().unwrap();
        assert_eq!(&parsed, pair.public_key());
        let uncompressed = parsed.to_uncompressed();
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(PublicKey::from_sec1_bytes(&uncompressed).unwrap(), parsed);
    }

    #[test]
    fn it_rejects_invalid_private_keys() {
        assert!(matches!(
            PrivateKey::from_bytes(&[0u8; 32]),
            Err(KeyError::EcdsaError(_))
        ));
        assert!(matches!(
            PrivateKey::from_bytes(&[0xffu8; 32]),
            Err(KeyError::EcdsaError(_))
        ));
        assert!(matches!(
            PrivateKey::from_bytes(&[1u8; 31]),
            Err(KeyError::BadPrivkeyLength(31))
        ));
    }

    #[test]
    fn it_rejects_non_canonical_tags() {
        let cases: [(u8, usize); 5] = [(0x05, 33), (0x00, 33), (0x06, 65), (0x04, 33), (0x02, 65)];
        let compressed = hex::decode(PUBKEY).unwrap();
        let uncompressed = PublicKey::from_hex(PUBKEY).unwrap().to_uncompressed();
        for (tag, len) in cases.iter() {
            let mut bad = if *len == 33 {
                compressed.clone()
            } else {
                uncompressed.to_vec()
            };
            bad[0] = *tag;
            assert!(
                matches!(
                    PublicKey::from_sec1_bytes(&bad),
                    Err(KeyError::BadPubkeyEncoding { tag: t, len: l }) if t == *tag && l == *len
                ),
                "{tag:#04x}"
            );
        }
        assert!(matches!(
            PublicKey::from_sec1_bytes(&[]),
            Err(KeyError::BadPubkeyEncoding { tag: 0, len: 0 })
        ));
    }

    #[test]
    fn it_rejects_off_curve_points() {
        // x = 1 has no y on the curve
        let mut compressed = [0u8; 33];
        compressed[0] = 0x02;
        compressed[32] = 0x01;
        assert!(matches!(
            PublicKey::from_sec1_bytes(&compressed),
            Err(KeyError::EcdsaError(_))
        ));

        let mut uncompressed = PublicKey::from_hex(PUBKEY).unwrap().to_uncompressed();
        uncompressed[64] ^= 0x01;
        assert!(matches!(
            PublicKey::from_sec1_bytes(&uncompressed),
            Err(KeyError::EcdsaError(_))
        ));
    }

    #[test]
    fn it_signs_deterministically() {
        let pair = KeyPair::from_private_bytes(&hex::decode(PRIVKEY).unwrap()).unwrap();
        let a = pair.sign_message(b"message").unwrap();
        let b = pair.sign_message(b"message").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, pair.sign_message(b"other message").unwrap());
    }

    #[test]
    fn it_verifies_its_own_signatures() {
        let pair = KeyPair::from_private_bytes(&hex::decode(PRIVKEY).unwrap()).unwrap();
        let sig = pair.sign_message(b"message").unwrap();
        pair.public_key().verify_message(b"message", &sig).unwrap();
        assert!(pair
            .public_key()
            .verify_message(b"tampered", &sig)
            .is_err());
    }

    #[test]
    fn it_serializes_public_keys_as_hex() {
        let key: PublicKey = PUBKEY.parse().unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{PUBKEY}\""));
        assert_eq!(serde_json::from_str::<PublicKey>(&json).unwrap(), key);
    }

    proptest! {
        #[test]
        fn signatures_verify_for_any_message(message in proptest::collection::vec(any::<u8>(), 0..256)) {
            let pair = KeyPair::from_private_bytes(&hex::decode(PRIVKEY).unwrap()).unwrap();
            let sig = pair.sign_message(&message).unwrap();
            prop_assert!(pair.public_key().verify_message(&message, &sig).is_ok());
        }
    }
}
