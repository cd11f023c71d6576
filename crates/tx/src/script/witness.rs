//! The two halves of a witness: the invocation script pushes signatures, the verification
//! script checks them.

use bhp_core::{ScriptHash, SerError};
use bhp_keys::{PublicKey, SignatureData};

use crate::{
    error::{TxError, TxResult},
    script::{OpCode, ScriptBuilder},
};

/// Witness scripts longer than this are rejected when deserializing
pub const MAX_WITNESS_SCRIPT: usize = 65536;

/// Multi-signature scripts accept at most this many keys
pub const MAX_MULTISIG_KEYS: usize = 1024;

bhp_core::wrap_prefixed_byte_vector!(
    /// Pushes the signatures a verification script consumes, one 64-byte push each.
    InvocationScript,
    MAX_WITNESS_SCRIPT
);

bhp_core::wrap_prefixed_byte_vector!(
    /// The script whose hash is the address being spent from. Consumes the signatures pushed
    /// by the invocation script.
    VerificationScript,
    MAX_WITNESS_SCRIPT
);

impl InvocationScript {
    /// Push one signature
    pub fn from_signature(sig: &SignatureData) -> Self {
        Self::from_signatures(std::slice::from_ref(sig))
    }

    /// Push signatures in the order the verification script expects them
    pub fn from_signatures(sigs: &[SignatureData]) -> Self {
        sigs.iter()
            .fold(ScriptBuilder::with_capacity(65 * sigs.len()), |sb, sig| {
                sb.push_data(&sig.to_bytes())
            })
            .build()
            .into()
    }

    /// Read the signatures back out. Errors if the script is anything but 64-byte pushes.
    pub fn signatures(&self) -> Result<Vec<SignatureData>, SerError> {
        let chunks = self.items().chunks(65);
        let mut sigs = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if chunk.len() != 65 || chunk[0] != 64 {
                return Err(SerError::ComponentError(
                    "invocation script is not a sequence of signature pushes".to_owned(),
                ));
            }
            sigs.push(
                SignatureData::from_bytes(&chunk[1..])
                    .map_err(|e| SerError::ComponentError(e.to_string()))?,
            );
        }
        Ok(sigs)
    }
}

impl VerificationScript {
    /// `PUSH(compressed key) CHECKSIG`
    pub fn from_public_key(key: &PublicKey) -> Self {
        ScriptBuilder::with_capacity(35)
            .push_data(&key.to_compressed())
            .op(OpCode::CHECKSIG)
            .build()
            .into()
    }

    /// `PUSH(m) PUSH(key)... PUSH(n) CHECKMULTISIG`. Keys are ordered by x coordinate, then y,
    /// so any permutation of the same keys produces the same script.
    pub fn multi_sig(threshold: usize, keys: &[PublicKey]) -> TxResult<Self> {
        if threshold == 0 || threshold > keys.len() || keys.len() > MAX_MULTISIG_KEYS {
            return Err(TxError::InvalidMultiSig {
                threshold,
                keys: keys.len(),
            });
        }
        let mut sorted = keys.to_vec();
        sorted.sort_by_key(|k| k.to_uncompressed());

        let sb = sorted
            .iter()
            .fold(ScriptBuilder::new().push_integer(threshold as i64), |sb, k| {
                sb.push_data(&k.to_compressed())
            });
        Ok(sb
            .push_integer(keys.len() as i64)
            .op(OpCode::CHECKMULTISIG)
            .build()
            .into())
    }

    /// `hash160(script)`, the address this script guards
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(self.items())
    }

    /// The key of a single-signature script. `None` for any other script.
    pub fn public_key(&self) -> Option<PublicKey> {
        match self.items() {
            [0x21, key @ .., 0xac] if key.len() == 33 => PublicKey::from_sec1_bytes(key).ok(),
            _ => None,
        }
    }

    /// The signature threshold and keys of a single- or multi-signature script, in the order
    /// signatures must be supplied. `None` for any other script.
    pub fn signers(&self) -> Option<(usize, Vec<PublicKey>)> {
        if let Some(key) = self.public_key() {
            return Some((1, vec![key]));
        }

        let script = self.items();
        let (&last, body) = script.split_last()?;
        if last != OpCode::CHECKMULTISIG.byte() {
            return None;
        }
        let mut pos = 0;
        let threshold = read_count(body, &mut pos)?;
        let mut keys = vec![];
        while body.get(pos) == Some(&0x21) {
            let key = body.get(pos + 1..pos + 34)?;
            keys.push(PublicKey::from_sec1_bytes(key).ok()?);
            pos += 34;
        }
        let n = read_count(body, &mut pos)?;
        if pos != body.len() || n != keys.len() || threshold == 0 || threshold > n {
            return None;
        }
        Some((threshold, keys))
    }
}

// A count pushed as `PUSH1..PUSH16` or as 1 or 2 little-endian data bytes
fn read_count(script: &[u8], pos: &mut usize) -> Option<usize> {
    let op = *script.get(*pos)?;
    let (value, width) = match op {
        0x51..=0x60 => ((op - 0x50) as usize, 1),
        0x01 => (*script.get(*pos + 1)? as usize, 2),
        0x02 => {
            let bytes = script.get(*pos + 1..*pos + 3)?;
            (u16::from_le_bytes([bytes[0], bytes[1]]) as usize, 3)
        }
        _ => return None,
    };
    *pos += width;
    Some(value)
}

#[cfg(test)]
mod test {
    use super::*;
    use bhp_core::ByteFormat;
    use bhp_keys::PrivateKey;

    const PUBKEY: &str = "031a6c6fbbdf02ca351745fa86b9ba5a9452d785ac4f7fc2b7548ca2a46c4fcf4a";

    #[test]
    fn it_builds_single_sig_verification_scripts() {
        let key: PublicKey = PUBKEY.parse().unwrap();
        let script = VerificationScript::from_public_key(&key);
        assert_eq!(hex::encode(script.items()), format!("21{PUBKEY}ac"));
        assert_eq!(
            script.serialize_hex().unwrap(),
            format!("2321{PUBKEY}ac")
        );
        assert_eq!(
            hex::encode(script.script_hash()),
            "23ba2703c53263e8d6e522dc32203339dcd8eee9"
        );
        assert_eq!(script.public_key(), Some(key));
    }

    #[test]
    fn it_pushes_signatures() {
        let sig = SignatureData::new([1u8; 32], [2u8; 32]);
        let script = InvocationScript::from_signature(&sig);
        assert_eq!(script.len(), 65);
        assert_eq!(script.items()[0], 0x40);
        assert_eq!(script.signatures().unwrap(), vec![sig]);

        let two = InvocationScript::from_signatures(&[sig, sig]);
        assert_eq!(two.signatures().unwrap().len(), 2);

        assert!(InvocationScript::new(vec![0x40, 0x00]).signatures().is_err());
    }

    #[test]
    fn it_orders_multisig_keys() {
        let keys: Vec<PublicKey> = (1u8..=3)
            .map(|i| PrivateKey::from_bytes(&[i; 32]).unwrap().public_key())
            .collect();
        let a = VerificationScript::multi_sig(2, &keys).unwrap();
        let mut reversed = keys.clone();
        reversed.reverse();
        let b = VerificationScript::multi_sig(2, &reversed).unwrap();
        assert_eq!(a, b);

        let items = a.items();
        assert_eq!(items[0], 0x52);
        assert_eq!(items.len(), 1 + 3 * 34 + 2);
        assert_eq!(items[items.len() - 2], 0x53);
        assert_eq!(items[items.len() - 1], 0xae);
        assert_eq!(a.public_key(), None);

        let (threshold, parsed) = a.signers().unwrap();
        assert_eq!(threshold, 2);
        let mut expected = keys;
        expected.sort_by_key(|k| k.to_uncompressed());
        assert_eq!(parsed, expected);
    }

    #[test]
    fn it_only_reads_standard_scripts() {
        let key: PublicKey = PUBKEY.parse().unwrap();
        assert_eq!(
            VerificationScript::from_public_key(&key).signers(),
            Some((1, vec![key]))
        );
        assert_eq!(VerificationScript::new(vec![0x51, 0xae]).signers(), None);
        assert_eq!(VerificationScript::new(vec![0x66]).signers(), None);
        assert_eq!(VerificationScript::null().signers(), None);
    }

    #[test]
    fn it_ignores_keys_with_non_canonical_tags() {
        let mut compact = hex::decode(PUBKEY).unwrap();
        compact[0] = 0x05;
        let mut items = vec![0x21];
        items.extend_from_slice(&compact);
        items.push(0xac);
        let script = VerificationScript::new(items);
        assert_eq!(script.public_key(), None);
        assert_eq!(script.signers(), None);
    }

    #[test]
    fn it_rejects_bad_thresholds() {
        let key: PublicKey = PUBKEY.parse().unwrap();
        assert!(matches!(
            VerificationScript::multi_sig(0, &[key]),
            Err(TxError::InvalidMultiSig { threshold: 0, keys: 1 })
        ));
        assert!(matches!(
            VerificationScript::multi_sig(2, &[key]),
            Err(TxError::InvalidMultiSig { threshold: 2, keys: 1 })
        ));
    }
}
