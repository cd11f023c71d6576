//! Producing and checking witnesses. The signed message is always the unsigned form of the
//! transaction.

use bhp_core::TxId;
use bhp_keys::KeyPair;

use crate::{
    error::{TxError, TxResult},
    types::{Transaction, Witness},
};

/// Sign the unsigned form of `tx` and wrap the signature in a single-signature witness.
pub fn sign_transaction(tx: &Transaction, key_pair: &KeyPair) -> TxResult<Witness> {
    let unsigned = tx.unsigned_bytes()?;
    tracing::trace!(txid = %TxId::digest(&unsigned), "signing transaction");
    let sig = key_pair.sign_message(&unsigned)?;
    Ok(Witness::from_signature(&sig, key_pair.public_key()))
}

/// Check a witness against the unsigned form of `tx`. Handles single-signature and m-of-n
/// verification scripts. Signatures must appear in key order.
pub fn verify_witness(tx: &Transaction, witness: &Witness) -> TxResult<()> {
    let (threshold, keys) = witness
        .verification
        .signers()
        .ok_or(TxError::InvalidWitness("unrecognized verification script"))?;
    let sigs = witness.invocation.signatures()?;
    if sigs.len() != threshold {
        return Err(TxError::InvalidWitness(
            "signature count does not match threshold",
        ));
    }

    let unsigned = tx.unsigned_bytes()?;
    let mut keys = keys.iter();
    for sig in sigs.iter() {
        let mut matched = false;
        for key in keys.by_ref() {
            if key.verify_message(&unsigned, sig).is_ok() {
                matched = true;
                break;
            }
        }
        if !matched {
            return Err(TxError::InvalidWitness("signature does not verify"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use bhp_core::{AssetId, Fixed8, ScriptHash};
    use bhp_keys::PrivateKey;
    use proptest::prelude::*;

    use crate::{
        builder::TransactionBuilder,
        script::{InvocationScript, VerificationScript},
    };

    fn pair(i: u8) -> KeyPair {
        KeyPair::new(PrivateKey::from_bytes(&[i; 32]).unwrap())
    }

    fn tx() -> Transaction {
        TransactionBuilder::contract()
            .pay(AssetId::GAS, Fixed8::from_units(1).unwrap(), ScriptHash::new([5; 20]))
            .build()
    }

    #[test]
    fn it_signs_and_verifies() {
        let tx = tx();
        let key = pair(1);
        let witness = sign_transaction(&tx, &key).unwrap();
        assert_eq!(witness.script_hash(), VerificationScript::from_public_key(key.public_key()).script_hash());
        verify_witness(&tx, &witness).unwrap();

        let other = TransactionBuilder::from(&tx).version(1).build();
        assert!(matches!(
            verify_witness(&other, &witness),
            Err(TxError::InvalidWitness(_))
        ));
    }

    #[test]
    fn it_refuses_witnesses_with_compact_key_tags() {
        let tx = tx();
        let key = pair(1);
        let signed = sign_transaction(&tx, &key).unwrap();

        let mut items = signed.verification.items().to_vec();
        items[1] = 0x05;
        let forged = Witness::new(signed.invocation.clone(), VerificationScript::new(items));
        assert_ne!(forged.script_hash(), signed.script_hash());
        assert!(matches!(
            verify_witness(&tx, &forged),
            Err(TxError::InvalidWitness(_))
        ));
    }

    #[test]
    fn it_verifies_multisig_witnesses_in_key_order() {
        let tx = tx();
        let pairs = [pair(1), pair(2), pair(3)];
        let keys: Vec<_> = pairs.iter().map(|p| *p.public_key()).collect();
        let verification = VerificationScript::multi_sig(2, &keys).unwrap();
        let (_, ordered) = verification.signers().unwrap();

        let unsigned = tx.unsigned_bytes().unwrap();
        let sign_with = |k: &bhp_keys::PublicKey| {
            let p = pairs.iter().find(|p| p.public_key() == k).unwrap();
            p.sign_message(&unsigned).unwrap()
        };
        let in_order = [sign_with(&ordered[0]), sign_with(&ordered[2])];
        let witness = Witness::new(InvocationScript::from_signatures(&in_order), verification.clone());
        verify_witness(&tx, &witness).unwrap();

        let swapped = [in_order[1], in_order[0]];
        let witness = Witness::new(InvocationScript::from_signatures(&swapped), verification.clone());
        assert!(verify_witness(&tx, &witness).is_err());

        let too_few = Witness::new(InvocationScript::from_signatures(&in_order[..1]), verification);
        assert!(verify_witness(&tx, &too_few).is_err());
    }

    proptest! {
        #[test]
        fn signing_is_deterministic(seed in 1u8..255, units in 1i64..1_000_000) {
            let tx = TransactionBuilder::contract()
                .pay(AssetId::BHP, Fixed8::from_units(units).unwrap(), ScriptHash::default())
                .build();
            let key = pair(seed);
            let a = sign_transaction(&tx, &key).unwrap();
            let b = sign_transaction(&tx, &key).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert!(verify_witness(&tx, &a).is_ok());
        }
    }
}
