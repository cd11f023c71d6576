//! The collaborators a transaction pipeline talks to: an account that owns UTXOs and keys, and
//! a client that submits finished transactions to a node.

use bhp_core::{AssetId, ByteFormat, Fixed8, ScriptHash};
use bhp_keys::{KeyError, KeyPair, PublicKey};

use crate::{
    error::{TxError, TxResult},
    script::VerificationScript,
    types::Transaction,
    utxo::{SelectionStrategy, Utxo},
};

/// Supplies the UTXOs to fund a transaction with.
pub trait UtxoProvider {
    /// UTXOs of `asset` worth at least `amount` if the holder has that much. The returned
    /// order is the order they are spent in.
    fn utxos_for_asset_amount(
        &self,
        asset: AssetId,
        amount: Fixed8,
        strategy: SelectionStrategy,
    ) -> TxResult<Vec<Utxo>>;
}

/// An account that funds and signs transactions.
pub trait Account: UtxoProvider {
    /// The account's public key
    fn public_key(&self) -> &PublicKey;

    /// The key pair to sign with. Watch-only accounts return an error.
    fn key_pair(&self) -> Result<&KeyPair, KeyError>;

    /// The account's address: the hash of its single-signature verification script
    fn script_hash(&self) -> ScriptHash {
        VerificationScript::from_public_key(self.public_key()).script_hash()
    }
}

/// Submits transactions to a node.
pub trait Client {
    /// Hand a hex-encoded transaction to the node. `Ok(true)` if it was accepted into the
    /// mempool.
    fn send_raw_transaction(&self, tx_hex: &str) -> TxResult<bool>;

    /// Serialize and submit a transaction. Unsigned transactions are refused before anything
    /// is sent.
    fn send_transaction(&self, tx: &Transaction) -> TxResult<bool> {
        if !tx.is_signed() {
            return Err(TxError::Unsigned);
        }
        self.send_raw_transaction(&tx.serialize_hex()?)
    }
}

/// An account whose UTXOs are held in memory, in the order they were added.
#[derive(Clone, Debug)]
pub struct InMemoryAccount {
    public_key: PublicKey,
    key_pair: Option<KeyPair>,
    utxos: Vec<Utxo>,
}

impl InMemoryAccount {
    /// An account that can sign
    pub fn new(key_pair: KeyPair) -> Self {
        Self {
            public_key: *key_pair.public_key(),
            key_pair: Some(key_pair),
            utxos: vec![],
        }
    }

    /// An account that can fund but not sign
    pub fn watch_only(public_key: PublicKey) -> Self {
        Self {
            public_key,
            key_pair: None,
            utxos: vec![],
        }
    }

    /// Add UTXOs after the ones already held
    pub fn with_utxos<I>(mut self, utxos: I) -> Self
    where
        I: IntoIterator<Item = Utxo>,
    {
        self.utxos.extend(utxos);
        self
    }

    /// Every UTXO held
    pub fn utxos(&self) -> &[Utxo] {
        &self.utxos
    }
}

impl UtxoProvider for InMemoryAccount {
    fn utxos_for_asset_amount(
        &self,
        asset: AssetId,
        amount: Fixed8,
        strategy: SelectionStrategy,
    ) -> TxResult<Vec<Utxo>> {
        let selection = crate::utxo::select(&self.utxos, asset, amount, strategy)?;
        Ok(selection.selected)
    }
}

impl Account for InMemoryAccount {
    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn key_pair(&self) -> Result<&KeyPair, KeyError> {
        self.key_pair
            .as_ref()
            .ok_or_else(|| KeyError::NoPrivateKey(self.public_key.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bhp_core::TxId;
    use std::cell::RefCell;

    use crate::types::{ExclusiveData, Witness};

    const PRIVKEY: &str = "1dd37fba80fec4e6a6f13fd708d8dcb3b29def768017052f6c930fa1c5d90bbb";

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl Client for Recorder {
        fn send_raw_transaction(&self, tx_hex: &str) -> TxResult<bool> {
            self.0.borrow_mut().push(tx_hex.to_owned());
            Ok(true)
        }
    }

    fn account() -> InMemoryAccount {
        let pair = KeyPair::from_private_bytes(&hex::decode(PRIVKEY).unwrap()).unwrap();
        InMemoryAccount::new(pair).with_utxos(vec![
            Utxo::new(AssetId::GAS, TxId::new([1; 32]), 0, Fixed8::from_units(40).unwrap()),
            Utxo::new(AssetId::BHP, TxId::new([2; 32]), 0, Fixed8::from_units(7).unwrap()),
            Utxo::new(AssetId::GAS, TxId::new([3; 32]), 0, Fixed8::from_units(16000).unwrap()),
        ])
    }

    #[test]
    fn it_derives_the_address() {
        assert_eq!(
            account().script_hash().to_string(),
            "e9eed8dc39332032dc22e5d6e86332c50327ba23"
        );
    }

    #[test]
    fn it_returns_covering_utxos_of_one_asset() {
        let acct = account();
        let utxos = acct
            .utxos_for_asset_amount(
                AssetId::GAS,
                Fixed8::from_units(41).unwrap(),
                SelectionStrategy::InOrder,
            )
            .unwrap();
        assert_eq!(utxos.len(), 2);
        assert!(utxos.iter().all(|u| u.asset_id == AssetId::GAS));
    }

    #[test]
    fn it_refuses_to_sign_when_watch_only() {
        let acct = InMemoryAccount::watch_only(*account().public_key());
        assert!(matches!(acct.key_pair(), Err(KeyError::NoPrivateKey(_))));
    }

    #[test]
    fn it_refuses_to_send_unsigned_transactions() {
        let client = Recorder::default();
        let mut tx = Transaction::new(0, ExclusiveData::Contract, vec![], vec![], vec![], vec![]);
        assert!(matches!(
            client.send_transaction(&tx),
            Err(TxError::Unsigned)
        ));
        assert!(client.0.borrow().is_empty());

        tx.push_witness(Witness::default());
        assert!(client.send_transaction(&tx).unwrap());
        assert_eq!(client.0.borrow()[0], "8000000000010000");
    }
}
