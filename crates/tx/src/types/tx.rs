//! The transaction, its type-specific data, and the two serializations: the unsigned form that
//! is hashed and signed, and the full form that is transmitted.

use std::io::{Read, Write};

use bhp_core::{
    ser::{read_var_bytes, var_bytes_len, write_var_bytes, ByteFormat, SerError},
    Fixed8, Hash256Writer, TxId,
};

use crate::{
    error::{TxError, TxResult},
    types::{TransactionAttribute, TransactionInput, TransactionOutput, Witness},
};

/// Attribute lists longer than this are rejected when deserializing
pub const MAX_ATTRIBUTES: usize = 16;
/// Input, output, claim and witness lists longer than this are rejected when deserializing
pub const MAX_ITEMS: usize = 65536;
/// Invocation scripts longer than this are rejected when deserializing
pub const MAX_INVOCATION_SCRIPT: usize = 65536 * 16;

/// The transaction type tag, the first byte of every transaction.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TransactionType {
    /// Block reward, first in every block
    Miner = 0x00,
    /// Issues a registered asset
    Issue = 0x01,
    /// Claims GAS generated by spent BHP
    Claim = 0x02,
    /// Validator enrollment
    Enrollment = 0x20,
    /// Asset registration
    Register = 0x40,
    /// A plain asset transfer
    Contract = 0x80,
    /// Account and validator state changes
    State = 0x90,
    /// Legacy contract publication
    Publish = 0xd0,
    /// Runs a script on the AVM
    Invocation = 0xd1,
}

impl TryFrom<u8> for TransactionType {
    type Error = SerError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        use TransactionType::*;
        let t = match tag {
            0x00 => Miner,
            0x01 => Issue,
            0x02 => Claim,
            0x20 => Enrollment,
            0x40 => Register,
            0x80 => Contract,
            0x90 => State,
            0xd0 => Publish,
            0xd1 => Invocation,
            _ => {
                return Err(SerError::UnknownTag {
                    kind: "transaction type",
                    tag,
                })
            }
        };
        Ok(t)
    }
}

/// The fields that depend on the transaction type. Enrollment, Register, State and Publish are
/// recognized by tag but not constructed.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExclusiveData {
    /// A nonce distinguishing otherwise identical miner transactions
    Miner {
        /// The nonce
        nonce: u32,
    },
    /// No extra fields
    Issue,
    /// The spent outputs whose generated GAS is claimed
    Claim {
        /// The claimed outputs
        claims: Vec<TransactionInput>,
    },
    /// No extra fields
    Contract,
    /// A script and the system fee paid to run it
    Invocation {
        /// The AVM script
        script: Vec<u8>,
        /// The system fee. Only on the wire from version 1.
        gas: Fixed8,
    },
}

impl ExclusiveData {
    /// The type tag this data belongs to
    pub fn tx_type(&self) -> TransactionType {
        match self {
            ExclusiveData::Miner { .. } => TransactionType::Miner,
            ExclusiveData::Issue => TransactionType::Issue,
            ExclusiveData::Claim { .. } => TransactionType::Claim,
            ExclusiveData::Contract => TransactionType::Contract,
            ExclusiveData::Invocation { .. } => TransactionType::Invocation,
        }
    }

    fn serialized_length(&self, version: u8) -> usize {
        match self {
            ExclusiveData::Miner { .. } => 4,
            ExclusiveData::Issue | ExclusiveData::Contract => 0,
            ExclusiveData::Claim { claims } => Transaction::prefix_vec_len(claims),
            ExclusiveData::Invocation { script, .. } => {
                var_bytes_len(script.len()) + if version >= 1 { 8 } else { 0 }
            }
        }
    }

    fn read_from<R>(reader: &mut R, tx_type: TransactionType, version: u8) -> TxResult<Self>
    where
        R: Read,
    {
        let data = match tx_type {
            TransactionType::Miner => ExclusiveData::Miner {
                nonce: Transaction::read_u32_le(reader)?,
            },
            TransactionType::Issue => ExclusiveData::Issue,
            TransactionType::Claim => ExclusiveData::Claim {
                claims: Transaction::read_prefix_vec(reader, MAX_ITEMS)?,
            },
            TransactionType::Contract => ExclusiveData::Contract,
            TransactionType::Invocation => {
                let script = read_var_bytes(reader, MAX_INVOCATION_SCRIPT)?;
                let gas = if version >= 1 {
                    Fixed8::read_from(reader, 0)?
                } else {
                    Fixed8::ZERO
                };
                ExclusiveData::Invocation { script, gas }
            }
            other => {
                return Err(SerError::UnknownTag {
                    kind: "transaction type",
                    tag: other as u8,
                }
                .into())
            }
        };
        Ok(data)
    }

    fn write_to<W>(&self, writer: &mut W, version: u8) -> TxResult<usize>
    where
        W: Write,
    {
        let len = match self {
            ExclusiveData::Miner { nonce } => Transaction::write_u32_le(writer, *nonce)?,
            ExclusiveData::Issue | ExclusiveData::Contract => 0,
            ExclusiveData::Claim { claims } => Transaction::write_prefix_vec(writer, claims)?,
            ExclusiveData::Invocation { script, gas } => {
                let mut len = write_var_bytes(writer, script)?;
                if version >= 1 {
                    len += gas.write_to(writer)?;
                }
                len
            }
        };
        Ok(len)
    }
}

/// A transaction.
///
/// The unsigned form is `type || version || exclusive data || attributes || inputs ||
/// outputs`. The full form appends the witnesses. Witnesses are never part of what is signed,
/// so appending one leaves the txid unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Transaction {
    version: u8,
    data: ExclusiveData,
    attributes: Vec<TransactionAttribute>,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    witnesses: Vec<Witness>,
}

impl Transaction {
    /// Instantiate a transaction from its parts
    pub fn new<A, I, O, W>(
        version: u8,
        data: ExclusiveData,
        attributes: A,
        inputs: I,
        outputs: O,
        witnesses: W,
    ) -> Self
    where
        A: Into<Vec<TransactionAttribute>>,
        I: Into<Vec<TransactionInput>>,
        O: Into<Vec<TransactionOutput>>,
        W: Into<Vec<Witness>>,
    {
        Self {
            version,
            data,
            attributes: attributes.into(),
            inputs: inputs.into(),
            outputs: outputs.into(),
            witnesses: witnesses.into(),
        }
    }

    /// The type tag
    pub fn tx_type(&self) -> TransactionType {
        self.data.tx_type()
    }

    /// The version byte
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The type-specific data
    pub fn exclusive_data(&self) -> &ExclusiveData {
        &self.data
    }

    /// The attributes, in order
    pub fn attributes(&self) -> &[TransactionAttribute] {
        &self.attributes
    }

    /// The inputs, in order
    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    /// The outputs, in order
    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// The witnesses, in signer order
    pub fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    /// The system fee carried by an invocation. Zero for every other type.
    pub fn system_fee(&self) -> Fixed8 {
        match &self.data {
            ExclusiveData::Invocation { gas, .. } => *gas,
            _ => Fixed8::ZERO,
        }
    }

    /// True once at least one witness is attached
    pub fn is_signed(&self) -> bool {
        !self.witnesses.is_empty()
    }

    /// Append a witness. Does not touch anything that is signed.
    pub fn push_witness(&mut self, witness: Witness) {
        self.witnesses.push(witness);
    }

    /// The byte-length of the unsigned form
    pub fn unsigned_length(&self) -> usize {
        2 + self.data.serialized_length(self.version)
            + Self::prefix_vec_len(&self.attributes)
            + Self::prefix_vec_len(&self.inputs)
            + Self::prefix_vec_len(&self.outputs)
    }

    /// Write the unsigned form, the signing pre-image
    pub fn write_unsigned<W>(&self, writer: &mut W) -> TxResult<usize>
    where
        W: Write,
    {
        let mut len = Self::write_u8(writer, self.tx_type() as u8)?;
        len += Self::write_u8(writer, self.version)?;
        len += self.data.write_to(writer, self.version)?;
        len += Self::write_prefix_vec(writer, &self.attributes)?;
        len += Self::write_prefix_vec(writer, &self.inputs)?;
        len += Self::write_prefix_vec(writer, &self.outputs)?;
        Ok(len)
    }

    /// The unsigned form as a new vector
    pub fn unsigned_bytes(&self) -> TxResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.unsigned_length());
        self.write_unsigned(&mut buf)?;
        Ok(buf)
    }

    /// `hash256` of the unsigned form
    pub fn txid(&self) -> TxResult<TxId> {
        let mut w = Hash256Writer::default();
        self.write_unsigned(&mut w)?;
        Ok(w.finish_txid())
    }
}

impl ByteFormat for Transaction {
    type Error = TxError;

    fn serialized_length(&self) -> usize {
        self.unsigned_length() + Self::prefix_vec_len(&self.witnesses)
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> TxResult<Self>
    where
        R: Read,
    {
        let tx_type = TransactionType::try_from(Self::read_u8(reader)?)?;
        let version = Self::read_u8(reader)?;
        let data = ExclusiveData::read_from(reader, tx_type, version)?;
        let attributes = Self::read_prefix_vec(reader, MAX_ATTRIBUTES)?;
        let inputs = Self::read_prefix_vec(reader, MAX_ITEMS)?;
        let outputs = Self::read_prefix_vec(reader, MAX_ITEMS)?;
        let witnesses = Self::read_prefix_vec(reader, MAX_ITEMS)?;
        Ok(Self {
            version,
            data,
            attributes,
            inputs,
            outputs,
            witnesses,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> TxResult<usize>
    where
        W: Write,
    {
        let mut len = self.write_unsigned(writer)?;
        len += Self::write_prefix_vec(writer, &self.witnesses)?;
        Ok(len)
    }
}

bhp_core::impl_hex_serde!(Transaction);

#[cfg(test)]
mod test {
    use super::*;
    use bhp_core::{AssetId, ScriptHash};
    use proptest::prelude::*;

    use crate::{
        script::{InvocationScript, VerificationScript},
        types::AttributeUsage,
    };

    fn sample_contract_tx() -> Transaction {
        Transaction::new(
            0,
            ExclusiveData::Contract,
            vec![TransactionAttribute::remark("x").unwrap()],
            vec![TransactionInput::new(TxId::new([0x11; 32]), 1)],
            vec![TransactionOutput::new(
                AssetId::BHP,
                Fixed8::from_units(5).unwrap(),
                ScriptHash::new([0x22; 20]),
            )],
            vec![],
        )
    }

    #[test]
    fn it_lays_out_fields_in_order() {
        let tx = sample_contract_tx();
        let expected = format!(
            "8000{}{}{}00",
            "01f00178",
            format!("01{}0100", "11".repeat(32)),
            format!(
                "01{}0065cd1d00000000{}",
                "9b7cffdaa674beae0f930ebe6085af9093e5fe56b34a5c220ccdcf6efc336fc5",
                "22".repeat(20)
            ),
        );
        assert_eq!(tx.serialize_hex().unwrap(), expected);
        assert_eq!(tx.serialized_length(), expected.len() / 2);
        assert_eq!(Transaction::deserialize_hex(&expected).unwrap(), tx);
    }

    #[test]
    fn it_keeps_the_txid_when_witnessed() {
        let mut tx = sample_contract_tx();
        let before = tx.txid().unwrap();
        let unsigned = tx.unsigned_bytes().unwrap();
        tx.push_witness(Witness::new(
            InvocationScript::new(vec![0x40; 65]),
            VerificationScript::new(vec![0xac]),
        ));
        assert!(tx.is_signed());
        assert_eq!(tx.txid().unwrap(), before);
        assert_eq!(tx.unsigned_bytes().unwrap(), unsigned);
        assert_eq!(before, TxId::digest(&unsigned));
        assert_eq!(tx.serialized_length(), unsigned.len() + 1 + 66 + 2);
    }

    #[test]
    fn it_writes_invocation_gas_from_version_one() {
        let data = ExclusiveData::Invocation {
            script: vec![0x66],
            gas: Fixed8::from_units(1).unwrap(),
        };
        let v0 = Transaction::new(0, data.clone(), vec![], vec![], vec![], vec![]);
        let v1 = Transaction::new(1, data, vec![], vec![], vec![], vec![]);
        assert_eq!(v0.serialize_hex().unwrap(), "d100016600000000");
        assert_eq!(
            v1.serialize_hex().unwrap(),
            "d101016600e1f5050000000000000000"
        );
        assert_eq!(v1.system_fee(), Fixed8::from_units(1).unwrap());
    }

    #[test]
    fn it_reads_miner_and_claim_data() {
        let miner = Transaction::new(
            0,
            ExclusiveData::Miner { nonce: 0xdeadbeef },
            vec![],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(miner.serialize_hex().unwrap(), "0000efbeadde00000000");

        let claim = Transaction::new(
            0,
            ExclusiveData::Claim {
                claims: vec![TransactionInput::new(TxId::new([0x33; 32]), 2)],
            },
            vec![],
            vec![],
            vec![],
            vec![],
        );
        let hex = claim.serialize_hex().unwrap();
        assert!(hex.starts_with("020001"));
        assert_eq!(Transaction::deserialize_hex(&hex).unwrap(), claim);
    }

    #[test]
    fn it_rejects_unsupported_types() {
        let cases = ["2000", "4000", "9000", "d000"];
        for case in cases.iter() {
            assert!(matches!(
                Transaction::deserialize_hex(case),
                Err(TxError::MalformedEncoding(SerError::UnknownTag { .. }))
            ));
        }
        assert!(matches!(
            Transaction::deserialize_hex("7700"),
            Err(TxError::MalformedEncoding(SerError::UnknownTag { tag: 0x77, .. }))
        ));
    }

    #[test]
    fn it_rejects_trailing_and_truncated_bytes() {
        assert!(matches!(
            Transaction::deserialize_hex("80000000000000"),
            Err(TxError::MalformedEncoding(SerError::TrailingBytes(1)))
        ));
        assert!(matches!(
            Transaction::deserialize_hex("8000000000"),
            Err(TxError::MalformedEncoding(SerError::Truncated))
        ));
    }

    #[test]
    fn it_round_trips_through_json() {
        let tx = sample_contract_tx();
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(serde_json::from_str::<Transaction>(&json).unwrap(), tx);
    }

    fn arb_attribute() -> impl Strategy<Value = TransactionAttribute> {
        prop_oneof![
            any::<[u8; 20]>().prop_map(|h| TransactionAttribute::script(&ScriptHash::new(h))),
            (0u8..=15, proptest::collection::vec(any::<u8>(), 0..300)).prop_map(|(n, d)| {
                TransactionAttribute::new(AttributeUsage::Remark(n), d).unwrap()
            }),
            (1u8..=15, any::<[u8; 32]>()).prop_map(|(n, h)| {
                TransactionAttribute::new(AttributeUsage::Hash(n), h.to_vec()).unwrap()
            }),
            any::<[u8; 32]>().prop_map(|h| {
                TransactionAttribute::new(AttributeUsage::Vote, h.to_vec()).unwrap()
            }),
        ]
    }

    fn arb_input() -> impl Strategy<Value = TransactionInput> {
        (any::<[u8; 32]>(), any::<u16>()).prop_map(|(h, i)| TransactionInput::new(TxId::new(h), i))
    }

    fn arb_output() -> impl Strategy<Value = TransactionOutput> {
        (any::<[u8; 32]>(), any::<i64>(), any::<[u8; 20]>()).prop_map(|(a, v, s)| {
            TransactionOutput::new(AssetId::new(a), Fixed8::from_raw(v), ScriptHash::new(s))
        })
    }

    fn arb_witness() -> impl Strategy<Value = Witness> {
        (
            proptest::collection::vec(any::<u8>(), 0..130),
            proptest::collection::vec(any::<u8>(), 0..40),
        )
            .prop_map(|(i, v)| Witness::new(i.into(), v.into()))
    }

    proptest! {
        #[test]
        fn serialization_round_trips(
            script in proptest::collection::vec(any::<u8>(), 0..400),
            gas in any::<i64>(),
            attributes in proptest::collection::vec(arb_attribute(), 0..4),
            inputs in proptest::collection::vec(arb_input(), 0..5),
            outputs in proptest::collection::vec(arb_output(), 0..5),
            witnesses in proptest::collection::vec(arb_witness(), 0..3),
        ) {
            let tx = Transaction::new(
                1,
                ExclusiveData::Invocation { script, gas: Fixed8::from_raw(gas) },
                attributes,
                inputs,
                outputs,
                witnesses,
            );
            let bytes = tx.to_bytes().unwrap();
            prop_assert_eq!(bytes.len(), tx.serialized_length());
            prop_assert_eq!(Transaction::from_bytes(&bytes).unwrap(), tx);
        }
    }
}
