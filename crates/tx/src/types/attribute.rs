//! Transaction attributes. The usage tag fixes how the payload is framed on the wire.

use std::io::{Read, Write};

use bhp_core::{
    ser::{read_var_bytes, write_var_bytes, var_bytes_len, ByteFormat, SerError, SerResult},
    ScriptHash,
};

use crate::error::{TxError, TxResult};

/// Description and remark payloads longer than this are rejected
pub const MAX_ATTRIBUTE_DATA: usize = 65535;

/// What an attribute says about the transaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AttributeUsage {
    /// 0x00, a 32-byte contract hash
    ContractHash,
    /// 0x02, the x coordinate of an ECDH key with even y
    ECDH02,
    /// 0x03, the x coordinate of an ECDH key with odd y
    ECDH03,
    /// 0x20, a 20-byte script hash that must witness the transaction
    Script,
    /// 0x30, a 32-byte vote
    Vote,
    /// 0x81, a URL of at most 255 bytes
    DescriptionUrl,
    /// 0x90, free-form description
    Description,
    /// 0xa1..=0xaf, a 32-byte hash. Carries 1..=15.
    Hash(u8),
    /// 0xf0..=0xff, a free-form remark. Carries 0..=15.
    Remark(u8),
}

/// How an attribute payload is laid out after the usage tag
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Framing {
    /// Exactly this many bytes, no prefix
    Fixed(usize),
    /// A one-byte length, then the bytes
    ShortPrefix,
    /// A VarInt length, then the bytes
    VarBytes,
}

impl AttributeUsage {
    /// False for `Hash` indices outside 1..=15 and `Remark` indices above 15, which have no
    /// tag byte.
    pub fn is_encodable(self) -> bool {
        match self {
            AttributeUsage::Hash(n) => (1..=0x0f).contains(&n),
            AttributeUsage::Remark(n) => n <= 0x0f,
            _ => true,
        }
    }

    /// The tag byte
    pub fn byte(self) -> u8 {
        match self {
            AttributeUsage::ContractHash => 0x00,
            AttributeUsage::ECDH02 => 0x02,
            AttributeUsage::ECDH03 => 0x03,
            AttributeUsage::Script => 0x20,
            AttributeUsage::Vote => 0x30,
            AttributeUsage::DescriptionUrl => 0x81,
            AttributeUsage::Description => 0x90,
            AttributeUsage::Hash(n) => 0xa0 | (n & 0x0f),
            AttributeUsage::Remark(n) => 0xf0 | (n & 0x0f),
        }
    }

    /// The payload framing for this usage
    pub fn framing(self) -> Framing {
        match self {
            AttributeUsage::ContractHash
            | AttributeUsage::ECDH02
            | AttributeUsage::ECDH03
            | AttributeUsage::Vote
            | AttributeUsage::Hash(_) => Framing::Fixed(32),
            AttributeUsage::Script => Framing::Fixed(20),
            AttributeUsage::DescriptionUrl => Framing::ShortPrefix,
            AttributeUsage::Description | AttributeUsage::Remark(_) => Framing::VarBytes,
        }
    }
}

impl TryFrom<u8> for AttributeUsage {
    type Error = SerError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        let usage = match tag {
            0x00 => AttributeUsage::ContractHash,
            0x02 => AttributeUsage::ECDH02,
            0x03 => AttributeUsage::ECDH03,
            0x20 => AttributeUsage::Script,
            0x30 => AttributeUsage::Vote,
            0x81 => AttributeUsage::DescriptionUrl,
            0x90 => AttributeUsage::Description,
            0xa1..=0xaf => AttributeUsage::Hash(tag & 0x0f),
            0xf0..=0xff => AttributeUsage::Remark(tag & 0x0f),
            _ => {
                return Err(SerError::UnknownTag {
                    kind: "attribute usage",
                    tag,
                })
            }
        };
        Ok(usage)
    }
}

/// A usage tag and its payload.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TransactionAttribute {
    usage: AttributeUsage,
    data: Vec<u8>,
}

impl TransactionAttribute {
    /// Instantiate an attribute. Errors if the usage has no tag byte or the payload does not
    /// fit the usage's framing.
    pub fn new(usage: AttributeUsage, data: Vec<u8>) -> TxResult<Self> {
        if !usage.is_encodable() {
            return Err(TxError::InvalidAttributeUsage(usage));
        }
        let framing = usage.framing();
        let fits = match framing {
            Framing::Fixed(n) => data.len() == n,
            Framing::ShortPrefix => data.len() <= 0xff,
            Framing::VarBytes => data.len() <= MAX_ATTRIBUTE_DATA,
        };
        if !fits {
            return Err(TxError::InvalidAttribute {
                usage,
                framing,
                got: data.len(),
            });
        }
        Ok(Self { usage, data })
    }

    /// The `Script` attribute naming `hash` as a required witness
    pub fn script(hash: &ScriptHash) -> Self {
        Self {
            usage: AttributeUsage::Script,
            data: hash.as_ref().to_vec(),
        }
    }

    /// A `Remark` attribute. Errors past 65535 bytes.
    pub fn remark(text: &str) -> TxResult<Self> {
        Self::new(AttributeUsage::Remark(0), text.as_bytes().to_vec())
    }

    /// The usage tag
    pub fn usage(&self) -> AttributeUsage {
        self.usage
    }

    /// The payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ByteFormat for TransactionAttribute {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        1 + match self.usage.framing() {
            Framing::Fixed(n) => n,
            Framing::ShortPrefix => 1 + self.data.len(),
            Framing::VarBytes => var_bytes_len(self.data.len()),
        }
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        let usage = AttributeUsage::try_from(Self::read_u8(reader)?)?;
        let data = match usage.framing() {
            Framing::Fixed(n) => {
                let mut buf = vec![0u8; n];
                reader.read_exact(&mut buf)?;
                buf
            }
            Framing::ShortPrefix => {
                let len = Self::read_u8(reader)? as usize;
                let mut buf = vec![0u8; len];
                reader.read_exact(&mut buf)?;
                buf
            }
            Framing::VarBytes => read_var_bytes(reader, MAX_ATTRIBUTE_DATA)?,
        };
        Ok(Self { usage, data })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = Self::write_u8(writer, self.usage.byte())?;
        len += match self.usage.framing() {
            Framing::Fixed(n) => {
                writer.write_all(&self.data)?;
                n
            }
            Framing::ShortPrefix => {
                Self::write_u8(writer, self.data.len() as u8)?;
                writer.write_all(&self.data)?;
                1 + self.data.len()
            }
            Framing::VarBytes => write_var_bytes(writer, &self.data)?,
        };
        Ok(len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_frames_payloads_by_usage() {
        let hash = ScriptHash::from_be_hex("e9eed8dc39332032dc22e5d6e86332c50327ba23").unwrap();
        let cases = [
            (
                TransactionAttribute::script(&hash),
                "2023ba2703c53263e8d6e522dc32203339dcd8eee9",
            ),
            (
                TransactionAttribute::remark("hi").unwrap(),
                "f0026869",
            ),
            (
                TransactionAttribute::new(AttributeUsage::DescriptionUrl, b"a.io".to_vec()).unwrap(),
                "8104612e696f",
            ),
            (
                TransactionAttribute::new(AttributeUsage::Hash(3), vec![0x11; 32]).unwrap(),
                "a31111111111111111111111111111111111111111111111111111111111111111",
            ),
        ];
        for (attr, expected) in cases.iter() {
            assert_eq!(attr.serialize_hex().unwrap(), *expected);
            assert_eq!(attr.serialized_length(), expected.len() / 2);
            assert_eq!(&TransactionAttribute::deserialize_hex(expected).unwrap(), attr);
        }
    }

    #[test]
    fn it_rejects_payloads_that_do_not_fit() {
        assert!(matches!(
            TransactionAttribute::new(AttributeUsage::Script, vec![0; 19]),
            Err(TxError::InvalidAttribute { got: 19, .. })
        ));
        assert!(matches!(
            TransactionAttribute::new(AttributeUsage::Vote, vec![0; 33]),
            Err(TxError::InvalidAttribute { got: 33, .. })
        ));
        assert!(matches!(
            TransactionAttribute::new(AttributeUsage::DescriptionUrl, vec![0; 256]),
            Err(TxError::InvalidAttribute { got: 256, .. })
        ));
    }

    #[test]
    fn it_rejects_indices_without_a_tag() {
        let cases = [
            AttributeUsage::Hash(0),
            AttributeUsage::Hash(16),
            AttributeUsage::Hash(0xff),
            AttributeUsage::Remark(16),
            AttributeUsage::Remark(0x80),
        ];
        for usage in cases.iter() {
            assert!(!usage.is_encodable());
            let data = vec![0u8; 32];
            assert!(
                matches!(
                    TransactionAttribute::new(*usage, data),
                    Err(TxError::InvalidAttributeUsage(u)) if u == *usage
                ),
                "{usage:?}"
            );
        }
    }

    #[test]
    fn it_round_trips_every_indexed_usage() {
        for n in 0u8..=15 {
            let mut usages = vec![AttributeUsage::Remark(n)];
            if n > 0 {
                usages.push(AttributeUsage::Hash(n));
            }
            for usage in usages {
                let attr = TransactionAttribute::new(usage, vec![n; 32]).unwrap();
                let hex = attr.serialize_hex().unwrap();
                assert_eq!(TransactionAttribute::deserialize_hex(&hex).unwrap(), attr);
            }
        }
    }

    #[test]
    fn it_rejects_unknown_usages() {
        for tag in [0x01u8, 0x21, 0x80, 0xa0, 0xb0].iter() {
            assert!(matches!(
                AttributeUsage::try_from(*tag),
                Err(SerError::UnknownTag { tag: t, .. }) if t == *tag
            ));
        }
        assert_eq!(AttributeUsage::try_from(0xff).unwrap(), AttributeUsage::Remark(15));
    }
}
