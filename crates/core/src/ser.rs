//! A simple trait for binary (de)Serialization using std `Read` and `Write` traits, plus the
//! varint and length-prefix framing used by every transaction field.

use std::io::{Cursor, Error as IOError, ErrorKind, Read, Write};

use thiserror::Error;

/// Errors related to serialization of types. Every decode-side failure on malformed input ends
/// up here.
#[derive(Debug, Error)]
pub enum SerError {
    /// VarInts must use the shortest form that fits their value.
    #[error("Non-minimal VarInt. Value {value} encoded in {len} bytes")]
    NonMinimalVarInt {
        /// The decoded value
        value: u64,
        /// The number of bytes it was encoded in
        len: u8,
    },

    /// The reader ran out of bytes before the structure was complete.
    #[error("Unexpected end of input")]
    Truncated,

    /// A length prefix declared more items than the field allows.
    #[error("Length {got} exceeds maximum {max}")]
    LengthExceeded {
        /// The declared length
        got: u64,
        /// The maximum for this field
        max: u64,
    },

    /// A fixed-width field got the wrong number of bytes.
    #[error("Expected {expected} bytes. Got {got}")]
    InvalidLength {
        /// The width of the field
        expected: usize,
        /// The width supplied
        got: usize,
    },

    /// A tag byte (transaction type, attribute usage, ...) that this crate does not know.
    #[error("Unknown {kind} tag 0x{tag:02x}")]
    UnknownTag {
        /// What the tag selects
        kind: &'static str,
        /// The offending byte
        tag: u8,
    },

    /// `deserialize_hex` decoded a structure but input bytes remained.
    #[error("{0} trailing bytes after structure")]
    TrailingBytes(usize),

    /// IOError bubbled up from a `Write` passed to a `ByteFormat::write_to` implementation.
    #[error("Serialization error")]
    IOError(#[source] IOError),

    /// `deserialize_hex` encountered an error on its input.
    #[error("Error deserializing hex string")]
    FromHexError(#[from] hex::FromHexError),

    /// An error by a component call in data structure (de)serialization
    #[error("Error in component (de)serialization: {0}")]
    ComponentError(String),
}

impl From<IOError> for SerError {
    fn from(e: IOError) -> Self {
        match e.kind() {
            ErrorKind::UnexpectedEof => SerError::Truncated,
            _ => SerError::IOError(e),
        }
    }
}

/// Type alias for serialization errors
pub type SerResult<T> = Result<T, SerError>;

/// Calculates the minimum prefix length for a VarInt encoding `number`
pub fn prefix_byte_len(number: u64) -> u8 {
    match number {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x10000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Matches the length of the VarInt to the 1-byte flag
pub fn first_byte_from_len(number: u8) -> Option<u8> {
    match number {
        3 => Some(0xfd),
        5 => Some(0xfe),
        9 => Some(0xff),
        _ => None,
    }
}

/// Matches the VarInt prefix flag to the serialized length
pub fn prefix_len_from_first_byte(number: u8) -> u8 {
    match number {
        0..=0xfc => 1,
        0xfd => 3,
        0xfe => 5,
        0xff => 9,
    }
}

/// Write a VarInt. Always uses the minimal form.
pub fn write_compact_int<W>(writer: &mut W, number: u64) -> SerResult<usize>
where
    W: Write,
{
    let prefix_len = prefix_byte_len(number);
    match first_byte_from_len(prefix_len) {
        None => writer.write_all(&[number as u8])?,
        Some(prefix) => {
            let body = number.to_le_bytes();
            writer.write_all(&[prefix])?;
            writer.write_all(&body[..prefix_len as usize - 1])?;
        }
    };
    Ok(prefix_len as usize)
}

/// Read a VarInt. Errors on truncated input and on any tagged form wider than its value needs.
pub fn read_compact_int<R>(reader: &mut R) -> SerResult<u64>
where
    R: Read,
{
    let mut prefix = [0u8; 1];
    reader.read_exact(&mut prefix)?;
    let prefix_len = prefix_len_from_first_byte(prefix[0]);
    if prefix_len == 1 {
        return Ok(prefix[0] as u64);
    }

    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf[..prefix_len as usize - 1])?;
    let number = u64::from_le_bytes(buf);
    if prefix_byte_len(number) != prefix_len {
        return Err(SerError::NonMinimalVarInt {
            value: number,
            len: prefix_len,
        });
    }
    Ok(number)
}

/// Write `varint(len) || data`.
pub fn write_var_bytes<W>(writer: &mut W, data: &[u8]) -> SerResult<usize>
where
    W: Write,
{
    let written = write_compact_int(writer, data.len() as u64)?;
    writer.write_all(data)?;
    Ok(written + data.len())
}

/// Read `varint(len) || data`. The declared length is checked against `max` before anything is
/// allocated.
pub fn read_var_bytes<R>(reader: &mut R, max: usize) -> SerResult<Vec<u8>>
where
    R: Read,
{
    let len = read_compact_int(reader)?;
    if len > max as u64 {
        return Err(SerError::LengthExceeded {
            got: len,
            max: max as u64,
        });
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// The serialized length of a length-prefixed blob of `len` bytes.
pub fn var_bytes_len(len: usize) -> usize {
    prefix_byte_len(len as u64) as usize + len
}

/// A simple trait for deserializing from `std::io::Read` and serializing to `std::io::Write`.
///
/// `ByteFormat` is used for txid calculation, the signing pre-image, and transaction
/// serialization and deserialization.
pub trait ByteFormat {
    /// An associated error type
    type Error: From<SerError> + From<IOError> + std::error::Error;

    /// Returns the byte-length of the serialized data structure.
    fn serialized_length(&self) -> usize;

    /// Convenience function for reading a u8
    fn read_u8<R>(reader: &mut R) -> SerResult<u8>
    where
        R: Read,
    {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Convenience function for reading a LE u16
    fn read_u16_le<R>(reader: &mut R) -> SerResult<u16>
    where
        R: Read,
    {
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Convenience function for reading a LE u32
    fn read_u32_le<R>(reader: &mut R) -> SerResult<u32>
    where
        R: Read,
    {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Convenience function for reading a LE i64
    fn read_i64_le<R>(reader: &mut R) -> SerResult<i64>
    where
        R: Read,
    {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Convenience function for writing a u8
    fn write_u8<W>(writer: &mut W, number: u8) -> SerResult<usize>
    where
        W: Write,
    {
        writer.write_all(&[number])?;
        Ok(1)
    }

    /// Convenience function for writing a LE u16
    fn write_u16_le<W>(writer: &mut W, number: u16) -> SerResult<usize>
    where
        W: Write,
    {
        writer.write_all(&number.to_le_bytes())?;
        Ok(2)
    }

    /// Convenience function for writing a LE u32
    fn write_u32_le<W>(writer: &mut W, number: u32) -> SerResult<usize>
    where
        W: Write,
    {
        writer.write_all(&number.to_le_bytes())?;
        Ok(4)
    }

    /// Convenience function for writing a LE i64
    fn write_i64_le<W>(writer: &mut W, number: i64) -> SerResult<usize>
    where
        W: Write,
    {
        writer.write_all(&number.to_le_bytes())?;
        Ok(8)
    }

    /// Read a VarInt-prefixed vector of `ByteFormat` items. At most `max` items are accepted.
    fn read_prefix_vec<R, I>(reader: &mut R, max: usize) -> Result<Vec<I>, Self::Error>
    where
        R: Read,
        I: ByteFormat,
        Self::Error: From<I::Error>,
    {
        let count = read_compact_int(reader)?;
        if count > max as u64 {
            return Err(SerError::LengthExceeded {
                got: count,
                max: max as u64,
            }
            .into());
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(I::read_from(reader, 0)?);
        }
        Ok(items)
    }

    /// Write a VarInt-prefixed vector of `ByteFormat` items.
    fn write_prefix_vec<W, I>(writer: &mut W, items: &[I]) -> Result<usize, Self::Error>
    where
        W: Write,
        I: ByteFormat,
        Self::Error: From<I::Error>,
    {
        let mut written = write_compact_int(writer, items.len() as u64)?;
        for item in items {
            written += item.write_to(writer)?;
        }
        Ok(written)
    }

    /// The serialized length of a VarInt-prefixed vector of items.
    fn prefix_vec_len<I>(items: &[I]) -> usize
    where
        I: ByteFormat,
    {
        let body: usize = items.iter().map(ByteFormat::serialized_length).sum();
        prefix_byte_len(items.len() as u64) as usize + body
    }

    /// Deserializes an instance of `Self` from a `std::io::Read`.
    /// The `limit` argument bounds the length of variable-size types. 0 means the type's own
    /// default maximum.
    fn read_from<R>(reader: &mut R, limit: usize) -> Result<Self, Self::Error>
    where
        R: Read,
        Self: std::marker::Sized;

    /// Serializes `Self` to a `std::io::Write`. Following `Write` trait conventions, its `Ok`
    /// type is a `usize` denoting the number of bytes written.
    fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
    where
        W: Write;

    /// Decodes a hex string to a `Vec<u8>`, deserializes an instance of `Self` from that vector.
    /// Fails if any bytes remain after the structure.
    fn deserialize_hex(s: &str) -> Result<Self, Self::Error>
    where
        Self: std::marker::Sized,
    {
        let v: Vec<u8> = hex::decode(s).map_err(SerError::from)?;
        Self::from_bytes(&v)
    }

    /// Deserializes an instance of `Self` from a byte slice. Fails if any bytes remain after the
    /// structure.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>
    where
        Self: std::marker::Sized,
    {
        let mut cursor = Cursor::new(bytes);
        let result = Self::read_from(&mut cursor, 0)?;
        let remaining = bytes.len() - cursor.position() as usize;
        if remaining != 0 {
            return Err(SerError::TrailingBytes(remaining).into());
        }
        Ok(result)
    }

    /// Serializes `self` to a new vector.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        let mut v: Vec<u8> = Vec::with_capacity(self.serialized_length());
        self.write_to(&mut v)?;
        Ok(v)
    }

    /// Serializes `self` to a vector, returns the hex-encoded vector
    fn serialize_hex(&self) -> Result<String, Self::Error> {
        Ok(hex::encode(self.to_bytes()?))
    }
}
