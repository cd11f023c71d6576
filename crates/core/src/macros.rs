//! Useful macros for implementing wire types

#[macro_export]
/// Implement `serde::Serialize` and `serde::Deserialize` by passing through to the hex
/// serialization of the wire form.
macro_rules! impl_hex_serde {
    ($item:ty) => {
        impl $crate::__serde::Serialize for $item {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                let s = $crate::ser::ByteFormat::serialize_hex(self)
                    .map_err(|e| $crate::__serde::ser::Error::custom(e.to_string()))?;
                serializer.serialize_str(&s)
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $item {
            fn deserialize<D>(deserializer: D) -> Result<$item, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let s: String = $crate::__serde::Deserialize::deserialize(deserializer)?;
                <$item as $crate::ser::ByteFormat>::deserialize_hex(&s)
                    .map_err(|e| $crate::__serde::de::Error::custom(e.to_string()))
            }
        }
    };
}

#[macro_export]
/// Wrap a length-prefixed vector of bytes (`u8`) in a newtype, and implement convenience
/// functions for it. `$max` bounds the length accepted when deserializing.
macro_rules! wrap_prefixed_byte_vector {
    (
        $(#[$outer:meta])*
        $wrapper_name:ident, $max:expr
    ) => {
        $(#[$outer])*
        #[derive(Clone, Debug, Eq, PartialEq, Default, Hash, PartialOrd, Ord)]
        pub struct $wrapper_name(Vec<u8>);

        impl $crate::ser::ByteFormat for $wrapper_name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                $crate::ser::var_bytes_len(self.len())
            }

            fn read_from<R>(reader: &mut R, limit: usize) -> Result<Self, Self::Error>
            where
                R: std::io::Read,
            {
                let max = if limit == 0 { $max } else { limit };
                Ok(Self($crate::ser::read_var_bytes(reader, max)?))
            }

            fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
            where
                W: std::io::Write,
            {
                $crate::ser::write_var_bytes(writer, &self.0)
            }
        }

        $crate::impl_hex_serde!($wrapper_name);

        impl std::convert::AsRef<[u8]> for $wrapper_name {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }

        impl $wrapper_name {
            /// Instantate a new wrapped vector
            pub fn new(v: Vec<u8>) -> Self {
                Self(v)
            }

            /// Construct an empty wrapped vector instance.
            pub fn null() -> Self {
                Self(vec![])
            }

            /// Return a reference to the underlying bytes
            pub fn items(&self) -> &[u8] {
                &self.0
            }

            /// Return the length of the item vector.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Return true if the length of the item vector is 0.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Determine the byte-length of the vector length prefix
            pub fn len_prefix(&self) -> u8 {
                $crate::ser::prefix_byte_len(self.len() as u64)
            }

            /// Consume the wrapper, returning the underlying bytes
            pub fn into_inner(self) -> Vec<u8> {
                self.0
            }
        }

        impl From<&[u8]> for $wrapper_name {
            fn from(v: &[u8]) -> Self {
                Self(v.to_vec())
            }
        }

        impl From<Vec<u8>> for $wrapper_name {
            fn from(v: Vec<u8>) -> Self {
                Self(v)
            }
        }
    };
}

#[macro_export]
/// Define a fixed-width digest newtype. The bytes are held in wire (little-endian) order. The
/// human-readable form, used by `Display`, `FromStr` and serde, is the byte-reversed hex string.
macro_rules! marked_digest {
    (
        $(#[$outer:meta])*
        $marked_name:ident, $len:expr
    ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $marked_name([u8; $len]);

        impl $marked_name {
            /// The width of the digest in bytes
            pub const LEN: usize = $len;

            /// Wrap bytes given in wire (little-endian) order
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Wrap a slice given in wire order. Errors if the slice has the wrong width.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, $crate::ser::SerError> {
                let buf: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| $crate::ser::SerError::InvalidLength {
                            expected: $len,
                            got: bytes.len(),
                        })?;
                Ok(Self(buf))
            }

            /// Parse the byte-reversed hex form printed by explorers and the node RPC.
            /// A leading `0x` is accepted.
            pub fn from_be_hex(s: &str) -> Result<Self, $crate::ser::SerError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let mut bytes = $crate::__hex::decode(s)?;
                bytes.reverse();
                Self::from_slice(&bytes)
            }

            /// The byte-reversed hex form
            pub fn to_be_hex(&self) -> String {
                let mut bytes = self.0;
                bytes.reverse();
                $crate::__hex::encode(bytes)
            }

            /// The bytes in wire order
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// The bytes in wire order, by value
            pub fn to_array(&self) -> [u8; $len] {
                self.0
            }
        }

        impl AsRef<[u8]> for $marked_name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $marked_name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl std::fmt::Display for $marked_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_be_hex())
            }
        }

        impl std::str::FromStr for $marked_name {
            type Err = $crate::ser::SerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_be_hex(s)
            }
        }

        impl $crate::ser::ByteFormat for $marked_name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                $len
            }

            fn read_from<R>(reader: &mut R, _limit: usize) -> Result<Self, Self::Error>
            where
                R: std::io::Read,
            {
                let mut buf = [0u8; $len];
                reader.read_exact(&mut buf)?;
                Ok(Self(buf))
            }

            fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
            where
                W: std::io::Write,
            {
                writer.write_all(&self.0)?;
                Ok($len)
            }
        }

        impl $crate::__serde::Serialize for $marked_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str(&self.to_be_hex())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $marked_name {
            fn deserialize<D>(deserializer: D) -> Result<$marked_name, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let s: String = $crate::__serde::Deserialize::deserialize(deserializer)?;
                Self::from_be_hex(&s).map_err(|e| $crate::__serde::de::Error::custom(e.to_string()))
            }
        }
    };
}
