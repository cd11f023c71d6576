//! Contract parameter types, deployment metadata and the scripts that deploy and invoke
//! contracts.

use serde::{Deserialize, Serialize};

use bhp_core::{Fixed8, ScriptHash, SerError};
use bhp_keys::PublicKey;

use crate::script::{OpCode, ScriptBuilder};

/// The interop service that registers a new contract
pub const CONTRACT_CREATE: &str = "Neo.Contract.Create";

/// The type tags contracts declare for their parameters and return value.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ContractParameterType {
    /// A 64-byte signature
    Signature = 0x00,
    /// `true` or `false`
    Boolean = 0x01,
    /// An arbitrary-width integer
    Integer = 0x02,
    /// A 20-byte hash
    Hash160 = 0x03,
    /// A 32-byte hash
    Hash256 = 0x04,
    /// Raw bytes
    ByteArray = 0x05,
    /// A compressed public key
    PublicKey = 0x06,
    /// A UTF-8 string
    String = 0x07,
    /// An array of parameters
    Array = 0x10,
    /// An opaque handle to an interop object
    InteropInterface = 0xf0,
    /// No value
    #[default]
    Void = 0xff,
}

impl ContractParameterType {
    /// The tag byte
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ContractParameterType {
    type Error = SerError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        use ContractParameterType::*;
        let t = match tag {
            0x00 => Signature,
            0x01 => Boolean,
            0x02 => Integer,
            0x03 => Hash160,
            0x04 => Hash256,
            0x05 => ByteArray,
            0x06 => PublicKey,
            0x07 => String,
            0x10 => Array,
            0xf0 => InteropInterface,
            0xff => Void,
            _ => {
                return Err(SerError::UnknownTag {
                    kind: "contract parameter type",
                    tag,
                })
            }
        };
        Ok(t)
    }
}

/// Capabilities a contract requests at deployment. Storage and dynamic invocation cost extra
/// system fee; payable does not.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractProperties {
    /// The contract uses persistent storage
    pub needs_storage: bool,
    /// The contract calls other contracts by a runtime-computed hash
    pub needs_dynamic_invoke: bool,
    /// The contract accepts asset transfers
    pub is_payable: bool,
}

impl ContractProperties {
    /// Bit for `needs_storage`
    pub const STORAGE: u8 = 0x01;
    /// Bit for `needs_dynamic_invoke`
    pub const DYNAMIC_INVOKE: u8 = 0x02;
    /// Bit for `is_payable`
    pub const PAYABLE: u8 = 0x04;

    /// The flag byte pushed by a deployment script
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.needs_storage {
            bits |= Self::STORAGE;
        }
        if self.needs_dynamic_invoke {
            bits |= Self::DYNAMIC_INVOKE;
        }
        if self.is_payable {
            bits |= Self::PAYABLE;
        }
        bits
    }

    /// Read the flags back out of a byte. Unknown bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            needs_storage: bits & Self::STORAGE != 0,
            needs_dynamic_invoke: bits & Self::DYNAMIC_INVOKE != 0,
            is_payable: bits & Self::PAYABLE != 0,
        }
    }
}

/// An argument to a contract invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContractParameter {
    /// A 64-byte `r || s` signature
    Signature(Vec<u8>),
    /// A boolean
    Boolean(bool),
    /// An integer
    Integer(i64),
    /// A script hash, pushed in wire order
    Hash160(ScriptHash),
    /// A 32-byte hash, in wire order
    Hash256([u8; 32]),
    /// Raw bytes
    ByteArray(Vec<u8>),
    /// A public key, pushed compressed
    PublicKey(PublicKey),
    /// A string, pushed as UTF-8
    String(String),
    /// Nested parameters, packed into one array
    Array(Vec<ContractParameter>),
}

impl ContractParameter {
    /// The declared type of this argument
    pub fn param_type(&self) -> ContractParameterType {
        match self {
            ContractParameter::Signature(_) => ContractParameterType::Signature,
            ContractParameter::Boolean(_) => ContractParameterType::Boolean,
            ContractParameter::Integer(_) => ContractParameterType::Integer,
            ContractParameter::Hash160(_) => ContractParameterType::Hash160,
            ContractParameter::Hash256(_) => ContractParameterType::Hash256,
            ContractParameter::ByteArray(_) => ContractParameterType::ByteArray,
            ContractParameter::PublicKey(_) => ContractParameterType::PublicKey,
            ContractParameter::String(_) => ContractParameterType::String,
            ContractParameter::Array(_) => ContractParameterType::Array,
        }
    }
}

impl ScriptBuilder {
    /// Push one contract argument. Arrays push their items in reverse, then the count, then
    /// `PACK`.
    pub fn push_param(self, param: &ContractParameter) -> Self {
        match param {
            ContractParameter::Signature(b) | ContractParameter::ByteArray(b) => self.push_data(b),
            ContractParameter::Boolean(b) => self.push_bool(*b),
            ContractParameter::Integer(n) => self.push_integer(*n),
            ContractParameter::Hash160(h) => self.push_data(h.as_ref()),
            ContractParameter::Hash256(h) => self.push_data(h),
            ContractParameter::PublicKey(k) => self.push_data(&k.to_compressed()),
            ContractParameter::String(s) => self.push_string(s),
            ContractParameter::Array(items) => self.push_params(items),
        }
    }

    /// Push a list of arguments packed into one array
    pub fn push_params(self, params: &[ContractParameter]) -> Self {
        params
            .iter()
            .rev()
            .fold(self, |sb, p| sb.push_param(p))
            .push_integer(params.len() as i64)
            .op(OpCode::PACK)
    }
}

/// The script that invokes `operation` on a deployed contract with `params`.
pub fn contract_call(
    contract: &ScriptHash,
    operation: &str,
    params: &[ContractParameter],
) -> Vec<u8> {
    ScriptBuilder::new()
        .push_params(params)
        .push_string(operation)
        .app_call(contract)
        .build()
}

/// Everything that goes into a contract deployment. Loadable from JSON, with the AVM as a hex
/// string and the network fee as a decimal string.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContractDeploymentSpec {
    /// The compiled contract
    #[serde(with = "hex_bytes")]
    pub avm: Vec<u8>,
    /// The types of the contract's entry point parameters
    #[serde(default)]
    pub parameters: Vec<ContractParameterType>,
    /// The type the entry point returns
    pub return_type: ContractParameterType,
    /// Requested capabilities
    #[serde(default)]
    pub properties: ContractProperties,
    /// Contract name
    #[serde(default)]
    pub name: String,
    /// Contract version
    #[serde(default)]
    pub version: String,
    /// Author name
    #[serde(default)]
    pub author: String,
    /// Author email
    #[serde(default)]
    pub email: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Network fee paid on top of the system fee
    #[serde(default)]
    pub network_fee: Fixed8,
}

impl ContractDeploymentSpec {
    /// The hash the contract will be reachable at once deployed: `hash160(avm)`
    pub fn contract_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.avm)
    }

    /// The parameter type list as the byte string a deployment pushes
    pub fn parameter_bytes(&self) -> Vec<u8> {
        self.parameters.iter().map(|p| p.byte()).collect()
    }

    /// The deployment script. Pushes description, email, author, version and name, then the
    /// property flags, the return type, the parameter type list and the AVM, then calls
    /// `Neo.Contract.Create`.
    pub fn deployment_script(&self) -> Vec<u8> {
        ScriptBuilder::with_capacity(self.avm.len() + 128)
            .push_string(&self.description)
            .push_string(&self.email)
            .push_string(&self.author)
            .push_string(&self.version)
            .push_string(&self.name)
            .push_integer(self.properties.bits() as i64)
            .push_integer(self.return_type.byte() as i64)
            .push_data(&self.parameter_bytes())
            .push_data(&self.avm)
            .syscall(CONTRACT_CREATE)
            .build()
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn tiny_spec() -> ContractDeploymentSpec {
        ContractDeploymentSpec {
            avm: vec![0x00, 0xc5, 0x6b, 0x61, 0x6c, 0x75, 0x66],
            parameters: vec![ContractParameterType::String, ContractParameterType::Array],
            return_type: ContractParameterType::ByteArray,
            properties: ContractProperties {
                needs_storage: true,
                ..Default::default()
            },
            name: "ico".to_owned(),
            version: "1".to_owned(),
            author: "author".to_owned(),
            email: "email".to_owned(),
            description: "description".to_owned(),
            network_fee: Fixed8::ZERO,
        }
    }

    #[test]
    fn it_combines_property_bits() {
        let cases = [
            ((false, false, false), 0x00),
            ((true, false, false), 0x01),
            ((false, true, false), 0x02),
            ((false, false, true), 0x04),
            ((true, true, true), 0x07),
        ];
        for ((s, d, p), bits) in cases.iter() {
            let props = ContractProperties {
                needs_storage: *s,
                needs_dynamic_invoke: *d,
                is_payable: *p,
            };
            assert_eq!(props.bits(), *bits);
            assert_eq!(ContractProperties::from_bits(*bits), props);
        }
    }

    #[test]
    fn it_writes_deployment_scripts_in_field_order() {
        let script = tiny_spec().deployment_script();
        let expected = concat!(
            "0b6465736372697074696f6e",
            "05656d61696c",
            "06617574686f72",
            "0131",
            "0369636f",
            "51",
            "55",
            "020710",
            "0700c56b616c7566",
            "68134e656f2e436f6e74726163742e437265617465",
        );
        assert_eq!(hex::encode(script), expected);
    }

    #[test]
    fn it_sets_the_property_push() {
        let mut spec = tiny_spec();
        spec.properties = ContractProperties {
            needs_storage: true,
            needs_dynamic_invoke: true,
            is_payable: true,
        };
        let script = spec.deployment_script();
        // description, email, author, version and name take 31 bytes
        assert_eq!(script[31], 0x57);
    }

    #[test]
    fn it_pushes_call_arguments_in_reverse() {
        let hash = ScriptHash::new([0x11; 20]);
        let script = contract_call(
            &hash,
            "transfer",
            &[
                ContractParameter::Integer(1),
                ContractParameter::String("a".to_owned()),
            ],
        );
        let expected = format!(
            "{}{}{}{}{}{}",
            "0161",               // "a"
            "51",                 // 1
            "52c1",               // 2 PACK
            "087472616e73666572", // "transfer"
            "67",
            "11".repeat(20),
        );
        assert_eq!(hex::encode(script), expected);
    }

    #[test]
    fn it_packs_empty_argument_lists() {
        let script = contract_call(&ScriptHash::default(), "name", &[]);
        assert_eq!(hex::encode(&script[..2]), "00c1");
    }

    #[test]
    fn it_reads_specs_from_json() {
        let json = r#"{
            "avm": "0x00c56b616c7566",
            "parameters": ["String", "Array"],
            "return_type": "ByteArray",
            "properties": { "needs_storage": true },
            "name": "ico",
            "version": "1",
            "author": "author",
            "email": "email",
            "description": "description",
            "network_fee": "0"
        }"#;
        let spec: ContractDeploymentSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, tiny_spec());
        assert_eq!(spec.contract_hash(), ScriptHash::from_script(&spec.avm));
    }

    #[test]
    fn it_rejects_unknown_parameter_types() {
        assert!(ContractParameterType::try_from(0x08).is_err());
        assert_eq!(
            ContractParameterType::try_from(0xf0).unwrap(),
            ContractParameterType::InteropInterface
        );
    }

    proptest! {
        #[test]
        fn deployment_scripts_are_deterministic(
            avm in proptest::collection::vec(any::<u8>(), 1..600),
            name in "[a-z]{0,20}",
            bits in 0u8..8,
        ) {
            let spec = ContractDeploymentSpec {
                avm,
                name,
                properties: ContractProperties::from_bits(bits),
                ..tiny_spec()
            };
            prop_assert_eq!(spec.deployment_script(), spec.clone().deployment_script());
        }
    }
}
