//! The JSON-RPC envelope node responses arrive in. Transport is left to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bhp_core::Fixed8;

use crate::{error::TxError, script::ContractParameterType};

/// The error member of a JSON-RPC response
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    /// The error code
    pub code: i64,
    /// A short description
    pub message: String,
    /// Anything else the node attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<RpcError> for TxError {
    fn from(e: RpcError) -> Self {
        TxError::Client(e.to_string())
    }
}

/// A JSON-RPC 2.0 response carrying a `T` on success.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    /// Always "2.0"
    pub jsonrpc: String,
    /// The id of the request this answers
    pub id: serde_json::Value,
    /// Present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl<T> Response<T> {
    /// The result, or the error the node sent. A response with neither is reported as an
    /// internal error.
    pub fn into_result(self) -> Result<T, RpcError> {
        match (self.result, self.error) {
            (_, Some(e)) => Err(e),
            (Some(r), None) => Ok(r),
            (None, None) => Err(RpcError {
                code: -32603,
                message: "response has neither result nor error".to_owned(),
                data: None,
            }),
        }
    }
}

/// One item left on the AVM stack by a test invocation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackItem {
    /// The item's type
    #[serde(rename = "type")]
    pub item_type: ContractParameterType,
    /// The item's value, shaped by its type
    #[serde(default)]
    pub value: serde_json::Value,
}

/// The result of running a script on a node without persisting it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    /// The script that ran, hex-encoded
    pub script: String,
    /// The final VM state, e.g. `HALT` or `FAULT`
    pub state: String,
    /// GAS the run consumed
    pub gas_consumed: Fixed8,
    /// The evaluation stack after the run
    #[serde(default)]
    pub stack: Vec<StackItem>,
}

impl InvocationResult {
    /// True if the VM halted with a fault
    pub fn has_faulted(&self) -> bool {
        self.state.contains("FAULT")
    }
}

/// The response to `invokescript` and `invokefunction`
pub type InvocationResponse = Response<InvocationResult>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_reads_invocation_results() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "script": "00c1046e616d6567",
                "state": "HALT, BREAK",
                "gas_consumed": "0.126",
                "stack": [{ "type": "ByteArray", "value": "4e454f" }]
            }
        }"#;
        let response: InvocationResponse = serde_json::from_str(json).unwrap();
        let result = response.into_result().unwrap();
        assert!(!result.has_faulted());
        assert_eq!(result.gas_consumed, "0.126".parse().unwrap());
        assert_eq!(result.stack[0].item_type, ContractParameterType::ByteArray);
        assert_eq!(result.stack[0].value, "4e454f");
    }

    #[test]
    fn it_surfaces_node_errors() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": "a",
            "error": { "code": -500, "message": "Block or transaction already exists" }
        }"#;
        let response: Response<bool> = serde_json::from_str(json).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.code, -500);
        assert!(matches!(TxError::from(err), TxError::Client(m) if m.contains("already exists")));
    }

    #[test]
    fn it_reports_empty_responses() {
        let response: Response<bool> =
            serde_json::from_str(r#"{ "jsonrpc": "2.0", "id": 3 }"#).unwrap();
        assert_eq!(response.into_result().unwrap_err().code, -32603);
    }
}
