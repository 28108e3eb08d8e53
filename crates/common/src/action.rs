//! Actions produced by an interpretation run

use serde::{Deserialize, Serialize};

use crate::types::{hex_bytes, Address};

/// A single contract call: target, calldata and attached value in wei
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallAction {
    pub to: Address,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub value: u128,
}

impl CallAction {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self { to, data, value: 0 }
    }
}

/// A call whose calldata wraps other calls through one or more forwarders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEncodedAction {
    /// Call on the outermost forwarder
    #[serde(flatten)]
    pub action: CallAction,
    /// Forwarders in the order they were written, outermost first
    #[serde(rename = "forwarderPath")]
    pub forwarder_path: Vec<String>,
}

/// An instruction for the wallet provider rather than the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAction {
    pub method: String,
    pub params: Vec<serde_json::Value>,
}

impl ProviderAction {
    /// `wallet_switchEthereumChain` for the given chain id
    pub fn switch_chain(chain_id: u64) -> Self {
        Self {
            method: "wallet_switchEthereumChain".to_string(),
            params: vec![serde_json::json!({ "chainId": format!("0x{:x}", chain_id) })],
        }
    }
}

/// Everything an interpretation run can emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Call(CallAction),
    Encoded(ScriptEncodedAction),
    Provider(ProviderAction),
}

impl Action {
    /// The underlying contract call, if this action targets the chain
    pub fn as_call(&self) -> Option<&CallAction> {
        match self {
            Action::Call(call) => Some(call),
            Action::Encoded(encoded) => Some(&encoded.action),
            Action::Provider(_) => None,
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Action::Provider(_))
    }
}

impl From<CallAction> for Action {
    fn from(call: CallAction) -> Self {
        Action::Call(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_chain_encodes_hex_chain_id() {
        let action = ProviderAction::switch_chain(100);
        assert_eq!(action.method, "wallet_switchEthereumChain");
        assert_eq!(action.params[0]["chainId"], "0x64");
    }

    #[test]
    fn test_call_action_serializes_hex_data() {
        let action = Action::Call(CallAction::new(Address::ZERO, vec![0xde, 0xad]));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "call");
        assert_eq!(json["data"], "0xdead");
        assert_eq!(json["to"], "0x0000000000000000000000000000000000000000");
    }

    #[test]
    fn test_encoded_action_flattens_call() {
        let action = Action::Encoded(ScriptEncodedAction {
            action: CallAction::new(Address::ZERO, vec![0x01]),
            forwarder_path: vec!["voting".to_string()],
        });
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "encoded");
        assert_eq!(json["data"], "0x01");
        assert_eq!(json["forwarderPath"][0], "voting");
    }

    #[test]
    fn test_as_call_skips_provider_actions() {
        assert!(Action::Provider(ProviderAction::switch_chain(1)).as_call().is_none());
    }
}
