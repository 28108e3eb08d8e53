//! Wrapping of a block's calls through forwarder apps
//!
//! A calls script is the EVMScript format with spec id 1: the 4-byte spec id
//! followed by, per call, the 20-byte target, the calldata length as a 4-byte
//! big-endian integer and the calldata itself.

use ethabi::{encode, Token};

use daoscript_common::{selector, Action, Address, CallAction, ScriptEncodedAction};

use super::error::{DaoError, Result};

const CALLS_SCRIPT_ID: [u8; 4] = [0, 0, 0, 1];

pub fn encode_call_script(calls: &[CallAction]) -> Result<Vec<u8>> {
    let mut script = CALLS_SCRIPT_ID.to_vec();
    for call in calls {
        if call.value != 0 {
            return Err(DaoError::ValueNotForwardable(call.to));
        }
        let length = u32::try_from(call.data.len())
            .map_err(|_| DaoError::CalldataTooLarge(call.data.len()))?;
        script.extend_from_slice(&call.to.0);
        script.extend_from_slice(&length.to_be_bytes());
        script.extend_from_slice(&call.data);
    }
    Ok(script)
}

/// Calldata of `forward(bytes)` carrying `script`
pub fn encode_forward(script: Vec<u8>) -> Vec<u8> {
    let mut data = selector("forward(bytes)").to_vec();
    data.extend(encode(&[Token::Bytes(script)]));
    data
}

/// A forwarder app as named in the script
#[derive(Debug, Clone, PartialEq)]
pub struct Forwarder {
    pub label: String,
    pub address: Address,
}

/// Nest `calls` through `forwarders`, outermost first. The innermost
/// forwarder receives the calls; each outer one forwards to the next.
pub fn wrap(calls: &[CallAction], forwarders: &[Forwarder]) -> Result<Option<ScriptEncodedAction>> {
    let Some((innermost, outer)) = forwarders.split_last() else {
        return Ok(None);
    };

    let mut action = CallAction::new(innermost.address, encode_forward(encode_call_script(calls)?));
    for forwarder in outer.iter().rev() {
        let script = encode_call_script(std::slice::from_ref(&action))?;
        action = CallAction::new(forwarder.address, encode_forward(script));
    }

    Ok(Some(ScriptEncodedAction {
        action,
        forwarder_path: forwarders.iter().map(|f| f.label.clone()).collect(),
    }))
}

/// Route a block's actions through its forwarders. Provider actions are kept
/// in order ahead of the single wrapped action.
pub fn forward_actions(actions: Vec<Action>, forwarders: &[Forwarder]) -> Result<Vec<Action>> {
    if forwarders.is_empty() {
        return Ok(actions);
    }

    let mut passthrough = Vec::new();
    let mut calls = Vec::new();
    for action in actions {
        match action {
            Action::Provider(_) => passthrough.push(action),
            Action::Call(call) => calls.push(call),
            Action::Encoded(encoded) => calls.push(encoded.action),
        }
    }

    if !calls.is_empty() {
        if let Some(encoded) = wrap(&calls, forwarders)? {
            passthrough.push(Action::Encoded(encoded));
        }
    }
    Ok(passthrough)
}
