use serde::{Deserialize, Serialize};

use crate::address::Address;

/// An addressed payload. The payload is opaque to the bridge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Address,
    pub receiver: Address,
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Message {
    pub fn new(
        sender: Address,
        receiver: Address,
        kind: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            sender,
            receiver,
            kind: kind.into(),
            payload,
        }
    }
}
