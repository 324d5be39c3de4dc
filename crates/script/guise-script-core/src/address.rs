use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BridgeError;

/// Name of a message endpoint (a GUI component or something on the external
/// bus). Resolution from name to instance happens in the runtime or the bus.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Non-empty, no whitespace or control characters.
    pub fn new(s: impl Into<String>) -> Result<Self, BridgeError> {
        let s = s.into();
        let reason = if s.is_empty() {
            Some("empty")
        } else if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("contains whitespace")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(BridgeError::InvalidAddress { address: s, reason }),
            None => Ok(Self(s)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = BridgeError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::new(s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl std::borrow::Borrow<str> for Address {
    fn borrow(&self) -> &str {
        &self.0
    }
}
