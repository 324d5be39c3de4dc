//! Script-facing errors.
//!
//! `BridgeError` is the taxonomy; `ScriptError` wraps it with the source
//! location of the script call that failed, which is what hooks return.

use std::fmt;
use std::panic::Location;

use guise_scene_core::SceneError;

use crate::address::Address;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BridgeError {
    /// Node store or scheduler rejected the operation
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Restricted namespace requested from a GUI script
    #[error("capability '{capability}' is not available to GUI scripts")]
    CapabilityDenied { capability: String },

    /// Script API called while the component is not dispatching a frame
    #[error("'{operation}' called outside the frame dispatch window")]
    NotInFrame { operation: &'static str },

    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: &'static str },

    #[error("no component registered at '{address}'")]
    UnknownComponent { address: Address },

    #[error("a component is already registered at '{address}'")]
    AddressInUse { address: Address },

    /// Failure raised by script code itself
    #[error("{0}")]
    Handler(String),
}

impl BridgeError {
    /// Only node allocation exhaustion is unrecoverable.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Scene(e) if e.is_fatal())
    }

    /// Short error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Scene(e) => e.category(),
            Self::CapabilityDenied { .. } => "capability",
            Self::NotInFrame { .. } => "frame",
            Self::InvalidAddress { .. }
            | Self::UnknownComponent { .. }
            | Self::AddressInUse { .. } => "address",
            Self::Handler(_) => "handler",
        }
    }
}

/// A `BridgeError` plus the call site that produced it.
///
/// Constructors and `From` conversions are `#[track_caller]`, so `?` inside a
/// hook records the line of the failing call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    error: BridgeError,
    location: &'static Location<'static>,
}

impl ScriptError {
    #[track_caller]
    pub fn new(error: impl Into<BridgeError>) -> Self {
        Self {
            error: error.into(),
            location: Location::caller(),
        }
    }

    /// Failure raised by script logic rather than by the bridge.
    #[track_caller]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(BridgeError::Handler(message.into()))
    }

    pub fn error(&self) -> &BridgeError {
        &self.error
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub fn into_inner(self) -> BridgeError {
        self.error
    }

    pub fn is_fatal(&self) -> bool {
        self.error.is_fatal()
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.error, self.location)
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<BridgeError> for ScriptError {
    #[track_caller]
    fn from(error: BridgeError) -> Self {
        Self::new(error)
    }
}

impl From<SceneError> for ScriptError {
    #[track_caller]
    fn from(error: SceneError) -> Self {
        Self::new(error)
    }
}

/// Unrecoverable condition surfaced to the host by `Runtime::tick`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("component '{address}' cannot continue: {source}")]
pub struct FatalError {
    pub address: Address,
    #[source]
    pub source: SceneError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> Result<(), SceneError> {
        Err(SceneError::NotFound { id: "x".into() })
    }

    fn fails() -> Result<(), ScriptError> {
        lookup()?;
        Ok(())
    }

    #[test]
    fn question_mark_records_call_site() {
        let err = fails().unwrap_err();
        assert!(err.location().file().ends_with("error.rs"));
        assert_eq!(err.error().category(), "id");
        assert!(err.to_string().contains("no node with id 'x'"));
        assert!(err.to_string().contains("error.rs:"));
    }

    #[test]
    fn fatal_only_for_exhaustion() {
        let err = BridgeError::from(SceneError::ResourceExhausted {
            requested: 1,
            live: 1,
            limit: 1,
        });
        assert!(err.is_fatal());
        assert!(!BridgeError::CapabilityDenied {
            capability: "entities".into()
        }
        .is_fatal());
    }
}
