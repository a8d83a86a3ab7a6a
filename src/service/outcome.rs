use crate::provider::Capability;
use crate::{Error, ErrorContext, Result};
use serde_json::Value;
use std::fmt;

/// Returned for every failure of a resolved call, whatever the cause.
pub const CONFIGURE_PROVIDER_FALLBACK: &str = "You need to configure LLM Provider first";

const NOT_SUPPORTED_SUFFIX: &str = "not supported by this LLM Provider";

/// Result of a dispatched capability call.
///
/// Dispatch never fails: the two degraded variants carry the fallback strings
/// callers show to the user. Use [`into_value`](Self::into_value) when only the
/// plain "result or message" shape is needed.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Provider result, unchanged.
    Completed(Value),
    /// No active provider, or the active provider lacks the capability.
    Unsupported(String),
    /// The call was attempted and failed; details went to the notifier.
    Failed(String),
}

impl DispatchOutcome {
    pub fn unsupported(capability: Capability) -> Self {
        Self::Unsupported(format!(
            "{} {}",
            capability.description(),
            NOT_SUPPORTED_SUFFIX
        ))
    }

    pub fn failed() -> Self {
        Self::Failed(CONFIGURE_PROVIDER_FALLBACK.to_string())
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Fallback message for the degraded variants.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Unsupported(message) | Self::Failed(message) => Some(message),
        }
    }

    /// Collapse to the provider result or the fallback string.
    pub fn into_value(self) -> Value {
        match self {
            Self::Completed(value) => value,
            Self::Unsupported(message) | Self::Failed(message) => Value::String(message),
        }
    }

    /// Treat the degraded variants as errors.
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Unsupported(message) | Self::Failed(message) => Err(Error::runtime_with_context(
                message,
                ErrorContext::new().with_source("dispatch"),
            )),
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(Value::String(text)) => f.write_str(text),
            Self::Completed(value) => write!(f, "{}", value),
            Self::Unsupported(message) | Self::Failed(message) => f.write_str(message),
        }
    }
}
