//! Provider contract and built-in provider variants.
//!
//! Every backend is reached through [`LlmProvider`]. A provider states which
//! capabilities it implements via [`LlmProvider::capabilities`]; asking it for
//! anything else yields [`Error::Unsupported`](crate::Error::Unsupported).
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Capability`] / [`CapabilitySet`] | Named operations and per-provider declarations |
//! | [`CapabilityRequest`] | A capability call with typed arguments |
//! | [`ProviderKind`] | Closed set of variants decoded from `LLMProvider` |
//! | [`ProviderRegistry`] | Kind to factory mapping |
//! | [`AlitaProvider`] | REST backend implementing the full contract |
//! | [`OpenAiProvider`] | OpenAI-compatible chat completions |

pub mod alita;
mod capability;
mod http;
pub mod openai;
mod registry;

pub use alita::{AlitaFactory, AlitaProvider};
pub use capability::{Capability, CapabilityRequest, CapabilitySet, PredictRequest, PromptQuery};
pub use openai::{OpenAiFactory, OpenAiProvider};
pub use registry::{ProviderFactory, ProviderKind, ProviderRegistry};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A pluggable backend exposing a subset of the capability contract.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Display name, used in logs and errors.
    fn name(&self) -> &str;

    /// Capabilities this provider implements.
    fn capabilities(&self) -> CapabilitySet;

    /// Execute one capability call. Results are opaque to the caller's dispatcher.
    async fn invoke(&self, request: CapabilityRequest) -> Result<Value>;

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}
