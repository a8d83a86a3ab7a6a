//! Provider selection and capability dispatch.
//!
//! [`ProviderService`] is the context object hosts construct once and share.
//! Every call first runs [`ProviderSelector::resolve`], which re-reads
//! `LLMProvider` and swaps the provider instance if the name changed, then
//! forwards to the active provider.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ProviderSelector`] | Active provider name, instance and generation |
//! | [`ProviderService`] | Dispatcher, prediction path and catalog operations |
//! | [`DispatchOutcome`] | Result, unsupported message or masked failure |

mod catalog;
mod dispatcher;
mod outcome;
mod selector;

pub use dispatcher::{ProviderService, ProviderServiceBuilder, DEFAULT_TAG};
pub use outcome::{DispatchOutcome, CONFIGURE_PROVIDER_FALLBACK};
pub use selector::{ActiveProvider, ProviderSelector};
