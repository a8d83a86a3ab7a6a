//! # ai-provider-hub
//!
//! Provider selection and capability dispatch for editor-side AI assistants.
//!
//! ## Overview
//!
//! A host (editor extension, CLI) talks to one of several interchangeable AI
//! backends through a single stable interface. The active backend is chosen by
//! the `LLMProvider` configuration value and may change at any time; the
//! service notices on the next call and swaps the provider instance.
//!
//! - **Self-healing selection**: configuration is re-read before every dispatch
//! - **Declared capabilities**: each provider states what it implements; the rest degrade to a message
//! - **Masked failures**: callers always get a result or a fallback string, details go to a [`notify::Notifier`]
//! - **Integration catalog**: cached, generation-tagged list of backend integrations and their models
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_provider_hub::config::{keys, MemoryConfig};
//! use ai_provider_hub::provider::PromptQuery;
//! use ai_provider_hub::ProviderService;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ai_provider_hub::Result<()> {
//!     let config = MemoryConfig::new()
//!         .with(keys::LLM_PROVIDER, "Alita")
//!         .with(keys::SERVER_URL, "https://alita.example.com")
//!         .with(keys::PROJECT_ID, "12");
//!     let service = ProviderService::new(Arc::new(config));
//!
//!     let prompts = service.get_prompts(PromptQuery::page(0)).await;
//!     println!("{}", prompts);
//!
//!     for choice in service.list_model_names().await? {
//!         println!("{}", choice.label());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`service`] | Provider selector, dispatcher and catalog operations |
//! | [`provider`] | Capability contract, provider registry and built-in providers |
//! | [`catalog`] | Integration records, snapshots and model choices |
//! | [`config`] | Configuration source trait and backends |
//! | [`notify`] | Failure notification sinks |

pub mod catalog;
pub mod config;
pub mod notify;
pub mod provider;
pub mod service;

// Re-export main types for convenience
pub use catalog::{CatalogSnapshot, ModelChoice, SelectedModel};
pub use provider::{Capability, CapabilityRequest, LlmProvider, ProviderKind};
pub use service::{DispatchOutcome, ProviderService, ProviderServiceBuilder};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
