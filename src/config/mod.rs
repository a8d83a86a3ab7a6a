//! Configuration source consumed by the provider selector.
//!
//! The editor owns the real settings store; the core only needs to read the
//! active provider name plus the provider-specific settings, and to write back
//! the model selection. [`ConfigSource`] is that seam.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ConfigSource`] | Async key/value store trait |
//! | [`MemoryConfig`] | In-process store for embedding and tests |
//! | [`FileConfig`] | JSON/YAML settings file, re-read on every access |
//! | [`ProviderSettings`] | Snapshot of the settings a provider is built from |

mod settings;
pub(crate) mod source;

pub use settings::{keys, ProviderSettings};
pub use source::{ConfigSource, FileConfig, FileFormat, MemoryConfig};
