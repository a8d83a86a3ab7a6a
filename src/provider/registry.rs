//! Provider registry: the closed set of provider variants and their factories.

use super::alita::AlitaFactory;
use super::openai::OpenAiFactory;
use super::LlmProvider;
use crate::config::ProviderSettings;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Provider variants selectable through the `LLMProvider` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    Alita,
    #[serde(rename = "OpenAI")]
    OpenAi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Alita, ProviderKind::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Alita => "Alita",
            ProviderKind::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        ProviderKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownProvider {
                name: trimmed.to_string(),
            })
    }
}

/// Builds a provider instance from the current settings.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>>;
}

#[async_trait]
impl<F> ProviderFactory for F
where
    F: Fn(&ProviderSettings) -> Result<Arc<dyn LlmProvider>> + Send + Sync,
{
    async fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>> {
        self(settings)
    }
}

/// Maps each [`ProviderKind`] to the factory that instantiates it.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<ProviderKind, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Empty registry; every selection fails with `UnregisteredProvider`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Alita and OpenAI providers.
    pub fn with_defaults() -> Self {
        Self::new()
            .with(ProviderKind::Alita, AlitaFactory)
            .with(ProviderKind::OpenAi, OpenAiFactory)
    }

    /// Register (or replace) the factory for `kind`.
    pub fn with(mut self, kind: ProviderKind, factory: impl ProviderFactory + 'static) -> Self {
        self.register(kind, Arc::new(factory));
        self
    }

    pub fn register(&mut self, kind: ProviderKind, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(kind, factory);
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|k| self.contains(*k))
            .collect()
    }

    /// Decode `name`, look up its factory and build an instance.
    pub async fn instantiate(
        &self,
        name: &str,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn LlmProvider>> {
        let kind: ProviderKind = name.parse()?;
        let factory = self
            .factories
            .get(&kind)
            .cloned()
            .ok_or_else(|| Error::UnregisteredProvider {
                name: kind.to_string(),
            })?;
        factory.create(settings).await
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
