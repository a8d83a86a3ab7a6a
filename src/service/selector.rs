use crate::config::{keys, ConfigSource, ProviderSettings};
use crate::provider::{LlmProvider, ProviderRegistry};
use crate::Result;
use arc_swap::ArcSwapOption;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The live provider instance and the name it was built from.
pub struct ActiveProvider {
    name: String,
    generation: u64,
    provider: Arc<dyn LlmProvider>,
}

impl ActiveProvider {
    /// Configured `LLMProvider` value this instance was created for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selector generation at creation time.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }
}

impl fmt::Debug for ActiveProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveProvider")
            .field("name", &self.name)
            .field("generation", &self.generation)
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Tracks the configured provider name and owns the matching instance.
///
/// Resolution re-reads `LLMProvider` on every call, so missed configuration
/// change events are picked up by the next dispatch. The generation counter
/// moves whenever the instance is (re)built or cleared; anything derived from
/// an older generation is stale.
pub struct ProviderSelector {
    registry: ProviderRegistry,
    config: Arc<dyn ConfigSource>,
    active: ArcSwapOption<ActiveProvider>,
    last_name: ArcSwapOption<String>,
    generation: AtomicU64,
}

impl ProviderSelector {
    pub fn new(registry: ProviderRegistry, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            registry,
            config,
            active: ArcSwapOption::empty(),
            last_name: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
        }
    }

    /// Bring the active instance in line with the configured provider name.
    ///
    /// Construction failures (unknown name, missing factory, bad settings) are
    /// logged and leave no active instance; only configuration read errors
    /// are returned.
    pub async fn resolve(&self) -> Result<Option<Arc<ActiveProvider>>> {
        let Some(name) = self.config.get_string(keys::LLM_PROVIDER).await? else {
            let had_name = self.last_name.swap(None).is_some();
            let had_instance = self.active.swap(None).is_some();
            if had_name || had_instance {
                self.generation.fetch_add(1, Ordering::SeqCst);
                info!("LLM provider unset, active provider cleared");
            }
            return Ok(None);
        };

        let unchanged = self
            .last_name
            .load_full()
            .map(|last| last.as_str() == name)
            .unwrap_or(false);
        if unchanged {
            if let Some(active) = self.active.load_full() {
                debug!(provider = %name, "LLM provider unchanged");
                return Ok(Some(active));
            }
        }

        self.last_name.store(Some(Arc::new(name.clone())));
        self.active.store(None);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match self.instantiate(&name).await {
            Ok(provider) => {
                info!(
                    provider = %name,
                    generation,
                    capabilities = provider.capabilities().len(),
                    "LLM provider activated"
                );
                let active = Arc::new(ActiveProvider {
                    name,
                    generation,
                    provider,
                });
                self.active.store(Some(active.clone()));
                Ok(Some(active))
            }
            Err(err) => {
                warn!(provider = %name, error = %err, "failed to instantiate LLM provider");
                Ok(None)
            }
        }
    }

    async fn instantiate(&self, name: &str) -> Result<Arc<dyn LlmProvider>> {
        let settings = ProviderSettings::load(self.config.as_ref()).await?;
        self.registry.instantiate(name, &settings).await
    }

    /// Active instance as of the last resolution, without re-reading configuration.
    pub fn active(&self) -> Option<Arc<ActiveProvider>> {
        self.active.load_full()
    }

    /// Provider name recorded by the last resolution.
    pub fn last_name(&self) -> Option<String> {
        self.last_name.load_full().map(|name| name.as_ref().clone())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

impl fmt::Debug for ProviderSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSelector")
            .field("last_name", &self.last_name())
            .field("generation", &self.generation())
            .field("active", &self.active())
            .finish()
    }
}
