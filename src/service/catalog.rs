//! Integration catalog operations and the model-selection workflow.

use super::dispatcher::ProviderService;
use super::outcome::DispatchOutcome;
use crate::catalog::{CatalogSnapshot, ModelChoice, SelectedModel, NO_MODEL_SELECTED};
use crate::config::keys;
use crate::{Error, ErrorContext, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

impl ProviderService {
    /// Fetch the integration catalog through `getEmbeddings` and cache it.
    ///
    /// The new snapshot replaces any cached one. A degraded dispatch or a
    /// malformed payload clears the cache and is returned as an error.
    pub async fn fetch_integrations(&self) -> Result<Arc<CatalogSnapshot>> {
        let outcome = self.get_embeddings().await;
        let generation = self.selector.generation();
        let snapshot = match outcome {
            DispatchOutcome::Completed(payload) => CatalogSnapshot::from_payload(generation, &payload),
            degraded => Err(Error::runtime_with_context(
                degraded.message().unwrap_or_default().to_string(),
                ErrorContext::new().with_source("catalog"),
            )),
        };
        match snapshot {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                info!(
                    integrations = snapshot.len(),
                    generation, "integration catalog refreshed"
                );
                self.catalog.store(Some(snapshot.clone()));
                Ok(snapshot)
            }
            Err(err) => {
                self.catalog.store(None);
                Err(err)
            }
        }
    }

    /// Catalog for lookups. With `use_cached`, the cached snapshot is reused
    /// only if it was fetched for the provider instance that is live now;
    /// otherwise, or when nothing is cached, a fresh fetch runs.
    pub async fn catalog(&self, use_cached: bool) -> Result<Arc<CatalogSnapshot>> {
        if use_cached {
            self.selector.resolve().await?;
            if let Some(cached) = self.catalog.load_full() {
                if cached.generation() == self.selector.generation() {
                    return Ok(cached);
                }
                debug!(
                    cached = cached.generation(),
                    live = self.selector.generation(),
                    "cached integration catalog is stale"
                );
            }
        }
        self.fetch_integrations().await
    }

    /// Last cached snapshot, whatever its generation.
    pub fn cached_catalog(&self) -> Option<Arc<CatalogSnapshot>> {
        self.catalog.load_full()
    }

    /// Fresh fetch, flattened to `{configName: modelName}` choices.
    pub async fn list_model_names(&self) -> Result<Vec<ModelChoice>> {
        Ok(self.fetch_integrations().await?.model_choices())
    }

    /// Uids of the integrations whose config name is `config_name`.
    pub async fn resolve_uid(&self, config_name: &str, use_cached: bool) -> Result<Vec<String>> {
        Ok(self.catalog(use_cached).await?.uids_for(config_name))
    }

    /// Display names of the integrations whose config name is `config_name`.
    pub async fn resolve_integration_name(
        &self,
        config_name: &str,
        use_cached: bool,
    ) -> Result<Vec<String>> {
        Ok(self.catalog(use_cached).await?.names_for(config_name))
    }

    /// Persist a model choice. The uid is resolved from a fresh catalog first;
    /// configuration is only written once that succeeds, so a failed fetch
    /// leaves the previous selection intact.
    pub async fn select_model(&self, choice: &ModelChoice) -> Result<SelectedModel> {
        let integration_uids = self.resolve_uid(&choice.config_name, false).await?;
        let selected = SelectedModel {
            choice: choice.clone(),
            integration_uids,
        };
        self.config
            .update(keys::MODEL_NAME, Value::String(choice.model_name.clone()))
            .await?;
        self.config
            .update(
                keys::MODEL_GROUP_NAME,
                Value::String(choice.config_name.clone()),
            )
            .await?;
        self.config
            .update(
                keys::INTEGRATION_UID,
                Value::String(selected.integration_uid()),
            )
            .await?;
        info!(
            model = %choice.model_name,
            config = %choice.config_name,
            uid = %selected.integration_uid(),
            "model selected"
        );
        Ok(selected)
    }

    /// Configured model name, or a placeholder when none is set.
    pub async fn current_model_name(&self) -> Result<String> {
        Ok(self
            .config
            .get_string(keys::MODEL_NAME)
            .await?
            .unwrap_or_else(|| NO_MODEL_SELECTED.to_string()))
    }
}
