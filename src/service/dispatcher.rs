use super::outcome::DispatchOutcome;
use super::selector::{ActiveProvider, ProviderSelector};
use crate::catalog::CatalogSnapshot;
use crate::config::{keys, ConfigSource};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::provider::{CapabilityRequest, PredictRequest, PromptQuery, ProviderRegistry};
use crate::{Error, ErrorContext, Result};
use arc_swap::ArcSwapOption;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Prefix for notification messages.
pub const DEFAULT_TAG: &str = "Alita Code";

/// Provider selection, capability dispatch and the integration catalog.
///
/// Construct one per host and share it (it is `Send + Sync`); there is no
/// global instance.
pub struct ProviderService {
    pub(super) config: Arc<dyn ConfigSource>,
    pub(super) selector: ProviderSelector,
    pub(super) catalog: ArcSwapOption<CatalogSnapshot>,
    notifier: Arc<dyn Notifier>,
    tag: String,
}

impl ProviderService {
    /// Service with the built-in providers and the tracing notifier.
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self::from_parts(
            config,
            ProviderRegistry::with_defaults(),
            Arc::new(TracingNotifier),
            DEFAULT_TAG.to_string(),
        )
    }

    pub fn builder() -> ProviderServiceBuilder {
        ProviderServiceBuilder::new()
    }

    fn from_parts(
        config: Arc<dyn ConfigSource>,
        registry: ProviderRegistry,
        notifier: Arc<dyn Notifier>,
        tag: String,
    ) -> Self {
        Self {
            selector: ProviderSelector::new(registry, config.clone()),
            config,
            catalog: ArcSwapOption::empty(),
            notifier,
            tag,
        }
    }

    pub fn config(&self) -> &Arc<dyn ConfigSource> {
        &self.config
    }

    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Re-read the configured provider and swap the instance if it changed.
    pub async fn resolve_active_provider(&self) -> Result<Option<Arc<ActiveProvider>>> {
        self.selector.resolve().await
    }

    /// Dispatch one capability call to the active provider.
    ///
    /// Never fails: a missing provider or capability yields
    /// [`DispatchOutcome::Unsupported`], any error yields
    /// [`DispatchOutcome::Failed`] after one notification.
    pub async fn invoke(&self, request: CapabilityRequest) -> DispatchOutcome {
        let capability = request.capability();
        match self.try_invoke(request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(err, format!("{} {}", self.tag, capability.method_name()))
                    .await;
                DispatchOutcome::failed()
            }
        }
    }

    async fn try_invoke(&self, request: CapabilityRequest) -> Result<DispatchOutcome> {
        let capability = request.capability();
        let Some(active) = self.selector.resolve().await? else {
            debug!(capability = %capability, "no active LLM provider");
            return Ok(DispatchOutcome::unsupported(capability));
        };
        if !active.provider().supports(capability) {
            debug!(capability = %capability, provider = active.name(), "capability not declared");
            return Ok(DispatchOutcome::unsupported(capability));
        }
        let value = active.provider().invoke(request).await?;
        Ok(DispatchOutcome::Completed(value))
    }

    /// Prediction path: called directly on the provider, with no capability
    /// check. A missing provider or capability is reported as a failure.
    pub async fn predict(&self, request: PredictRequest) -> DispatchOutcome {
        match self.try_predict(request).await {
            Ok(value) => DispatchOutcome::Completed(value),
            Err(err) => {
                self.report(err, format!("{} is not able to connect", self.tag))
                    .await;
                DispatchOutcome::failed()
            }
        }
    }

    async fn try_predict(&self, request: PredictRequest) -> Result<Value> {
        let active = self.selector.resolve().await?.ok_or_else(|| {
            Error::configuration_with_context(
                "no active LLM provider",
                ErrorContext::new()
                    .with_field_path(keys::LLM_PROVIDER)
                    .with_source("predict"),
            )
        })?;
        active
            .provider()
            .invoke(CapabilityRequest::Predict(request))
            .await
    }

    async fn report(&self, error: Error, message: String) {
        self.notifier
            .notify(Notification::new(error, message))
            .await;
    }

    pub async fn get_socket_config(&self) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetSocketConfig).await
    }

    pub async fn get_model_settings(&self) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetModelSettings).await
    }

    pub async fn get_prompts(&self, query: PromptQuery) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetPrompts(query)).await
    }

    pub async fn get_prompt_detail(&self, prompt_id: impl Into<String>) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetPromptDetail(prompt_id.into()))
            .await
    }

    pub async fn get_datasource_detail(&self, id: impl Into<String>) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetDatasourceDetail(id.into()))
            .await
    }

    pub async fn get_datasources(&self) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetDatasources).await
    }

    pub async fn get_application_detail(&self, id: impl Into<String>) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetApplicationDetail(id.into()))
            .await
    }

    pub async fn get_applications(&self) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetApplications).await
    }

    pub async fn get_deployments(&self) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetDeployments).await
    }

    pub async fn stop_application_task(&self, task_id: impl Into<String>) -> DispatchOutcome {
        self.invoke(CapabilityRequest::StopApplicationTask(task_id.into()))
            .await
    }

    pub async fn stop_datasource_task(&self, task_id: impl Into<String>) -> DispatchOutcome {
        self.invoke(CapabilityRequest::StopDatasourceTask(task_id.into()))
            .await
    }

    pub async fn chat(&self, params: Value) -> DispatchOutcome {
        self.invoke(CapabilityRequest::Chat(params)).await
    }

    pub async fn get_embeddings(&self) -> DispatchOutcome {
        self.invoke(CapabilityRequest::GetEmbeddings).await
    }
}

impl fmt::Debug for ProviderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderService")
            .field("tag", &self.tag)
            .field("selector", &self.selector)
            .field(
                "catalog_generation",
                &self.catalog.load_full().map(|c| c.generation()),
            )
            .finish()
    }
}

/// Builder for [`ProviderService`].
#[derive(Default)]
pub struct ProviderServiceBuilder {
    config: Option<Arc<dyn ConfigSource>>,
    registry: Option<ProviderRegistry>,
    notifier: Option<Arc<dyn Notifier>>,
    tag: Option<String>,
}

impl ProviderServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the provider registry (defaults to the built-ins).
    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Prefix used in notification messages.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn build(self) -> Result<ProviderService> {
        let config = self.config.ok_or_else(|| {
            Error::configuration_with_context(
                "a configuration source is required",
                ErrorContext::new().with_source("ProviderServiceBuilder"),
            )
        })?;
        Ok(ProviderService::from_parts(
            config,
            self.registry.unwrap_or_else(ProviderRegistry::with_defaults),
            self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            self.tag.unwrap_or_else(|| DEFAULT_TAG.to_string()),
        ))
    }
}
