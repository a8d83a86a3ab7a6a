//! Alita REST backend.
//!
//! Every call is scoped to the configured project:
//! `<providerServerURL>/api/v1/<area>/<collection>/prompt_lib/<projectId>[/<id>]`.
//! Socket and model settings are derived locally from configuration.

use super::http::RestClient;
use super::{Capability, CapabilityRequest, CapabilitySet, LlmProvider, PredictRequest};
use super::{ProviderFactory, PromptQuery};
use crate::config::{keys, ProviderSettings};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

const PROMPTS_PAGE_SIZE: u32 = 10;
const API_PREFIX: &str = "api/v1";

pub struct AlitaProvider {
    client: RestClient,
    server_url: String,
    project_id: String,
    auth_token: Option<String>,
    settings: ProviderSettings,
}

impl AlitaProvider {
    pub const CAPABILITIES: CapabilitySet = CapabilitySet::ALL;

    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let server_url =
            ProviderSettings::require(&settings.server_url, keys::SERVER_URL, "alita")?
                .trim_end_matches('/')
                .to_string();
        let project_id =
            ProviderSettings::require(&settings.project_id, keys::PROJECT_ID, "alita")?.to_string();
        let client = RestClient::new(
            &format!("{}/{}", server_url, API_PREFIX),
            settings.auth_token.clone(),
            settings.timeout,
            "alita",
        )?;
        Ok(Self {
            client,
            server_url,
            project_id,
            auth_token: settings.auth_token.clone(),
            settings: settings.clone(),
        })
    }

    fn scoped(&self, area: &str, collection: &str) -> String {
        format!("{}/{}/prompt_lib/{}", area, collection, self.project_id)
    }

    fn scoped_item(&self, area: &str, collection: &str, id: &str) -> String {
        format!("{}/{}", self.scoped(area, collection), id.trim())
    }

    fn socket_config(&self) -> Value {
        json!({
            "projectId": self.project_id,
            "url": self.server_url,
            "token": self.auth_token,
        })
    }

    fn model_settings(&self) -> Value {
        json!({
            "model": {
                "name": self.settings.model_name,
                "integration_uid": self.settings.integration_uid,
            },
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        })
    }

    async fn prompts(&self, query: &PromptQuery) -> Result<Value> {
        let offset = query.page.checked_mul(PROMPTS_PAGE_SIZE).ok_or_else(|| {
            Error::configuration_with_context(
                "prompt page is out of range",
                ErrorContext::new()
                    .with_field_path("page")
                    .with_details(query.page.to_string())
                    .with_source("alita"),
            )
        })?;
        let mut params = vec![
            ("limit", PROMPTS_PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(q) = query.query.as_deref().filter(|q| !q.is_empty()) {
            params.push(("query", q.to_string()));
        }
        self.client
            .get(&self.scoped("prompt_lib", "prompts"), &params)
            .await
    }

    async fn integrations(&self) -> Result<Value> {
        self.client
            .get(
                &format!("integrations/integrations/default/{}", self.project_id),
                &[("section", "ai".to_string())],
            )
            .await
    }

    async fn predict(&self, request: &PredictRequest) -> Result<Value> {
        let path = match request.prompt_template.as_deref() {
            Some(id) => self.scoped_item("prompt_lib", "predict", id),
            None => self.scoped("prompt_lib", "predict"),
        };
        let mut body = Map::new();
        body.insert("project_id".into(), Value::String(self.project_id.clone()));
        body.insert("context".into(), Value::String(request.context_text()));
        body.insert("user_input".into(), Value::String(request.prompt.clone()));
        if let Value::Object(template) = &request.template {
            if let Some(examples) = template.get("examples") {
                body.insert("examples".into(), examples.clone());
            }
        }
        body.insert("model_settings".into(), self.model_settings());
        self.client.post(&path, &Value::Object(body)).await
    }
}

#[async_trait]
impl LlmProvider for AlitaProvider {
    fn name(&self) -> &str {
        "Alita"
    }

    fn capabilities(&self) -> CapabilitySet {
        Self::CAPABILITIES
    }

    async fn invoke(&self, request: CapabilityRequest) -> Result<Value> {
        debug!(capability = %request.capability(), project = %self.project_id, "alita call");
        match request {
            CapabilityRequest::GetSocketConfig => Ok(self.socket_config()),
            CapabilityRequest::GetModelSettings => Ok(self.model_settings()),
            CapabilityRequest::GetPrompts(query) => self.prompts(&query).await,
            CapabilityRequest::GetPromptDetail(id) => {
                self.client
                    .get(&self.scoped_item("prompt_lib", "prompt", &id), &[])
                    .await
            }
            CapabilityRequest::GetDatasources => {
                self.client
                    .get(&self.scoped("datasources", "datasources"), &[])
                    .await
            }
            CapabilityRequest::GetDatasourceDetail(id) => {
                self.client
                    .get(&self.scoped_item("datasources", "datasource", &id), &[])
                    .await
            }
            CapabilityRequest::GetApplications => {
                self.client
                    .get(&self.scoped("applications", "applications"), &[])
                    .await
            }
            CapabilityRequest::GetApplicationDetail(id) => {
                self.client
                    .get(&self.scoped_item("applications", "application", &id), &[])
                    .await
            }
            CapabilityRequest::GetDeployments | CapabilityRequest::GetEmbeddings => {
                self.integrations().await
            }
            CapabilityRequest::StopApplicationTask(id) => {
                self.client
                    .delete(&self.scoped_item("applications", "task", &id))
                    .await
            }
            CapabilityRequest::StopDatasourceTask(id) => {
                self.client
                    .delete(&self.scoped_item("datasources", "task", &id))
                    .await
            }
            CapabilityRequest::Chat(params) => {
                if !params.is_object() {
                    return Err(Error::runtime("chat parameters must be a JSON object"));
                }
                self.client
                    .post(&format!("chat/prompt_lib/{}", self.project_id), &params)
                    .await
            }
            CapabilityRequest::Predict(request) => self.predict(&request).await,
        }
    }
}

impl std::fmt::Debug for AlitaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlitaProvider")
            .field("base", &self.client.base().as_str())
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Factory registered for [`ProviderKind::Alita`](super::ProviderKind::Alita).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlitaFactory;

#[async_trait]
impl ProviderFactory for AlitaFactory {
    async fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>> {
        Ok(Arc::new(AlitaProvider::new(settings)?))
    }
}
