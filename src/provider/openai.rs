//! OpenAI-compatible chat completions provider.

use super::http::RestClient;
use super::{CapabilityRequest, CapabilitySet, LlmProvider, PredictRequest, ProviderFactory};
use super::Capability;
use crate::config::{keys, ProviderSettings};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiProvider {
    client: RestClient,
    model: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    pub const CAPABILITIES: CapabilitySet = CapabilitySet::of(&[
        Capability::GetModelSettings,
        Capability::Chat,
        Capability::Predict,
    ]);

    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "API key required",
                    ErrorContext::new()
                        .with_field_path(keys::API_KEY)
                        .with_details("set apiKey or OPENAI_API_KEY")
                        .with_source("openai"),
                )
            })?;
        let base = settings.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let client = RestClient::new(base, Some(api_key), settings.timeout, "openai")?;
        Ok(Self {
            client,
            model: settings
                .model_name
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fill in model and sampling defaults the caller did not set.
    fn completion_body(&self, params: Value) -> Result<Value> {
        let Value::Object(mut body) = params else {
            return Err(Error::runtime("chat parameters must be a JSON object"));
        };
        body.entry("model").or_insert_with(|| json!(self.model));
        if let Some(t) = self.temperature {
            body.entry("temperature").or_insert_with(|| json!(t));
        }
        if let Some(m) = self.max_tokens {
            body.entry("max_tokens").or_insert_with(|| json!(m));
        }
        Ok(Value::Object(body))
    }

    async fn predict(&self, request: &PredictRequest) -> Result<Value> {
        let mut messages = Vec::new();
        let context = request.context_text();
        if !context.trim().is_empty() {
            messages.push(json!({"role": "system", "content": context}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let body = self.completion_body(json!({ "messages": messages }))?;
        let response = self.client.post("chat/completions", &body).await?;
        // Prediction callers want the text; keep the raw payload if the shape is unexpected.
        Ok(match response.pointer("/choices/0/message/content") {
            Some(Value::String(text)) => Value::String(text.clone()),
            _ => response,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn capabilities(&self) -> CapabilitySet {
        Self::CAPABILITIES
    }

    async fn invoke(&self, request: CapabilityRequest) -> Result<Value> {
        debug!(capability = %request.capability(), model = %self.model, "openai call");
        match request {
            CapabilityRequest::GetModelSettings => Ok(json!({
                "model": self.model,
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
                "api_base": self.client.base().as_str(),
            })),
            CapabilityRequest::Chat(params) => {
                let body = self.completion_body(params)?;
                self.client.post("chat/completions", &body).await
            }
            CapabilityRequest::Predict(request) => self.predict(&request).await,
            other => Err(Error::unsupported(
                self.name(),
                other.capability().method_name(),
            )),
        }
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base", &self.client.base().as_str())
            .field("model", &self.model)
            .finish()
    }
}

/// Factory registered for [`ProviderKind::OpenAi`](super::ProviderKind::OpenAi).
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiFactory;

#[async_trait]
impl ProviderFactory for OpenAiFactory {
    async fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>> {
        Ok(Arc::new(OpenAiProvider::new(settings)?))
    }
}
