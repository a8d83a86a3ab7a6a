//! Shared fixtures: a scripted provider whose behaviour and call counts are
//! observable from the test.

#![allow(dead_code)]

use ai_provider_hub::config::{keys, MemoryConfig, ProviderSettings};
use ai_provider_hub::notify::InMemoryNotifier;
use ai_provider_hub::provider::{
    CapabilityRequest, CapabilitySet, LlmProvider, ProviderFactory, ProviderKind, ProviderRegistry,
};
use ai_provider_hub::{Error, ProviderService, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Factory and shared state for [`ScriptedProvider`] instances.
#[derive(Clone)]
pub struct Scripted {
    capabilities: CapabilitySet,
    payload: Arc<Mutex<Value>>,
    fail_status: Option<u16>,
    created: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
    fetches: Arc<AtomicUsize>,
}

impl Scripted {
    pub fn new(capabilities: CapabilitySet) -> Self {
        Self {
            capabilities,
            payload: Arc::new(Mutex::new(json!([]))),
            fail_status: None,
            created: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every declared capability fails with `Error::Remote { status }`.
    pub fn failing(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    pub fn with_payload(self, payload: Value) -> Self {
        self.set_payload(payload);
        self
    }

    pub fn set_payload(&self, payload: Value) {
        *self.payload.lock().unwrap() = payload;
    }

    /// Instances built so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Calls that reached a provider instance.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `getEmbeddings` calls served.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderFactory for Scripted {
    async fn create(&self, _settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedProvider {
            script: self.clone(),
        }))
    }
}

pub struct ScriptedProvider {
    script: Scripted,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> CapabilitySet {
        self.script.capabilities
    }

    async fn invoke(&self, request: CapabilityRequest) -> Result<Value> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        let capability = request.capability();
        if !self.supports(capability) {
            return Err(Error::unsupported(self.name(), capability.method_name()));
        }
        if let Some(status) = self.script.fail_status {
            return Err(Error::Remote {
                status,
                message: "bad gateway".into(),
            });
        }
        Ok(match request {
            CapabilityRequest::GetEmbeddings => {
                self.script.fetches.fetch_add(1, Ordering::SeqCst);
                self.script.payload.lock().unwrap().clone()
            }
            CapabilityRequest::Chat(params) => params,
            CapabilityRequest::Predict(req) => json!({ "echo": req.prompt }),
            other => json!({ "called": other.capability().method_name() }),
        })
    }
}

/// Integrations `A` (models m1, m2) and `B` (model m3).
pub fn sample_integrations() -> Value {
    json!([
        {
            "uid": "uid-a",
            "name": "Integration A",
            "config": {"name": "A"},
            "settings": {"models": [{"name": "m1"}, {"name": "m2"}]}
        },
        {
            "uid": "uid-b",
            "name": "Integration B",
            "config": {"name": "B"},
            "settings": {"models": [{"name": "m3"}]}
        }
    ])
}

pub struct Harness {
    pub config: Arc<MemoryConfig>,
    pub notifier: Arc<InMemoryNotifier>,
    pub service: ProviderService,
}

/// Service with `alita` registered as Alita and `openai` as OpenAI.
pub fn harness(provider: Option<&str>, alita: Scripted, openai: Scripted) -> Harness {
    let config = Arc::new(MemoryConfig::new());
    if let Some(name) = provider {
        config.set(keys::LLM_PROVIDER, name);
    }
    let notifier = Arc::new(InMemoryNotifier::default());
    let registry = ProviderRegistry::new()
        .with(ProviderKind::Alita, alita)
        .with(ProviderKind::OpenAi, openai);
    let service = ProviderService::builder()
        .config(config.clone())
        .registry(registry)
        .notifier(notifier.clone())
        .tag("test")
        .build()
        .unwrap();
    Harness {
        config,
        notifier,
        service,
    }
}

/// Harness with one scripted provider registered as Alita and selected.
pub fn single(script: Scripted) -> Harness {
    harness(
        Some("Alita"),
        script,
        Scripted::new(CapabilitySet::EMPTY),
    )
}
