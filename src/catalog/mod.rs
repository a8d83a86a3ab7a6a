//! Integration catalog: the backend's configured LLM integrations and their models.
//!
//! The catalog is fetched through the active provider's `getEmbeddings`
//! capability. Payload entries look like:
//!
//! ```json
//! { "uid": "…", "name": "…", "config": { "name": "…" }, "settings": { "models": [ { "name": "…" } ] } }
//! ```
//!
//! Parsing is lenient: entries without a config name are dropped, a missing or
//! malformed `settings.models` yields an integration with no models, and model
//! entries without a display name are skipped. Integrations without a display
//! name stay in the catalog for lookups but contribute no model choices.

mod choice;

pub use choice::{ModelChoice, SelectedModel, LABEL_SEPARATOR, NO_MODEL_SELECTED};

use crate::config::source::value_to_string;
use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// One selectable model under an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub name: String,
}

/// One backend-side integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationRecord {
    pub uid: Option<String>,
    pub name: Option<String>,
    /// `config.name`, the stable join key used by selection UIs.
    pub config_name: String,
    pub models: Vec<ModelDescriptor>,
}

impl IntegrationRecord {
    /// Parse one payload entry; `None` if it has no config name.
    pub fn from_value(value: &Value) -> Option<Self> {
        let config_name = value
            .pointer("/config/name")
            .and_then(value_to_string)?;
        let models = match value.pointer("/settings/models") {
            Some(Value::Array(models)) => models
                .iter()
                .filter_map(|m| m.get("name").and_then(value_to_string))
                .map(|name| ModelDescriptor { name })
                .collect(),
            _ => Vec::new(),
        };
        Some(Self {
            uid: value.get("uid").and_then(value_to_string),
            name: value.get("name").and_then(value_to_string),
            config_name,
            models,
        })
    }
}

/// Cached catalog, tagged with the selector generation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    generation: u64,
    integrations: Vec<IntegrationRecord>,
}

impl CatalogSnapshot {
    pub fn new(generation: u64, integrations: Vec<IntegrationRecord>) -> Self {
        Self {
            generation,
            integrations,
        }
    }

    /// Build a snapshot from a `getEmbeddings` payload, which must be a sequence.
    pub fn from_payload(generation: u64, payload: &Value) -> Result<Self> {
        let Value::Array(entries) = payload else {
            return Err(Error::runtime_with_context(
                "integration payload must be a sequence",
                ErrorContext::new()
                    .with_source("catalog")
                    .with_details(truncate(&payload.to_string(), 120)),
            ));
        };
        let integrations: Vec<_> = entries
            .iter()
            .filter_map(IntegrationRecord::from_value)
            .collect();
        if integrations.len() != entries.len() {
            debug!(
                dropped = entries.len() - integrations.len(),
                "skipped integrations without a config name"
            );
        }
        Ok(Self::new(generation, integrations))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn integrations(&self) -> &[IntegrationRecord] {
        &self.integrations
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }

    /// Every model flattened to `{configName: modelName}`, integration order first.
    /// Integrations without a display name are not offered.
    pub fn model_choices(&self) -> Vec<ModelChoice> {
        self.integrations
            .iter()
            .filter(|integration| integration.name.is_some())
            .flat_map(|integration| {
                integration
                    .models
                    .iter()
                    .map(|model| ModelChoice::new(&integration.config_name, &model.name))
            })
            .collect()
    }

    fn matching<'a>(&'a self, config_name: &'a str) -> impl Iterator<Item = &'a IntegrationRecord> {
        self.integrations
            .iter()
            .filter(move |i| i.config_name == config_name)
    }

    /// Uids of integrations whose config name equals `config_name`.
    pub fn uids_for(&self, config_name: &str) -> Vec<String> {
        self.matching(config_name)
            .filter_map(|i| i.uid.clone())
            .collect()
    }

    /// Display names of integrations whose config name equals `config_name`.
    pub fn names_for(&self, config_name: &str) -> Vec<String> {
        self.matching(config_name)
            .filter_map(|i| i.name.clone())
            .collect()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!([
            {"uid": "u-a", "name": "Team A", "config": {"name": "A"},
             "settings": {"models": [{"name": "m1"}, {"name": "m2"}]}},
            {"uid": 17, "name": "Team B", "config": {"name": "B"},
             "settings": {"models": [{"name": "m3"}]}}
        ])
    }

    #[test]
    fn flattens_models_in_payload_order() {
        let snapshot = CatalogSnapshot::from_payload(1, &payload()).unwrap();
        let choices: Vec<Value> = snapshot
            .model_choices()
            .iter()
            .map(ModelChoice::to_value)
            .collect();
        assert_eq!(
            choices,
            vec![json!({"A": "m1"}), json!({"A": "m2"}), json!({"B": "m3"})]
        );
    }

    #[test]
    fn numeric_uids_are_rendered() {
        let snapshot = CatalogSnapshot::from_payload(1, &payload()).unwrap();
        assert_eq!(snapshot.uids_for("B"), vec!["17".to_string()]);
        assert_eq!(snapshot.names_for("A"), vec!["Team A".to_string()]);
        assert!(snapshot.uids_for("C").is_empty());
    }

    #[test]
    fn malformed_models_are_skipped() {
        let snapshot = CatalogSnapshot::from_payload(
            1,
            &json!([
                {"uid": "1", "config": {"name": "X"}, "settings": {"models": "oops"}},
                {"uid": "2", "config": {"name": "Y"}},
                {"uid": "3", "name": "Team Z", "config": {"name": "Z"},
                 "settings": {"models": [{"id": 1}, {"name": ""}, {"name": "ok"}]}},
                {"uid": "4", "name": "no config"}
            ]),
        )
        .unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.model_choices(), vec![ModelChoice::new("Z", "ok")]);
    }

    #[test]
    fn unnamed_integrations_offer_no_models() {
        let snapshot = CatalogSnapshot::from_payload(
            1,
            &json!([
                {"uid": "u-1", "config": {"name": "A"},
                 "settings": {"models": [{"name": "hidden"}]}},
                {"uid": "u-2", "name": "Team A", "config": {"name": "A"},
                 "settings": {"models": [{"name": "shown"}]}}
            ]),
        )
        .unwrap();
        assert_eq!(snapshot.model_choices(), vec![ModelChoice::new("A", "shown")]);
        assert_eq!(snapshot.uids_for("A"), vec!["u-1", "u-2"]);
        assert_eq!(snapshot.names_for("A"), vec!["Team A"]);
    }

    #[test]
    fn non_sequence_payload_is_rejected() {
        let err = CatalogSnapshot::from_payload(1, &json!("Get available integrations not supported"))
            .unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
    }
}
