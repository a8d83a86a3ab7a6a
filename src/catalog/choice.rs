use crate::{Error, ErrorContext, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Separator between model and config name in a picker label.
pub const LABEL_SEPARATOR: &str = " --- ";

/// Reported by `current_model_name` when nothing has been selected.
pub const NO_MODEL_SELECTED: &str = "provider not defined yet";

/// A selectable model, keyed by the config name of its integration.
///
/// Serializes as the single-entry mapping `{configName: modelName}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelChoice {
    pub config_name: String,
    pub model_name: String,
}

impl ModelChoice {
    pub fn new(config_name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            config_name: config_name.into(),
            model_name: model_name.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            self.config_name.clone(),
            Value::String(self.model_name.clone()),
        );
        Value::Object(map)
    }

    /// Picker label: `"<model> --- [<config>]"`.
    pub fn label(&self) -> String {
        format!("{}{}[{}]", self.model_name, LABEL_SEPARATOR, self.config_name)
    }

    /// Inverse of [`label`](Self::label). Brackets around the config name are optional.
    pub fn parse_label(label: &str) -> Result<Self> {
        let invalid = || {
            Error::configuration_with_context(
                "model label must look like '<model> --- [<config>]'",
                ErrorContext::new().with_details(label),
            )
        };
        let (model, config) = label.rsplit_once(LABEL_SEPARATOR.trim()).ok_or_else(invalid)?;
        let model = model.trim();
        let config = config.trim();
        let config = config
            .strip_prefix('[')
            .and_then(|c| c.strip_suffix(']'))
            .unwrap_or(config)
            .trim();
        if model.is_empty() || config.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(config, model))
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for ModelChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.config_name, &self.model_name)?;
        map.end()
    }
}

/// Result of a model selection, as written back to configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedModel {
    pub choice: ModelChoice,
    /// Uids of the integrations matching the choice's config name.
    pub integration_uids: Vec<String>,
}

impl SelectedModel {
    /// Comma-joined uids, the form stored under `integrationUid`.
    pub fn integration_uid(&self) -> String {
        self.integration_uids.join(",")
    }
}

impl fmt::Display for SelectedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "You selected: {}  [{}]",
            self.choice.model_name, self.choice.config_name
        )
    }
}
