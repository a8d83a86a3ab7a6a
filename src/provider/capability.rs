//! Capability contract shared by every provider.
//!
//! Providers declare the capabilities they implement up front as a
//! [`CapabilitySet`]; the dispatcher consults that declaration instead of
//! probing the provider at call time.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One named operation a provider may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    GetSocketConfig,
    GetModelSettings,
    GetPrompts,
    GetPromptDetail,
    GetDatasourceDetail,
    GetDatasources,
    GetApplicationDetail,
    GetApplications,
    GetDeployments,
    StopApplicationTask,
    StopDatasourceTask,
    Chat,
    GetEmbeddings,
    Predict,
}

impl Capability {
    pub const ALL: [Capability; 14] = [
        Capability::GetSocketConfig,
        Capability::GetModelSettings,
        Capability::GetPrompts,
        Capability::GetPromptDetail,
        Capability::GetDatasourceDetail,
        Capability::GetDatasources,
        Capability::GetApplicationDetail,
        Capability::GetApplications,
        Capability::GetDeployments,
        Capability::StopApplicationTask,
        Capability::StopDatasourceTask,
        Capability::Chat,
        Capability::GetEmbeddings,
        Capability::Predict,
    ];

    /// Wire name used in notifications and on the command line.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::GetSocketConfig => "getSocketConfig",
            Self::GetModelSettings => "getModelSettings",
            Self::GetPrompts => "getPrompts",
            Self::GetPromptDetail => "getPromptDetail",
            Self::GetDatasourceDetail => "getDatasourceDetail",
            Self::GetDatasources => "getDatasources",
            Self::GetApplicationDetail => "getApplicationDetail",
            Self::GetApplications => "getApplications",
            Self::GetDeployments => "getDeployments",
            Self::StopApplicationTask => "stopApplicationTask",
            Self::StopDatasourceTask => "stopDatasourceTask",
            Self::Chat => "chat",
            Self::GetEmbeddings => "getEmbeddings",
            Self::Predict => "predict",
        }
    }

    /// Human description used in the "not supported" message.
    pub fn description(&self) -> &'static str {
        match self {
            Self::GetSocketConfig => "Get socket config",
            Self::GetModelSettings => "Get model settings",
            Self::GetPrompts => "List prompts",
            Self::GetPromptDetail => "Get prompt detail",
            Self::GetDatasourceDetail => "Get datasource detail",
            Self::GetDatasources => "List datasources",
            Self::GetApplicationDetail => "Get application detail",
            Self::GetApplications => "List applications",
            Self::GetDeployments => "Get deployments",
            Self::StopApplicationTask => "Stop application task",
            Self::StopDatasourceTask => "Stop datasource task",
            Self::Chat => "Chat",
            Self::GetEmbeddings => "Get available integrations",
            Self::Predict => "Predict",
        }
    }

    /// Whether the capability takes a single id argument.
    pub fn takes_id(&self) -> bool {
        matches!(
            self,
            Self::GetPromptDetail
                | Self::GetDatasourceDetail
                | Self::GetApplicationDetail
                | Self::StopApplicationTask
                | Self::StopDatasourceTask
        )
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.method_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    format!("unknown capability '{}'", s),
                    ErrorContext::new().with_source("capability"),
                )
            })
    }
}

/// Compile-time capability declaration of a provider variant.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);
    pub const ALL: CapabilitySet = CapabilitySet::of(&Capability::ALL);

    pub const fn of(caps: &[Capability]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < caps.len() {
            bits |= caps[i].bit();
            i += 1;
        }
        CapabilitySet(bits)
    }

    pub const fn with(self, cap: Capability) -> Self {
        CapabilitySet(self.0 | cap.bit())
    }

    pub const fn without(self, cap: Capability) -> Self {
        CapabilitySet(self.0 & !cap.bit())
    }

    pub const fn contains(&self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Arguments for `getPrompts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl PromptQuery {
    pub fn page(page: u32) -> Self {
        Self { page, query: None }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Arguments for the prediction path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Prompt template: plain text, or an object carrying a `context` field.
    pub template: Value,
    /// User input.
    pub prompt: String,
    /// Optional identifier of a backend-side prompt template/version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

impl PredictRequest {
    pub fn new(template: impl Into<Value>, prompt: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            prompt: prompt.into(),
            prompt_template: None,
        }
    }

    pub fn with_prompt_template(mut self, id: impl Into<String>) -> Self {
        self.prompt_template = Some(id.into());
        self
    }

    /// System context text extracted from the template.
    pub fn context_text(&self) -> String {
        match &self.template {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("context") {
                Some(Value::String(s)) => s.clone(),
                _ => self.template.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// A capability call with its typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityRequest {
    GetSocketConfig,
    GetModelSettings,
    GetPrompts(PromptQuery),
    GetPromptDetail(String),
    GetDatasourceDetail(String),
    GetDatasources,
    GetApplicationDetail(String),
    GetApplications,
    GetDeployments,
    StopApplicationTask(String),
    StopDatasourceTask(String),
    /// Chat parameters are passed through to the provider as-is.
    Chat(Value),
    GetEmbeddings,
    Predict(PredictRequest),
}

impl CapabilityRequest {
    pub fn capability(&self) -> Capability {
        match self {
            Self::GetSocketConfig => Capability::GetSocketConfig,
            Self::GetModelSettings => Capability::GetModelSettings,
            Self::GetPrompts(_) => Capability::GetPrompts,
            Self::GetPromptDetail(_) => Capability::GetPromptDetail,
            Self::GetDatasourceDetail(_) => Capability::GetDatasourceDetail,
            Self::GetDatasources => Capability::GetDatasources,
            Self::GetApplicationDetail(_) => Capability::GetApplicationDetail,
            Self::GetApplications => Capability::GetApplications,
            Self::GetDeployments => Capability::GetDeployments,
            Self::StopApplicationTask(_) => Capability::StopApplicationTask,
            Self::StopDatasourceTask(_) => Capability::StopDatasourceTask,
            Self::Chat(_) => Capability::Chat,
            Self::GetEmbeddings => Capability::GetEmbeddings,
            Self::Predict(_) => Capability::Predict,
        }
    }

    /// Build a request from a capability and one optional textual argument.
    ///
    /// Ids are taken verbatim, `getPrompts` reads the argument as a page number,
    /// `chat` parses it as JSON and `predict` uses it as the prompt.
    pub fn from_parts(capability: Capability, arg: Option<&str>) -> Result<Self> {
        let require = |what: &str| {
            arg.map(str::to_string).ok_or_else(|| {
                Error::configuration_with_context(
                    format!("{} requires {}", capability, what),
                    ErrorContext::new().with_source("capability"),
                )
            })
        };
        Ok(match capability {
            Capability::GetSocketConfig => Self::GetSocketConfig,
            Capability::GetModelSettings => Self::GetModelSettings,
            Capability::GetPrompts => {
                let page = match arg {
                    Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                        Error::configuration_with_context(
                            "page must be a non-negative integer",
                            ErrorContext::new().with_details(raw),
                        )
                    })?,
                    None => 0,
                };
                Self::GetPrompts(PromptQuery::page(page))
            }
            Capability::GetPromptDetail => Self::GetPromptDetail(require("an id")?),
            Capability::GetDatasourceDetail => Self::GetDatasourceDetail(require("an id")?),
            Capability::GetDatasources => Self::GetDatasources,
            Capability::GetApplicationDetail => Self::GetApplicationDetail(require("an id")?),
            Capability::GetApplications => Self::GetApplications,
            Capability::GetDeployments => Self::GetDeployments,
            Capability::StopApplicationTask => Self::StopApplicationTask(require("a task id")?),
            Capability::StopDatasourceTask => Self::StopDatasourceTask(require("a task id")?),
            Capability::Chat => {
                let params = match arg {
                    Some(raw) => serde_json::from_str(raw)?,
                    None => Value::Object(Default::default()),
                };
                Self::Chat(params)
            }
            Capability::GetEmbeddings => Self::GetEmbeddings,
            Capability::Predict => {
                Self::Predict(PredictRequest::new(Value::Null, require("a prompt")?))
            }
        })
    }
}
