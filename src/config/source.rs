//! Configuration source backends.

use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key/value settings store owned by the host editor.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Read a key. `Ok(None)` means unset.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a key. Writing `Value::Null` unsets it.
    async fn update(&self, key: &str, value: Value) -> Result<()>;

    /// Read a key as a trimmed, non-empty string. Numbers and booleans are
    /// rendered; other shapes are treated as unset.
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key).await?.and_then(|v| value_to_string(&v)))
    }
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// In-memory configuration.
#[derive(Debug, Default)]
pub struct MemoryConfig {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.into(), value.into());
        }
        self
    }

    /// Synchronous write for hosts that push changes from a non-async callback.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        let key = key.into();
        if let Ok(mut values) = self.values.write() {
            if value.is_null() {
                values.remove(&key);
            } else {
                values.insert(key, value);
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }

    fn poisoned() -> Error {
        Error::runtime_with_context(
            "configuration lock poisoned",
            ErrorContext::new().with_source("memory_config"),
        )
    }
}

#[async_trait]
impl ConfigSource for MemoryConfig {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self.values.read().map_err(|_| Self::poisoned())?;
        Ok(values.get(key).cloned())
    }

    async fn update(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        if value.is_null() {
            values.remove(key);
        } else {
            values.insert(key.to_string(), value);
        }
        Ok(())
    }
}

/// On-disk format of a [`FileConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Infer from the file extension; anything that is not `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }
}

/// Settings file backend.
///
/// The file is read on every `get` so edits made by another process are seen on
/// the next dispatch. A missing file is an empty configuration.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
    format: FileFormat,
}

impl FileConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = FileFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Value = match self.format {
            FileFormat::Json => serde_json::from_str(&raw)?,
            FileFormat::Yaml => serde_yaml::from_str(&raw)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(Error::configuration_with_context(
                "settings file must contain a mapping at the top level",
                ErrorContext::new()
                    .with_field_path(self.path.display().to_string())
                    .with_details(format!("found {}", type_name(&other))),
            )),
        }
    }

    async fn store(&self, map: Map<String, Value>) -> Result<()> {
        let value = Value::Object(map);
        let rendered = match self.format {
            FileFormat::Json => serde_json::to_string_pretty(&value)?,
            FileFormat::Yaml => serde_yaml::to_string(&value)?,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, rendered).await?;
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[async_trait]
impl ConfigSource for FileConfig {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let map = self.load().await?;
        Ok(map.get(key).filter(|v| !v.is_null()).cloned())
    }

    async fn update(&self, key: &str, value: Value) -> Result<()> {
        let mut map = self.load().await?;
        if value.is_null() {
            map.remove(key);
        } else {
            map.insert(key.to_string(), value);
        }
        self.store(map).await
    }
}
