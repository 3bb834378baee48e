//! Persisted plugin configuration (`config.yml`).

use crate::error::{ConfigErrorKind, InfraError};
use parking_lot::Mutex;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

pub const ITEMS_SECTION: &str = "items";

/// Shipped with the plugin, written on first start
pub const DEFAULT_CONFIG: &str = include_str!("../resources/config.yml");

/// In-memory view of the YAML document. Keys outside `items` are carried
/// through a rewrite untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    doc: Mapping,
}

impl ConfigFile {
    pub fn parse(data: &str) -> Result<Self, ConfigErrorKind> {
        let value: Value = serde_yaml::from_str(data).map_err(ConfigErrorKind::Parse)?;
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(doc) => Ok(Self { doc }),
            _ => Err(ConfigErrorKind::NotAMapping),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigErrorKind> {
        serde_yaml::to_string(&self.doc).map_err(ConfigErrorKind::Serialize)
    }

    /// Ordered `(name, configured value)` pairs of the `items` section, or
    /// `None` when the section is missing or not a mapping.
    pub fn items(&self) -> Option<Vec<(String, i128)>> {
        let section = self.doc.get(ITEMS_SECTION)?.as_mapping()?;
        Some(
            section
                .iter()
                .filter_map(|(k, v)| Some((key_string(k)?, lenient_int(v))))
                .collect(),
        )
    }

    /// Overwrites (or adds) one entry of the `items` section
    pub fn set_item(&mut self, name: &str, value: i64) {
        let section = self
            .doc
            .entry(Value::String(ITEMS_SECTION.to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !section.is_mapping() {
            *section = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(items) = section {
            items.insert(Value::String(name.to_string()), Value::Number(value.into()));
        }
    }
}

fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer accessor with the host's leniency: floats truncate, anything
/// non-numeric reads as 0. The whole `u64` range is kept exact; YAML numbers
/// past it only exist as floats and are truncated (saturating at `i128`).
fn lenient_int(value: &Value) -> i128 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| n.as_f64().map(|f| f as i128))
            .unwrap_or(0),
        _ => 0,
    }
}

pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<ConfigFile, InfraError>;

    fn save(&self, cfg: &ConfigFile) -> Result<(), InfraError>;

    /// Writes [`DEFAULT_CONFIG`] if nothing is persisted yet. Returns whether
    /// it wrote anything.
    fn save_default(&self) -> Result<bool, InfraError>;
}

pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for YamlFileStore {
    fn load(&self) -> Result<ConfigFile, InfraError> {
        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| InfraError::config(&self.path, ConfigErrorKind::Read(e)))?;
        ConfigFile::parse(&data).map_err(|e| InfraError::config(&self.path, e))
    }

    fn save(&self, cfg: &ConfigFile) -> Result<(), InfraError> {
        let data = cfg
            .to_yaml_string()
            .map_err(|e| InfraError::config(&self.path, e))?;
        // Write to a sibling file first so a crash never leaves a truncated config.
        let tmp = self.path.with_extension("yml.tmp");
        std::fs::write(&tmp, data)
            .map_err(|e| InfraError::config(&self.path, ConfigErrorKind::Write(e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| InfraError::config(&self.path, ConfigErrorKind::Write(e)))?;
        Ok(())
    }

    fn save_default(&self) -> Result<bool, InfraError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, DEFAULT_CONFIG)
            .map_err(|e| InfraError::config(&self.path, ConfigErrorKind::Write(e)))?;
        tracing::info!(path = %self.path.display(), "wrote default config");
        Ok(true)
    }
}

/// Config kept in memory as YAML text. Counts writes so callers can assert
/// on write-back behaviour.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    text: Mutex<Option<String>>,
    saves: Mutex<usize>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_yaml(yaml: &str) -> Self {
        Self {
            text: Mutex::new(Some(yaml.to_string())),
            saves: Mutex::new(0),
        }
    }

    /// Replace the persisted text, as an admin editing the file would
    pub fn edit(&self, yaml: &str) {
        *self.text.lock() = Some(yaml.to_string());
    }

    pub fn yaml(&self) -> Option<String> {
        self.text.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

const MEMORY_PATH: &str = "<memory>";

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<ConfigFile, InfraError> {
        match self.text.lock().as_deref() {
            Some(text) => ConfigFile::parse(text).map_err(|e| InfraError::config(MEMORY_PATH, e)),
            None => Ok(ConfigFile::default()),
        }
    }

    fn save(&self, cfg: &ConfigFile) -> Result<(), InfraError> {
        let text = cfg
            .to_yaml_string()
            .map_err(|e| InfraError::config(MEMORY_PATH, e))?;
        *self.text.lock() = Some(text);
        *self.saves.lock() += 1;
        Ok(())
    }

    fn save_default(&self) -> Result<bool, InfraError> {
        let mut text = self.text.lock();
        if text.is_some() {
            return Ok(false);
        }
        *text = Some(DEFAULT_CONFIG.to_string());
        Ok(true)
    }
}
