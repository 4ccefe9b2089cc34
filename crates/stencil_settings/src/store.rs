//! The settings store: load, flatten, merge.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{SettingsError, SettingsResult};
use crate::vars::{TemplateVars, VARS_KEY};

/// A single configurable value addressed by its dotted name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
}

impl Setting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Config file formats accepted by [`SettingsStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Extensions that select a format, lowercase and without the dot.
    pub const EXTENSIONS: [&'static str; 3] = ["json", "yaml", "yml"];

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Access to the configuration used for a run.
///
/// The materializer and negotiator only talk to this trait, so they can be
/// driven by a test double instead of a file on disk.
pub trait ConfigStore {
    /// Flatten the document into one [`Setting`] per leaf.
    fn get_all_values(&self) -> SettingsResult<Vec<Setting>>;

    /// Write each setting at its dotted path.
    ///
    /// Settings are applied in order. The first failure stops the batch and
    /// leaves earlier writes in place.
    fn set_values(&mut self, settings: &[Setting]) -> SettingsResult<()>;

    /// The whole document, used as the template context.
    fn object(&self) -> &Document;

    /// Check the settings are complete before anything is rendered.
    fn validate(&self) -> SettingsResult<()> {
        Ok(())
    }
}

/// [`ConfigStore`] backed by a JSON or YAML file.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    source: Option<PathBuf>,
    root: Document,
    vars: TemplateVars,
    fixed: BTreeSet<String>,
}

impl SettingsStore {
    /// Wrap an in-memory document as-is.
    pub fn from_document(root: Document) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Load settings from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::InvalidConfigPath {
                path: path.to_path_buf(),
                reason: "path does not exist".to_string(),
            });
        }
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            SettingsError::InvalidConfigPath {
                path: path.to_path_buf(),
                reason: "extension must be one of .json, .yaml, .yml".to_string(),
            }
        })?;

        debug!("Loading settings from {:?}", path);
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut root: Document = match format {
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        }
        .map_err(|message| SettingsError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        let section = match &mut root {
            Document::Object(map) => map.remove(VARS_KEY),
            _ => None,
        };
        let mut store = Self {
            source: Some(path.to_path_buf()),
            root,
            ..Self::default()
        };
        if let Some(section) = section {
            let vars = TemplateVars::from_document(&section).map_err(|message| {
                SettingsError::Parse {
                    path: path.to_path_buf(),
                    message,
                }
            })?;
            store.declare(vars)?;
        }

        info!("Loaded settings from {}", path.display());
        Ok(store)
    }

    /// Apply declared variables: prompt variables start at their default and
    /// static values join the context without being offered.
    pub fn declare(&mut self, vars: TemplateVars) -> SettingsResult<()> {
        for (name, var) in &vars.prompt {
            self.set_value(name, var.initial())?;
        }
        for (name, value) in &vars.fixed {
            self.set_value(name, value)?;
            self.fixed.insert(name.clone());
        }
        debug!(
            "Declared {} prompt and {} static variables",
            vars.prompt.len(),
            vars.fixed.len()
        );
        self.vars = vars;
        Ok(())
    }

    /// The file this store was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Resolve a dotted name against the document.
    pub fn lookup(&self, name: &str) -> Option<&Document> {
        self.root.lookup(name)
    }

    /// Write a single value at a dotted path, creating intermediate objects.
    pub fn set_value(&mut self, name: &str, value: &str) -> SettingsResult<()> {
        let write_err = |reason: String| SettingsError::Write {
            name: name.to_string(),
            reason,
        };

        if let Some(var) = self.vars.prompt.get(name) {
            if !var.accepts(value) {
                return Err(write_err(format!(
                    "'{}' is not one of {}",
                    value,
                    var.options.join(", ")
                )));
            }
        }

        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(write_err("name has an empty segment".to_string()));
        }
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| write_err("name is empty".to_string()))?;

        let mut node = &mut self.root;
        for segment in parents {
            node = match node {
                Document::Object(map) => map
                    .entry((*segment).to_string())
                    .or_insert_with(Document::object),
                other => {
                    return Err(write_err(format!(
                        "parent of '{}' is a {}, not an object",
                        segment,
                        other.type_name()
                    )))
                }
            };
        }

        match node {
            Document::Object(map) => {
                map.insert((*last).to_string(), Document::String(value.to_string()));
                Ok(())
            }
            other => Err(write_err(format!(
                "parent of '{}' is a {}, not an object",
                last,
                other.type_name()
            ))),
        }
    }
}

impl ConfigStore for SettingsStore {
    fn get_all_values(&self) -> SettingsResult<Vec<Setting>> {
        let mut settings = flatten(&self.root)?;
        settings.retain(|setting| !self.fixed.contains(&setting.name));
        Ok(settings)
    }

    fn set_values(&mut self, settings: &[Setting]) -> SettingsResult<()> {
        for setting in settings {
            debug!("Setting {} = {:?}", setting.name, setting.value);
            self.set_value(&setting.name, &setting.value)?;
        }
        Ok(())
    }

    fn object(&self) -> &Document {
        &self.root
    }

    fn validate(&self) -> SettingsResult<()> {
        for (name, var) in self.vars.prompt.iter().filter(|(_, var)| var.required) {
            let value = self.root.lookup(name).and_then(Document::as_str);
            if value.map_or(true, str::is_empty) {
                let hint = if var.description.is_empty() {
                    "no value was given".to_string()
                } else {
                    var.description.clone()
                };
                return Err(SettingsError::Required {
                    name: name.clone(),
                    hint,
                });
            }
        }
        Ok(())
    }
}

/// Flatten a document into dotted-name settings, depth-first in key order.
///
/// Objects with at least one child are recursed into; every other node is a
/// leaf and must be a string.
pub fn flatten(root: &Document) -> SettingsResult<Vec<Setting>> {
    let Document::Object(children) = root else {
        return Err(SettingsError::Traversal(format!(
            "root of the settings document is a {}, not an object",
            root.type_name()
        )));
    };

    let mut settings = Vec::new();
    flatten_into(children, "", &mut settings)?;
    Ok(settings)
}

fn flatten_into(
    children: &BTreeMap<String, Document>,
    prefix: &str,
    settings: &mut Vec<Setting>,
) -> SettingsResult<()> {
    for (key, child) in children {
        if key.is_empty() || key.contains('.') {
            return Err(SettingsError::Traversal(format!(
                "key '{}{}' cannot be addressed by a dotted name",
                prefix, key
            )));
        }

        let name = format!("{}{}", prefix, key);
        match child {
            Document::Object(grandchildren) if !grandchildren.is_empty() => {
                flatten_into(grandchildren, &format!("{}.", name), settings)?;
            }
            Document::String(value) => settings.push(Setting::new(name, value.clone())),
            other => {
                return Err(SettingsError::TypeMismatch {
                    name,
                    found: other.type_name(),
                })
            }
        }
    }
    Ok(())
}
