//! The optional `vars` section of a config file.
//!
//! ```yaml
//! vars:
//!   prompt:
//!     Name: { type: string, description: Project name, default: demo, required: true }
//!     License: { type: select(string), options: [MIT, Apache-2.0] }
//!   static:
//!     Generator: stencil
//! ```
//!
//! Prompt variables become settings holding their default. Static variables
//! are added to the template context but are never offered for override.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::document::Document;

/// Top-level key holding the variable declarations.
pub const VARS_KEY: &str = "vars";

/// Declared template variables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TemplateVars {
    pub prompt: BTreeMap<String, PromptVar>,
    #[serde(rename = "static")]
    pub fixed: BTreeMap<String, String>,
}

/// How a prompt variable is asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum PromptKind {
    #[default]
    #[serde(rename = "string")]
    Text,
    #[serde(rename = "select(string)")]
    Select,
}

/// One variable offered for override.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PromptVar {
    #[serde(rename = "type")]
    pub kind: PromptKind,
    pub description: String,
    pub default: String,
    pub options: Vec<String>,
    pub required: bool,
}

impl TemplateVars {
    /// Read the declarations from the `vars` node of a document.
    pub fn from_document(section: &Document) -> Result<Self, String> {
        let value = serde_json::to_value(section).map_err(|e| e.to_string())?;
        let vars: Self = serde_json::from_value(value).map_err(|e| format!("invalid vars: {}", e))?;

        for (name, var) in &vars.prompt {
            if var.kind == PromptKind::Select && var.options.is_empty() {
                return Err(format!("select variable '{}' has no options", name));
            }
            if !var.default.is_empty() && !var.accepts(&var.default) {
                return Err(format!(
                    "default '{}' of '{}' is not one of its options",
                    var.default, name
                ));
            }
        }
        Ok(vars)
    }
}

impl PromptVar {
    /// Value the setting starts with.
    pub fn initial(&self) -> &str {
        match (self.default.is_empty(), self.kind, self.options.first()) {
            (true, PromptKind::Select, Some(first)) => first,
            _ => &self.default,
        }
    }

    /// True if `value` may be assigned to this variable.
    pub fn accepts(&self, value: &str) -> bool {
        match self.kind {
            PromptKind::Text => true,
            PromptKind::Select => self.options.iter().any(|option| option == value),
        }
    }
}
