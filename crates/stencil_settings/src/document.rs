//! The nested configuration document.
//!
//! A [`Document`] is the parsed form of a `.stencil` config file. It is the
//! value that flattening walks and the context every template renders
//! against, so it keeps enough type information to report a non-string leaf
//! instead of coercing it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Document {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Document>),
    Object(BTreeMap<String, Document>),
}

impl Default for Document {
    fn default() -> Self {
        Document::Object(BTreeMap::new())
    }
}

impl Document {
    /// Create an empty object document.
    pub fn object() -> Self {
        Self::default()
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get a direct child of an object node.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Resolve a dotted name such as `Project.User.Name`.
    pub fn lookup(&self, dotted: &str) -> Option<&Document> {
        dotted
            .split('.')
            .try_fold(self, |node, segment| node.get(segment))
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Document::String(value)
    }
}

impl<K: Into<String>, V: Into<Document>> FromIterator<(K, V)> for Document {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Document::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
