//! Discovery of the config file inside a template.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};
use crate::store::ConfigFormat;

/// Directory inside a template root that holds the config file.
pub const CONFIG_DIR: &str = ".stencil";

/// Base name of the config file, before its extension.
pub const CONFIG_BASE_NAME: &str = ".stencil";

/// Find the single config file under `<template_root>/.stencil/`.
pub fn find_config_file(template_root: &Path) -> SettingsResult<PathBuf> {
    let config_dir = template_root.join(CONFIG_DIR);
    if !config_dir.is_dir() {
        return Err(SettingsError::InvalidConfigPath {
            path: config_dir,
            reason: "stencil configuration folder not found".to_string(),
        });
    }

    let pattern = format!(
        "{}/{}.*",
        Pattern::escape(&config_dir.to_string_lossy()),
        CONFIG_BASE_NAME
    );
    let candidates = glob::glob(&pattern).map_err(|e| SettingsError::InvalidConfigPath {
        path: config_dir.clone(),
        reason: e.to_string(),
    })?;

    let matches: Vec<PathBuf> = candidates
        .filter_map(Result::ok)
        .filter(|p| p.is_file() && ConfigFormat::from_path(p).is_some())
        .collect();
    debug!("Config candidates in {:?}: {:?}", config_dir, matches);

    match matches.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(SettingsError::InvalidConfigPath {
            path: config_dir,
            reason: format!(
                "no {} config file found (expected one of {})",
                CONFIG_BASE_NAME,
                ConfigFormat::EXTENSIONS.join(", ")
            ),
        }),
        _ => Err(SettingsError::InvalidConfigPath {
            path: config_dir,
            reason: format!("multiple config files found: {:?}", matches),
        }),
    }
}
