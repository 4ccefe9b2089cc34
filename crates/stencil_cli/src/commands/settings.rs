//! Settings command - List the settings a template accepts.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use stencil_core::TemplateSource;
use stencil_settings::{find_config_file, ConfigStore, Setting, SettingsStore};

#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Local template directory or git repository URL
    pub source: String,
}

pub fn execute(args: SettingsArgs) -> Result<()> {
    let source = TemplateSource::resolve(&args.source)
        .with_context(|| format!("Failed to resolve template '{}'", args.source))?;
    let config = find_config_file(source.root()).context("Failed to locate template settings")?;
    let store = SettingsStore::load(&config)
        .with_context(|| format!("Failed to load settings from {}", config.display()))?;

    let settings = store.get_all_values()?;
    write_settings(&mut std::io::stdout().lock(), &settings)?;
    Ok(())
}

/// One `name = value` line per setting.
fn write_settings(out: &mut impl Write, settings: &[Setting]) -> std::io::Result<()> {
    for setting in settings {
        writeln!(out, "{} = {}", setting.name, setting.value)?;
    }
    out.flush()
}
