//! Use command - Generate a project from a template.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use stencil_core::{GenerateRequest, Generator, TemplateSource, TerminalInput};
use stencil_settings::{find_config_file, SettingsStore};
use stencil_templates::TemplateRenderer;

#[derive(Args, Debug)]
pub struct UseArgs {
    /// Local template directory or git repository URL
    pub source: String,

    /// Output directory (defaults to the current directory)
    #[arg(short, long, env = "STENCIL_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Override a setting before prompting, e.g. --set Project.Name=demo
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_override)]
    pub set: Vec<(String, String)>,

    /// Do not offer settings for interactive override
    #[arg(long, env = "STENCIL_NO_PROMPT")]
    pub no_prompt: bool,
}

/// Split `NAME=VALUE` at the first `=`.
fn parse_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

pub fn execute(args: UseArgs) -> Result<()> {
    let output_root = match args.output {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    let source = TemplateSource::resolve(&args.source)
        .with_context(|| format!("Failed to resolve template '{}'", args.source))?;
    info!("Using template at {}", source.root().display());
    if source.is_remote() {
        info!("The cloned template is removed once generation finishes");
    }

    let config = find_config_file(source.root()).context("Failed to locate template settings")?;
    let mut store = SettingsStore::load(&config)
        .with_context(|| format!("Failed to load settings from {}", config.display()))?;
    if let Some(name) = store.lookup("metadata.name").and_then(|doc| doc.as_str()) {
        info!("Template: {}", name);
    }

    let mut request = GenerateRequest::new(source.root(), &output_root).prompt(!args.no_prompt);
    for (name, value) in args.set {
        request = request.with_override(name, value);
    }

    let renderer = TemplateRenderer::new();
    let mut input = TerminalInput::new();
    let outcome = Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .context("Failed to generate project")?;

    println!(
        "Project generated in {} ({} directories, {} files)",
        output_root.display(),
        outcome.report.directories.len(),
        outcome.report.files.len()
    );
    if !outcome.overridden.is_empty() {
        println!("Overridden settings:");
        for setting in &outcome.overridden {
            println!("  {} = {}", setting.name, setting.value);
        }
    }

    Ok(())
}
