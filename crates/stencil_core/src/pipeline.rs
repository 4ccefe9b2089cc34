//! Run orchestration: settings, overrides, then materialization.

use std::path::PathBuf;

use tracing::info;

use stencil_settings::{ConfigStore, Setting};
use stencil_templates::Renderer;

use crate::error::CoreResult;
use crate::materializer::{MaterializeReport, TreeMaterializer};
use crate::negotiator::{offer_overrides, InputCollaborator};

/// Everything a single generation run needs to know.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub template_root: PathBuf,
    pub output_root: PathBuf,
    /// Values applied before prompting, e.g. from `--set`.
    pub overrides: Vec<Setting>,
    /// Whether to offer every setting to the input collaborator.
    pub prompt: bool,
}

impl GenerateRequest {
    pub fn new(template_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            template_root: template_root.into(),
            output_root: output_root.into(),
            overrides: Vec::new(),
            prompt: true,
        }
    }

    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push(Setting::new(name, value));
        self
    }

    pub fn prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOutcome {
    /// Settings changed by the input collaborator.
    pub overridden: Vec<Setting>,
    pub report: MaterializeReport,
}

/// Composes a config store, a renderer and an input collaborator.
pub struct Generator<'a, S: ?Sized, R: ?Sized, I: ?Sized> {
    store: &'a mut S,
    renderer: &'a R,
    input: &'a mut I,
}

impl<'a, S, R, I> Generator<'a, S, R, I>
where
    S: ConfigStore + ?Sized,
    R: Renderer + ?Sized,
    I: InputCollaborator + ?Sized,
{
    pub fn new(store: &'a mut S, renderer: &'a R, input: &'a mut I) -> Self {
        Self {
            store,
            renderer,
            input,
        }
    }

    /// Apply overrides, negotiate, then render the template tree.
    ///
    /// The settings are not touched again once materialization starts.
    pub fn run(&mut self, request: &GenerateRequest) -> CoreResult<GenerateOutcome> {
        if !request.overrides.is_empty() {
            info!("Applying {} explicit overrides", request.overrides.len());
            self.store.set_values(&request.overrides)?;
        }

        let overridden = if request.prompt {
            offer_overrides(self.store, self.input)?
        } else {
            Vec::new()
        };
        self.store.validate()?;

        let report = TreeMaterializer::new(self.renderer).materialize(
            &request.template_root,
            &request.output_root,
            self.store.object(),
        )?;

        Ok(GenerateOutcome { overridden, report })
    }
}
