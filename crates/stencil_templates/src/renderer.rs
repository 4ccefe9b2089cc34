//! Path and file rendering.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use stencil_settings::Document;

use crate::error::{TemplateError, TemplateResult};
use crate::parse;

/// Name given to the template parsed from a path string.
const PATH_TEMPLATE: &str = "path";

/// Renders template text against a settings document.
pub trait Renderer {
    /// Render a relative path string.
    fn render_path(&self, path: &str, context: &Document) -> TemplateResult<String>;

    /// Render the file at `source` into `out`.
    ///
    /// Execution starts at the template named after the file's base name, so
    /// a file may `define` helper blocks alongside its own content.
    fn render_file(
        &self,
        source: &Path,
        context: &Document,
        out: &mut dyn Write,
    ) -> TemplateResult<()>;
}

/// The default [`Renderer`]: Go-style `{{.Field}}` templates with strict
/// field access.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self
    }

    /// Parse `source` as a template called `name` and execute it.
    ///
    /// `label` identifies the template in error messages.
    fn render_named(
        &self,
        name: &str,
        label: &str,
        source: &[u8],
        context: &Document,
    ) -> TemplateResult<Vec<u8>> {
        let set = parse::parse(name, source)
            .map_err(|failure| TemplateError::parse(label, failure.to_string()))?;
        set.execute(name, context)
            .map_err(|message| TemplateError::exec(label, message))
    }
}

impl Renderer for TemplateRenderer {
    fn render_path(&self, path: &str, context: &Document) -> TemplateResult<String> {
        let rendered = self.render_named(PATH_TEMPLATE, path, path.as_bytes(), context)?;
        String::from_utf8(rendered)
            .map_err(|_| TemplateError::exec(path, "rendered path is not valid UTF-8"))
    }

    fn render_file(
        &self,
        source: &Path,
        context: &Document,
        out: &mut dyn Write,
    ) -> TemplateResult<()> {
        let io_err = |source_err| TemplateError::Io {
            path: source.to_path_buf(),
            source: source_err,
        };

        let label = source.display().to_string();
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TemplateError::parse(&label, "path has no file name"))?;

        let bytes = fs::read(source).map_err(io_err)?;
        let rendered = self.render_named(&name, &label, &bytes, context)?;
        out.write_all(&rendered).map_err(io_err)?;
        debug!("Rendered {} ({} bytes)", label, rendered.len());
        Ok(())
    }
}
