//! # stencil_templates
//!
//! Template parsing and rendering for stencil.
//!
//! Both the relative path of every template entry and the contents of every
//! template file go through the same engine, a subset of Go's
//! `text/template` syntax:
//!
//! - `{{.Project.Name}}` dotted field access (a missing field is an error)
//! - `{{.}}` and `{{"literal"}}`
//! - `{{/* comments */}}` and `{{-` / `-}}` whitespace trimming
//! - `{{define "name"}}...{{end}}` and `{{template "name" .Data}}`
//!
//! ## Example
//!
//! ```rust
//! use stencil_settings::Document;
//! use stencil_templates::{Renderer, TemplateRenderer};
//!
//! let context: Document = [("Project", "demo")].into_iter().collect();
//! let renderer = TemplateRenderer::new();
//!
//! let path = renderer.render_path("{{.Project}}/README.md", &context).unwrap();
//! assert_eq!(path, "demo/README.md");
//! ```

pub mod error;
mod exec;
mod parse;
pub mod renderer;

pub use error::{TemplateError, TemplateResult};
pub use renderer::{Renderer, TemplateRenderer};
