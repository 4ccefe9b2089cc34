//! # stencil_core
//!
//! The generation pipeline for stencil.
//!
//! # Architecture
//!
//! - **Fetch**: resolves the user's template argument to a local directory,
//!   cloning git repositories into a temporary directory
//! - **Negotiator**: offers each flattened setting for override and writes
//!   the changes back to the store
//! - **Materializer**: walks the template tree and renders every path and
//!   file into the output directory
//! - **Pipeline**: runs the steps above in order for one request
//!
//! # Example
//!
//! ```rust,no_run
//! use stencil_core::{GenerateRequest, Generator, TemplateSource, TerminalInput};
//! use stencil_settings::{find_config_file, SettingsStore};
//! use stencil_templates::TemplateRenderer;
//!
//! let source = TemplateSource::resolve("./my-template").unwrap();
//! let mut store = SettingsStore::load(find_config_file(source.root()).unwrap()).unwrap();
//! let renderer = TemplateRenderer::new();
//! let mut input = TerminalInput::new();
//!
//! let request = GenerateRequest::new(source.root(), "./out");
//! let outcome = Generator::new(&mut store, &renderer, &mut input)
//!     .run(&request)
//!     .unwrap();
//! println!("{} files written", outcome.report.files.len());
//! ```

pub mod error;
pub mod fetch;
pub mod materializer;
pub mod negotiator;
pub mod pipeline;
pub mod prompt;

pub use error::{CoreError, CoreResult};
pub use fetch::TemplateSource;
pub use materializer::{is_ignored, MaterializeReport, TreeMaterializer, IGNORED_COMPONENTS};
pub use negotiator::{negotiate, offer_overrides, InputCollaborator};
pub use pipeline::{GenerateOutcome, GenerateRequest, Generator};
pub use prompt::TerminalInput;
