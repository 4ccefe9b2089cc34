//! # stencil_settings
//!
//! Settings for stencil templates.
//!
//! A template ships a nested JSON or YAML document under `.stencil/`. This
//! crate loads it, flattens it into dotted-name [`Setting`]s for override,
//! writes overrides back, and hands the whole [`Document`] to the renderer.
//! An optional `vars` section declares prompt variables with defaults and
//! static values, see [`vars`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use stencil_settings::{find_config_file, ConfigStore, Setting, SettingsStore};
//! use std::path::Path;
//!
//! let path = find_config_file(Path::new("my-template")).unwrap();
//! let mut store = SettingsStore::load(path).unwrap();
//!
//! for setting in store.get_all_values().unwrap() {
//!     println!("{} = {}", setting.name, setting.value);
//! }
//! store.set_values(&[Setting::new("Project.Name", "demo")]).unwrap();
//! ```

pub mod document;
pub mod error;
pub mod locate;
pub mod store;
pub mod vars;

pub use document::Document;
pub use error::{SettingsError, SettingsResult};
pub use locate::{find_config_file, CONFIG_BASE_NAME, CONFIG_DIR};
pub use store::{flatten, ConfigFormat, ConfigStore, Setting, SettingsStore};
pub use vars::{PromptKind, PromptVar, TemplateVars, VARS_KEY};
