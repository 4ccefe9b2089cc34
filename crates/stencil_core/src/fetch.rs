//! Locating a template: a local directory or a git repository.
//!
//! Remote templates are cloned with the system `git` into a temporary
//! directory that is removed when the [`TemplateSource`] is dropped.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};

/// A template root resolved to local disk.
#[derive(Debug)]
pub struct TemplateSource {
    root: PathBuf,
    clone: Option<TempDir>,
}

impl TemplateSource {
    /// Resolve user input to a template directory.
    ///
    /// An existing local directory wins; otherwise the input is treated as a
    /// git URL when git is installed.
    pub fn resolve(input: &str) -> CoreResult<Self> {
        if is_path(input) {
            debug!("Using local template at {}", input);
            return Ok(Self::local(input));
        }

        if !is_git_available() {
            warn!("git is not installed; cannot treat {} as a repository", input);
        } else if is_git_url(input) {
            return pull_template(input);
        }

        Err(CoreError::Fetch(format!(
            "unable to find a local path or git repository using '{}'",
            input
        )))
    }

    /// A template that already lives on disk.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clone: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True if the template was cloned and will be deleted on drop.
    pub fn is_remote(&self) -> bool {
        self.clone.is_some()
    }
}

/// True if `input` names an existing directory.
pub fn is_path(input: &str) -> bool {
    Path::new(input).is_dir()
}

/// Check if Git is available on the system.
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// True if `git ls-remote` accepts `input` as a repository.
pub fn is_git_url(input: &str) -> bool {
    match Command::new("git")
        .args(["ls-remote", input])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
    {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            debug!(
                "git ls-remote {} failed: {}",
                input,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            false
        }
        Err(e) => {
            debug!("Failed to run git ls-remote: {}", e);
            false
        }
    }
}

/// Clone `repo` into a fresh temporary directory.
pub fn pull_template(repo: &str) -> CoreResult<TemplateSource> {
    let dir = tempfile::Builder::new()
        .prefix("template-")
        .tempdir()
        .map_err(|e| CoreError::Fetch(format!("Failed to create temporary directory: {}", e)))?;

    info!("Cloning {} into {}", repo, dir.path().display());
    let output = Command::new("git")
        .arg("clone")
        .arg(repo)
        .arg(dir.path())
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CoreError::Fetch(format!("Failed to run git clone: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoreError::Fetch(format!("git clone failed: {}", stderr.trim())));
    }

    Ok(TemplateSource {
        root: dir.path().to_path_buf(),
        clone: Some(dir),
    })
}
