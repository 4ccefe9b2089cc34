//! Materialization of a template tree into an output directory.
//!
//! Every entry below the template root is visited depth-first, directories
//! before their contents. The entry's relative path is rendered to find its
//! target, directories are created with the source's permissions and files
//! are rendered and written with the source's permissions. The first failure
//! stops the walk; output written so far stays on disk.

use std::fs::{self, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use stencil_settings::{Document, CONFIG_DIR};
use stencil_templates::Renderer;

use crate::error::{CoreError, CoreResult};

/// Path components that cause an entry and everything below it to be skipped.
pub const IGNORED_COMPONENTS: [&str; 2] = [".git", CONFIG_DIR];

/// What a materialization run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Directories created, in creation order.
    pub directories: Vec<PathBuf>,
    /// Files written, in creation order.
    pub files: Vec<PathBuf>,
    /// Template entries skipped by the ignore list.
    pub skipped: Vec<PathBuf>,
}

/// Walks a template tree and renders it into an output directory.
pub struct TreeMaterializer<'a, R: ?Sized> {
    renderer: &'a R,
}

impl<'a, R: Renderer + ?Sized> TreeMaterializer<'a, R> {
    pub fn new(renderer: &'a R) -> Self {
        Self { renderer }
    }

    /// Render every entry of `template_root` into `output_root`.
    pub fn materialize(
        &self,
        template_root: &Path,
        output_root: &Path,
        context: &Document,
    ) -> CoreResult<MaterializeReport> {
        info!(
            "Materializing {} into {}",
            template_root.display(),
            output_root.display()
        );

        let mut report = MaterializeReport::default();
        let mut walker = WalkDir::new(template_root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|source| CoreError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| template_root.to_path_buf()),
                source,
            })?;
            let source = entry.path();
            let relative = source.strip_prefix(template_root).unwrap_or(source);

            if is_ignored(relative) {
                debug!("Skipping {}", source.display());
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                report.skipped.push(relative.to_path_buf());
                continue;
            }

            let target = self.target_path(relative, output_root, context)?;
            let permissions = entry
                .metadata()
                .map_err(|e| CoreError::Walk {
                    path: source.to_path_buf(),
                    source: e,
                })?
                .permissions();

            info!("Creating {} -> {}", source.display(), target.display());

            if entry.file_type().is_dir() {
                if target.is_dir() {
                    debug!("{} already exists", target.display());
                    continue;
                }
                create_dir(&target, &permissions).map_err(|e| CoreError::DirectoryCreate {
                    path: target.clone(),
                    source: e,
                })?;
                report.directories.push(target);
            } else {
                let mut rendered = Vec::new();
                self.renderer
                    .render_file(source, context, &mut rendered)
                    .map_err(|e| CoreError::ContentRender {
                        path: source.to_path_buf(),
                        source: e,
                    })?;

                if let Some(parent) = target.parent().filter(|p| !p.exists()) {
                    fs::create_dir_all(parent).map_err(|e| CoreError::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }
                write_file(&target, &rendered, &permissions).map_err(|e| {
                    CoreError::FileCreate {
                        path: target.clone(),
                        source: e,
                    }
                })?;
                report.files.push(target);
            }
        }

        info!(
            "Created {} directories and {} files",
            report.directories.len(),
            report.files.len()
        );
        Ok(report)
    }

    /// Render a path relative to the template root and join it onto
    /// `output_root`.
    pub fn target_path(
        &self,
        relative: &Path,
        output_root: &Path,
        context: &Document,
    ) -> CoreResult<PathBuf> {
        let text = relative.to_string_lossy();
        let rendered = self
            .renderer
            .render_path(&text, context)
            .map_err(|e| CoreError::PathRender {
                path: relative.to_path_buf(),
                source: e,
            })?;

        // Joined like `filepath.Join`: roots and empty segments collapse,
        // `..` may only climb back up within the output directory.
        let mut target = PathBuf::new();
        for component in Path::new(&rendered).components() {
            match component {
                Component::Normal(part) => target.push(part),
                Component::ParentDir if target.pop() => {}
                Component::ParentDir => {
                    return Err(CoreError::UnsafeTargetPath {
                        path: relative.to_path_buf(),
                        rendered: rendered.clone(),
                    })
                }
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            }
        }

        Ok(output_root.join(target))
    }
}

/// True if any component of `relative` is on the ignore list.
pub fn is_ignored(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => IGNORED_COMPONENTS.iter().any(|ignored| name == *ignored),
        _ => false,
    })
}

#[cfg(unix)]
fn mode_of(permissions: &Permissions) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    permissions.mode() & 0o7777
}

fn create_dir(path: &Path, permissions: &Permissions) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode_of(permissions));
    }
    builder.create(path)?;
    // Like files, directories keep the source bits regardless of the umask.
    fs::set_permissions(path, source_permissions(permissions))
}

fn source_permissions(permissions: &Permissions) -> Permissions {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Permissions::from_mode(mode_of(permissions))
    }
    #[cfg(not(unix))]
    {
        permissions.clone()
    }
}

fn write_file(path: &Path, contents: &[u8], permissions: &Permissions) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode_of(permissions));
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    drop(file);

    // The creation mode is filtered by the umask; restore the source bits.
    fs::set_permissions(path, source_permissions(permissions))
}
