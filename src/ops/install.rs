//! Implementation of `qtbuild install`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::{BuildOptions, QmakeBuilder};
use crate::core::Manifest;
use crate::util::{Reporter, Status};

/// Build a project and install it into `target_dir`. Returns the installed
/// paths.
pub fn install(
    manifest: Manifest,
    mut options: BuildOptions,
    target_dir: &Path,
    reporter: Arc<dyn Reporter>,
) -> Result<Vec<PathBuf>> {
    // Installing needs the build.
    options.no_make = false;

    let builder = QmakeBuilder::configure(manifest, options, Arc::clone(&reporter))?;
    let installed = builder.build_project(target_dir)?;
    builder.install_project()?;

    for path in &installed {
        reporter.verbose(&path.display());
    }

    reporter.status(
        Status::Finished,
        &format!(
            "{} installed in {}",
            builder.manifest().project.name,
            target_dir.display()
        ),
    );

    Ok(installed)
}
