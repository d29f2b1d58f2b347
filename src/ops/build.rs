//! Implementation of `qtbuild build`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::{BuildOptions, QmakeBuilder};
use crate::core::Manifest;
use crate::util::config::BuildConfig;
use crate::util::{Reporter, Status};

/// Flags given on the command line. Anything left unset falls back to the
/// configuration files.
#[derive(Debug, Clone, Default)]
pub struct BuildFlags {
    /// Path to qmake
    pub qmake: Option<PathBuf>,

    /// Spec to build with
    pub spec: Option<String>,

    /// Number of parallel jobs passed to make
    pub jobs: Option<usize>,

    /// Extra qmake lines, added after those from config files
    pub qmake_settings: Vec<String>,

    /// Generate the Makefiles only
    pub no_make: bool,
}

/// Merge command line flags over the `[build]` configuration.
pub fn merge_options(config: &BuildConfig, flags: BuildFlags) -> BuildOptions {
    let mut qmake_settings = config.qmake_settings.clone();
    qmake_settings.extend(flags.qmake_settings);

    BuildOptions {
        qmake: flags.qmake.or_else(|| config.qmake.clone()),
        spec: flags.spec.or_else(|| config.spec.clone()),
        jobs: flags.jobs.or(config.jobs),
        make: config.make.clone(),
        qmake_settings,
        no_make: flags.no_make,
    }
}

/// The default directory modules are installed into, `<project>/install`.
pub fn default_target_dir(manifest: &Manifest) -> PathBuf {
    manifest.manifest_dir.join("install")
}

/// Build a project. Returns the paths that installing it will create.
pub fn build(
    manifest: Manifest,
    options: BuildOptions,
    target_dir: &Path,
    reporter: Arc<dyn Reporter>,
) -> Result<Vec<PathBuf>> {
    let builder = QmakeBuilder::configure(manifest, options, Arc::clone(&reporter))?;

    let installed = builder.build_project(target_dir)?;
    for path in &installed {
        reporter.verbose(&path.display());
    }

    reporter.status(
        Status::Finished,
        &format!("{} in {}", builder.manifest().project.name, builder.build_dir().display()),
    );

    Ok(installed)
}
