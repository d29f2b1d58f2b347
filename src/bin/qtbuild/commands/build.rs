//! `qtbuild build` command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{BuildArgs, ProjectArgs};
use qtbuild::builder::BuildOptions;
use qtbuild::core::{find_manifest, Manifest};
use qtbuild::ops::{build, default_target_dir, merge_options, BuildFlags};
use qtbuild::util::config::load_for_project;
use qtbuild::util::Reporter;

/// Load the manifest and merge the configuration files with the flags.
pub fn load_project(
    args: ProjectArgs,
    no_make: bool,
) -> Result<(Manifest, BuildOptions, PathBuf)> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let manifest_path = match args.manifest_path {
        Some(path) => path,
        None => find_manifest(&cwd)?,
    };
    let manifest_path = std::path::absolute(&manifest_path)
        .with_context(|| format!("failed to resolve {}", manifest_path.display()))?;
    let manifest = Manifest::load(&manifest_path)?;

    // Configuration: CLI > project > global
    let config = load_for_project(&manifest.manifest_dir);
    let options = merge_options(
        &config.build,
        BuildFlags {
            qmake: args.qmake,
            spec: args.spec,
            jobs: args.jobs,
            qmake_settings: args.qmake_settings,
            no_make,
        },
    );

    let target_dir = match args.target_dir {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("failed to resolve {}", dir.display()))?,
        None => default_target_dir(&manifest),
    };

    Ok((manifest, options, target_dir))
}

pub fn execute(args: BuildArgs, shell: Arc<dyn Reporter>) -> Result<()> {
    let (manifest, options, target_dir) = load_project(args.project, args.no_make)?;

    build(manifest, options, &target_dir, shell)?;

    Ok(())
}
