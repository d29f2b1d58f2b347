//! `qtbuild install` command

use std::sync::Arc;

use anyhow::Result;

use super::build::load_project;
use crate::cli::InstallArgs;
use qtbuild::ops::install;
use qtbuild::util::Reporter;

pub fn execute(args: InstallArgs, shell: Arc<dyn Reporter>) -> Result<()> {
    let (manifest, options, target_dir) = load_project(args.project, false)?;

    install(manifest, options, &target_dir, shell)?;

    Ok(())
}
