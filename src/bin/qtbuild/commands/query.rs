//! `qtbuild query` command
//!
//! Shows what qmake reports about a Qt installation and the build settings
//! derived from it.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::QueryArgs;
use qtbuild::builder::{BuildError, QtConfiguration};
use qtbuild::util::config::load_for_project;
use qtbuild::util::process::{find_executable, resolve_tool};
use qtbuild::util::Reporter;

pub fn execute(args: QueryArgs, shell: Arc<dyn Reporter>) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_for_project(&cwd);

    let qmake = match args.qmake.or(config.build.qmake) {
        Some(qmake) => resolve_tool(&qmake).ok_or_else(|| BuildError::MissingTool {
            tool: qmake.display().to_string(),
        })?,
        None => find_executable("qmake").ok_or_else(|| BuildError::MissingTool {
            tool: "qmake".to_string(),
        })?,
    };

    let qt = QtConfiguration::query(&qmake, shell.as_ref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&qt)?);
        return Ok(());
    }

    println!("qmake:       {}", qt.qmake.display());
    println!("Qt version:  {}", qt.version());
    println!("Version tag: {}", qt.version().tag());
    println!("Spec:        {}", qt.default_spec().unwrap_or_default());
    println!("Platform:    {}", qt.py_platform());
    println!();

    for (name, value) in &qt.values {
        println!("{}: {}", name, value.as_deref().unwrap_or(""));
    }

    Ok(())
}
