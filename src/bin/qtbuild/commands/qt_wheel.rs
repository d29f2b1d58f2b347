//! `qtbuild qt-wheel` command

use std::sync::Arc;

use anyhow::{Context, Result};

use super::bundle::windows_dlls;
use crate::cli::QtWheelArgs;
use qtbuild::ops::{qt_wheel, QtWheelOptions};
use qtbuild::util::config::load_for_project;
use qtbuild::util::Reporter;

pub fn execute(args: QtWheelArgs, shell: Arc<dyn Reporter>) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_for_project(&cwd).bundle;

    let mut exclude = config.exclude.clone();
    exclude.extend(args.exclude);

    let options = QtWheelOptions {
        package: args.package,
        qt_dir: args.qt_dir,
        output_dir: args.output_dir,
        build_tag: args.build_tag,
        windows: windows_dlls(args.windows, &config),
        exclude,
    };

    qt_wheel(&options, shell)?;

    Ok(())
}
