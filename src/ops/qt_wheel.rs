//! Implementation of `qtbuild qt-wheel`.
//!
//! Creates a wheel containing only the parts of a Qt installation a package
//! needs, for packages that depend on Qt being installed separately.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::bundle::package::Package;
use crate::bundle::wheel::{self, WheelName};
use crate::bundle::{AssetBundler, BundleError};
use crate::core::PlatformFamily;
use crate::ops::bundle::{bundle_windows_dlls, windows_dlls_dir, WindowsDlls};
use crate::util::fs::{ensure_dir, join_slashed, remove_dir_all_if_exists, write_string};
use crate::util::{Reporter, Status};

/// Options for creating a Qt wheel.
#[derive(Debug, Clone, Default)]
pub struct QtWheelOptions {
    /// The package the wheel is for, eg. `PyQt6`
    pub package: String,

    /// The Qt installation, eg. `/opt/Qt/6.5.2/gcc_64`
    pub qt_dir: PathBuf,

    /// Where the wheel is written
    pub output_dir: PathBuf,

    /// An optional build tag
    pub build_tag: Option<String>,

    pub windows: WindowsDlls,

    /// Qt components not to include
    pub exclude: Vec<String>,
}

/// The wheel platform tag for the architecture directory of a Qt
/// installation.
pub fn qt_platform_tag(qt_dir: &Path, qt_major: u8) -> Result<String> {
    let arch = qt_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let tag = match arch.as_str() {
        "gcc_64" if qt_major >= 6 => "manylinux_2_28_x86_64",
        "gcc_64" => "manylinux2014_x86_64",
        "clang_64" if qt_major >= 6 => "macosx_10_14_intel",
        "clang_64" => "macosx_10_13_intel",
        // Qt 6 installations built for both architectures.
        "macos" => "macosx_10_14_universal2",
        a if a.starts_with("msvc") && a.ends_with("_64") => "win_amd64",
        a if a.starts_with("msvc") => "win32",
        _ => return Err(BundleError::UnsupportedQtArch { arch }.into()),
    };

    Ok(tag.to_string())
}

/// Create a wheel of the Qt needed by a package. Returns the path of the
/// wheel.
pub fn qt_wheel(options: &QtWheelOptions, reporter: Arc<dyn Reporter>) -> Result<PathBuf> {
    let package =
        Package::for_qt(&options.package, &options.qt_dir)?.with_reporter(Arc::clone(&reporter));
    let profile = package.profile();
    let qt_version = package.qt_version();

    let platform = qt_platform_tag(&options.qt_dir, profile.qt_major)?;
    let family = PlatformFamily::from_tag(&platform).ok_or_else(|| {
        BundleError::UnsupportedPlatform {
            tag: platform.clone(),
        }
    })?;

    let name = WheelName {
        distribution: profile.companion_name(),
        version: qt_version.to_string(),
        python: "py3".to_string(),
        abi: "none".to_string(),
        platform,
        unlicensed: false,
    };
    let build_tag = options.build_tag.as_deref();

    let output = options.output_dir.join(name.file_name(build_tag));
    if output.exists() {
        return Err(BundleError::WouldOverwrite { path: output }.into());
    }

    let scratch = options.output_dir.join(name.stem(build_tag));
    let target_qt_dir = join_slashed(&scratch, &profile.target_qt_dir());

    // A Qt wheel is best effort: not every installation has every module.
    let bundler = AssetBundler::new(&options.qt_dir, &target_qt_dir, family, qt_version)
        .ignore_missing(true)
        .exclude(options.exclude.clone())
        .with_reporter(Arc::clone(&reporter));

    bundler.preflight(profile.table)?;
    let dlls_dir = windows_dlls_dir(&options.windows, &name.platform)?;

    remove_dir_all_if_exists(&scratch)?;
    ensure_dir(&scratch)?;

    let lgpl = bundler.bundle_table(profile.table)?;

    if let Some(dlls_dir) = &dlls_dir {
        bundle_windows_dlls(&package, &target_qt_dir, &name.platform, &options.windows, dlls_dir)?;
    }

    let dist_info = format!("{}-{}.dist-info", name.distribution, name.version);
    write_dist_info(&scratch.join(&dist_info), &name, build_tag, lgpl)?;

    reporter.status(Status::Packing, &output.display());
    wheel::pack(&scratch, &dist_info, &output)?;
    remove_dir_all_if_exists(&scratch)?;

    reporter.status(Status::Finished, &output.display());

    Ok(output)
}

/// Write the METADATA and WHEEL files of a Qt wheel.
fn write_dist_info(
    dist_info: &Path,
    name: &WheelName,
    build_tag: Option<&str>,
    lgpl: bool,
) -> Result<()> {
    let license = if lgpl { "LGPL v3" } else { "GPL v3" };

    let metadata = format!(
        "Metadata-Version: 1.2\n\
         Name: {}\n\
         Version: {}\n\
         Summary: The subset of a Qt installation needed by {}.\n\
         License: {}\n",
        name.distribution.replace('_', "-"),
        name.version,
        name.distribution
            .rsplit_once("_Qt")
            .map_or(name.distribution.as_str(), |(package, _)| package),
        license,
    );
    write_string(&dist_info.join("METADATA"), &metadata)?;

    let mut wheel_file = format!(
        "Wheel-Version: 1.0\n\
         Generator: qtbuild {}\n\
         Root-Is-Purelib: false\n\
         Tag: {}-{}-{}\n",
        env!("CARGO_PKG_VERSION"),
        name.python,
        name.abi,
        name.platform,
    );
    if let Some(build_tag) = build_tag {
        wheel_file.push_str(&format!("Build: {}\n", build_tag));
    }
    write_string(&dist_info.join("WHEEL"), &wheel_file)?;

    Ok(())
}
