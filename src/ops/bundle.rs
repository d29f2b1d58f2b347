//! Implementation of `qtbuild bundle`.
//!
//! An existing wheel is unpacked, the parts of a Qt installation it needs
//! are copied into it and it is packed again under a new build tag. The
//! original wheel is only ever read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::bundle::package::Package;
use crate::bundle::wheel::{self, WheelName};
use crate::bundle::{AssetBundler, BundleError};
use crate::core::PlatformFamily;
use crate::util::config::global_config_dir;
use crate::util::fs::{
    ensure_dir, join_slashed, read_to_string, remove_dir_all_if_exists, remove_file_if_exists,
    sorted_dir_names, write_string,
};
use crate::util::{Reporter, Status};

/// The part of an existing bundle that survives re-bundling.
const PROTECTED_SUBDIR: &str = "qsci";

/// Options for bundling Qt with a wheel.
#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    /// The wheel to bundle Qt with
    pub wheel: PathBuf,

    /// The Qt installation, eg. `/opt/Qt/6.5.2/gcc_64`
    pub qt_dir: PathBuf,

    /// Where the new wheel is written
    pub output_dir: PathBuf,

    /// Appended to the Qt version to make the build tag
    pub build_tag_suffix: Option<String>,

    pub windows: WindowsDlls,

    /// Qt components not to bundle
    pub exclude: Vec<String>,

    /// Skip files missing from the Qt installation
    pub ignore_missing: bool,

    /// Thin a universal2 wheel to this architecture
    pub arch: Option<String>,
}

/// The extra DLLs bundled for Windows.
#[derive(Debug, Clone, Default)]
pub struct WindowsDlls {
    /// Bundle the MSVC runtime
    pub msvc_runtime: bool,

    /// Bundle OpenSSL
    pub openssl: bool,

    /// OpenSSL DLLs to use instead of the default set
    pub openssl_dir: Option<PathBuf>,

    /// Location of the default runtime and OpenSSL DLL sets
    pub dlls_dir: Option<PathBuf>,
}

/// Bundle Qt with a wheel. Returns the path of the new wheel.
pub fn bundle(options: &BundleOptions, reporter: Arc<dyn Reporter>) -> Result<PathBuf> {
    let file_name = options
        .wheel
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = WheelName::parse(&file_name)?;

    let package = Package::for_wheel(&name.distribution, &name.version, &options.qt_dir)?
        .with_reporter(Arc::clone(&reporter));
    let profile = package.profile();

    let build_tag = format!(
        "{}{}",
        package.qt_version(),
        options.build_tag_suffix.as_deref().unwrap_or("")
    );

    let original_platform = name.platform.clone();
    if let Some(arch) = &options.arch {
        name.platform = thinned_platform(&name.platform, arch)?;
    }

    let family =
        PlatformFamily::from_tag(&name.platform).ok_or_else(|| BundleError::UnsupportedPlatform {
            tag: name.platform.clone(),
        })?;

    let output = options.output_dir.join(name.file_name(Some(&build_tag)));
    if output.exists() {
        return Err(BundleError::WouldOverwrite { path: output }.into());
    }

    let target_qt_dir_name = profile.target_qt_dir();
    let scratch = options.output_dir.join(name.stem(Some(&build_tag)));
    let target_qt_dir = join_slashed(&scratch, &target_qt_dir_name);

    let bundler = AssetBundler::new(
        &options.qt_dir,
        &target_qt_dir,
        family,
        package.qt_version(),
    )
    .ignore_missing(options.ignore_missing)
    .exclude(options.exclude.clone())
    .thin_to(options.arch.clone())
    .require_bindings(true)
    .with_reporter(Arc::clone(&reporter));

    // Fail on missing tools before anything is written.
    bundler.preflight(profile.table)?;
    let dlls_dir = windows_dlls_dir(&options.windows, &name.platform)?;

    reporter.status(Status::Unpacking, &file_name);
    remove_dir_all_if_exists(&scratch)?;
    ensure_dir(&scratch)?;
    wheel::unpack(&options.wheel, &scratch)?;

    remove_previous_bundle(&target_qt_dir)?;

    bundler.bundle_table(profile.table)?;

    if let Some(dlls_dir) = &dlls_dir {
        bundle_windows_dlls(&package, &target_qt_dir, &name.platform, &options.windows, dlls_dir)?;
    }

    let dist_info = wheel::find_dist_info(&scratch, &options.wheel)?;
    update_metadata(
        &join_slashed(&scratch, &dist_info),
        &build_tag,
        options.arch.is_some().then_some(name.platform.as_str()),
        &profile.companion_name(),
    )?;

    reporter.status(Status::Packing, &output.display());
    wheel::pack(&scratch, &dist_info, &output)?;
    remove_dir_all_if_exists(&scratch)?;

    tracing::debug!("bundled {} as {} (was {})", file_name, name.platform, original_platform);
    reporter.status(Status::Finished, &output.display());

    Ok(output)
}

/// The platform tag of a universal2 wheel thinned to `arch`.
fn thinned_platform(platform: &str, arch: &str) -> Result<String> {
    if !matches!(arch, "arm64" | "x86_64") {
        bail!(
            "unsupported architecture `{}`\n\
             hint: use `arm64` or `x86_64`",
            arch
        );
    }

    match platform.strip_suffix("_universal2") {
        Some(base) if platform.starts_with("macosx_") => Ok(format!("{}_{}", base, arch)),
        _ => Err(BundleError::UnsupportedPlatform {
            tag: platform.to_string(),
        }
        .into()),
    }
}

/// The directory of fallback DLL sets if any Windows DLLs will be bundled.
pub(crate) fn windows_dlls_dir(options: &WindowsDlls, platform: &str) -> Result<Option<PathBuf>> {
    if !matches!(platform, "win32" | "win_amd64") || !(options.msvc_runtime || options.openssl) {
        return Ok(None);
    }

    match options.dlls_dir.clone().or_else(|| global_config_dir().map(|d| d.join("dlls"))) {
        Some(dir) => Ok(Some(dir)),
        None => bail!(
            "no directory of DLLs to bundle\n\
             hint: set `bundle.dlls_dir` in the configuration or pass --dlls-dir"
        ),
    }
}

/// Bundle the MSVC runtime and OpenSSL as requested.
pub(crate) fn bundle_windows_dlls(
    package: &Package,
    target_qt_dir: &Path,
    platform: &str,
    options: &WindowsDlls,
    dlls_dir: &Path,
) -> Result<()> {
    if options.msvc_runtime {
        package.bundle_msvc_runtime(target_qt_dir, platform, dlls_dir)?;
    }

    if options.openssl {
        package.bundle_openssl(
            target_qt_dir,
            platform,
            options.openssl_dir.as_deref(),
            dlls_dir,
        )?;
    }

    Ok(())
}

/// Remove Qt bundled by an earlier run, except for the protected subtree.
fn remove_previous_bundle(target_qt_dir: &Path) -> Result<()> {
    if !target_qt_dir.is_dir() {
        return Ok(());
    }

    for name in sorted_dir_names(target_qt_dir)? {
        if name == PROTECTED_SUBDIR {
            continue;
        }

        let path = target_qt_dir.join(&name);
        if path.is_dir() {
            remove_dir_all_if_exists(&path)?;
        } else {
            remove_file_if_exists(&path)?;
        }
    }

    Ok(())
}

/// Rewrite WHEEL with the new build tag (and platform) and drop METADATA's
/// requirement on the companion Qt wheel.
fn update_metadata(
    dist_info: &Path,
    build_tag: &str,
    platform: Option<&str>,
    companion: &str,
) -> Result<()> {
    let wheel_path = dist_info.join("WHEEL");
    let mut contents = wheel::set_build_tag(&read_to_string(&wheel_path)?, build_tag);
    if let Some(platform) = platform {
        contents = wheel::set_platform_tag(&contents, platform);
    }
    write_string(&wheel_path, &contents)?;

    let metadata_path = dist_info.join("METADATA");
    if metadata_path.is_file() {
        let metadata = read_to_string(&metadata_path)?;
        if let Some(stripped) = wheel::strip_requirement(&metadata, companion) {
            write_string(&metadata_path, &stripped)
                .with_context(|| format!("failed to update {}", metadata_path.display()))?;
        }
    }

    Ok(())
}
