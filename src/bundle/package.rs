//! Packages that Qt can be bundled with.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::bundle::asset::AssetTable;
use crate::bundle::errors::BundleError;
use crate::bundle::packages::PROFILES;
use crate::core::QtVersion;
use crate::util::fs::{copy_file, ensure_dir, sorted_dir_names};
use crate::util::{Reporter, Silent, Status};

/// Where a package's MSVC runtime DLLs come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsvcRuntime {
    /// The package doesn't bundle a runtime.
    None,

    /// `msvc-64` or `msvc-32` depending on the platform.
    PerArch,

    /// A single directory of that name.
    Shared(&'static str),
}

/// Everything that distinguishes one package from another when bundling.
#[derive(Debug)]
pub struct PackageProfile {
    /// The distribution name as it appears in wheel names
    pub name: &'static str,

    /// The Qt major version the package wraps
    pub qt_major: u8,

    pub table: AssetTable,
    pub msvc_runtime: MsvcRuntime,

    /// Whether OpenSSL must be bundled on Windows for Qt releases without
    /// their own TLS backends
    pub openssl: bool,
}

impl PackageProfile {
    /// The directory, relative to the wheel root, Qt is bundled in.
    pub fn target_qt_dir(&self) -> String {
        format!("PyQt{0}/Qt{0}", self.qt_major)
    }

    /// The name of the wheel containing just the Qt parts, eg. `PyQt6_Qt6`.
    pub fn companion_name(&self) -> String {
        format!("{}_Qt{}", self.name, self.qt_major)
    }
}

/// Look up a package by its distribution name. `-` and `_` are treated the
/// same.
pub fn find_profile(name: &str) -> Option<&'static PackageProfile> {
    let name = name.replace('-', "_");
    PROFILES.iter().copied().find(|p| p.name == name)
}

/// Look up a package, failing if it isn't supported.
pub fn profile(name: &str) -> Result<&'static PackageProfile> {
    find_profile(name).ok_or_else(|| {
        BundleError::UnknownPackage {
            name: name.to_string(),
        }
        .into()
    })
}

/// Parse a version, keeping the first three components of its release.
fn parse_version(version: &str) -> Result<QtVersion> {
    QtVersion::parse_base(version).ok_or_else(|| {
        BundleError::QtVersion {
            version: version.to_string(),
        }
        .into()
    })
}

/// The version of a Qt installation from its path, `.../<version>/<arch>`.
pub fn installed_qt_version(qt_dir: &Path) -> Result<QtVersion> {
    let version = qt_dir
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    parse_version(&version)
}

/// A package being bundled with a particular Qt installation.
pub struct Package {
    profile: &'static PackageProfile,
    qt_version: QtVersion,
    reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.profile.name)
            .field("qt_version", &self.qt_version)
            .finish_non_exhaustive()
    }
}

impl Package {
    /// The package of an existing wheel, checking the Qt installation is
    /// recent enough for it.
    ///
    /// The wheel's version with its patch level zeroed is the Qt it was
    /// built against.
    pub fn for_wheel(name: &str, version: &str, qt_dir: &Path) -> Result<Self> {
        let profile = profile(name)?;
        let required = parse_version(version)?.with_patch(0);
        let qt_version = installed_qt_version(qt_dir)?;

        if qt_version < required {
            return Err(BundleError::QtTooOld {
                found: qt_version,
                required,
            }
            .into());
        }

        Ok(Package {
            profile,
            qt_version,
            reporter: Arc::new(Silent),
        })
    }

    /// The package whose Qt parts are to be put in a wheel of their own.
    pub fn for_qt(name: &str, qt_dir: &Path) -> Result<Self> {
        Ok(Package {
            profile: profile(name)?,
            qt_version: installed_qt_version(qt_dir)?,
            reporter: Arc::new(Silent),
        })
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn profile(&self) -> &'static PackageProfile {
        self.profile
    }

    pub fn qt_version(&self) -> QtVersion {
        self.qt_version
    }

    /// Bundle the MSVC runtime from the fallback DLL sets in `dlls_dir`.
    pub fn bundle_msvc_runtime(
        &self,
        target_qt_dir: &Path,
        platform: &str,
        dlls_dir: &Path,
    ) -> Result<()> {
        let subdir = match self.profile.msvc_runtime {
            MsvcRuntime::None => return Ok(()),
            MsvcRuntime::PerArch if platform == "win_amd64" => "msvc-64",
            MsvcRuntime::PerArch => "msvc-32",
            MsvcRuntime::Shared(subdir) => subdir,
        };

        self.reporter.status(Status::Bundling, &"the MSVC runtime");
        bundle_dlls(target_qt_dir, &dlls_dir.join(subdir))
    }

    /// Bundle the OpenSSL DLLs, from `openssl_dir` if given or else from the
    /// fallback DLL sets in `dlls_dir`.
    pub fn bundle_openssl(
        &self,
        target_qt_dir: &Path,
        platform: &str,
        openssl_dir: Option<&Path>,
        dlls_dir: &Path,
    ) -> Result<()> {
        if !self.profile.openssl {
            return Ok(());
        }

        // Qt v6.2.0 and later have their own TLS backends.
        if self.qt_version >= QtVersion::new(6, 2, 0) {
            self.reporter
                .verbose(&"OpenSSL libraries are not required for Qt v6.2.0 and later");
            return Ok(());
        }

        let dir = match openssl_dir {
            Some(dir) => {
                self.reporter.status(
                    Status::Bundling,
                    &format!("the OpenSSL libraries from {}", dir.display()),
                );
                dir.to_path_buf()
            }
            None => {
                self.reporter
                    .status(Status::Bundling, &"the default OpenSSL libraries");
                let subdir = if platform == "win_amd64" {
                    "openssl-64"
                } else {
                    "openssl-32"
                };
                dlls_dir.join(subdir)
            }
        };

        bundle_dlls(target_qt_dir, &dir)
    }
}

/// Copy every file in `dlls_dir` into the bundle's `bin` directory.
fn bundle_dlls(target_qt_dir: &Path, dlls_dir: &Path) -> Result<()> {
    let bin_dir: PathBuf = target_qt_dir.join("bin");
    ensure_dir(&bin_dir)?;

    let names = sorted_dir_names(dlls_dir)
        .with_context(|| format!("no DLLs to bundle in {}", dlls_dir.display()))?;

    for name in names {
        let src = dlls_dir.join(&name);
        if src.is_file() {
            copy_file(&src, &bin_dir.join(&name))?;
        }
    }

    Ok(())
}
