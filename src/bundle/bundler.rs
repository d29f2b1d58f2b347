//! Copying the parts of a Qt installation described by an asset table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::bundle::asset::{applicable, AssetTable, VersionedAsset};
use crate::bundle::errors::BundleError;
use crate::bundle::patch;
use crate::core::{PlatformFamily, QtVersion};
use crate::util::fs::{
    copy_dir_filtered, copy_file, is_dir_link, join_slashed, sorted_dir_names, write_string,
};
use crate::util::{Reporter, Silent, Status};

/// The directory of a Qt installation holding its shared libraries.
pub fn library_subdir(family: PlatformFamily) -> &'static str {
    match family {
        PlatformFamily::Windows => "bin",
        _ => "lib",
    }
}

/// The file implementing a Qt library such as `QtCore`, relative to the
/// library directory.
pub fn qt_library_file(name: &str, family: PlatformFamily, qt_version: QtVersion) -> String {
    let major = qt_version.major();
    let suffix = name.strip_prefix("Qt").unwrap_or(name);

    match family {
        PlatformFamily::Linux => format!("libQt{}{}.so.{}", major, suffix, major),
        PlatformFamily::MacOs => {
            // Qt 6 frameworks are versioned as A.
            let version = if major >= 6 {
                "A".to_string()
            } else {
                major.to_string()
            };
            format!("{}.framework/Versions/{}/{}", name, version, name)
        }
        PlatformFamily::Windows => format!("Qt{}{}.dll", major, suffix),
    }
}

/// Whether a file or directory name is a debug artifact.
pub fn is_debug(name: &str, family: PlatformFamily) -> bool {
    match family {
        PlatformFamily::Linux => name.ends_with(".debug"),
        PlatformFamily::MacOs => name.ends_with("_debug.dylib") || name.ends_with(".dSYM"),
        // Qt's debug DLLs end in `d.dll` but so do some release plugins.
        PlatformFamily::Windows => {
            name.ends_with(".pdb") || (name.ends_with("d.dll") && !name.ends_with("backend.dll"))
        }
    }
}

/// Whether `file_name` is the extension module implementing the bindings
/// for `module`, eg. `QtCore.abi3.so` or `QtCore.pyd`.
pub fn is_extension_module(file_name: &str, module: &str, family: PlatformFamily) -> bool {
    let Some(rest) = file_name
        .strip_prefix(module)
        .and_then(|r| r.strip_prefix('.'))
    else {
        return false;
    };

    match family {
        PlatformFamily::Windows => rest == "pyd" || rest.ends_with(".pyd"),
        _ => rest == "so" || rest.ends_with(".so"),
    }
}

/// Copies the parts of a Qt installation into a bundle.
pub struct AssetBundler {
    qt_dir: PathBuf,
    target_qt_dir: PathBuf,
    family: PlatformFamily,
    qt_version: QtVersion,
    ignore_missing: bool,
    exclude: Vec<String>,
    arch: Option<String>,
    require_bindings: bool,
    reporter: Arc<dyn Reporter>,
}

impl AssetBundler {
    /// Bundle from the installation in `qt_dir` (eg. `~/Qt/6.5.0/gcc_64`)
    /// into `target_qt_dir`.
    pub fn new(
        qt_dir: impl Into<PathBuf>,
        target_qt_dir: impl Into<PathBuf>,
        family: PlatformFamily,
        qt_version: QtVersion,
    ) -> Self {
        AssetBundler {
            qt_dir: qt_dir.into(),
            target_qt_dir: target_qt_dir.into(),
            family,
            qt_version,
            ignore_missing: false,
            exclude: Vec::new(),
            arch: None,
            require_bindings: false,
            reporter: Arc::new(Silent),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Skip files missing from the installation instead of failing.
    pub fn ignore_missing(mut self, ignore_missing: bool) -> Self {
        self.ignore_missing = ignore_missing;
        self
    }

    /// Don't bundle these modules at all.
    pub fn exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Thin universal binaries to a single architecture.
    pub fn thin_to(mut self, arch: Option<String>) -> Self {
        self.arch = arch;
        self
    }

    /// Only bundle a module if its bindings are next to the target Qt
    /// directory.
    pub fn require_bindings(mut self, require_bindings: bool) -> Self {
        self.require_bindings = require_bindings;
        self
    }

    pub fn target_qt_dir(&self) -> &Path {
        &self.target_qt_dir
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name)
    }

    /// Whether the bindings of a module have been installed in the package
    /// containing the target Qt directory.
    fn has_bindings(&self, name: &str) -> Result<bool> {
        let Some(package_dir) = self.target_qt_dir.parent() else {
            return Ok(false);
        };

        if !package_dir.is_dir() {
            return Ok(false);
        }

        Ok(sorted_dir_names(package_dir)?
            .iter()
            .any(|f| is_extension_module(f, name, self.family)))
    }

    /// The assets that bundling `table` would use.
    fn selected(&self, table: AssetTable) -> Vec<(&'static str, &'static VersionedAsset)> {
        table
            .iter()
            .filter(|(name, _)| !self.is_excluded(name))
            .filter_map(|(name, entry)| entry.select(self.qt_version).map(|a| (*name, a)))
            .collect()
    }

    /// Check that every external tool bundling `table` needs is available.
    pub fn preflight(&self, table: AssetTable) -> Result<()> {
        let has_exes = self
            .selected(table)
            .iter()
            .any(|(_, asset)| applicable(asset.exes, self.family).next().is_some());

        patch::check_tools(&patch::required_tools(
            self.family,
            self.qt_version,
            has_exes,
            self.arch.is_some(),
        ))
    }

    /// Bundle every module of a table. Returns true if all of the bundled
    /// modules are available under the LGPL.
    pub fn bundle_table(&self, table: AssetTable) -> Result<bool> {
        let mut lgpl = true;

        for (name, entry) in table {
            if self.is_excluded(name) {
                self.reporter.verbose(&format!("Excluding {}", name));
                continue;
            }

            let Some(asset) = entry.select(self.qt_version) else {
                self.reporter.status(
                    Status::Skipped,
                    &format!("{} (not applicable to Qt v{})", name, self.qt_version),
                );
                tracing::warn!("no metadata for {} applies to Qt v{}", name, self.qt_version);
                continue;
            };

            if self.require_bindings && !self.has_bindings(name)? {
                self.reporter
                    .status(Status::Skipped, &format!("{} (no bindings in the wheel)", name));
                tracing::warn!("the wheel has no {} bindings so its Qt parts are not bundled", name);
                continue;
            }

            self.bundle_asset(name, asset)?;
            lgpl &= asset.lgpl;
        }

        if let Some(arch) = &self.arch {
            if self.family == PlatformFamily::MacOs && self.target_qt_dir.is_dir() {
                let thinned = patch::thin_tree(&self.target_qt_dir, arch)?;
                self.reporter
                    .verbose(&format!("Thinned {} binaries to {}", thinned, arch));
            }
        }

        Ok(lgpl)
    }

    /// Bundle the parts of Qt one module needs.
    pub fn bundle_asset(&self, name: &str, asset: &VersionedAsset) -> Result<()> {
        self.reporter.status(Status::Bundling, &name);

        let lib_name = asset.library_name(name);
        let family = self.family;

        if asset.dll {
            self.bundle_qt_library(lib_name)?;
        }

        for lib in applicable(asset.lib_deps, family) {
            self.bundle_qt_library(lib)?;
        }

        let mut lib_contents: Option<Vec<String>> = None;
        for lib in applicable(asset.other_lib_deps, family) {
            if lib.contains('*') {
                // A pattern implies the dependency is optional.
                let pattern = glob::Pattern::new(lib)
                    .with_context(|| format!("invalid library pattern '{}'", lib))?;

                if lib_contents.is_none() {
                    lib_contents = Some(self.library_dir_contents()?);
                }

                for qt_lib in lib_contents.iter().flatten() {
                    if pattern.matches(qt_lib) {
                        self.bundle_library(qt_lib, None)?;
                    }
                }
            } else {
                self.bundle_library(lib, None)?;
            }
        }

        for exe in applicable(asset.exes, family) {
            if let Some(bundled) = self.bundle_file(exe, &self.target_qt_dir, &self.qt_dir, None)? {
                patch::patch_executable(&bundled, family, self.qt_version)?;
            }
        }

        if asset.qml || asset.qml_names.is_some() {
            let default_names = [lib_name];
            let qml_names = asset.qml_names.unwrap_or(&default_names);

            for subdir in qml_names {
                self.bundle_nondebug(&format!("qml/{}", subdir), &[])?;
            }
        }

        // Plugins aren't attributed to individual modules so one module of
        // a table takes all of them.
        if let Some(excluded) = asset.excluded_plugins {
            self.bundle_nondebug("plugins", excluded)?;
        }

        if !asset.translations.is_empty() {
            self.bundle_translations(asset.translations)?;
        }

        for (file_name, contents) in applicable(asset.files, family) {
            write_string(&join_slashed(&self.target_qt_dir, file_name), contents)?;
        }

        for other in applicable(asset.others, family) {
            self.bundle_file(other, &self.target_qt_dir, &self.qt_dir, None)?;
        }

        Ok(())
    }

    fn library_dir_contents(&self) -> Result<Vec<String>> {
        let dir = self.qt_dir.join(library_subdir(self.family));

        if dir.is_dir() {
            sorted_dir_names(&dir)
        } else {
            Ok(Vec::new())
        }
    }

    /// Copy a file (or directory) from `src_dir` to `target_dir`, returning
    /// the copy, or `None` if it was missing and that is allowed.
    fn bundle_file(
        &self,
        name: &str,
        target_dir: &Path,
        src_dir: &Path,
        skip: Option<&dyn Fn(&Path) -> bool>,
    ) -> Result<Option<PathBuf>> {
        let src = join_slashed(src_dir, name);
        let dst = join_slashed(target_dir, name);

        if src.is_dir() {
            copy_dir_filtered(&src, &dst, |p| skip.is_some_and(|skip| skip(p)))?;
        } else if src.is_file() {
            copy_file(&src, &dst)?;
        } else if self.ignore_missing {
            self.reporter
                .verbose(&format!("Ignoring missing '{}'", name));
            return Ok(None);
        } else {
            return Err(BundleError::Packaging {
                name: name.to_string(),
            }
            .into());
        }

        Ok(Some(dst))
    }

    fn bundle_library(&self, name: &str, skip: Option<&dyn Fn(&Path) -> bool>) -> Result<()> {
        let subdir = library_subdir(self.family);

        self.bundle_file(
            name,
            &self.target_qt_dir.join(subdir),
            &self.qt_dir.join(subdir),
            skip,
        )?;

        Ok(())
    }

    fn bundle_qt_library(&self, name: &str) -> Result<()> {
        self.bundle_library(&qt_library_file(name, self.family, self.qt_version), None)?;

        if self.family == PlatformFamily::MacOs {
            // The resources without the unneeded .prl files.
            let skip_prl = |p: &Path| p.extension().is_some_and(|e| e == "prl");
            self.bundle_library(&format!("{}.framework/Resources", name), Some(&skip_prl))?;
        }

        Ok(())
    }

    /// Copy the non-debug contents of a directory of the installation,
    /// leaving out any subdirectory named in `exclude`.
    fn bundle_nondebug(&self, subdir: &str, exclude: &[&str]) -> Result<()> {
        let src = join_slashed(&self.qt_dir, subdir);

        if !src.is_dir() {
            if self.ignore_missing {
                self.reporter
                    .verbose(&format!("Ignoring missing '{}'", subdir));
                return Ok(());
            }

            return Err(BundleError::Packaging {
                name: subdir.to_string(),
            }
            .into());
        }

        let family = self.family;
        let walker = WalkDir::new(&src)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                let excluded = e.file_type().is_dir() && exclude.iter().any(|x| *x == name);

                !excluded && !is_debug(&name, family)
            });

        for entry in walker {
            let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
            if entry.file_type().is_dir() || is_dir_link(&entry) {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&self.qt_dir)
                .with_context(|| format!("{} is outside the Qt installation", entry.path().display()))?;
            copy_file(entry.path(), &self.target_qt_dir.join(rel))?;
        }

        Ok(())
    }

    /// Copy the `.qm` files whose names start with one of `prefixes`.
    fn bundle_translations(&self, prefixes: &[&str]) -> Result<()> {
        let tr_dir = self.qt_dir.join("translations");
        let target_tr_dir = self.target_qt_dir.join("translations");

        if !tr_dir.is_dir() {
            if self.ignore_missing {
                self.reporter.verbose(&"Ignoring missing 'translations'");
                return Ok(());
            }

            return Err(BundleError::Packaging {
                name: "translations".to_string(),
            }
            .into());
        }

        for qm in sorted_dir_names(&tr_dir)? {
            if qm.ends_with(".qm") && prefixes.iter().any(|p| qm.starts_with(p)) {
                self.bundle_file(&qm, &target_tr_dir, &tr_dir, None)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::asset::{Applies, AssetEntry};
    use tempfile::TempDir;

    const QT6: QtVersion = QtVersion::new(6, 5, 0);

    fn touch(root: &Path, name: &str) {
        let path = join_slashed(root, name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, name).unwrap();
    }

    fn files_under(root: &Path) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| crate::util::fs::to_slashed(e.path().strip_prefix(root).unwrap()))
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_qt_library_file() {
        assert_eq!(qt_library_file("QtCore", PlatformFamily::Linux, QT6), "libQt6Core.so.6");
        assert_eq!(qt_library_file("QtCore", PlatformFamily::Windows, QT6), "Qt6Core.dll");
        assert_eq!(
            qt_library_file("QtCore", PlatformFamily::MacOs, QT6),
            "QtCore.framework/Versions/A/QtCore"
        );
        assert_eq!(
            qt_library_file("QtCore", PlatformFamily::MacOs, QtVersion::new(5, 15, 2)),
            "QtCore.framework/Versions/5/QtCore"
        );
    }

    #[test]
    fn test_is_debug() {
        use PlatformFamily::*;

        assert!(is_debug("foo.debug", Linux));
        assert!(!is_debug("foo", Linux));
        assert!(is_debug("bar.pdb", Windows));
        assert!(is_debug("Qt6Cored.dll", Windows));
        assert!(!is_debug("bar.dll", Windows));
        assert!(!is_debug("bazbackend.dll", Windows));
        assert!(is_debug("libqcocoa_debug.dylib", MacOs));
        assert!(is_debug("QtCore.dSYM", MacOs));
        assert!(!is_debug("libqcocoa.dylib", MacOs));
    }

    #[test]
    fn test_is_extension_module() {
        use PlatformFamily::*;

        assert!(is_extension_module("QtCore.abi3.so", "QtCore", Linux));
        assert!(is_extension_module("QtCore.cpython-311-darwin.so", "QtCore", MacOs));
        assert!(is_extension_module("QtCore.pyd", "QtCore", Windows));
        assert!(!is_extension_module("QtCore.pyi", "QtCore", Linux));
        assert!(!is_extension_module("QtCore.abi3.so", "QtCore", Windows));
        assert!(!is_extension_module("QtCoreExtra.abi3.so", "QtCore", Linux));
    }

    #[test]
    fn test_modules_without_bindings_are_skipped() {
        let qt = TempDir::new().unwrap();
        let wheel = TempDir::new().unwrap();
        touch(qt.path(), "lib/libQt6Core.so.6");
        touch(qt.path(), "lib/libQt6Qml.so.6");
        touch(qt.path(), "lib/libQt6Quick.so.6");
        touch(qt.path(), "qml/QtQuick/qmldir");
        touch(wheel.path(), "PyQt6/QtCore.abi3.so");
        touch(wheel.path(), "PyQt6/QtQml.pyi");

        const TABLE: AssetTable = &[
            ("QtCore", AssetEntry::Single(VersionedAsset::DEFAULT)),
            ("QtQml", AssetEntry::Single(VersionedAsset::DEFAULT)),
            (
                "QtQuick",
                AssetEntry::Single(VersionedAsset {
                    qml: true,
                    ..VersionedAsset::DEFAULT
                }),
            ),
        ];

        let target_qt_dir = wheel.path().join("PyQt6/Qt6");
        let bundler = AssetBundler::new(qt.path(), &target_qt_dir, PlatformFamily::Linux, QT6)
            .require_bindings(true);
        bundler.bundle_table(TABLE).unwrap();
        assert_eq!(files_under(&target_qt_dir), ["lib/libQt6Core.so.6"]);

        // Without the check every module is bundled.
        let target = TempDir::new().unwrap();
        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6);
        bundler.bundle_table(TABLE).unwrap();
        assert_eq!(
            files_under(target.path()),
            [
                "lib/libQt6Core.so.6",
                "lib/libQt6Qml.so.6",
                "lib/libQt6Quick.so.6",
                "qml/QtQuick/qmldir",
            ]
        );
    }

    #[test]
    fn test_plugins_are_excluded() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "lib/libQt6Core.so.6");
        touch(qt.path(), "plugins/fake/plugin.so");
        touch(qt.path(), "plugins/platforms/libqxcb.so");
        touch(qt.path(), "plugins/platforms/libqxcb.so.debug");

        const TABLE: AssetTable = &[(
            "QtCore",
            AssetEntry::Single(VersionedAsset {
                excluded_plugins: Some(&["fake"]),
                ..VersionedAsset::DEFAULT
            }),
        )];

        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6);
        assert!(bundler.bundle_table(TABLE).unwrap());

        assert_eq!(
            files_under(target.path()),
            ["lib/libQt6Core.so.6", "plugins/platforms/libqxcb.so"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_qml_directory_links_are_skipped() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "lib/libQt6Quick.so.6");
        touch(qt.path(), "qml/QtQuick/qmldir");
        std::os::unix::fs::symlink(qt.path().join("qml/QtQuick"), qt.path().join("qml/QtQuick/Current"))
            .unwrap();

        const TABLE: AssetTable = &[(
            "QtQuick",
            AssetEntry::Single(VersionedAsset {
                qml: true,
                ..VersionedAsset::DEFAULT
            }),
        )];

        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6);
        bundler.bundle_table(TABLE).unwrap();

        assert_eq!(
            files_under(target.path()),
            ["lib/libQt6Quick.so.6", "qml/QtQuick/qmldir"]
        );
    }

    #[test]
    fn test_windows_debug_exclusion() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "bin/Qt6Core.dll");
        for name in ["bar.dll", "bar.pdb", "bard.dll", "bazbackend.dll"] {
            touch(qt.path(), &format!("plugins/tls/{}", name));
        }

        const TABLE: AssetTable = &[(
            "QtCore",
            AssetEntry::Single(VersionedAsset {
                excluded_plugins: Some(&[]),
                ..VersionedAsset::DEFAULT
            }),
        )];

        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Windows, QT6);
        bundler.bundle_table(TABLE).unwrap();

        assert_eq!(
            files_under(target.path()),
            ["bin/Qt6Core.dll", "plugins/tls/bar.dll", "plugins/tls/bazbackend.dll"]
        );
    }

    #[test]
    fn test_missing_file_policy() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "lib/libQt6Gui.so.6");

        const TABLE: AssetTable = &[(
            "QtGui",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["QtMissing", "QtCore"])],
                ..VersionedAsset::DEFAULT
            }),
        )];
        touch(qt.path(), "lib/libQt6Core.so.6");

        let strict = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6);
        let err = strict.bundle_table(TABLE).unwrap_err();
        match err.downcast_ref::<BundleError>() {
            Some(BundleError::Packaging { name }) => assert_eq!(name, "libQt6Missing.so.6"),
            other => panic!("unexpected error: {:?}", other),
        }

        let target = TempDir::new().unwrap();
        let lenient = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6)
            .ignore_missing(true);
        lenient.bundle_table(TABLE).unwrap();

        // Processing carries on after the missing library.
        assert_eq!(
            files_under(target.path()),
            ["lib/libQt6Core.so.6", "lib/libQt6Gui.so.6"]
        );
    }

    #[test]
    fn test_version_gating_and_exclusion() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "lib/libQt6Charts.so.6");
        touch(qt.path(), "lib/libQt6ChartsQml.so.6");
        touch(qt.path(), "lib/libQt6Graphs.so.6");

        const TABLE: AssetTable = &[
            (
                "QtCharts",
                AssetEntry::Variants(&[
                    VersionedAsset {
                        version: Some(QtVersion::new(6, 5, 0)),
                        lib_deps: &[(Applies::All, &["QtChartsQml"])],
                        lgpl: false,
                        ..VersionedAsset::DEFAULT
                    },
                    VersionedAsset {
                        version: Some(QtVersion::new(6, 1, 0)),
                        lgpl: false,
                        ..VersionedAsset::DEFAULT
                    },
                ]),
            ),
            (
                "QtGraphs",
                AssetEntry::Single(VersionedAsset {
                    version: Some(QtVersion::new(6, 8, 0)),
                    ..VersionedAsset::DEFAULT
                }),
            ),
        ];

        let bundler = AssetBundler::new(
            qt.path(),
            target.path(),
            PlatformFamily::Linux,
            QtVersion::new(6, 4, 2),
        );
        assert!(!bundler.bundle_table(TABLE).unwrap());
        assert_eq!(files_under(target.path()), ["lib/libQt6Charts.so.6"]);

        let target = TempDir::new().unwrap();
        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6)
            .exclude(vec!["QtCharts".to_string()]);
        // Nothing bundled is GPL only.
        assert!(bundler.bundle_table(TABLE).unwrap());
        assert!(files_under(target.path()).is_empty());
    }

    #[test]
    fn test_other_libs_translations_and_files() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "lib/libQt6Core.so.6");
        touch(qt.path(), "lib/libicuuc.so.56");
        touch(qt.path(), "lib/libicudata.so.56");
        touch(qt.path(), "lib/libother.so.1");
        touch(qt.path(), "translations/qtbase_de.qm");
        touch(qt.path(), "translations/qtbase_de.ts");
        touch(qt.path(), "translations/qtmultimedia_de.qm");
        touch(qt.path(), "resources/icudtl.dat");

        const TABLE: AssetTable = &[(
            "QtCore",
            AssetEntry::Single(VersionedAsset {
                other_lib_deps: &[
                    (Applies::All, &["libicu*.so.56", "libnothing*.so"]),
                    (Applies::Only(PlatformFamily::Windows), &["opengl32sw.dll"]),
                ],
                translations: &["qtbase"],
                files: &[(Applies::All, &[("lib/.ignore", "placeholder\n")])],
                others: &[(Applies::Only(PlatformFamily::Linux), &["resources"])],
                ..VersionedAsset::DEFAULT
            }),
        )];

        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6);
        bundler.bundle_table(TABLE).unwrap();

        assert_eq!(
            files_under(target.path()),
            [
                "lib/.ignore",
                "lib/libQt6Core.so.6",
                "lib/libicudata.so.56",
                "lib/libicuuc.so.56",
                "resources/icudtl.dat",
                "translations/qtbase_de.qm",
            ]
        );
    }

    #[test]
    fn test_linux_executable_gets_qt_conf() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "libexec/QtWebEngineProcess");

        const TABLE: AssetTable = &[(
            "QtWebEngineCore",
            AssetEntry::Single(VersionedAsset {
                dll: false,
                exes: &[(Applies::Only(PlatformFamily::Linux), &["libexec/QtWebEngineProcess"])],
                ..VersionedAsset::DEFAULT
            }),
        )];

        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::Linux, QT6);
        bundler.preflight(TABLE).unwrap();
        bundler.bundle_table(TABLE).unwrap();

        assert_eq!(
            files_under(target.path()),
            ["libexec/QtWebEngineProcess", "libexec/qt.conf"]
        );
    }

    #[test]
    fn test_macos_resources_without_prl() {
        let qt = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(qt.path(), "lib/QtCore.framework/Versions/A/QtCore");
        touch(qt.path(), "lib/QtCore.framework/Resources/Info.plist");
        touch(qt.path(), "lib/QtCore.framework/Resources/QtCore.prl");

        const TABLE: AssetTable = &[("QtCore", AssetEntry::Single(VersionedAsset::DEFAULT))];

        let bundler = AssetBundler::new(qt.path(), target.path(), PlatformFamily::MacOs, QT6);
        bundler.bundle_table(TABLE).unwrap();

        assert_eq!(
            files_under(target.path()),
            [
                "lib/QtCore.framework/Resources/Info.plist",
                "lib/QtCore.framework/Versions/A/QtCore",
            ]
        );
    }
}
