//! QtBuild.toml manifest parsing and schema.
//!
//! The manifest describes the extension modules of a project and the files
//! installed alongside them. Paths in the manifest are relative to the
//! directory containing it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::buildable::{Buildable, Installable};
use crate::util::fs::sorted_dir_names;

/// The manifest file name.
pub const MANIFEST_NAME: &str = "QtBuild.toml";

/// A parsed QtBuild.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectConfig,

    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSpec>,

    #[serde(default, rename = "install")]
    pub installs: Vec<InstallSpec>,

    /// Directory containing the manifest
    #[serde(skip)]
    pub manifest_dir: PathBuf,
}

/// The `[project]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, also the name of the top-level .pro file
    pub name: String,

    /// Build directory (default: `build`)
    pub build_dir: Option<PathBuf>,

    /// Directory containing Python.h
    pub py_include_dir: Option<String>,

    /// Directory containing the Python library (Windows)
    pub py_pylib_dir: Option<String>,

    /// Location of Qt relative to the installed modules, used for rpaths
    pub target_qt_dir: Option<String>,

    pub qml_debug: bool,

    /// Android ABIs to build for
    pub android_abis: Vec<String>,

    /// Build universal2 binaries on macOS
    pub apple_universal2: bool,

    pub debug: bool,

    /// The target Python is a debug build
    pub py_debug: bool,

    /// Extension module file extension overriding the platform default
    pub module_extension: Option<String>,

    /// Default install subdirectory for modules
    pub install_subdir: Option<String>,
}

/// What a `[[module]]` entry builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    #[default]
    Module,
    Executable,
    Files,
}

/// A C++ configuration test deciding whether a module can be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTest {
    /// Headers to #include
    pub headers: Vec<String>,

    /// Expression to evaluate in main()
    pub call: String,
}

/// A `[[module]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSpec {
    pub name: String,
    pub kind: ModuleKind,

    pub sources: Vec<String>,
    pub headers: Vec<String>,
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub libraries: Vec<String>,
    pub define_macros: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
    pub extra_objects: Vec<String>,

    /// Qt modules to add, or remove when prefixed with `-`
    pub qt: Vec<String>,

    pub cpp11: bool,

    #[serde(rename = "static")]
    pub static_link: bool,

    pub exceptions: bool,
    pub builder_settings: Vec<String>,
    pub install_subdir: Option<String>,

    /// Files installed by a `files` entry
    pub files: Vec<String>,

    /// Compile the support sources in `qpy/<name>/` into the module
    pub qpy: bool,

    pub test: Option<ConfigTest>,
}

/// An `[[install]]` entry: project-level files to install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallSpec {
    pub name: String,

    #[serde(default)]
    pub target_subdir: Option<String>,

    pub files: Vec<String>,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut manifest: Manifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        manifest.manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        manifest.validate()?;

        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if !is_safe_name(&self.project.name) {
            bail!("project name `{}` is not a valid file name", self.project.name);
        }

        let mut seen = HashSet::new();
        for module in &self.modules {
            if !is_safe_name(&module.name) {
                bail!("module name `{}` is not a valid file name", module.name);
            }

            if !seen.insert(module.name.as_str()) {
                bail!("module `{}` is defined more than once", module.name);
            }
        }

        Ok(())
    }

    /// The absolute build directory.
    pub fn build_dir(&self) -> PathBuf {
        let dir = self
            .project
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("build"));

        self.manifest_dir.join(dir)
    }

    /// Resolve a manifest-relative path.
    fn resolve(&self, name: &str) -> String {
        let path = Path::new(name);

        if path.is_absolute() {
            name.to_string()
        } else {
            self.manifest_dir.join(path).to_string_lossy().into_owned()
        }
    }

    fn resolve_all(&self, names: &[String]) -> Vec<String> {
        names.iter().map(|n| self.resolve(n)).collect()
    }

    /// A module's own configuration test program,
    /// `config-tests/cfgtest_<name>.cpp`, if there is one.
    pub fn external_config_test(&self, name: &str) -> Option<PathBuf> {
        let path = self
            .manifest_dir
            .join("config-tests")
            .join(format!("cfgtest_{}.cpp", name));

        path.is_file().then_some(path)
    }

    /// Add the sources of a module's qpy support library.
    fn add_qpy_sources(&self, b: &mut Buildable) -> Result<()> {
        let qpy_dir = self.manifest_dir.join("qpy").join(&b.name);
        let files = if qpy_dir.is_dir() {
            sorted_dir_names(&qpy_dir)?
        } else {
            Vec::new()
        };
        let path = |f: &String| qpy_dir.join(f).to_string_lossy().into_owned();

        b.include_dirs.push(qpy_dir.to_string_lossy().into_owned());
        b.headers
            .extend(files.iter().filter(|f| f.ends_with(".h")).map(path));

        // C sources first, then C++.
        for ext in [".c", ".cpp"] {
            b.sources
                .extend(files.iter().filter(|f| f.ends_with(ext)).map(path));
        }

        Ok(())
    }

    /// Convert a `[[module]]` entry to a buildable.
    pub fn buildable(&self, spec: &ModuleSpec) -> Result<Buildable> {
        let build_dir = self.build_dir().join(&spec.name);

        let mut b = match spec.kind {
            ModuleKind::Module => Buildable::module(&spec.name, build_dir),
            ModuleKind::Executable => Buildable::executable(&spec.name, build_dir),
            ModuleKind::Files => Buildable::files(&spec.name, build_dir),
        };

        b.sources = self.resolve_all(&spec.sources);
        b.headers = self.resolve_all(&spec.headers);
        b.include_dirs = self.resolve_all(&spec.include_dirs);
        b.library_dirs = self.resolve_all(&spec.library_dirs);
        b.extra_objects = self.resolve_all(&spec.extra_objects);
        b.libraries = spec.libraries.clone();
        b.define_macros = spec.define_macros.clone();
        b.extra_compile_args = spec.extra_compile_args.clone();
        b.extra_link_args = spec.extra_link_args.clone();

        if spec.qpy {
            self.add_qpy_sources(&mut b)?;
        }

        if spec.cpp11 {
            b.require_cpp11();
        }
        b.apply_qt(&spec.qt);
        b.builder_settings.extend(spec.builder_settings.iter().cloned());

        b.static_link = spec.static_link;
        b.exceptions = spec.exceptions;
        b.debug = self.project.debug;
        b.extension = self.project.module_extension.clone();
        b.install_subdir = spec
            .install_subdir
            .clone()
            .or_else(|| self.project.install_subdir.clone());

        if spec.kind == ModuleKind::Files && !spec.files.is_empty() {
            b.installables.push(
                Installable::new(&spec.name, b.install_subdir.clone())
                    .with_files(self.resolve_all(&spec.files)),
            );
        }

        Ok(b)
    }

    /// The project-level installables.
    pub fn installables(&self) -> Vec<Installable> {
        self.installs
            .iter()
            .map(|i| {
                Installable::new(&i.name, i.target_subdir.clone())
                    .with_files(self.resolve_all(&i.files))
            })
            .collect()
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', ':', ' '])
}

/// Find the manifest in `start` or the nearest parent directory.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!(
                "could not find `{}` in `{}` or any parent directory",
                MANIFEST_NAME,
                start.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buildable::BuildableKind;

    const MANIFEST: &str = r#"
[project]
name = "PyQt6"
py_include_dir = "/usr/include/python3.12"
install_subdir = "PyQt6"

[[module]]
name = "QtCore"
sources = ["sip/QtCore/sipQtCorecmodule.cpp"]
include_dirs = ["qpy/QtCore"]
qt = ["core", "-gui"]
cpp11 = true
exceptions = true
test = { headers = ["QtCore/qglobal.h"], call = "qVersion()" }

[[module]]
name = "stubs"
kind = "files"
files = ["stubs/QtCore.pyi"]

[[install]]
name = "licence"
target_subdir = "PyQt6"
files = ["LICENSE"]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST, Path::new("/src/QtBuild.toml")).unwrap();

        assert_eq!(manifest.project.name, "PyQt6");
        assert_eq!(manifest.modules.len(), 2);
        assert_eq!(manifest.build_dir(), PathBuf::from("/src/build"));
        assert_eq!(
            manifest.modules[0].test,
            Some(ConfigTest {
                headers: vec!["QtCore/qglobal.h".to_string()],
                call: "qVersion()".to_string(),
            })
        );
    }

    #[test]
    fn test_buildable_from_module() {
        let manifest = Manifest::parse(MANIFEST, Path::new("/src/QtBuild.toml")).unwrap();
        let b = manifest.buildable(&manifest.modules[0]).unwrap();

        assert_eq!(b.kind, BuildableKind::Module);
        assert_eq!(b.target, "QtCore");
        assert_eq!(b.build_dir, PathBuf::from("/src/build/QtCore"));
        assert_eq!(b.install_subdir.as_deref(), Some("PyQt6"));
        assert!(b.exceptions);
        assert_eq!(
            b.builder_settings,
            vec!["CONFIG += c++11", "QT += core", "QT -= gui"]
        );
    }

    #[test]
    fn test_files_module_has_installable() {
        let manifest = Manifest::parse(MANIFEST, Path::new("/src/QtBuild.toml")).unwrap();
        let b = manifest.buildable(&manifest.modules[1]).unwrap();

        assert_eq!(b.kind, BuildableKind::Files);
        assert_eq!(b.installables.len(), 1);
        assert_eq!(b.installables[0].name, "stubs");
    }

    #[test]
    fn test_qpy_sources_and_external_config_test() {
        let tmp = tempfile::TempDir::new().unwrap();
        let qpy = tmp.path().join("qpy/QtCore");
        std::fs::create_dir_all(&qpy).unwrap();
        for f in ["qpycore_enums.cpp", "qpycore_api.h", "qpycore_chimera.c", "README"] {
            std::fs::write(qpy.join(f), "").unwrap();
        }
        std::fs::create_dir_all(tmp.path().join("config-tests")).unwrap();
        std::fs::write(tmp.path().join("config-tests/cfgtest_QtCore.cpp"), "").unwrap();

        let content = r#"
[project]
name = "PyQt6"

[[module]]
name = "QtCore"
sources = ["sipQtCorecmodule.cpp"]
qpy = true

[[module]]
name = "QtGui"
"#;
        let manifest = Manifest::parse(content, &tmp.path().join("QtBuild.toml")).unwrap();
        let b = manifest.buildable(&manifest.modules[0]).unwrap();
        let in_qpy = |f: &str| qpy.join(f).to_string_lossy().into_owned();

        assert_eq!(
            b.sources,
            vec![
                tmp.path().join("sipQtCorecmodule.cpp").to_string_lossy().into_owned(),
                in_qpy("qpycore_chimera.c"),
                in_qpy("qpycore_enums.cpp"),
            ]
        );
        assert_eq!(b.headers, vec![in_qpy("qpycore_api.h")]);
        assert_eq!(b.include_dirs, vec![qpy.to_string_lossy().into_owned()]);

        assert_eq!(
            manifest.external_config_test("QtCore"),
            Some(tmp.path().join("config-tests/cfgtest_QtCore.cpp"))
        );
        assert_eq!(manifest.external_config_test("QtGui"), None);
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let content = r#"
[project]
name = "p"

[[module]]
name = "QtCore"

[[module]]
name = "QtCore"
"#;
        let err = Manifest::parse(content, Path::new("QtBuild.toml")).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_unsafe_name_rejected() {
        let content = "[project]\nname = \"p\"\n\n[[module]]\nname = \"../QtCore\"\n";
        assert!(Manifest::parse(content, Path::new("QtBuild.toml")).is_err());
    }

    #[test]
    fn test_find_manifest() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "[project]\nname = \"p\"\n").unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_manifest(&nested).unwrap(), tmp.path().join(MANIFEST_NAME));
    }
}
