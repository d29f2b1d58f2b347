//! Buildable units - what gets compiled or installed.
//!
//! A [`Buildable`] describes one subdirectory of a generated qmake project:
//! an extension module, a helper executable, or a set of files that are only
//! installed.

use std::path::{Path, PathBuf};

use crate::core::platform::PyPlatform;
use crate::util::fs::{relative_path, to_slashed};

/// The kind of a buildable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildableKind {
    /// A Python extension module
    Module,

    /// A stand-alone executable (configuration tests)
    Executable,

    /// Nothing to compile, only installables
    Files,
}

/// A set of files installed into a subdirectory of the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installable {
    /// The qmake install set name (`<name>.path`, `<name>.files`)
    pub name: String,

    /// Subdirectory of the target directory, if any
    pub target_subdir: Option<String>,

    /// Files to install, relative to the build directory
    pub files: Vec<String>,

    /// Set for the TARGET of a .pro file, which qmake installs itself
    pub is_target: bool,
}

impl Installable {
    pub fn new(name: impl Into<String>, target_subdir: Option<String>) -> Self {
        Installable {
            name: name.into(),
            target_subdir,
            files: Vec::new(),
            is_target: false,
        }
    }

    /// The installable describing a module's own TARGET.
    pub fn target(module_file: impl Into<String>, target_subdir: Option<String>) -> Self {
        Installable {
            name: "target".to_string(),
            target_subdir,
            files: vec![module_file.into()],
            is_target: true,
        }
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// The directory the files end up in.
    pub fn full_target_dir(&self, target_dir: &Path) -> PathBuf {
        match &self.target_subdir {
            Some(subdir) => target_dir.join(subdir),
            None => target_dir.to_path_buf(),
        }
    }

    /// The paths the files will have once installed.
    pub fn installed_paths(&self, target_dir: &Path) -> Vec<PathBuf> {
        let dir = self.full_target_dir(target_dir);

        self.files
            .iter()
            .map(|f| {
                let name = Path::new(f)
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(f));
                dir.join(name)
            })
            .collect()
    }
}

/// One compilable (or installable) unit of a project.
#[derive(Debug, Clone)]
pub struct Buildable {
    /// Name of the subdirectory and its .pro file
    pub name: String,

    pub kind: BuildableKind,

    /// qmake TARGET, unique within the project
    pub target: String,

    /// Directory the .pro file is generated in
    pub build_dir: PathBuf,

    pub sources: Vec<String>,
    pub headers: Vec<String>,
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub libraries: Vec<String>,
    pub define_macros: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
    pub extra_objects: Vec<String>,

    /// Build a static library instead of a loadable plugin
    pub static_link: bool,

    pub debug: bool,

    /// Build with C++ exceptions enabled
    pub exceptions: bool,

    /// Free-form lines added verbatim to the .pro file
    pub builder_settings: Vec<String>,

    pub installables: Vec<Installable>,

    /// Subdirectory of the target directory the module is installed in
    pub install_subdir: Option<String>,

    /// Module file extension overriding the platform default
    pub extension: Option<String>,

    /// Features a configuration test program reported as unavailable
    pub disabled_features: Vec<String>,
}

impl Buildable {
    fn with_kind(kind: BuildableKind, name: &str, build_dir: PathBuf) -> Self {
        Buildable {
            name: name.to_string(),
            kind,
            target: name.to_string(),
            build_dir,
            sources: Vec::new(),
            headers: Vec::new(),
            include_dirs: Vec::new(),
            library_dirs: Vec::new(),
            libraries: Vec::new(),
            define_macros: Vec::new(),
            extra_compile_args: Vec::new(),
            extra_link_args: Vec::new(),
            extra_objects: Vec::new(),
            static_link: false,
            debug: false,
            exceptions: false,
            builder_settings: Vec::new(),
            installables: Vec::new(),
            install_subdir: None,
            extension: None,
            disabled_features: Vec::new(),
        }
    }

    /// An extension module generated in `build_dir`.
    pub fn module(name: &str, build_dir: impl Into<PathBuf>) -> Self {
        Self::with_kind(BuildableKind::Module, name, build_dir.into())
    }

    /// An executable generated in `build_dir`.
    pub fn executable(name: &str, build_dir: impl Into<PathBuf>) -> Self {
        Self::with_kind(BuildableKind::Executable, name, build_dir.into())
    }

    /// A set of installables with nothing to compile.
    pub fn files(name: &str, build_dir: impl Into<PathBuf>) -> Self {
        Self::with_kind(BuildableKind::Files, name, build_dir.into())
    }

    /// Apply a list of Qt modules to add (`core`) or remove (`-gui`).
    pub fn apply_qt<S: AsRef<str>>(&mut self, qt: &[S]) {
        let mut add = Vec::new();
        let mut remove = Vec::new();

        for module in qt {
            match module.as_ref().strip_prefix('-') {
                Some(removed) => remove.push(removed),
                None => add.push(module.as_ref()),
            }
        }

        if !add.is_empty() {
            self.builder_settings.push(format!("QT += {}", add.join(" ")));
        }

        if !remove.is_empty() {
            self.builder_settings.push(format!("QT -= {}", remove.join(" ")));
        }
    }

    pub fn require_cpp11(&mut self) {
        self.builder_settings.push("CONFIG += c++11".to_string());
    }

    /// The file name of the built extension module.
    pub fn module_file_name(&self, py_platform: PyPlatform, py_debug: bool) -> String {
        let mut name = self.target.clone();

        if py_platform.is_windows() && py_debug {
            name.push_str("_d");
        }

        let ext = match (&self.extension, self.static_link, py_platform.is_windows()) {
            (Some(ext), _, _) => ext.as_str(),
            (None, true, true) => ".lib",
            (None, true, false) => ".a",
            (None, false, true) => ".pyd",
            (None, false, false) => ".so",
        };
        name.push_str(ext);

        name
    }

    /// A file name as it is written into the .pro file: relative to the
    /// build directory when absolute, with `/` separators.
    pub fn relative_name(&self, name: &str) -> String {
        let path = Path::new(name);

        if path.is_absolute() {
            to_slashed(&relative_path(&self.build_dir, path))
        } else {
            name.to_string()
        }
    }
}
