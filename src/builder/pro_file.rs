//! qmake .pro file generation.
//!
//! Generation is a pure function of a [`Buildable`] and the project-wide
//! [`GeneratorSettings`]: nothing is written until [`ProFile::write`] is
//! called, and the same inputs always produce the same lines. Lists are
//! emitted in the order the caller gave them.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{Buildable, Installable, PyPlatform};
use crate::util::fs::{to_slashed, write_lines, write_string};

/// Project-wide inputs to generation.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// The qmake spec being built with
    pub spec: String,

    pub py_platform: PyPlatform,
    pub py_debug: bool,
    pub qml_debug: bool,
    pub android_abis: Vec<String>,
    pub apple_universal2: bool,

    /// Location of Qt relative to the installed modules
    pub target_qt_dir: Option<String>,

    pub py_include_dir: Option<String>,
    pub py_pylib_dir: Option<String>,

    /// User supplied lines added to every .pro file
    pub qmake_settings: Vec<String>,
}

impl GeneratorSettings {
    pub fn new(spec: impl Into<String>, py_platform: PyPlatform) -> Self {
        GeneratorSettings {
            spec: spec.into(),
            py_platform,
            py_debug: false,
            qml_debug: false,
            android_abis: Vec::new(),
            apple_universal2: false,
            target_qt_dir: None,
            py_include_dir: None,
            py_pylib_dir: None,
            qmake_settings: Vec::new(),
        }
    }
}

/// A generated .pro file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl ProFile {
    /// Write the file, replacing any existing one.
    pub fn write(&self) -> Result<()> {
        write_lines(&self.path, &self.lines)
    }
}

/// The version script limiting an extension module's exported symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMap {
    pub path: PathBuf,
    pub contents: String,
}

/// Everything generated for an extension module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleProFile {
    pub pro: ProFile,
    pub export_map: Option<ExportMap>,

    /// The paths the module's installables will be installed as
    pub installed: Vec<PathBuf>,
}

impl ModuleProFile {
    pub fn write(&self) -> Result<()> {
        if let Some(exp) = &self.export_map {
            write_string(&exp.path, &exp.contents)?;
        }
        self.pro.write()
    }
}

/// Quote a path for qmake if it contains spaces, using `/` separators.
pub fn qmake_quote(path: &str) -> String {
    let path = path.replace('\\', "/");

    if path.contains(' ') {
        format!("$$quote({})", path)
    } else {
        path
    }
}

/// Generator of .pro files.
#[derive(Debug, Clone)]
pub struct ProFileGenerator {
    settings: GeneratorSettings,
}

impl ProFileGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        ProFileGenerator { settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Generate the .pro file (and export map) of an extension module.
    pub fn module(&self, b: &Buildable, target_dir: &Path) -> ModuleProFile {
        let s = &self.settings;
        let mut lines = vec!["TEMPLATE = lib".to_string(), "CONFIG += warn_on".to_string()];

        lines.push(if b.exceptions {
            "CONFIG += exceptions".to_string()
        } else {
            "CONFIG += exceptions_off".to_string()
        });

        if b.static_link {
            lines.push("CONFIG += staticlib hide_symbols".to_string());
        } else {
            // Some Qt5 releases implement plugin_bundle rather than plugin.
            lines.push("CONFIG += plugin plugin_bundle no_default_rpath".to_string());
        }

        if s.qml_debug {
            lines.push("CONFIG += qml_debug".to_string());
        }

        // QTBUG-39300
        lines.push("CONFIG -= android_install".to_string());

        if !s.android_abis.is_empty() {
            lines.push(format!("ANDROID_ABIS = \"{}\"", s.android_abis.join(" ")));
        }

        self.common_lines(&mut lines, b);

        // MinGW built Qt assumes 16 byte aligned stack frames, the Python
        // installers use 4 byte alignment.
        if s.spec == "win32-g++" {
            lines.push("QMAKE_CFLAGS += -mstackrealign".to_string());
            lines.push("QMAKE_CXXFLAGS += -mstackrealign".to_string());
        }

        let module = b.module_file_name(s.py_platform, s.py_debug);

        if !b.static_link {
            // no_check_exist: the module doesn't exist until make has run but
            // qmake only generates install targets for files that exist.
            lines.extend(
                [
                    "",
                    "win32 {",
                    "    PY_MODULE_SRC = $(DESTDIR_TARGET)",
                    "} else {",
                    "    macx {",
                    "        PY_MODULE_SRC = $(TARGET).plugin/Contents/MacOS/$(TARGET)",
                    "        QMAKE_LFLAGS += \"-undefined dynamic_lookup\"",
                    "    } else {",
                    "        PY_MODULE_SRC = $(TARGET)",
                    "    }",
                    "}",
                    "",
                ]
                .map(String::from),
            );
            lines.push(format!(
                "QMAKE_POST_LINK = $(COPY_FILE) $$PY_MODULE_SRC {}",
                module
            ));
            lines.push(String::new());
            lines.push("target.CONFIG = no_check_exist".to_string());
            lines.push(format!("target.files = {}", module));
            lines.push(String::new());
        }

        if let Some(qt_dir) = &s.target_qt_dir {
            lines.extend([
                String::new(),
                "CONFIG += no_qt_rpath".to_string(),
                "linux {".to_string(),
                format!("    QMAKE_RPATHDIR = {}", qt_dir),
                "}".to_string(),
                "macx {".to_string(),
                format!("    QMAKE_RPATHDIR = @loader_path/{}", qt_dir),
                "}".to_string(),
                String::new(),
            ]);
        }

        let export_map = if s.spec.contains("linux") && !b.static_link {
            lines.push(format!(
                "QMAKE_LFLAGS += -Wl,--version-script={}.exp",
                b.target
            ));

            Some(ExportMap {
                path: b.build_dir.join(format!("{}.exp", b.target)),
                contents: format!("{{ global: PyInit_{}; local: *; }};", b.target),
            })
        } else {
            None
        };

        if let Some(include_dir) = &s.py_include_dir {
            lines.push(format!("INCLUDEPATH += {}", qmake_quote(include_dir)));
        }

        // Python.h on Windows embeds the need for pythonXY.lib.
        if !b.static_link {
            if let Some(pylib_dir) = &s.py_pylib_dir {
                lines.push("win32 {".to_string());
                lines.push(format!("    LIBS += -L{}", qmake_quote(pylib_dir)));
                lines.push("}".to_string());
            }
        }

        let mut installables = b.installables.clone();
        installables.push(Installable::target(module, b.install_subdir.clone()));

        let mut installed = Vec::new();
        for installable in &installables {
            install_lines(&mut lines, &mut installed, installable, target_dir);
        }

        ModuleProFile {
            pro: ProFile {
                path: b.build_dir.join(format!("{}.pro", b.name)),
                lines,
            },
            export_map,
            installed,
        }
    }

    /// Generate the .pro file of a stand-alone executable.
    pub fn executable(&self, b: &Buildable) -> ProFile {
        let mut lines = Vec::new();
        self.common_lines(&mut lines, b);

        ProFile {
            path: b.build_dir.join(format!("{}.pro", b.target)),
            lines,
        }
    }

    /// Generate the top-level `subdirs` .pro file.
    pub fn top_level(
        &self,
        path: PathBuf,
        subdirs: &[String],
        installables: &[Installable],
        target_dir: &Path,
        installed: &mut Vec<PathBuf>,
    ) -> ProFile {
        let mut lines = vec![
            "TEMPLATE = subdirs".to_string(),
            "CONFIG += ordered nostrip".to_string(),
            format!("SUBDIRS = {}", subdirs.join(" ")),
        ];

        for installable in installables {
            install_lines(&mut lines, installed, installable, target_dir);
        }

        ProFile { path, lines }
    }

    /// Lines shared by modules and executables.
    fn common_lines(&self, lines: &mut Vec<String>, b: &Buildable) {
        let s = &self.settings;

        if s.py_platform == PyPlatform::Darwin && s.apple_universal2 {
            lines.push("QMAKE_APPLE_DEVICE_ARCHS = x86_64 arm64".to_string());
        }

        lines.push(format!(
            "CONFIG += {}",
            if b.debug { "debug" } else { "release" }
        ));

        lines.extend(b.builder_settings.iter().cloned());
        lines.extend(s.qmake_settings.iter().cloned());

        lines.push(format!("TARGET = {}", b.target));

        if !b.define_macros.is_empty() {
            lines.push(format!("DEFINES += {}", b.define_macros.join(" ")));
        }

        for include_dir in &b.include_dirs {
            lines.push(format!(
                "INCLUDEPATH += {}",
                qmake_quote(&b.relative_name(include_dir))
            ));
        }

        let libs: Vec<String> = b
            .library_dirs
            .iter()
            .map(|d| format!("-L{}", qmake_quote(&b.relative_name(d))))
            .chain(b.libraries.iter().map(|l| format!("-l{}", l)))
            .collect();

        if !libs.is_empty() {
            lines.push(format!("LIBS += {}", libs.join(" ")));
        }

        lines.push(format!("HEADERS = {}", quoted(b, &b.headers)));
        lines.push(format!("SOURCES = {}", quoted(b, &b.sources)));

        if !b.extra_compile_args.is_empty() {
            lines.push(format!(
                "QMAKE_CXXFLAGS += {}",
                b.extra_compile_args.join(" ")
            ));
        }

        if !b.extra_link_args.is_empty() {
            lines.push(format!("QMAKE_LFLAGS += {}", b.extra_link_args.join(" ")));
        }

        if !b.extra_objects.is_empty() {
            lines.push(format!("OBJECTS += {}", quoted(b, &b.extra_objects)));
        }
    }
}

fn quoted(b: &Buildable, names: &[String]) -> String {
    names
        .iter()
        .map(|n| qmake_quote(&b.relative_name(n)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Add the lines installing an installable and record where its files go.
fn install_lines(
    lines: &mut Vec<String>,
    installed: &mut Vec<PathBuf>,
    installable: &Installable,
    target_dir: &Path,
) {
    installed.extend(installable.installed_paths(target_dir));

    lines.push(format!(
        "{}.path = {}",
        installable.name,
        to_slashed(&installable.full_target_dir(target_dir))
    ));

    // qmake installs a TARGET without being told its files.
    if !installable.is_target {
        let files: Vec<String> = installable.files.iter().map(|f| qmake_quote(f)).collect();
        lines.push(format!("{}.files = {}", installable.name, files.join(" ")));
    }

    lines.push(format!("INSTALLS += {}", installable.name));
}
