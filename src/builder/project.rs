//! Building a whole project with qmake.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::builder::errors::BuildError;
use crate::builder::pro_file::{GeneratorSettings, ProFileGenerator};
use crate::builder::qmake::{QmakeDriver, DEFAULT_MAKEFILE};
use crate::builder::toolchain::QtConfiguration;
use crate::core::manifest::{ConfigTest, Manifest};
use crate::core::{Buildable, BuildableKind, Installable};
use crate::util::fs::{read_to_string, remove_file_if_exists, write_string};
use crate::util::process::{find_executable, resolve_tool, ProcessBuilder};
use crate::util::{Reporter, Status};

/// Options controlling a build, after config files and flags are merged.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// qmake to use (None = search PATH)
    pub qmake: Option<PathBuf>,

    /// Spec to build with (None = qmake's default)
    pub spec: Option<String>,

    pub jobs: Option<usize>,

    /// Make tool overriding the platform default
    pub make: Option<String>,

    /// Extra lines for every .pro file
    pub qmake_settings: Vec<String>,

    /// Don't run make after generating the Makefiles
    pub no_make: bool,
}

/// A project builder using qmake as the underlying build system.
pub struct QmakeBuilder {
    manifest: Manifest,
    config: QtConfiguration,
    driver: QmakeDriver,
    generator: ProFileGenerator,
    no_make: bool,
    reporter: Arc<dyn Reporter>,
}

impl QmakeBuilder {
    /// Locate qmake, query the Qt installation and prepare to build.
    pub fn configure(
        manifest: Manifest,
        options: BuildOptions,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let qmake = match &options.qmake {
            Some(qmake) => resolve_tool(qmake).ok_or_else(|| BuildError::MissingTool {
                tool: qmake.display().to_string(),
            })?,
            None => find_executable("qmake").ok_or_else(|| BuildError::MissingTool {
                tool: "qmake".to_string(),
            })?,
        };
        let qmake = std::path::absolute(&qmake)
            .with_context(|| format!("failed to resolve {}", qmake.display()))?;

        let config = QtConfiguration::query(&qmake, reporter.as_ref())?;
        Self::with_configuration(manifest, config, options, reporter)
    }

    /// Prepare to build against an already queried Qt installation.
    pub fn with_configuration(
        manifest: Manifest,
        config: QtConfiguration,
        options: BuildOptions,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let spec = match options.spec.or_else(|| config.default_spec()) {
            Some(spec) => spec,
            None => anyhow::bail!("qmake did not report QMAKE_SPEC, specify a spec"),
        };

        let project = &manifest.project;
        let mut settings = GeneratorSettings::new(spec.clone(), config.py_platform());
        settings.py_debug = project.py_debug;
        settings.qml_debug = project.qml_debug;
        settings.android_abis = project.android_abis.clone();
        settings.apple_universal2 = project.apple_universal2;
        settings.target_qt_dir = project.target_qt_dir.clone();
        settings.py_include_dir = project.py_include_dir.clone();
        settings.py_pylib_dir = project.py_pylib_dir.clone();
        settings.qmake_settings = options.qmake_settings;

        let driver = QmakeDriver::new(&config, spec)
            .with_make(options.make)
            .with_jobs(options.jobs)
            .with_reporter(Arc::clone(&reporter));

        Ok(QmakeBuilder {
            manifest,
            config,
            driver,
            generator: ProFileGenerator::new(settings),
            no_make: options.no_make,
            reporter,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn qt_configuration(&self) -> &QtConfiguration {
        &self.config
    }

    pub fn build_dir(&self) -> PathBuf {
        self.manifest.build_dir()
    }

    /// The buildables of the project, dropping any whose configuration test
    /// doesn't build.
    ///
    /// A module's own test program in `config-tests/` takes precedence over
    /// a `test` in the manifest and is also run. Each line it writes is a
    /// disabled feature.
    pub fn buildables(&self) -> Result<Vec<Buildable>> {
        let mut buildables = Vec::new();

        for spec in &self.manifest.modules {
            let mut b = self.manifest.buildable(spec)?;

            let buildable = match self.manifest.external_config_test(&spec.name) {
                Some(source) => match self.compile_config_test(&b, &source)? {
                    Some(exe) => {
                        self.run_config_test(&mut b, &exe)?;
                        true
                    }
                    None => false,
                },
                None => match &spec.test {
                    Some(test) => {
                        let source = b.build_dir.join(format!("cfgtest_{}.cpp", b.name));
                        write_string(&source, &config_test_source(test))?;
                        self.compile_config_test(&b, &source)?.is_some()
                    }
                    None => true,
                },
            };

            if !buildable {
                self.reporter.status(
                    Status::Skipped,
                    &format!("the {} module cannot be built", b.name),
                );
                tracing::warn!("configuration test for {} failed, skipping", b.name);
                continue;
            }

            buildables.push(b);
        }

        Ok(buildables)
    }

    /// Compile and link a configuration test program for a module, returning
    /// the executable if it was built.
    fn compile_config_test(&self, b: &Buildable, source: &Path) -> Result<Option<PathBuf>> {
        self.reporter.status(
            Status::Checking,
            &format!("to see if the {} module can be built", b.name),
        );

        let test_name = format!("cfgtest_{}", b.name);
        let mut exe = Buildable::executable(&test_name, b.build_dir.clone());
        exe.builder_settings = b.builder_settings.clone();
        exe.sources = vec![source.to_string_lossy().into_owned()];
        exe.debug = b.debug;

        self.build_executable(&exe, &format!("{}.mk", test_name), false)
    }

    /// Run a compiled configuration test and record the features it
    /// disables.
    fn run_config_test(&self, b: &mut Buildable, exe: &Path) -> Result<()> {
        let out_file = b.build_dir.join(format!("cfgtest_{}.out", b.name));
        remove_file_if_exists(&out_file)?;

        // The exit status is ignored, only the output file matters.
        if let Err(e) = ProcessBuilder::new(exe).arg(&out_file).cwd(&b.build_dir).exec() {
            tracing::warn!("{:#}", e);
        }

        if !out_file.is_file() {
            return Err(BuildError::ConfigTestOutput {
                program: exe.to_path_buf(),
            }
            .into());
        }

        let disabled: Vec<String> = read_to_string(&out_file)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        if !disabled.is_empty() {
            self.reporter.status(
                Status::Warning,
                &format!("Disabled {} features: {}", b.name, disabled.join(", ")),
            );
            b.disabled_features.extend(disabled);
        }

        Ok(())
    }

    /// Build an executable, returning its path if it was created.
    pub fn build_executable(
        &self,
        b: &Buildable,
        makefile: &str,
        fatal: bool,
    ) -> Result<Option<PathBuf>> {
        let pro = self.generator.executable(b);
        pro.write()?;

        if !self
            .driver
            .generate_makefiles(&pro.path, makefile, fatal, false)?
        {
            return Ok(None);
        }

        self.driver
            .run_build(&b.build_dir, &b.target, makefile, b.debug, fatal)
    }

    /// Generate every .pro file and the Makefiles, then build unless told
    /// not to. Returns the paths that installing into `target_dir` creates.
    pub fn build_project(&self, target_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut installed = Vec::new();
        let mut subdirs = Vec::new();
        let mut installables: Vec<Installable> = Vec::new();

        for b in self.buildables()? {
            match b.kind {
                BuildableKind::Module => {
                    self.reporter.status(
                        Status::Generating,
                        &format!("the .pro file for the {} module", b.target),
                    );

                    let generated = self.generator.module(&b, target_dir);
                    generated.write()?;
                    installed.extend(generated.installed);
                    subdirs.push(b.name.clone());
                }
                BuildableKind::Files => installables.extend(b.installables),
                BuildableKind::Executable => {
                    return Err(BuildError::UnsupportedBuildable {
                        name: b.name,
                        kind: "executable".to_string(),
                    }
                    .into())
                }
            }
        }

        installables.extend(self.manifest.installables());

        self.reporter
            .status(Status::Generating, &"the top-level .pro file");

        let build_dir = self.build_dir();
        let top = self.generator.top_level(
            build_dir.join(format!("{}.pro", self.manifest.project.name)),
            &subdirs,
            &installables,
            target_dir,
            &mut installed,
        );
        top.write()?;

        self.reporter.status(Status::Generating, &"the Makefiles");
        self.driver
            .generate_makefiles(&top.path, DEFAULT_MAKEFILE, true, true)?;

        if !self.no_make {
            self.reporter.status(Status::Compiling, &"the project");
            self.driver.run_project_make(&build_dir, false)?;
        }

        Ok(installed)
    }

    /// Install a built project.
    pub fn install_project(&self) -> Result<()> {
        self.driver.run_project_make(&self.build_dir(), true)?;
        self.reporter.status(Status::Installed, &"the project");

        Ok(())
    }
}

/// The C++ source of a configuration test.
fn config_test_source(test: &ConfigTest) -> String {
    let includes: Vec<String> = test
        .headers
        .iter()
        .map(|h| format!("#include<{}>", h))
        .collect();

    format!(
        "{}\n\nint main(int, char **)\n{{\n    {};\n}}\n",
        includes.join("\n"),
        test.call
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Silent;

    #[test]
    fn test_config_test_source() {
        let test = ConfigTest {
            headers: vec!["QtCore/qglobal.h".to_string(), "QtCore/qstring.h".to_string()],
            call: "qVersion()".to_string(),
        };

        assert_eq!(
            config_test_source(&test),
            "#include<QtCore/qglobal.h>\n#include<QtCore/qstring.h>\n\nint main(int, char **)\n{\n    qVersion();\n}\n"
        );
    }

    #[cfg(unix)]
    mod scripts {
        use super::*;
        use crate::util::fs::set_mode;
        use tempfile::TempDir;

        const QUERY: &str = "QT_VERSION:6.5.0\nQMAKE_SPEC:linux-g++\nQMAKE_XSPEC:linux-g++\n";

        fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
            set_mode(&path, 0o755).unwrap();
            path
        }

        /// A project with two modules, the second of which has a config test
        /// that only "builds" when `$QTBUILD_TEST_PASS` names it.
        fn setup(tmp: &TempDir, make_body: &str) -> QmakeBuilder {
            let tools = tmp.path().join("tools");
            std::fs::create_dir_all(&tools).unwrap();

            let qmake = script(
                &tools,
                "qmake",
                "mf=Makefile\nwhile [ $# -gt 0 ]; do [ \"$1\" = -o ] && mf=$2; shift; done\necho all: > $mf\n",
            );
            let make = script(&tools, "make", make_body);

            let manifest = r#"
[project]
name = "PyQt6"

[[module]]
name = "QtCore"
sources = ["QtCore.cpp"]

[[module]]
name = "QtNfc"
sources = ["QtNfc.cpp"]
test = { headers = ["QtNfc/qnearfieldmanager.h"], call = "new QNearFieldManager()" }

[[install]]
name = "licence"
target_subdir = "PyQt6"
files = ["LICENSE"]
"#;
            let path = tmp.path().join("QtBuild.toml");
            std::fs::write(&path, manifest).unwrap();
            let manifest = Manifest::load(&path).unwrap();

            let config = QtConfiguration::parse(&qmake, QUERY).unwrap();
            let options = BuildOptions {
                make: Some(make.display().to_string()),
                ..Default::default()
            };

            QmakeBuilder::with_configuration(manifest, config, options, Arc::new(Silent)).unwrap()
        }

        #[test]
        fn test_failing_config_test_drops_module() {
            let tmp = TempDir::new().unwrap();
            let builder = setup(&tmp, "exit 1\n");

            let names: Vec<String> = builder.buildables().unwrap().into_iter().map(|b| b.name).collect();
            assert_eq!(names, vec!["QtCore"]);
            assert!(tmp.path().join("build/QtNfc/cfgtest_QtNfc.cpp").is_file());
            assert!(tmp.path().join("build/QtNfc/cfgtest_QtNfc.pro").is_file());
        }

        #[test]
        fn test_passing_config_test_keeps_module() {
            let tmp = TempDir::new().unwrap();
            let builder = setup(&tmp, "echo built > cfgtest_QtNfc\n");

            assert_eq!(builder.buildables().unwrap().len(), 2);
        }

        fn add_external_test(tmp: &TempDir) {
            let dir = tmp.path().join("config-tests");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("cfgtest_QtNfc.cpp"), "int main() {}\n").unwrap();
        }

        #[test]
        fn test_external_config_test_disables_features() {
            let tmp = TempDir::new().unwrap();
            let builder = setup(
                &tmp,
                "printf '#!/bin/sh\\nprintf \"PyQt_NFC_Tags\\\\nPyQt_NFC_Ndef\\\\n\" > \"$1\"\\n' > cfgtest_QtNfc\nchmod +x cfgtest_QtNfc\n",
            );
            add_external_test(&tmp);

            let buildables = builder.buildables().unwrap();
            assert_eq!(buildables.len(), 2);
            assert_eq!(buildables[1].disabled_features, vec!["PyQt_NFC_Tags", "PyQt_NFC_Ndef"]);
            assert!(buildables[0].disabled_features.is_empty());

            // The manifest's own test isn't generated.
            assert!(!tmp.path().join("build/QtNfc/cfgtest_QtNfc.cpp").exists());
            let pro = std::fs::read_to_string(tmp.path().join("build/QtNfc/cfgtest_QtNfc.pro")).unwrap();
            assert!(pro.contains("config-tests/cfgtest_QtNfc.cpp"));
        }

        #[test]
        fn test_external_config_test_without_output() {
            let tmp = TempDir::new().unwrap();
            let builder = setup(
                &tmp,
                "printf '#!/bin/sh\\nexit 0\\n' > cfgtest_QtNfc\nchmod +x cfgtest_QtNfc\n",
            );
            add_external_test(&tmp);

            let err = builder.buildables().unwrap_err();
            assert!(matches!(
                err.downcast_ref::<BuildError>(),
                Some(BuildError::ConfigTestOutput { .. })
            ));
        }

        #[test]
        fn test_external_config_test_that_fails_to_build() {
            let tmp = TempDir::new().unwrap();
            let builder = setup(&tmp, "exit 1\n");
            add_external_test(&tmp);

            let names: Vec<String> = builder.buildables().unwrap().into_iter().map(|b| b.name).collect();
            assert_eq!(names, vec!["QtCore"]);
        }

        #[test]
        fn test_build_project() {
            let tmp = TempDir::new().unwrap();
            let builder = setup(&tmp, "touch cfgtest_QtNfc; echo \"$@\" >> make.log\n");
            let target = tmp.path().join("site");

            let installed = builder.build_project(&target).unwrap();

            assert_eq!(
                installed,
                vec![
                    target.join("QtCore.so"),
                    target.join("QtNfc.so"),
                    target.join("PyQt6").join("LICENSE"),
                ]
            );

            let top = std::fs::read_to_string(tmp.path().join("build/PyQt6.pro")).unwrap();
            assert!(top.contains("SUBDIRS = QtCore QtNfc\n"));
            assert!(top.contains("INSTALLS += licence\n"));
            assert!(tmp.path().join("build/QtCore/QtCore.pro").is_file());
            assert!(tmp.path().join("build/QtCore/QtCore.exp").is_file());
            assert!(tmp.path().join("build/Makefile").is_file());
            assert!(tmp.path().join("build/make.log").is_file());

            builder.install_project().unwrap();
            let log = std::fs::read_to_string(tmp.path().join("build/make.log")).unwrap();
            assert!(log.lines().any(|l| l == "install"));
        }
    }
}
