//! Driving qmake and make.
//!
//! Each invocation runs with an explicit working directory (the directory of
//! the .pro file or Makefile), so the process's own current directory is
//! never changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::errors::BuildError;
use crate::builder::toolchain::QtConfiguration;
use crate::core::PyPlatform;
use crate::util::fs::remove_file_if_exists;
use crate::util::process::{resolve_tool, ProcessBuilder};
use crate::util::{Reporter, Silent};

/// The default makefile name qmake generates.
pub const DEFAULT_MAKEFILE: &str = "Makefile";

/// Runs qmake and the platform's make tool.
pub struct QmakeDriver {
    qmake: PathBuf,
    spec: String,
    qmake_default_spec: Option<String>,
    py_platform: PyPlatform,
    make: Option<String>,
    jobs: Option<usize>,
    reporter: Arc<dyn Reporter>,
}

impl QmakeDriver {
    /// Create a driver building with `spec` for the installation described
    /// by `config`.
    pub fn new(config: &QtConfiguration, spec: impl Into<String>) -> Self {
        QmakeDriver {
            qmake: config.qmake.clone(),
            spec: spec.into(),
            qmake_default_spec: config.qmake_spec().map(String::from),
            py_platform: config.py_platform(),
            make: None,
            jobs: None,
            reporter: Arc::new(Silent),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Use `make` instead of the tool implied by the platform.
    pub fn with_make(mut self, make: Option<String>) -> Self {
        self.make = make;
        self
    }

    /// Pass `-j jobs` to make when building the project.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn py_platform(&self) -> PyPlatform {
        self.py_platform
    }

    /// The name of the make tool.
    pub fn make_tool(&self) -> String {
        if let Some(make) = &self.make {
            return make.clone();
        }

        match self.py_platform {
            PyPlatform::Win32 if self.spec.contains("g++") => "mingw32-make".to_string(),
            PyPlatform::Win32 => "nmake".to_string(),
            _ => "make".to_string(),
        }
    }

    /// Locate the make tool, failing before anything is run if it is absent.
    pub fn find_make(&self) -> Result<PathBuf> {
        let make = self.make_tool();

        resolve_tool(Path::new(&make)).ok_or_else(|| BuildError::MissingTool { tool: make }.into())
    }

    /// The qmake command line for a .pro file.
    fn qmake_command(&self, pro_file: &Path, makefile: &str, recursive: bool) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.qmake);

        // Only pass the spec if it isn't the default.
        if self.qmake_default_spec.as_deref() != Some(self.spec.as_str()) {
            cmd = cmd.arg("-spec").arg(&self.spec);
        }

        if makefile != DEFAULT_MAKEFILE {
            cmd = cmd.arg("-o").arg(makefile);
        }

        if recursive {
            cmd = cmd.arg("-recursive");
        }

        let pro_name = pro_file.file_name().unwrap_or(pro_file.as_os_str());
        cmd = cmd.arg(pro_name);

        match pro_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => cmd.cwd(dir),
            _ => cmd,
        }
    }

    /// Run qmake on a .pro file to generate `makefile` next to it.
    ///
    /// Any existing makefile is removed first so that success can be judged
    /// by its existence. If `fatal` is false a failure returns `Ok(false)`
    /// instead of an error.
    pub fn generate_makefiles(
        &self,
        pro_file: &Path,
        makefile: &str,
        fatal: bool,
        recursive: bool,
    ) -> Result<bool> {
        let dir = pro_file.parent().unwrap_or(Path::new("."));
        let makefile_path = dir.join(makefile);
        remove_file_if_exists(&makefile_path)?;

        let cmd = self.qmake_command(pro_file, makefile, recursive);
        let output = cmd.exec()?;
        self.report_output(&output.stdout, &output.stderr);

        if output.status.success() && makefile_path.is_file() {
            return Ok(true);
        }

        if fatal {
            return Err(BuildError::BuildGeneration {
                tool: self.qmake.display().to_string(),
                pro_file: pro_file.to_path_buf(),
            }
            .into());
        }

        tracing::debug!("`{}` did not create {}", cmd.display_command(), makefile);
        Ok(false)
    }

    /// Build an executable with make in `dir`.
    ///
    /// Returns the path of the executable, or `None` if it wasn't created
    /// (which is how a failed configuration test is detected).
    pub fn run_build(
        &self,
        dir: &Path,
        target: &str,
        makefile: &str,
        debug: bool,
        fatal: bool,
    ) -> Result<Option<PathBuf>> {
        let make = self.find_make()?;

        let (make_target, exe) = match self.py_platform {
            PyPlatform::Win32 => {
                let config = if debug { "debug" } else { "release" };
                (Some(config), Path::new(config).join(format!("{}.exe", target)))
            }
            PyPlatform::Darwin => (
                None,
                Path::new(&format!("{}.app", target))
                    .join("Contents")
                    .join("MacOS")
                    .join(target),
            ),
            _ => (None, PathBuf::from(target)),
        };

        let exe = dir.join(exe);
        remove_file_if_exists(&exe)?;

        let mut cmd = ProcessBuilder::new(&make).cwd(dir);
        if makefile != DEFAULT_MAKEFILE {
            cmd = cmd.arg("-f").arg(makefile);
        }
        if let Some(make_target) = make_target {
            cmd = cmd.arg(make_target);
        }

        let output = cmd.exec()?;
        self.report_output(&output.stdout, &output.stderr);

        if !output.status.success() && fatal {
            return Err(BuildError::ToolFailed {
                tool: self.make_tool(),
                code: output.status.code(),
            }
            .into());
        }

        Ok(exe.is_file().then_some(exe))
    }

    /// Run make on the top-level Makefile in `dir`, either to build or to
    /// install the project.
    pub fn run_project_make(&self, dir: &Path, install: bool) -> Result<()> {
        let make = self.find_make()?;
        let mut cmd = ProcessBuilder::new(&make).cwd(dir);

        if install {
            cmd = cmd.arg("install");
        } else if let Some(jobs) = self.jobs.filter(|_| !self.py_platform.is_windows()) {
            cmd = cmd.arg("-j").arg(jobs.to_string());
        }

        let status = cmd.status()?;
        if !status.success() {
            return Err(BuildError::ToolFailed {
                tool: self.make_tool(),
                code: status.code(),
            }
            .into());
        }

        Ok(())
    }

    fn report_output(&self, stdout: &[u8], stderr: &[u8]) {
        for line in String::from_utf8_lossy(stdout)
            .lines()
            .chain(String::from_utf8_lossy(stderr).lines())
        {
            self.reporter.verbose(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(query: &str) -> QtConfiguration {
        QtConfiguration::parse(Path::new("/opt/Qt/bin/qmake"), query).unwrap()
    }

    #[test]
    fn test_spec_only_passed_when_not_default() {
        let config = config("QT_VERSION:6.5.0\nQMAKE_SPEC:linux-g++\n");

        let driver = QmakeDriver::new(&config, "linux-g++");
        let cmd = driver.qmake_command(Path::new("/b/QtCore/QtCore.pro"), DEFAULT_MAKEFILE, false);
        assert_eq!(cmd.get_args(), &["QtCore.pro"]);
        assert_eq!(cmd.get_cwd(), Some(Path::new("/b/QtCore")));

        let driver = QmakeDriver::new(&config, "linux-clang");
        let cmd = driver.qmake_command(Path::new("/b/PyQt6.pro"), "cfgtest.mk", true);
        assert_eq!(
            cmd.get_args(),
            &["-spec", "linux-clang", "-o", "cfgtest.mk", "-recursive", "PyQt6.pro"]
        );
    }

    #[test]
    fn test_make_tool() {
        let linux = config("QT_VERSION:6.5.0\nQMAKE_SPEC:linux-g++\nQMAKE_XSPEC:linux-g++\n");
        assert_eq!(QmakeDriver::new(&linux, "linux-g++").make_tool(), "make");

        let msvc = config("QT_VERSION:6.5.0\nQMAKE_SPEC:win32-msvc\nQMAKE_XSPEC:win32-msvc\n");
        assert_eq!(QmakeDriver::new(&msvc, "win32-msvc").make_tool(), "nmake");

        let mingw = config("QT_VERSION:6.5.0\nQMAKE_SPEC:win32-g++\nQMAKE_XSPEC:win32-g++\n");
        assert_eq!(QmakeDriver::new(&mingw, "win32-g++").make_tool(), "mingw32-make");

        let driver = QmakeDriver::new(&linux, "linux-g++").with_make(Some("gmake".to_string()));
        assert_eq!(driver.make_tool(), "gmake");
    }

    #[test]
    fn test_missing_make() {
        let config = config("QT_VERSION:6.5.0\nQMAKE_SPEC:linux-g++\n");
        let driver = QmakeDriver::new(&config, "linux-g++")
            .with_make(Some("/nonexistent/qtbuild-make".to_string()));

        let err = driver.find_make().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingTool { .. })
        ));
    }

    #[cfg(unix)]
    mod scripts {
        use super::*;
        use crate::util::fs::set_mode;
        use tempfile::TempDir;

        fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
            set_mode(&path, 0o755).unwrap();
            path
        }

        fn driver(tmp: &TempDir, qmake_body: &str, make_body: &str) -> QmakeDriver {
            let qmake = script(tmp.path(), "qmake", qmake_body);
            let make = script(tmp.path(), "make", make_body);

            let config =
                QtConfiguration::parse(&qmake, "QT_VERSION:6.5.0\nQMAKE_SPEC:linux-g++\n").unwrap();

            QmakeDriver::new(&config, "linux-g++").with_make(Some(make.display().to_string()))
        }

        #[test]
        fn test_generate_makefiles() {
            let tmp = TempDir::new().unwrap();
            // Writes the makefile named by -o, else Makefile, in its cwd.
            let driver = driver(
                &tmp,
                "mf=Makefile\nwhile [ $# -gt 0 ]; do [ \"$1\" = -o ] && mf=$2; shift; done\necho all: > $mf\n",
                "exit 0\n",
            );

            let project = tmp.path().join("project");
            std::fs::create_dir_all(&project).unwrap();
            let pro = project.join("test.pro");
            std::fs::write(&pro, "TARGET = test\n").unwrap();

            assert!(driver.generate_makefiles(&pro, DEFAULT_MAKEFILE, true, false).unwrap());
            assert!(project.join("Makefile").is_file());

            assert!(driver.generate_makefiles(&pro, "test.mk", true, false).unwrap());
            assert!(project.join("test.mk").is_file());
        }

        #[test]
        fn test_generate_makefiles_failure() {
            let tmp = TempDir::new().unwrap();
            let driver = driver(&tmp, "exit 3\n", "exit 0\n");

            let pro = tmp.path().join("broken.pro");
            std::fs::write(&pro, "").unwrap();
            // A stale makefile must not be mistaken for success.
            std::fs::write(tmp.path().join("Makefile"), "stale").unwrap();

            assert!(!driver.generate_makefiles(&pro, DEFAULT_MAKEFILE, false, false).unwrap());
            assert!(!tmp.path().join("Makefile").exists());

            let err = driver.generate_makefiles(&pro, DEFAULT_MAKEFILE, true, false).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<BuildError>(),
                Some(BuildError::BuildGeneration { .. })
            ));
        }

        #[test]
        fn test_run_build() {
            let tmp = TempDir::new().unwrap();
            let driver = driver(&tmp, "exit 0\n", "echo built > cfgtest_QtCore\n");

            let exe = driver
                .run_build(tmp.path(), "cfgtest_QtCore", "cfgtest_QtCore.mk", false, false)
                .unwrap();
            assert_eq!(exe, Some(tmp.path().join("cfgtest_QtCore")));
        }

        #[test]
        fn test_run_build_not_buildable() {
            let tmp = TempDir::new().unwrap();
            let driver = driver(&tmp, "exit 0\n", "exit 2\n");
            std::fs::write(tmp.path().join("cfgtest_QtCore"), "stale").unwrap();

            let exe = driver
                .run_build(tmp.path(), "cfgtest_QtCore", DEFAULT_MAKEFILE, false, false)
                .unwrap();
            assert_eq!(exe, None);

            let err = driver
                .run_build(tmp.path(), "cfgtest_QtCore", DEFAULT_MAKEFILE, false, true)
                .unwrap_err();
            assert!(err.to_string().contains("exit code 2"));
        }

        #[test]
        fn test_run_project_make_passes_jobs() {
            let tmp = TempDir::new().unwrap();
            let driver = driver(&tmp, "exit 0\n", "echo \"$@\" > make.args\n").with_jobs(Some(4));

            driver.run_project_make(tmp.path(), false).unwrap();
            let args = std::fs::read_to_string(tmp.path().join("make.args")).unwrap();
            assert_eq!(args.trim(), "-j 4");

            driver.run_project_make(tmp.path(), true).unwrap();
            let args = std::fs::read_to_string(tmp.path().join("make.args")).unwrap();
            assert_eq!(args.trim(), "install");
        }
    }
}
