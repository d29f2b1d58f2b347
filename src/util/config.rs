//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.qtbuild/config.toml` - User-wide defaults
//! - Project: `.qtbuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Bundling settings
    pub bundle: BundleConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Path to qmake (None = search PATH)
    pub qmake: Option<PathBuf>,

    /// The qmake spec to build with (None = qmake's default)
    pub spec: Option<String>,

    /// Number of parallel make jobs
    pub jobs: Option<usize>,

    /// Make tool to use instead of the one implied by the platform
    pub make: Option<String>,

    /// Extra `NAME += VALUE` lines added to every generated .pro file
    #[serde(default)]
    pub qmake_settings: Vec<String>,
}

/// Bundle-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Skip files missing from the Qt installation instead of failing
    #[serde(default)]
    pub ignore_missing: bool,

    /// Qt components never to bundle
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Directory containing OpenSSL DLLs to bundle on Windows
    pub openssl_dir: Option<PathBuf>,

    /// Directory containing the fallback runtime and OpenSSL DLL sets
    pub dlls_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.qmake.is_some() {
            self.build.qmake = other.build.qmake;
        }
        if other.build.spec.is_some() {
            self.build.spec = other.build.spec;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.make.is_some() {
            self.build.make = other.build.make;
        }
        if !other.build.qmake_settings.is_empty() {
            self.build.qmake_settings = other.build.qmake_settings;
        }

        // Bundle settings
        if other.bundle.ignore_missing {
            self.bundle.ignore_missing = true;
        }
        if !other.bundle.exclude.is_empty() {
            self.bundle.exclude = other.bundle.exclude;
        }
        if other.bundle.openssl_dir.is_some() {
            self.bundle.openssl_dir = other.bundle.openssl_dir;
        }
        if other.bundle.dlls_dir.is_some() {
            self.bundle.dlls_dir = other.bundle.dlls_dir;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.qtbuild/config.toml)
/// 2. Global config (~/.qtbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Load the configuration that applies to a project directory.
pub fn load_for_project(project_root: &Path) -> Config {
    let project = project_config_path(project_root);

    match global_config_path() {
        Some(global) => load_config(&global, &project),
        None => load_config(Path::new(""), &project),
    }
}

/// Get the global config directory (~/.qtbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".qtbuild"))
}

/// Get the global config path (~/.qtbuild/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.qtbuild/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".qtbuild").join("config.toml")
}
