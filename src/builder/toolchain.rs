//! Qt toolchain discovery.
//!
//! qmake is asked about the Qt installation once per run with `qmake -query`.
//! The answers are kept in a [`QtConfiguration`] that is never modified
//! afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::errors::BuildError;
use crate::core::{PyPlatform, QtVersion};
use crate::util::process::ProcessBuilder;
use crate::util::{Reporter, Status};

/// The configuration of a Qt installation as reported by qmake.
#[derive(Debug, Clone, Serialize)]
pub struct QtConfiguration {
    /// The qmake that was queried
    pub qmake: PathBuf,

    /// Every `name:value` pair, `/` in names replaced by `_`
    pub values: BTreeMap<String, Option<String>>,

    #[serde(serialize_with = "serialize_version")]
    version: QtVersion,
}

fn serialize_version<S: serde::Serializer>(v: &QtVersion, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}

impl QtConfiguration {
    /// Run `qmake -query` and parse its output.
    pub fn query(qmake: &Path, reporter: &dyn Reporter) -> Result<Self> {
        reporter.status(Status::Querying, &"qmake about your Qt installation");

        let output = ProcessBuilder::new(qmake).arg("-query").exec()?;
        if !output.status.success() {
            return Err(BuildError::ToolFailed {
                tool: qmake.display().to_string(),
                code: output.status.code(),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let config = Self::parse(qmake, &stdout)?;
        tracing::debug!("found Qt v{} ({} values)", config.version, config.values.len());

        Ok(config)
    }

    /// Parse the output of `qmake -query`.
    pub fn parse(qmake: &Path, output: &str) -> Result<Self> {
        let mut values = BTreeMap::new();

        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (name, value) = line.split_once(':').ok_or_else(|| BuildError::ToolOutput {
                tool: qmake.display().to_string(),
                line: line.to_string(),
            })?;

            let value = (!value.is_empty()).then(|| value.to_string());
            values.insert(name.replace('/', "_"), value);
        }

        let version_str = values
            .get("QT_VERSION")
            .cloned()
            .flatten()
            .unwrap_or_else(|| "unknown".to_string());

        let version = match QtVersion::parse(&version_str) {
            Some(v) if v >= QtVersion::MINIMUM => v,
            _ => {
                return Err(BuildError::UnsupportedVersion {
                    found: version_str,
                    minimum: QtVersion::MINIMUM,
                }
                .into())
            }
        };

        Ok(QtConfiguration {
            qmake: qmake.to_path_buf(),
            values,
            version,
        })
    }

    /// Get a value, treating an absent value as not set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_deref())
    }

    pub fn version(&self) -> QtVersion {
        self.version
    }

    /// qmake's own default spec.
    pub fn qmake_spec(&self) -> Option<&str> {
        self.get("QMAKE_SPEC")
    }

    /// The spec to build with when none is configured.
    ///
    /// Old Qt installers defaulted to `macx-xcode`, which cannot build from
    /// the command line, so `macx-clang` is used instead.
    pub fn default_spec(&self) -> Option<String> {
        self.qmake_spec().map(|spec| match spec {
            "macx-xcode" => "macx-clang".to_string(),
            other => other.to_string(),
        })
    }

    /// The platform being built for.
    pub fn py_platform(&self) -> PyPlatform {
        PyPlatform::from_xspec(
            self.get("QMAKE_XSPEC")
                .or_else(|| self.qmake_spec())
                .unwrap_or(""),
        )
    }
}
