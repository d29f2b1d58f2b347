//! Errors raised while configuring and building a project.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::QtVersion;

#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("unexpected output from qmake: '{line}'")]
    #[diagnostic(
        code(qtbuild::build::tool_output),
        help("check that `{tool}` is a working qmake")
    )]
    ToolOutput { tool: String, line: String },

    #[error("Qt v{minimum} or later is required and you seem to be using v{found}")]
    #[diagnostic(code(qtbuild::build::unsupported_version))]
    UnsupportedVersion { found: String, minimum: QtVersion },

    #[error("{tool} failed to create a makefile from {}", .pro_file.display())]
    #[diagnostic(
        code(qtbuild::build::generation),
        help("run with --verbose to see the qmake command line")
    )]
    BuildGeneration { tool: String, pro_file: PathBuf },

    #[error("`{tool}` failed with {}", exit_description(.code))]
    #[diagnostic(code(qtbuild::build::tool_failed))]
    ToolFailed { tool: String, code: Option<i32> },

    #[error("'{tool}' could not be found on PATH")]
    #[diagnostic(
        code(qtbuild::build::missing_tool),
        help("install it or set its location in .qtbuild/config.toml")
    )]
    MissingTool { tool: String },

    #[error("'{}' didn't create any output", .program.display())]
    #[diagnostic(
        code(qtbuild::build::config_test_output),
        help("a configuration test program must write its results to the file named by its argument")
    )]
    ConfigTestOutput { program: PathBuf },

    #[error("cannot build '{name}' buildables of kind {kind}")]
    #[diagnostic(code(qtbuild::build::unsupported_buildable))]
    UnsupportedBuildable { name: String, kind: String },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BuildError::UnsupportedVersion {
            found: "5.5.1".to_string(),
            minimum: QtVersion::MINIMUM,
        };
        assert_eq!(
            err.to_string(),
            "Qt v5.6.0 or later is required and you seem to be using v5.5.1"
        );

        let err = BuildError::ToolFailed {
            tool: "make".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "`make` failed with exit code 2");
    }
}
