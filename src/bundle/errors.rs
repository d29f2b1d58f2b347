//! Errors raised while bundling Qt into a wheel.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::QtVersion;

#[derive(Debug, Error, Diagnostic)]
pub enum BundleError {
    #[error("'{name}' is missing from the Qt installation")]
    #[diagnostic(
        code(qtbuild::bundle::packaging),
        help("pass --ignore-missing to bundle the rest of the installation anyway")
    )]
    Packaging { name: String },

    #[error("unable to recognise '{name}' as a wheel name")]
    #[diagnostic(
        code(qtbuild::bundle::naming),
        help("expected NAME-VERSION[-BUILD]-PYTHON-ABI-PLATFORM[-unlicensed].whl")
    )]
    Naming { name: String },

    #[error("'{name}' is not a supported package")]
    #[diagnostic(code(qtbuild::bundle::unknown_package))]
    UnknownPackage { name: String },

    #[error("unable to parse '{version}' as a version number")]
    #[diagnostic(
        code(qtbuild::bundle::qt_version),
        help("the Qt directory should look like .../<version>/<arch>, e.g. ~/Qt/6.5.0/gcc_64")
    )]
    QtVersion { version: String },

    #[error("the version of Qt being bundled (v{found}) is too old, v{required} or later is required")]
    #[diagnostic(code(qtbuild::bundle::qt_too_old))]
    QtTooOld { found: QtVersion, required: QtVersion },

    #[error("'{tag}' is not a supported platform tag for this operation")]
    #[diagnostic(code(qtbuild::bundle::unsupported_platform))]
    UnsupportedPlatform { tag: String },

    #[error("Qt architecture '{arch}' is unsupported")]
    #[diagnostic(
        code(qtbuild::bundle::unsupported_qt_arch),
        help("supported architectures are gcc_64, clang_64, macos and msvc*")
    )]
    UnsupportedQtArch { arch: String },

    #[error("'{}' doesn't contain a .dist-info directory", .wheel.display())]
    #[diagnostic(code(qtbuild::bundle::missing_dist_info))]
    MissingDistInfo { wheel: PathBuf },

    #[error("{} already exists", .path.display())]
    #[diagnostic(
        code(qtbuild::bundle::would_overwrite),
        help("remove it or choose a different output directory")
    )]
    WouldOverwrite { path: PathBuf },

    #[error("'{tool}' is required to bundle for this platform but could not be found")]
    #[diagnostic(code(qtbuild::bundle::missing_tool))]
    MissingTool { tool: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BundleError::Packaging {
            name: "libQt6Core.so.6".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'libQt6Core.so.6' is missing from the Qt installation"
        );

        let err = BundleError::QtTooOld {
            found: QtVersion::new(6, 4, 3),
            required: QtVersion::new(6, 5, 0),
        };
        assert!(err.to_string().contains("v6.4.3"));
    }
}
