//! `qtbuild bundle` command

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{BundleArgs, WindowsArgs};
use qtbuild::ops::{bundle, BundleOptions, WindowsDlls};
use qtbuild::util::config::{load_for_project, BundleConfig};
use qtbuild::util::Reporter;

/// The Windows DLL options from the flags, falling back to the configuration.
pub fn windows_dlls(args: WindowsArgs, config: &BundleConfig) -> WindowsDlls {
    WindowsDlls {
        msvc_runtime: !args.no_msvc_runtime,
        openssl: !args.no_openssl,
        openssl_dir: args.openssl_dir.or_else(|| config.openssl_dir.clone()),
        dlls_dir: args.dlls_dir.or_else(|| config.dlls_dir.clone()),
    }
}

/// The bundle options from the flags and configuration. Excluded components
/// from both are combined.
fn bundle_options(args: BundleArgs, config: &BundleConfig) -> BundleOptions {
    let mut exclude = config.exclude.clone();
    exclude.extend(args.exclude);

    BundleOptions {
        wheel: args.wheel,
        qt_dir: args.qt_dir,
        output_dir: args.output_dir,
        build_tag_suffix: args.build_tag_suffix,
        windows: windows_dlls(args.windows, config),
        exclude,
        ignore_missing: args.ignore_missing || config.ignore_missing,
        arch: args.arch,
    }
}

pub fn execute(args: BundleArgs, shell: Arc<dyn Reporter>) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_for_project(&cwd);

    bundle(&bundle_options(args, &config.bundle), shell)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    /// Helper to parse BundleArgs from command-line strings.
    fn parse_bundle_args(args: &[&str]) -> BundleArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            bundle: BundleArgs,
        }
        let cli = TestCli::parse_from(args);
        cli.bundle
    }

    #[test]
    fn test_bundle_args_defaults() {
        let args = parse_bundle_args(&[
            "test",
            "PyQt6-6.5.1-cp37-abi3-win_amd64.whl",
            "--qt-dir",
            "C:/Qt/6.5.2/msvc2019_64",
        ]);

        let options = bundle_options(args, &BundleConfig::default());
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert!(options.windows.msvc_runtime);
        assert!(options.windows.openssl);
        assert!(!options.ignore_missing);
        assert!(options.arch.is_none());
    }

    #[test]
    fn test_flags_and_config_combine() {
        let args = parse_bundle_args(&[
            "test",
            "PyQt6-6.5.1-cp37-abi3-win_amd64.whl",
            "--qt-dir",
            "C:/Qt/6.5.2/msvc2019_64",
            "--exclude",
            "QtWebEngineCore",
            "--no-openssl",
            "--dlls-dir",
            "D:/dlls",
        ]);
        let config = BundleConfig {
            ignore_missing: true,
            exclude: vec!["QtDesigner".to_string()],
            openssl_dir: Some(PathBuf::from("C:/OpenSSL")),
            dlls_dir: Some(PathBuf::from("C:/dlls")),
        };

        let options = bundle_options(args, &config);
        assert_eq!(options.exclude, ["QtDesigner", "QtWebEngineCore"]);
        assert!(options.ignore_missing);
        assert!(!options.windows.openssl);
        assert_eq!(options.windows.openssl_dir, Some(PathBuf::from("C:/OpenSSL")));
        assert_eq!(options.windows.dlls_dir, Some(PathBuf::from("D:/dlls")));
    }
}
