//! Per-platform fixes applied to copied Qt binaries.
//!
//! Package installers cannot reproduce the symlinked layout of a Qt
//! installation, so helper executables end up somewhere other than where
//! they were built to run from and need their library search paths fixing.

use std::path::Path;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::bundle::errors::BundleError;
use crate::core::{PlatformFamily, QtVersion};
use crate::util::fs::write_string;
use crate::util::process::{find_executable, ProcessBuilder};

/// The Qt release whose helper executables have broken rpaths.
const BROKEN_RPATHS: QtVersion = QtVersion::new(5, 6, 0);

/// The rpath embedded in macOS helpers, relative to the framework layout.
const MACOS_LOADER_PATH: &[u8] = b"@loader_path/../../../../../../../";

/// Its replacement, padded with NULs to the same length.
const MACOS_LOADER_PATH_FIXED: &[u8] = b"@loader_path/../../../../../\0\0\0\0\0\0";

/// The contents of the `qt.conf` placed next to a helper executable.
pub const QT_CONF: &str = "[Paths]\nPrefix = ..\n";

/// The external tools that fixing up a bundle will run.
pub fn required_tools(
    family: PlatformFamily,
    qt_version: QtVersion,
    has_exes: bool,
    thinning: bool,
) -> Vec<&'static str> {
    let mut tools = Vec::new();

    if has_exes {
        match family {
            PlatformFamily::Linux if qt_version == BROKEN_RPATHS => tools.push("chrpath"),
            PlatformFamily::MacOs => {
                if qt_version == BROKEN_RPATHS {
                    tools.push("install_name_tool");
                }
                tools.push("codesign");
            }
            _ => {}
        }
    }

    if thinning {
        tools.push("lipo");
    }

    tools
}

/// Fail if any of the tools can't be found.
pub fn check_tools(tools: &[&str]) -> Result<()> {
    for tool in tools {
        if find_executable(tool).is_none() {
            return Err(BundleError::MissingTool {
                tool: tool.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

/// Fix a helper executable that has just been copied into the bundle.
pub fn patch_executable(exe: &Path, family: PlatformFamily, qt_version: QtVersion) -> Result<()> {
    match family {
        PlatformFamily::Linux => {
            if qt_version == BROKEN_RPATHS {
                run(ProcessBuilder::new("chrpath")
                    .arg("--replace")
                    .arg("$ORIGIN/../lib")
                    .arg(exe))?;
            }
            create_qt_conf(exe)
        }
        PlatformFamily::MacOs => {
            if qt_version == BROKEN_RPATHS {
                for rpath in [
                    "@loader_path/../../../../../../../../Frameworks",
                    "/Users/qt/work/install/lib",
                ] {
                    run(ProcessBuilder::new("install_name_tool")
                        .arg("-delete_rpath")
                        .arg(rpath)
                        .arg(exe))?;
                }
                run(ProcessBuilder::new("install_name_tool")
                    .arg("-add_rpath")
                    .arg("@loader_path/../../../../../")
                    .arg(exe))?;
            } else {
                let contents = std::fs::read(exe)
                    .with_context(|| format!("failed to read {}", exe.display()))?;
                if let Some(patched) = patch_loader_path(&contents) {
                    std::fs::write(exe, patched)
                        .with_context(|| format!("failed to write {}", exe.display()))?;
                }
            }

            // Any change invalidates the signature.
            run(ProcessBuilder::new("codesign")
                .arg("--force")
                .arg("--sign")
                .arg("-")
                .arg(exe))
        }
        PlatformFamily::Windows => create_qt_conf(exe),
    }
}

/// Write a `qt.conf` next to an executable so that it finds the rest of Qt.
fn create_qt_conf(exe: &Path) -> Result<()> {
    let dir = exe.parent().unwrap_or(Path::new("."));
    write_string(&dir.join("qt.conf"), QT_CONF)
}

/// Replace every occurrence of the framework-relative rpath with one
/// relative to the installed location. The length of the binary is
/// unchanged. Returns `None` if there was nothing to replace.
pub fn patch_loader_path(contents: &[u8]) -> Option<Vec<u8>> {
    let from = MACOS_LOADER_PATH;
    let mut patched = contents.to_vec();
    let mut found = false;
    let mut i = 0;

    while i + from.len() <= patched.len() {
        if &patched[i..i + from.len()] == from {
            patched[i..i + from.len()].copy_from_slice(MACOS_LOADER_PATH_FIXED);
            found = true;
            i += from.len();
        } else {
            i += 1;
        }
    }

    found.then_some(patched)
}

/// Whether the leading bytes of a file are those of a universal (fat)
/// Mach-O binary.
///
/// Java class files share the magic number, but their version fields make
/// the architecture count implausibly large.
pub fn is_universal_macho(header: &[u8]) -> bool {
    if header.len() < 8 {
        return false;
    }

    let magic = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let nfat_arch = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    magic == 0xcafe_babe && (1..=16).contains(&nfat_arch)
}

/// Reduce every universal binary under `dir` to the single architecture
/// `arch`. Returns the number of files thinned.
pub fn thin_tree(dir: &Path, arch: &str) -> Result<usize> {
    let mut thinned = 0;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !is_universal_macho(&read_header(path)?) {
            continue;
        }

        let thin = path.with_file_name(format!(
            "{}.thin",
            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        ));
        run(ProcessBuilder::new("lipo")
            .arg(path)
            .arg("-thin")
            .arg(arch)
            .arg("-output")
            .arg(&thin))?;
        std::fs::rename(&thin, path)
            .with_context(|| format!("failed to replace {}", path.display()))?;

        tracing::debug!("thinned {} to {}", path.display(), arch);
        thinned += 1;
    }

    Ok(thinned)
}

fn read_header(path: &Path) -> Result<Vec<u8>> {
    use std::io::Read;

    let mut header = Vec::with_capacity(8);
    std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .take(8)
        .read_to_end(&mut header)
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(header)
}

fn run(cmd: ProcessBuilder) -> Result<()> {
    let output = cmd.exec()?;

    if !output.status.success() {
        bail!(
            "`{}` failed: {}",
            cmd.display_command(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_patch_loader_path_keeps_length() {
        let mut binary = b"\x00\x01LC_RPATH".to_vec();
        binary.extend_from_slice(MACOS_LOADER_PATH);
        binary.extend_from_slice(b"\x00tail");

        let patched = patch_loader_path(&binary).unwrap();
        assert_eq!(patched.len(), binary.len());
        assert!(patched
            .windows(MACOS_LOADER_PATH_FIXED.len())
            .any(|w| w == MACOS_LOADER_PATH_FIXED));
        assert!(patched.ends_with(b"\x00tail"));

        assert!(patch_loader_path(b"no rpath here").is_none());
    }

    #[test]
    fn test_is_universal_macho() {
        assert!(is_universal_macho(&[0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 2]));
        // A Java class file, version 52.
        assert!(!is_universal_macho(&[0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 52]));
        // A thin 64-bit Mach-O.
        assert!(!is_universal_macho(&[0xcf, 0xfa, 0xed, 0xfe, 7, 0, 0, 1]));
        assert!(!is_universal_macho(&[0xca, 0xfe]));
    }

    #[test]
    fn test_required_tools() {
        let v6 = QtVersion::new(6, 5, 0);

        assert!(required_tools(PlatformFamily::Linux, v6, true, false).is_empty());
        assert_eq!(
            required_tools(PlatformFamily::Linux, BROKEN_RPATHS, true, false),
            ["chrpath"]
        );
        assert_eq!(required_tools(PlatformFamily::MacOs, v6, true, true), ["codesign", "lipo"]);
        assert!(required_tools(PlatformFamily::MacOs, v6, false, false).is_empty());
        assert!(required_tools(PlatformFamily::Windows, v6, true, false).is_empty());
    }

    #[test]
    fn test_windows_executable_gets_qt_conf() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("bin").join("QtWebEngineProcess.exe");
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        std::fs::write(&exe, b"MZ").unwrap();

        patch_executable(&exe, PlatformFamily::Windows, QtVersion::new(6, 5, 0)).unwrap();

        let conf = std::fs::read_to_string(tmp.path().join("bin").join("qt.conf")).unwrap();
        assert_eq!(conf, QT_CONF);
    }

    #[test]
    fn test_missing_tool() {
        let err = check_tools(&["qtbuild-no-such-tool"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::MissingTool { .. })
        ));
    }
}
