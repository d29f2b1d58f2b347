//! Platform classification.
//!
//! Platform tags and qmake specs are plain strings at the boundary. They are
//! classified exactly once into the closed enums here and matched on
//! exhaustively from then on.

use std::fmt;

/// The family of a binary archive's platform tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    Linux,
    MacOs,
    Windows,
}

impl PlatformFamily {
    /// Classify a platform tag such as `manylinux_2_28_x86_64`,
    /// `macosx_10_14_universal2` or `win_amd64`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.starts_with("manylinux") || tag.starts_with("musllinux") || tag.starts_with("linux")
        {
            Some(PlatformFamily::Linux)
        } else if tag.starts_with("macosx") {
            Some(PlatformFamily::MacOs)
        } else if tag.starts_with("win") {
            Some(PlatformFamily::Windows)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Linux => "linux",
            PlatformFamily::MacOs => "macos",
            PlatformFamily::Windows => "win",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The platform an extension module is being built for, derived from qmake's
/// `QMAKE_XSPEC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyPlatform {
    Android,
    Ios,
    Darwin,
    Wasm,
    Win32,
    Linux,
}

impl PyPlatform {
    /// Classify a qmake spec. Anything not recognised is treated as Linux.
    pub fn from_xspec(xspec: &str) -> Self {
        // Order matters: `android-clang` on a macOS host still targets Android.
        if xspec.contains("android") {
            PyPlatform::Android
        } else if xspec.contains("ios") {
            PyPlatform::Ios
        } else if xspec.contains("macx") {
            PyPlatform::Darwin
        } else if xspec.contains("wasm") {
            PyPlatform::Wasm
        } else if xspec.contains("win32") || xspec.contains("mingw-w64") {
            PyPlatform::Win32
        } else {
            PyPlatform::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PyPlatform::Android => "android",
            PyPlatform::Ios => "ios",
            PyPlatform::Darwin => "darwin",
            PyPlatform::Wasm => "wasm",
            PyPlatform::Win32 => "win32",
            PyPlatform::Linux => "linux",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, PyPlatform::Win32)
    }
}

impl fmt::Display for PyPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
