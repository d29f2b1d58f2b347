//! Core data structures.
//!
//! - Buildables and installables (what a project compiles and installs)
//! - The QtBuild.toml manifest
//! - Qt versions and platform classification

pub mod buildable;
pub mod manifest;
pub mod platform;
pub mod version;

pub use buildable::{Buildable, BuildableKind, Installable};
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use platform::{PlatformFamily, PyPlatform};
pub use version::QtVersion;
