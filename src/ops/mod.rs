//! High-level operations.
//!
//! This module contains the implementation of the qtbuild commands.

pub mod build;
pub mod bundle;
pub mod install;
pub mod qt_wheel;

pub use build::{build, default_target_dir, merge_options, BuildFlags};
pub use bundle::{bundle, BundleOptions, WindowsDlls};
pub use install::install;
pub use qt_wheel::{qt_platform_tag, qt_wheel, QtWheelOptions};
