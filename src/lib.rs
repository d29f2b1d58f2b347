//! qtbuild - Build Qt-based Python extension modules with qmake
//!
//! This crate provides the library behind the `qtbuild` tool: generating
//! qmake project files and driving qmake and make for a project's modules,
//! and bundling the parts of a Qt installation that a package needs into its
//! wheels.

pub mod builder;
pub mod bundle;
pub mod core;
pub mod ops;
pub mod util;

pub use builder::{BuildOptions, QmakeBuilder, QtConfiguration};
pub use bundle::{AssetBundler, Package, WheelName};
pub use crate::core::{Manifest, QtVersion};
pub use util::Config;
