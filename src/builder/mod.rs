//! Building Qt extension modules with qmake.
//!
//! A project is turned into one .pro file per module plus a top-level
//! `subdirs` project, qmake generates the Makefiles and make does the rest.

pub mod errors;
pub mod pro_file;
pub mod project;
pub mod qmake;
pub mod toolchain;

pub use errors::BuildError;
pub use pro_file::{GeneratorSettings, ProFile, ProFileGenerator};
pub use project::{BuildOptions, QmakeBuilder};
pub use qmake::QmakeDriver;
pub use toolchain::QtConfiguration;
