//! Command implementations

pub mod build;
pub mod bundle;
pub mod completions;
pub mod install;
pub mod qt_wheel;
pub mod query;
