//! Bundling a Qt installation with a wheel.
//!
//! Which parts of Qt a package needs is described by static tables of
//! versioned assets. The [`AssetBundler`] interprets a table against a live
//! installation, and the [`wheel`] functions take care of unpacking,
//! recording and repacking the result.

pub mod asset;
pub mod bundler;
pub mod errors;
pub mod package;
pub mod packages;
pub mod patch;
pub mod wheel;

pub use asset::{Applies, AssetEntry, AssetTable, VersionedAsset};
pub use bundler::AssetBundler;
pub use errors::BundleError;
pub use package::{Package, PackageProfile};
pub use wheel::WheelName;
