//! Declarative descriptions of the parts of Qt a wrapped module needs.
//!
//! Tables of [`VersionedAsset`]s are static data. Every list that can differ
//! between platforms is a slice of `(Applies, items)` pairs, and file names
//! always use `/` as the separator whatever the platform.

use crate::core::{PlatformFamily, QtVersion};

/// Which platforms a list of items applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applies {
    All,
    Only(PlatformFamily),
}

impl Applies {
    pub fn matches(self, family: PlatformFamily) -> bool {
        match self {
            Applies::All => true,
            Applies::Only(f) => f == family,
        }
    }
}

/// Per-platform lists of items.
pub type ByPlatform<T> = &'static [(Applies, &'static [T])];

/// Iterate over the items of `list` that apply to `family`, in declaration
/// order.
pub fn applicable<T: 'static>(
    list: ByPlatform<T>,
    family: PlatformFamily,
) -> impl Iterator<Item = &'static T> {
    list.iter()
        .filter(move |(applies, _)| applies.matches(family))
        .flat_map(|(_, items)| items.iter())
}

/// What to bundle for one wrapped module from a particular Qt version.
#[derive(Debug, Clone, Copy)]
pub struct VersionedAsset {
    /// The oldest Qt this applies to (None = any)
    pub version: Option<QtVersion>,

    /// The Qt library name if different from the module name
    pub name: Option<&'static str>,

    /// Other Qt libraries the module needs
    pub lib_deps: ByPlatform<&'static str>,

    /// Non-Qt libraries in the Qt library directory. A name containing `*`
    /// is a pattern and the dependency is optional.
    pub other_lib_deps: ByPlatform<&'static str>,

    /// Helper executables, relative to the installation
    pub exes: ByPlatform<&'static str>,

    /// Small files synthesized in the bundle as `(name, contents)`
    pub files: ByPlatform<(&'static str, &'static str)>,

    /// Anything else to copy, relative to the installation
    pub others: ByPlatform<&'static str>,

    /// Whether the module wraps a Qt library of its own
    pub dll: bool,

    pub qml: bool,

    /// The `qml/` subdirectories to bundle (None = the library name)
    pub qml_names: Option<&'static [&'static str]>,

    /// Prefixes of the `.qm` files to bundle
    pub translations: &'static [&'static str],

    /// Bundle `plugins/` except these subdirectories. Only one module of a
    /// table should set this.
    pub excluded_plugins: Option<&'static [&'static str]>,

    /// Whether the Qt parts are available under the LGPL
    pub lgpl: bool,
}

impl VersionedAsset {
    /// A module wrapping a single Qt library of the same name.
    pub const DEFAULT: VersionedAsset = VersionedAsset {
        version: None,
        name: None,
        lib_deps: &[],
        other_lib_deps: &[],
        exes: &[],
        files: &[],
        others: &[],
        dll: true,
        qml: false,
        qml_names: None,
        translations: &[],
        excluded_plugins: None,
        lgpl: true,
    };

    /// Whether this applies to a particular Qt version.
    pub fn is_applicable(&self, qt_version: QtVersion) -> bool {
        self.version.map_or(true, |v| qt_version >= v)
    }

    /// The name of the Qt library, defaulting to the module's name.
    pub fn library_name<'a>(&self, module: &'a str) -> &'a str {
        self.name.unwrap_or(module)
    }
}

/// The assets of one module, either unconditional or as variants ordered
/// newest Qt first.
#[derive(Debug, Clone, Copy)]
pub enum AssetEntry {
    Single(VersionedAsset),
    Variants(&'static [VersionedAsset]),
}

impl AssetEntry {
    /// The first applicable asset, if any.
    pub fn select(&self, qt_version: QtVersion) -> Option<&VersionedAsset> {
        match self {
            AssetEntry::Single(asset) => asset.is_applicable(qt_version).then_some(asset),
            AssetEntry::Variants(variants) => variants.iter().find(|a| a.is_applicable(qt_version)),
        }
    }
}

/// A package's modules and their assets, in bundling order.
pub type AssetTable = &'static [(&'static str, AssetEntry)];
