//! The packages Qt can be bundled with.

mod pyqt5;
mod pyqt6;

use crate::bundle::package::PackageProfile;

use pyqt5::{
    PYQT3D, PYQT5, PYQTDATAVISUALIZATION, PYQTNETWORKAUTH, PYQTPURCHASING, PYQTWEBENGINE,
};
use pyqt6::{
    PYQT6, PYQT6_3D, PYQT6_CHARTS, PYQT6_DATAVISUALIZATION, PYQT6_GRAPHS, PYQT6_WEBENGINE,
};

/// Every supported package.
pub static PROFILES: &[&PackageProfile] = &[
    &PYQT6,
    &PYQT6_3D,
    &PYQT6_CHARTS,
    &PYQT6_DATAVISUALIZATION,
    &PYQT6_GRAPHS,
    &PYQT6_WEBENGINE,
    &PYQT5,
    &PYQT3D,
    &PYQTDATAVISUALIZATION,
    &PYQTNETWORKAUTH,
    &PYQTPURCHASING,
    &PYQTWEBENGINE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::asset::AssetEntry;
    use std::collections::HashSet;

    #[test]
    fn test_profile_names_are_unique() {
        let names: HashSet<_> = PROFILES.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), PROFILES.len());
    }

    #[test]
    fn test_tables_are_well_formed() {
        for profile in PROFILES {
            let mut modules = HashSet::new();
            let mut plugin_owners = 0;

            for (name, entry) in profile.table {
                assert!(modules.insert(*name), "{} lists {} twice", profile.name, name);

                let variants = match entry {
                    AssetEntry::Single(asset) => std::slice::from_ref(asset),
                    AssetEntry::Variants(variants) => *variants,
                };

                // Newest first so that the first applicable variant wins.
                for pair in variants.windows(2) {
                    assert!(
                        pair[0].version > pair[1].version,
                        "{} {} variants are out of order",
                        profile.name,
                        name
                    );
                }

                if variants.iter().any(|v| v.excluded_plugins.is_some()) {
                    plugin_owners += 1;
                }
            }

            assert!(plugin_owners <= 1, "{} bundles plugins more than once", profile.name);
        }
    }
}
