//! Qt version numbers.
//!
//! A version is packed into a single integer, one byte per component, so
//! versions order the same way qmake's `QT_VERSION` hex values do.

use std::fmt;

/// A packed `major.minor.patch` Qt version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QtVersion(u32);

impl QtVersion {
    /// The oldest Qt that can be built against.
    pub const MINIMUM: QtVersion = QtVersion::new(5, 6, 0);

    /// Create a version from its components.
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        QtVersion(((major as u32) << 16) | ((minor as u32) << 8) | patch as u32)
    }

    /// Create a version from its packed form (eg. `0x060500`).
    pub const fn from_packed(packed: u32) -> Self {
        QtVersion(packed & 0x00ff_ffff)
    }

    /// Parse a dotted version such as `6.5.0`.
    ///
    /// Each component shifts the accumulated value left by 8 bits, so missing
    /// trailing components are treated as zero. Returns `None` if a component
    /// is not a number below 256 or there are more than three components.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }

        let mut packed = 0u32;
        for part in &parts {
            let v: u8 = part.parse().ok()?;
            packed = (packed << 8) | v as u32;
        }

        for _ in parts.len()..3 {
            packed <<= 8;
        }

        Some(QtVersion(packed))
    }

    /// Parse the release part of a package version (`5.15.10.dev2301`,
    /// `6.5.1+local`, `1!6.2`), padded or truncated to three components.
    pub fn parse_base(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.split_once('!').map_or(s, |(_, rest)| rest);

        let mut parts = Vec::new();
        for part in s.split('.') {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                break;
            }
            parts.push(digits.parse::<u8>().ok()?);

            // Anything after the digits (`1rc1`, `0+local`) ends the release.
            if digits.len() != part.len() || parts.len() == 3 {
                break;
            }
        }

        if parts.is_empty() {
            return None;
        }
        parts.resize(3, 0);

        Some(QtVersion::new(parts[0], parts[1], parts[2]))
    }

    pub fn major(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn minor(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn patch(&self) -> u8 {
        self.0 as u8
    }

    /// The packed integer.
    pub fn packed(&self) -> u32 {
        self.0
    }

    /// The same version with a different patch level.
    pub fn with_patch(&self, patch: u8) -> Self {
        QtVersion::new(self.major(), self.minor(), patch)
    }

    /// The version as used in a bindings feature tag, eg. `6_5_0`.
    ///
    /// Only 5.12.4 and 5.15 releases are distinguished by patch level: 5.13,
    /// 5.14 and every Qt 6 release use a patch of 0, and 5.12.4 onwards use 4.
    pub fn tag(&self) -> String {
        let (major, minor) = (self.major(), self.minor());

        let patch = if (major == 5 && (13..15).contains(&minor)) || major >= 6 {
            0
        } else if *self >= QtVersion::new(5, 12, 4) && *self < QtVersion::new(5, 13, 0) {
            4
        } else {
            self.patch()
        };

        format!("{}_{}_{}", major, minor, patch)
    }
}

impl fmt::Display for QtVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(QtVersion::parse("6.5.0"), Some(QtVersion::new(6, 5, 0)));
        assert_eq!(QtVersion::parse("6.5.0").unwrap().packed(), 0x060500);
        assert_eq!(QtVersion::parse("5.15"), Some(QtVersion::new(5, 15, 0)));
        assert_eq!(QtVersion::parse("six"), None);
        assert_eq!(QtVersion::parse("6.256.0"), None);
        assert_eq!(QtVersion::parse("1.2.3.4"), None);
    }

    #[test]
    fn test_parse_base() {
        assert_eq!(
            QtVersion::parse_base("5.15.10.dev2301"),
            Some(QtVersion::new(5, 15, 10))
        );
        assert_eq!(QtVersion::parse_base("6.7"), Some(QtVersion::new(6, 7, 0)));
        assert_eq!(QtVersion::parse_base("6.2.0rc1"), Some(QtVersion::new(6, 2, 0)));
        assert_eq!(QtVersion::parse_base("6.5.1+abi3"), Some(QtVersion::new(6, 5, 1)));
        assert_eq!(QtVersion::parse_base("1!6.4.2"), Some(QtVersion::new(6, 4, 2)));
        assert_eq!(QtVersion::parse_base("latest"), None);
    }

    #[test]
    fn test_ordering() {
        assert!(QtVersion::new(6, 1, 9) < QtVersion::new(6, 2, 0));
        assert!(QtVersion::new(5, 15, 2) < QtVersion::new(6, 0, 0));
        assert!(QtVersion::new(5, 5, 1) < QtVersion::MINIMUM);
    }

    #[test]
    fn test_tag() {
        assert_eq!(QtVersion::new(6, 5, 2).tag(), "6_5_0");
        assert_eq!(QtVersion::new(5, 14, 2).tag(), "5_14_0");
        assert_eq!(QtVersion::new(5, 15, 2).tag(), "5_15_2");
        assert_eq!(QtVersion::new(5, 12, 9).tag(), "5_12_4");
        assert_eq!(QtVersion::new(5, 12, 3).tag(), "5_12_3");
        assert_eq!(QtVersion::new(5, 9, 1).tag(), "5_9_1");
    }

    #[test]
    fn test_display() {
        assert_eq!(QtVersion::from_packed(0x050f02).to_string(), "5.15.2");
    }
}
