//! PSK key exchange mode flags.
//!
//! A TLS 1.3 peer is configured with a set of acceptable key exchange
//! modes. The set is stored as a 3-bit field:
//!
//! | Bit | Name            | Meaning                                 |
//! |-----|-----------------|-----------------------------------------|
//! | 0   | `psk`           | PSK only, no (EC)DHE                    |
//! | 1   | `ephemeral`     | (EC)DHE only, certificate authenticated |
//! | 2   | `psk_ephemeral` | PSK combined with (EC)DHE               |
//!
//! The unions `psk_all`, `ephemeral_all` and `all` use the same
//! representation. They are comparison masks in the negotiation rules and
//! also the spelling of multi-mode peer configurations.

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, Result};

/// Set of TLS 1.3 key exchange modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct KexMode(u8);

impl KexMode {
    /// No mode at all
    pub const NONE: Self = Self(0);
    /// Pure PSK
    pub const PSK: Self = Self(1 << 0);
    /// Pure (EC)DHE
    pub const EPHEMERAL: Self = Self(1 << 1);
    /// PSK with (EC)DHE
    pub const PSK_EPHEMERAL: Self = Self(1 << 2);
    /// Any PSK variant
    pub const PSK_ALL: Self = Self(Self::PSK.0 | Self::PSK_EPHEMERAL.0);
    /// Any ephemeral variant
    pub const EPHEMERAL_ALL: Self = Self(Self::EPHEMERAL.0 | Self::PSK_EPHEMERAL.0);
    /// Every mode
    pub const ALL: Self = Self(Self::PSK.0 | Self::EPHEMERAL.0 | Self::PSK_EPHEMERAL.0);

    /// The three single-mode values, in bit order.
    pub const BASE: [Self; 3] = [Self::PSK, Self::EPHEMERAL, Self::PSK_EPHEMERAL];

    /// Every value that has a configuration name, in the order the
    /// generator walks them.
    pub const NAMED: [Self; 6] = [
        Self::PSK,
        Self::EPHEMERAL,
        Self::PSK_EPHEMERAL,
        Self::PSK_ALL,
        Self::EPHEMERAL_ALL,
        Self::ALL,
    ];

    /// Create from raw bits. Bits outside `ALL` are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Get raw bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no mode is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when `other` is non-empty and every bit of it is set in `self`.
    ///
    /// `NONE` is never contained, so a membership test cannot pass vacuously.
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// True when `self` and `other` share at least one bit
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Configuration name, if this value has one.
    ///
    /// These are the spellings accepted by Mbed TLS `tls13_kex_modes=`.
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("none"),
            1 => Some("psk"),
            2 => Some("ephemeral"),
            4 => Some("psk_ephemeral"),
            5 => Some("psk_all"),
            6 => Some("ephemeral_all"),
            7 => Some("all"),
            _ => None,
        }
    }

    /// Iterate over the single-mode values present in `self`.
    pub fn iter(self) -> impl Iterator<Item = KexMode> {
        Self::BASE.into_iter().filter(move |m| self.contains(*m))
    }
}

impl BitAnd for KexMode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for KexMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for KexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        // Only psk|ephemeral lacks a name
        let parts: Vec<&str> = self.iter().filter_map(|m| m.name()).collect();
        f.write_str(&parts.join("|"))
    }
}

impl FromStr for KexMode {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        let mut mode = KexMode::NONE;
        for part in s.split('|') {
            mode = mode
                | match part.trim().to_lowercase().as_str() {
                    "none" => KexMode::NONE,
                    "psk" => KexMode::PSK,
                    "ephemeral" => KexMode::EPHEMERAL,
                    "psk_ephemeral" => KexMode::PSK_EPHEMERAL,
                    "psk_all" => KexMode::PSK_ALL,
                    "ephemeral_all" => KexMode::EPHEMERAL_ALL,
                    "all" => KexMode::ALL,
                    _ => return Err(CompatError::UnknownKexMode(s.to_string())),
                };
        }
        Ok(mode)
    }
}

impl From<KexMode> for String {
    fn from(mode: KexMode) -> Self {
        mode.to_string()
    }
}

impl TryFrom<String> for KexMode {
    type Error = CompatError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_bits() {
        assert_eq!(KexMode::PSK.bits(), 1);
        assert_eq!(KexMode::EPHEMERAL.bits(), 2);
        assert_eq!(KexMode::PSK_EPHEMERAL.bits(), 4);
        assert_eq!(KexMode::PSK_ALL.bits(), 5);
        assert_eq!(KexMode::EPHEMERAL_ALL.bits(), 6);
        assert_eq!(KexMode::ALL.bits(), 7);
    }

    #[test]
    fn test_contains() {
        assert!(KexMode::PSK_ALL.contains(KexMode::PSK));
        assert!(KexMode::PSK_ALL.contains(KexMode::PSK_EPHEMERAL));
        assert!(!KexMode::PSK_ALL.contains(KexMode::EPHEMERAL));
        assert!(!KexMode::PSK.contains(KexMode::PSK_ALL));
        assert!(KexMode::ALL.contains(KexMode::EPHEMERAL_ALL));
    }

    #[test]
    fn test_contains_none_is_false() {
        for mode in KexMode::NAMED {
            assert!(!mode.contains(KexMode::NONE), "{mode} contains none");
        }
        assert!(!KexMode::NONE.contains(KexMode::NONE));
    }

    #[test]
    fn test_intersection() {
        assert_eq!(KexMode::PSK_ALL & KexMode::EPHEMERAL_ALL, KexMode::PSK_EPHEMERAL);
        assert_eq!(KexMode::PSK_ALL & KexMode::EPHEMERAL, KexMode::NONE);
        assert!((KexMode::PSK & KexMode::EPHEMERAL).is_empty());
    }

    #[test]
    fn test_from_bits_truncates() {
        assert_eq!(KexMode::from_bits(0xff), KexMode::ALL);
        assert_eq!(KexMode::from_bits(0x09), KexMode::PSK);
    }

    #[test]
    fn test_names_roundtrip() {
        for mode in KexMode::NAMED {
            let parsed: KexMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_unnamed_display() {
        let mode = KexMode::PSK | KexMode::EPHEMERAL;
        assert_eq!(mode.name(), None);
        assert_eq!(mode.to_string(), "psk|ephemeral");
        assert_eq!("psk|ephemeral".parse::<KexMode>().unwrap(), mode);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "dhe".parse::<KexMode>(),
            Err(CompatError::UnknownKexMode(_))
        ));
    }

    #[test]
    fn test_serde_as_name() {
        let json = serde_json::to_string(&KexMode::PSK_ALL).unwrap();
        assert_eq!(json, "\"psk_all\"");
        let mode: KexMode = serde_json::from_str("\"ephemeral\"").unwrap();
        assert_eq!(mode, KexMode::EPHEMERAL);
    }
}
