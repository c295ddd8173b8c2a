// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device variant (hardware/firmware class) of a NET-PwrCtrl device.

use std::fmt;

use serde::{Serialize, Serializer};

/// Blocked codes at or above this value identify a legacy HUT device.
const LEGACY_HUT_BLOCKED_THRESHOLD: u32 = 248;

/// Hardware/firmware class of a device.
///
/// Firmware 6.0 and newer report a single-letter code which maps onto the
/// named variants. Older firmware is classified as [`DeviceVariant::LegacyHut`]
/// or [`DeviceVariant::LegacyPro`] from the blocked code, or carries the raw
/// type string of its extended header in [`DeviceVariant::Reported`].
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::types::DeviceVariant;
///
/// assert_eq!(DeviceVariant::from_code("f"), DeviceVariant::OneF);
/// assert_eq!(DeviceVariant::from_code("f").as_str(), "ONE-F");
/// assert_eq!(DeviceVariant::from_code("x"), DeviceVariant::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DeviceVariant {
    /// NET-PwrCtrl ADV.
    Adv,
    /// NET-PwrCtrl IO.
    Io,
    /// NET-PwrCtrl HUT.
    Hut,
    /// NET-PwrCtrl ONE.
    One,
    /// NET-PwrCtrl ONE-F.
    OneF,
    /// NET-PwrCtrl HOME (three relays).
    Home,
    /// NET-PwrCtrl PRO.
    Pro,
    /// Pre-6.0 HUT, inferred from the blocked code.
    LegacyHut,
    /// Pre-6.0 PRO, inferred from the blocked code.
    LegacyPro,
    /// Raw type string from an extended `NET-PWRCTRL` header.
    Reported(String),
    /// Variant code not in the known table.
    #[default]
    Unknown,
}

impl DeviceVariant {
    /// Translates a firmware 6.0 variant code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "a" => Self::Adv,
            "i" => Self::Io,
            "h" => Self::Hut,
            "o" => Self::One,
            "f" => Self::OneF,
            "H" => Self::Home,
            "P" => Self::Pro,
            _ => Self::Unknown,
        }
    }

    /// Classifies a pre-6.0 device from its blocked code.
    #[must_use]
    pub fn from_blocked_code(blocked: u32) -> Self {
        if blocked >= LEGACY_HUT_BLOCKED_THRESHOLD {
            Self::LegacyHut
        } else {
            Self::LegacyPro
        }
    }

    /// Returns the display name of the variant.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Adv => "ADV",
            Self::Io => "IO",
            Self::Hut => "HUT",
            Self::One => "ONE",
            Self::OneF => "ONE-F",
            Self::Home => "Home",
            Self::Pro => "PRO",
            Self::LegacyHut => "H",
            Self::LegacyPro => "P",
            Self::Reported(raw) => raw,
            Self::Unknown => "unknown",
        }
    }

    /// Returns `false` for variants without IO pins.
    #[must_use]
    pub fn supports_io(&self) -> bool {
        !matches!(
            self,
            Self::Adv | Self::One | Self::OneF | Self::Home | Self::Pro
        )
    }

    /// Number of relay slots the telegram carries for this variant.
    #[must_use]
    pub fn relay_slots(&self) -> usize {
        if matches!(self, Self::Home) { 3 } else { 8 }
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceVariant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_code_table() {
        let codes = ["a", "i", "h", "o", "f", "H", "P", "x"];
        let names: Vec<String> = codes
            .iter()
            .map(|c| DeviceVariant::from_code(c).to_string())
            .collect();
        assert_eq!(
            names,
            ["ADV", "IO", "HUT", "ONE", "ONE-F", "Home", "PRO", "unknown"]
        );
    }

    #[test]
    fn legacy_from_blocked_code() {
        assert_eq!(DeviceVariant::from_blocked_code(248), DeviceVariant::LegacyHut);
        assert_eq!(DeviceVariant::from_blocked_code(255), DeviceVariant::LegacyHut);
        assert_eq!(DeviceVariant::from_blocked_code(247), DeviceVariant::LegacyPro);
        assert_eq!(DeviceVariant::from_blocked_code(0).as_str(), "P");
    }

    #[test]
    fn io_support() {
        assert!(DeviceVariant::Io.supports_io());
        assert!(DeviceVariant::Hut.supports_io());
        assert!(DeviceVariant::Unknown.supports_io());
        assert!(!DeviceVariant::Adv.supports_io());
        assert!(!DeviceVariant::Home.supports_io());
        assert!(!DeviceVariant::Pro.supports_io());
    }

    #[test]
    fn home_has_three_relay_slots() {
        assert_eq!(DeviceVariant::Home.relay_slots(), 3);
        assert_eq!(DeviceVariant::Hut.relay_slots(), 8);
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&DeviceVariant::OneF).unwrap();
        assert_eq!(json, "\"ONE-F\"");
    }
}
