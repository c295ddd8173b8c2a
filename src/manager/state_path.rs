// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dotted state paths addressing a switchable slot.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::types::SlotKind;

const STATUS_SEGMENT: &str = "Status";

/// Address of one relay or IO pin status, `<device>.<relais|io>.<n>.Status`.
///
/// Leading segments before the device name (an adapter instance prefix such
/// as `anelhut.0`) are ignored.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::manager::StatePath;
/// use pwrctrl_lib::types::SlotKind;
///
/// let path: StatePath = "anelhut.0.HUTOG.relais.4.Status".parse().unwrap();
/// assert_eq!(path.device, "HUTOG");
/// assert_eq!(path.kind, SlotKind::Relay);
/// assert_eq!(path.ordinal, 4);
/// assert_eq!(path.to_string(), "HUTOG.relais.4.Status");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePath {
    /// Display name of the device.
    pub device: String,
    /// Addressed slot kind.
    pub kind: SlotKind,
    /// 1-based slot ordinal.
    pub ordinal: u8,
}

impl FromStr for StatePath {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidStatePath(s.to_string());

        let segments: Vec<&str> = s.split('.').collect();
        let [.., device, kind, ordinal, status] = segments.as_slice() else {
            return Err(invalid());
        };
        if *status != STATUS_SEGMENT || device.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            device: (*device).to_string(),
            kind: kind.parse()?,
            ordinal: ordinal.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{STATUS_SEGMENT}",
            self.device,
            self.kind.path_segment(),
            self.ordinal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_prefixed_paths() {
        let short: StatePath = "HUTEG.io.1.Status".parse().unwrap();
        assert_eq!(short.kind, SlotKind::Io);
        assert_eq!(short.ordinal, 1);

        let long: StatePath = "anelhut.0.HUTEG.io.1.Status".parse().unwrap();
        assert_eq!(long, short);
    }

    #[test]
    fn rejects_other_states() {
        for path in [
            "HUTOG.relais.4.Name",
            "HUTOG.relais.x.Status",
            "HUTOG.relais.Status",
            ".relais.1.Status",
            "",
        ] {
            assert_eq!(
                path.parse::<StatePath>(),
                Err(ValueError::InvalidStatePath(path.to_string())),
                "{path}"
            );
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            "HUTOG.sensor.1.Status".parse::<StatePath>(),
            Err(ValueError::InvalidSlotKind("sensor".to_string()))
        );
    }
}
