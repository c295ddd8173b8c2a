// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch-related types.
//!
//! This module provides the target state of a switch request and the kind of
//! slot (relay or IO pin) a request addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Requested state of a relay or IO pin.
///
/// Devices only understand on and off; any other numeric request is an
/// input error and never reaches the wire.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::types::SwitchState;
///
/// assert_eq!(SwitchState::try_from(1).unwrap(), SwitchState::On);
/// assert_eq!(SwitchState::try_from(0).unwrap(), SwitchState::Off);
/// assert!(SwitchState::try_from(2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchState {
    /// Output is off.
    Off,
    /// Output is on.
    On,
}

impl SwitchState {
    /// Returns the command token suffix for this state (`on` or `off`).
    #[must_use]
    pub const fn as_token(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` for [`SwitchState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl TryFrom<i64> for SwitchState {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            other => Err(ValueError::InvalidSwitchState(other)),
        }
    }
}

impl From<bool> for SwitchState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Kind of switchable slot on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A power relay (`Sw_on` / `Sw_off`).
    Relay,
    /// A digital IO pin (`IO_on` / `IO_off`).
    Io,
}

impl SlotKind {
    /// Returns the command token prefix for this slot kind.
    #[must_use]
    pub const fn command_prefix(&self) -> &'static str {
        match self {
            Self::Relay => "Sw",
            Self::Io => "IO",
        }
    }

    /// Returns the state-path segment applications use for this kind.
    #[must_use]
    pub const fn path_segment(&self) -> &'static str {
        match self {
            Self::Relay => "relais",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for SlotKind {
    type Err = ValueError;

    /// Parses a state-path segment such as `relais` or `io`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relais" | "relay" => Ok(Self::Relay),
            "io" => Ok(Self::Io),
            _ => Err(ValueError::InvalidSlotKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_state_from_number() {
        assert_eq!(SwitchState::try_from(0), Ok(SwitchState::Off));
        assert_eq!(SwitchState::try_from(1), Ok(SwitchState::On));
        assert_eq!(
            SwitchState::try_from(2),
            Err(ValueError::InvalidSwitchState(2))
        );
        assert_eq!(
            SwitchState::try_from(-1),
            Err(ValueError::InvalidSwitchState(-1))
        );
    }

    #[test]
    fn switch_state_tokens() {
        assert_eq!(SwitchState::On.as_token(), "on");
        assert_eq!(SwitchState::Off.to_string(), "off");
        assert!(SwitchState::from(true).is_on());
    }

    #[test]
    fn slot_kind_prefix() {
        assert_eq!(SlotKind::Relay.command_prefix(), "Sw");
        assert_eq!(SlotKind::Io.command_prefix(), "IO");
    }

    #[test]
    fn slot_kind_from_path_segment() {
        assert_eq!("relais".parse::<SlotKind>(), Ok(SlotKind::Relay));
        assert_eq!("IO".parse::<SlotKind>(), Ok(SlotKind::Io));
        assert!("dimmer".parse::<SlotKind>().is_err());
    }
}
