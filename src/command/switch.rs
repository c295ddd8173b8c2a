// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay and IO switch commands.

use crate::command::Command;
use crate::error::ValueError;
use crate::types::{SlotKind, SwitchState};

/// Command to switch one relay or IO pin.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::command::{Command, SwitchCommand};
/// use pwrctrl_lib::types::{SlotKind, SwitchState};
///
/// let cmd = SwitchCommand::relay(4, SwitchState::On).unwrap();
/// assert_eq!(cmd.token(), "Sw_on4");
///
/// let cmd = SwitchCommand::build(SlotKind::Io, 2, 0).unwrap();
/// assert_eq!(cmd.token(), "IO_off2");
///
/// // Only 0 and 1 are valid states
/// assert!(SwitchCommand::build(SlotKind::Relay, 1, 2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchCommand {
    kind: SlotKind,
    ordinal: u8,
    state: SwitchState,
}

impl SwitchCommand {
    /// Creates a switch command.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidOrdinal`] if `ordinal` is 0.
    pub fn new(kind: SlotKind, ordinal: u8, state: SwitchState) -> Result<Self, ValueError> {
        if ordinal == 0 {
            return Err(ValueError::InvalidOrdinal(ordinal));
        }
        Ok(Self {
            kind,
            ordinal,
            state,
        })
    }

    /// Builds a switch command from a raw numeric state.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidSwitchState`] if `state` is neither 0
    /// nor 1, or [`ValueError::InvalidOrdinal`] if `ordinal` is 0.
    pub fn build(kind: SlotKind, ordinal: u8, state: i64) -> Result<Self, ValueError> {
        Self::new(kind, ordinal, SwitchState::try_from(state)?)
    }

    /// Creates a command for relay `ordinal`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidOrdinal`] if `ordinal` is 0.
    pub fn relay(ordinal: u8, state: SwitchState) -> Result<Self, ValueError> {
        Self::new(SlotKind::Relay, ordinal, state)
    }

    /// Creates a command for IO pin `ordinal`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidOrdinal`] if `ordinal` is 0.
    pub fn io(ordinal: u8, state: SwitchState) -> Result<Self, ValueError> {
        Self::new(SlotKind::Io, ordinal, state)
    }

    /// Returns the addressed slot kind.
    #[must_use]
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Returns the addressed 1-based ordinal.
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }

    /// Returns the requested state.
    #[must_use]
    pub fn state(&self) -> SwitchState {
        self.state
    }
}

impl Command for SwitchCommand {
    fn token(&self) -> String {
        format!(
            "{}_{}{}",
            self.kind.command_prefix(),
            self.state.as_token(),
            self.ordinal
        )
    }
}
