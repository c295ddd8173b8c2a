// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! NET-PwrCtrl command definitions.
//!
//! A command datagram is the command token, immediately followed by the
//! encoded credentials and a terminating NUL byte:
//!
//! ```text
//! Sw_on1adminanel\0
//! Sw_on1AAoIBQ8PCwkN\0      (credentials obfuscated)
//! ```
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Example |
//! |-------------|---------|---------|
//! | [`SwitchCommand`] | Switch a relay or IO pin | `Sw_on4`, `IO_off2` |
//!
//! # Examples
//!
//! ```
//! use pwrctrl_lib::command::{Command, Credentials, SwitchCommand};
//! use pwrctrl_lib::types::SwitchState;
//!
//! let cmd = SwitchCommand::relay(1, SwitchState::On).unwrap();
//! let datagram = cmd.to_datagram(&Credentials::new("admin", "anel"));
//!
//! assert_eq!(datagram, b"Sw_on1adminanel\0");
//! ```

mod credentials;
mod switch;

pub use credentials::{Credentials, legacy_obfuscate};
pub use switch::SwitchCommand;

/// A command that can be sent to a NET-PwrCtrl device.
pub trait Command {
    /// Returns the command token, for example `"Sw_on1"`.
    fn token(&self) -> String;

    /// Returns the full UDP payload: token, credentials and NUL terminator.
    fn to_datagram(&self, credentials: &Credentials) -> Vec<u8> {
        let mut payload = self.token().into_bytes();
        payload.extend_from_slice(credentials.encode().as_bytes());
        payload.push(0);
        payload
    }
}
