// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for NET-PwrCtrl device control.
//!
//! # Types
//!
//! - [`SwitchState`] - On/Off target of a switch request (validated from 0/1)
//! - [`SlotKind`] - Relay or IO pin
//! - [`DeviceVariant`] - Hardware/firmware class reported by a device

mod switch;
mod variant;

pub use switch::{SlotKind, SwitchState};
pub use variant::DeviceVariant;
