// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP transport for NET-PwrCtrl devices.
//!
//! # Endpoints
//!
//! - [`TelegramListener`]: one long-lived socket per device. Sends the
//!   `wer da?` discovery probe, then decodes and publishes status telegrams.
//! - [`CommandSender`]: one short-lived socket per command.
//!
//! Both are configured by an [`EndpointConfig`].

mod endpoint;
mod listener;
mod sender;

pub use endpoint::EndpointConfig;
pub use listener::{DISCOVERY_PROBE, ListenerState, TelegramListener};
pub use sender::CommandSender;
