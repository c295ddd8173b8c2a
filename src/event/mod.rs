// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Manager-wide device events.
//!
//! The [`EventBus`] merges the snapshots, listener shutdowns and command
//! outcomes of every managed device into one broadcast stream. Unlike a
//! device's own snapshot subscription, a slow bus subscriber may lag and
//! lose events.
//!
//! # Examples
//!
//! ```
//! use pwrctrl_lib::event::{DeviceId, DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let device_id = DeviceId::new();
//! bus.publish(DeviceEvent::device_added(device_id, "Hut"));
//!
//! let event = rx.try_recv().unwrap();
//! assert!(event.is_lifecycle());
//! ```

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::EventBus;
