// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager for coordinating multiple NET-PwrCtrl devices.
//!
//! # Overview
//!
//! The [`DeviceManager`] binds one independent [`Device`](crate::Device) per
//! configured unit and provides:
//!
//! - **Configuration loading**: [`DeviceConfig`] reads existing device lists
//! - **Lookup**: by [`DeviceId`](crate::event::DeviceId) or display name
//! - **Switch routing**: by name or by [`StatePath`]
//! - **Event system**: one merged broadcast stream of every device's events
//!
//! # Examples
//!
//! ```no_run
//! use pwrctrl_lib::event::DeviceEvent;
//! use pwrctrl_lib::manager::{DeviceConfig, DeviceManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let configs = DeviceConfig::list_from_json(&std::fs::read_to_string("devices.json")?)?;
//!
//! let manager = DeviceManager::new();
//! let mut events = manager.subscribe();
//! for (name, result) in manager.add_devices(configs).await {
//!     if let Err(e) = result {
//!         eprintln!("{name}: {e}");
//!     }
//! }
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if let DeviceEvent::SnapshotReceived { snapshot, .. } = event {
//!             println!("{}: {:?}", snapshot.identity().name, snapshot.relays());
//!         }
//!     }
//! });
//!
//! manager.switch_by_path("HUTOG.relais.4.Status", 1).await?;
//! # Ok(())
//! # }
//! ```

mod device_config;
mod device_manager;
mod managed_device;
mod state_path;

pub use device_config::DeviceConfig;
pub use device_manager::DeviceManager;
pub use state_path::StatePath;
