// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `PwrCtrl` Lib - A Rust library to monitor and switch ANEL NET-PwrCtrl
//! power strips over UDP.
//!
//! NET-PwrCtrl devices answer a broadcast `wer da?` probe, and report every
//! state change, with a colon-separated status telegram. Relays and IO pins
//! are switched with short text commands carrying the web interface
//! credentials.
//!
//! # Supported Features
//!
//! - **Discovery and monitoring**: Probe a device and receive decoded
//!   [`DeviceSnapshot`]s
//! - **Switching**: Relays and IO pins, with plain or obfuscated credentials
//! - **Telemetry**: Power meter readings, external sensor, board temperature
//! - **Multiple devices**: [`DeviceManager`](manager::DeviceManager) with a
//!   merged event stream
//!
//! # Supported Variants
//!
//! HUT, IO, ADV, ONE, ONE-F, Home and PRO, including firmware older than 6.0.
//!
//! # Quick Start
//!
//! ## Single Device
//!
//! ```no_run
//! use pwrctrl_lib::{Device, EndpointConfig, SwitchState};
//!
//! #[tokio::main]
//! async fn main() -> pwrctrl_lib::Result<()> {
//!     let config = EndpointConfig::new("192.168.0.244".parse().unwrap())
//!         .with_credentials("admin", "anel");
//!     let device = Device::bind(config).await?;
//!
//!     let mut snapshots = device.subscribe();
//!     device.switch_relay(1, SwitchState::On).await?;
//!
//!     while let Some(snapshot) = snapshots.recv().await {
//!         for relay in snapshot.relays() {
//!             println!("{} {}: {}", relay.number, relay.name, relay.on);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding Telegrams
//!
//! ```
//! use pwrctrl_lib::telegram::decode;
//!
//! let raw = "NET-PwrCtrl:Hut:192.168.0.244:255.255.255.0:192.168.0.1:\
//!            0.4.163.10.9.1:Lamp,1:Fan,0:3,0:4,0:5,0:6,0:7,0:8,0:0:80";
//! let snapshot = decode(raw).unwrap();
//!
//! assert_eq!(snapshot.identity().mac, "00:04:A3:0A:09:01");
//! assert!(snapshot.relay(1).unwrap().on);
//! assert!(snapshot.io_pins().is_empty());
//! ```
//!
//! # Logging
//!
//! The library emits [`tracing`](https://docs.rs/tracing) events and never
//! installs a subscriber; route them with the application's subscriber.

pub mod command;
mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod telegram;
pub mod types;

pub use command::{Command, Credentials, SwitchCommand};
pub use device::Device;
pub use error::{DecodeError, DeviceError, Error, ProtocolError, Result, ValueError};
pub use protocol::{EndpointConfig, ListenerState};
pub use state::DeviceSnapshot;
pub use subscription::{SnapshotSubscription, SubscriptionId};
pub use types::{DeviceVariant, SlotKind, SwitchState};
