// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device snapshots.
//!
//! Every snapshot a device's listener accepts is published on that device's
//! [`SnapshotChannel`]. Subscribers pull snapshots from their own
//! [`SnapshotSubscription`] queue.
//!
//! # Usage
//!
//! ```no_run
//! use pwrctrl_lib::Device;
//! use pwrctrl_lib::protocol::EndpointConfig;
//!
//! # async fn example() -> pwrctrl_lib::Result<()> {
//! let device = Device::bind(EndpointConfig::new("192.168.0.244".parse().unwrap())).await?;
//!
//! let mut sub = device.subscribe();
//! while let Some(snapshot) = sub.recv().await {
//!     println!("{} relays: {:?}", snapshot.identity().name, snapshot.relays());
//! }
//! # Ok(())
//! # }
//! ```

mod channel;

pub use channel::{SnapshotChannel, SnapshotSubscription, SubscriptionId};
