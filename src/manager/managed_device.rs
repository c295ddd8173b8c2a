// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device wrapper for the device manager.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::Device;
use crate::event::{DeviceEvent, DeviceId, EventBus};

/// Internal representation of a device in the manager.
pub(crate) struct ManagedDevice {
    /// Unique device identifier.
    pub id: DeviceId,
    /// Display name.
    pub name: String,
    /// The bound device.
    pub device: Arc<Device>,
    /// Task forwarding the device's snapshots to the event bus.
    forwarder: JoinHandle<()>,
}

impl ManagedDevice {
    /// Wraps a bound device and starts forwarding its snapshots.
    pub fn new(name: String, device: Device, event_bus: EventBus) -> Self {
        let id = DeviceId::new();
        let device = Arc::new(device);
        let forwarder = spawn_forwarder(id, &device, event_bus);

        Self {
            id,
            name,
            device,
            forwarder,
        }
    }

    /// Closes the device and waits until its last event was forwarded.
    pub async fn close(self) {
        self.device.close().await;
        // The forwarder only ends on its own; a join error means it panicked.
        if let Err(e) = self.forwarder.await {
            tracing::error!(device_id = %self.id, error = %e, "Snapshot forwarder failed");
        }
    }
}

impl std::fmt::Debug for ManagedDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedDevice")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("device_ip", &self.device.config().device_ip())
            .finish_non_exhaustive()
    }
}

/// Publishes every snapshot of `device` on the bus, then a
/// [`DeviceEvent::ListenerClosed`] once the listener has stopped.
///
/// The task holds the device weakly. Dropping the last `Arc<Device>` drops
/// the listener, which ends the subscription and with it the task.
fn spawn_forwarder(device_id: DeviceId, device: &Arc<Device>, event_bus: EventBus) -> JoinHandle<()> {
    let mut snapshots = device.subscribe();
    let device = Arc::downgrade(device);

    tokio::spawn(async move {
        tracing::debug!(%device_id, "Starting snapshot forwarder");

        while let Some(snapshot) = snapshots.recv().await {
            event_bus.publish(DeviceEvent::SnapshotReceived {
                device_id,
                snapshot,
            });
        }

        let error = device.upgrade().and_then(|d| d.listener_error());
        tracing::debug!(%device_id, error = ?error, "Snapshot forwarder stopped");
        event_bus.publish(DeviceEvent::ListenerClosed { device_id, error });
    })
}
