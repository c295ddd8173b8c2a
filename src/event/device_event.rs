// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use std::sync::Arc;

use crate::state::DeviceSnapshot;

use super::DeviceId;

/// Events emitted by the device manager.
///
/// Every event carries the ID of the device it concerns.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::event::{DeviceId, DeviceEvent};
///
/// let device_id = DeviceId::new();
///
/// let added = DeviceEvent::device_added(device_id, "Hut");
/// assert!(added.is_lifecycle());
///
/// let closed = DeviceEvent::ListenerClosed { device_id, error: None };
/// assert_eq!(closed.device_id(), device_id);
/// ```
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A device was added to the manager.
    DeviceAdded {
        /// The ID of the added device.
        device_id: DeviceId,
        /// Display name of the device.
        name: String,
    },

    /// A device was removed from the manager.
    DeviceRemoved {
        /// The ID of the removed device.
        device_id: DeviceId,
    },

    /// The device's listener published a snapshot.
    SnapshotReceived {
        /// The ID of the device.
        device_id: DeviceId,
        /// The decoded snapshot.
        snapshot: Arc<DeviceSnapshot>,
    },

    /// The device's listener stopped.
    ListenerClosed {
        /// The ID of the device.
        device_id: DeviceId,
        /// Socket error that closed the listener, `None` on explicit close.
        error: Option<String>,
    },

    /// A command datagram was sent.
    CommandSent {
        /// The ID of the device.
        device_id: DeviceId,
        /// Command token, for example `Sw_on1`.
        command: String,
    },

    /// A command could not be built or sent.
    CommandFailed {
        /// The ID of the device.
        device_id: DeviceId,
        /// Command token, or the rejected request if no token was built.
        command: String,
        /// Error description.
        error: String,
    },
}

impl DeviceEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceAdded { device_id, .. }
            | Self::DeviceRemoved { device_id }
            | Self::SnapshotReceived { device_id, .. }
            | Self::ListenerClosed { device_id, .. }
            | Self::CommandSent { device_id, .. }
            | Self::CommandFailed { device_id, .. } => *device_id,
        }
    }

    /// Returns `true` if this is a device lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` if this event reports a command outcome.
    #[must_use]
    pub fn is_command(&self) -> bool {
        matches!(self, Self::CommandSent { .. } | Self::CommandFailed { .. })
    }

    /// Returns the snapshot carried by a [`DeviceEvent::SnapshotReceived`].
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<DeviceSnapshot>> {
        match self {
            Self::SnapshotReceived { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: DeviceId, name: impl Into<String>) -> Self {
        Self::DeviceAdded {
            device_id,
            name: name.into(),
        }
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(device_id: DeviceId) -> Self {
        Self::DeviceRemoved { device_id }
    }
}
