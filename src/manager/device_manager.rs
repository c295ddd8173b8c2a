// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager for coordinating multiple NET-PwrCtrl devices.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::Device;
use crate::command::{Command, SwitchCommand};
use crate::error::{DeviceError, Error};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::protocol::EndpointConfig;
use crate::types::SlotKind;

use super::device_config::DeviceConfig;
use super::managed_device::ManagedDevice;
use super::state_path::StatePath;

/// Manager for coordinating multiple NET-PwrCtrl devices.
///
/// Each device is an independent [`Device`] with its own listener, sender
/// and snapshot channel. The manager only keeps the registry of bound
/// devices and merges their activity into one event stream.
///
/// # Examples
///
/// ```no_run
/// use pwrctrl_lib::manager::{DeviceConfig, DeviceManager};
/// use pwrctrl_lib::types::SlotKind;
///
/// #[tokio::main]
/// async fn main() -> pwrctrl_lib::Result<()> {
///     let manager = DeviceManager::new();
///
///     // Subscribe to events
///     let mut events = manager.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("Event: {:?}", event);
///         }
///     });
///
///     // Add a device and switch its first relay
///     manager.add_device(DeviceConfig::new("HUTOG", "192.168.0.244")).await?;
///     manager.switch_by_name("HUTOG", SlotKind::Relay, 1, 1).await?;
///
///     manager.shutdown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct DeviceManager {
    /// Managed devices, keyed by device ID.
    devices: Arc<RwLock<HashMap<DeviceId, ManagedDevice>>>,
    /// Event bus for broadcasting device events.
    event_bus: EventBus,
}

impl DeviceManager {
    /// Creates a new device manager.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(EventBus::DEFAULT_CAPACITY)
    }

    /// Creates a new device manager with custom event bus capacity.
    #[must_use]
    pub fn with_capacity(event_capacity: usize) -> Self {
        Self {
            devices: Arc::new(RwLock::new(HashMap::new())),
            event_bus: EventBus::with_capacity(event_capacity),
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to the events of all managed devices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Binds a device from its configuration and adds it to the manager.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the configuration is invalid or the name
    /// is already managed, or [`Error::Protocol`] if binding fails.
    pub async fn add_device(&self, config: DeviceConfig) -> Result<DeviceId, Error> {
        let endpoint = config.to_endpoint()?;
        self.add_endpoint(config.name, endpoint).await
    }

    /// Binds a device from an endpoint configuration and adds it under
    /// `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the name is already managed, or
    /// [`Error::Protocol`] if binding fails.
    pub async fn add_endpoint(
        &self,
        name: impl Into<String>,
        config: EndpointConfig,
    ) -> Result<DeviceId, Error> {
        let name = name.into();
        if self.device_id_by_name(&name).await.is_some() {
            return Err(DeviceError::DuplicateName(name).into());
        }

        let device_ip = config.device_ip();
        let device = Device::bind(config).await?;
        let managed = ManagedDevice::new(name.clone(), device, self.event_bus.clone());
        let device_id = managed.id;

        let mut devices = self.devices.write().await;
        if devices.values().any(|d| d.name == name) {
            drop(devices);
            managed.close().await;
            return Err(DeviceError::DuplicateName(name).into());
        }
        devices.insert(device_id, managed);
        drop(devices);

        tracing::info!(%device_id, name = %name, device_ip = %device_ip, "Device added");
        self.event_bus
            .publish(DeviceEvent::device_added(device_id, name));

        Ok(device_id)
    }

    /// Adds every device of `configs`.
    ///
    /// Devices are bound independently; a failure is logged and reported
    /// for that device only.
    pub async fn add_devices(
        &self,
        configs: impl IntoIterator<Item = DeviceConfig>,
    ) -> Vec<(String, Result<DeviceId, Error>)> {
        let mut results = Vec::new();
        for config in configs {
            let name = config.name.clone();
            let result = self.add_device(config).await;
            if let Err(e) = &result {
                tracing::error!(name = %name, error = %e, "Failed to add device");
            }
            results.push((name, result));
        }
        results
    }

    /// Closes a device and removes it from the manager.
    ///
    /// Returns `true` if the device was found and removed.
    pub async fn remove_device(&self, device_id: DeviceId) -> bool {
        let removed = self.devices.write().await.remove(&device_id);

        match removed {
            Some(managed) => {
                managed.close().await;
                self.event_bus
                    .publish(DeviceEvent::device_removed(device_id));
                true
            }
            None => false,
        }
    }

    /// Returns a list of all device IDs.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().copied().collect()
    }

    /// Returns the number of managed devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns a managed device.
    pub async fn device(&self, device_id: DeviceId) -> Option<Arc<Device>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|d| Arc::clone(&d.device))
    }

    /// Returns the ID of the device with display name `name`.
    pub async fn device_id_by_name(&self, name: &str) -> Option<DeviceId> {
        self.devices
            .read()
            .await
            .values()
            .find(|d| d.name == name)
            .map(|d| d.id)
    }

    /// Returns the device with display name `name`.
    pub async fn device_by_name(&self, name: &str) -> Option<Arc<Device>> {
        self.devices
            .read()
            .await
            .values()
            .find(|d| d.name == name)
            .map(|d| Arc::clone(&d.device))
    }

    /// Returns the display name of a device.
    pub async fn name(&self, device_id: DeviceId) -> Option<String> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|d| d.name.clone())
    }

    // =========================================================================
    // Switching
    // =========================================================================

    /// Switches a relay or IO pin of a device.
    ///
    /// The outcome is also published as [`DeviceEvent::CommandSent`] or
    /// [`DeviceEvent::CommandFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] for an unknown device, otherwise
    /// the error of [`Device::switch`].
    pub async fn switch(
        &self,
        device_id: DeviceId,
        kind: SlotKind,
        ordinal: u8,
        state: i64,
    ) -> Result<usize, Error> {
        let device = self
            .device(device_id)
            .await
            .ok_or(Error::DeviceNotFound)?;

        let result = device.switch(kind, ordinal, state).await;

        let command = describe_switch(kind, ordinal, state);
        let event = match &result {
            Ok(_) => DeviceEvent::CommandSent { device_id, command },
            Err(e) => DeviceEvent::CommandFailed {
                device_id,
                command,
                error: e.to_string(),
            },
        };
        self.event_bus.publish(event);

        result
    }

    /// Switches a relay or IO pin of the device named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if no device has that name,
    /// otherwise the error of [`switch`](Self::switch).
    pub async fn switch_by_name(
        &self,
        name: &str,
        kind: SlotKind,
        ordinal: u8,
        state: i64,
    ) -> Result<usize, Error> {
        let device_id = self
            .device_id_by_name(name)
            .await
            .ok_or(Error::DeviceNotFound)?;
        self.switch(device_id, kind, ordinal, state).await
    }

    /// Switches the slot addressed by a state path such as
    /// `HUTOG.relais.4.Status`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if the path is malformed, otherwise the
    /// error of [`switch_by_name`](Self::switch_by_name).
    pub async fn switch_by_path(&self, path: &str, state: i64) -> Result<usize, Error> {
        let path: StatePath = path.parse()?;
        tracing::debug!(path = %path, state, "Routing switch request");
        self.switch_by_name(&path.device, path.kind, path.ordinal, state)
            .await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Closes and removes every device.
    pub async fn shutdown(&self) {
        let devices: Vec<ManagedDevice> = self
            .devices
            .write()
            .await
            .drain()
            .map(|(_, d)| d)
            .collect();

        tracing::info!(count = devices.len(), "Shutting down device manager");
        for managed in devices {
            let device_id = managed.id;
            managed.close().await;
            self.event_bus
                .publish(DeviceEvent::device_removed(device_id));
        }
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DeviceManager {
    fn clone(&self) -> Self {
        Self {
            devices: Arc::clone(&self.devices),
            event_bus: self.event_bus.clone(),
        }
    }
}

/// Command token of a switch request, or the request itself if it is
/// invalid.
fn describe_switch(kind: SlotKind, ordinal: u8, state: i64) -> String {
    SwitchCommand::build(kind, ordinal, state).map_or_else(
        |_| format!("{}.{ordinal}={state}", kind.path_segment()),
        |command| command.token(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use std::net::IpAddr;

    fn loopback() -> EndpointConfig {
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        EndpointConfig::new(ip)
            .with_bind_addr(ip)
            .with_receive_port(0)
            .with_broadcast_addr(ip)
    }

    #[tokio::test]
    async fn new_manager_is_empty() {
        let manager = DeviceManager::new();

        assert_eq!(manager.device_count().await, 0);
        assert!(manager.device_ids().await.is_empty());
    }

    #[tokio::test]
    async fn add_endpoint_publishes_event() {
        let manager = DeviceManager::new();
        let mut events = manager.subscribe();

        let id = manager.add_endpoint("HUTOG", loopback()).await.unwrap();

        let event = events.recv().await.unwrap();
        assert!(matches!(
            event,
            DeviceEvent::DeviceAdded { device_id, ref name } if device_id == id && name == "HUTOG"
        ));
        assert_eq!(manager.name(id).await.as_deref(), Some("HUTOG"));
        assert_eq!(manager.device_id_by_name("HUTOG").await, Some(id));
        assert!(manager.device_by_name("HUTOG").await.is_some());

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn dropping_manager_releases_listening_port() {
        let port = std::net::UdpSocket::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let manager = DeviceManager::new();
        let mut events = manager.subscribe();
        manager
            .add_endpoint("HUTOG", loopback().with_receive_port(port))
            .await
            .unwrap();
        drop(manager);

        // The forwarder reports the closed listener once the device is gone.
        let closed = tokio::time::timeout(std::time::Duration::from_secs(2), async {
            loop {
                match events.recv().await {
                    Ok(DeviceEvent::ListenerClosed { error, .. }) => break error,
                    Ok(_) => {}
                    Err(e) => panic!("event stream ended: {e}"),
                }
            }
        })
        .await
        .unwrap();
        assert!(closed.is_none());

        let mut rebound = None;
        for _ in 0..100 {
            if let Ok(socket) = tokio::net::UdpSocket::bind(("127.0.0.1", port)).await {
                rebound = Some(socket);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(rebound.is_some(), "port {port} still bound after drop");
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let manager = DeviceManager::new();
        manager.add_endpoint("HUTOG", loopback()).await.unwrap();

        let err = manager.add_endpoint("HUTOG", loopback()).await.unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::DuplicateName(_))));
        assert_eq!(manager.device_count().await, 1);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_config_does_not_affect_others() {
        let manager = DeviceManager::new();
        manager.add_endpoint("good", loopback()).await.unwrap();

        let results = manager
            .add_devices([DeviceConfig::new("bad", "not-an-ip")])
            .await;
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].1,
            Err(Error::Device(DeviceError::InvalidConfiguration(_)))
        ));
        assert_eq!(manager.device_count().await, 1);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn remove_device_emits_closed_then_removed() {
        let manager = DeviceManager::new();
        let id = manager.add_endpoint("HUTOG", loopback()).await.unwrap();
        let mut events = manager.subscribe();

        assert!(manager.remove_device(id).await);
        assert!(!manager.remove_device(id).await);

        assert!(matches!(
            events.recv().await.unwrap(),
            DeviceEvent::ListenerClosed { error: None, .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            DeviceEvent::DeviceRemoved { device_id } if device_id == id
        ));
    }

    #[tokio::test]
    async fn switch_unknown_device() {
        let manager = DeviceManager::new();
        let err = manager
            .switch_by_name("missing", SlotKind::Relay, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound));
    }

    #[tokio::test]
    async fn rejected_switch_is_published() {
        let manager = DeviceManager::new();
        let id = manager.add_endpoint("HUTOG", loopback()).await.unwrap();
        let mut events = manager.subscribe();

        let err = manager
            .switch_by_path("anelhut.0.HUTOG.io.3.Status", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidSwitchState(5))));

        match events.recv().await.unwrap() {
            DeviceEvent::CommandFailed {
                device_id, command, ..
            } => {
                assert_eq!(device_id, id);
                assert_eq!(command, "io.3=5");
            }
            other => panic!("unexpected event {other:?}"),
        }

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_path_is_rejected() {
        let manager = DeviceManager::new();
        let err = manager.switch_by_path("HUTOG.relais", 1).await.unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidStatePath(_))));
    }

    #[test]
    fn describe_valid_and_invalid_requests() {
        assert_eq!(describe_switch(SlotKind::Relay, 4, 1), "Sw_on4");
        assert_eq!(describe_switch(SlotKind::Relay, 4, 7), "relais.4=7");
    }
}
