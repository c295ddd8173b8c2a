// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level abstraction of one NET-PwrCtrl device.
//!
//! A [`Device`] owns the listening endpoint, the command sender and the
//! snapshot channel of a single device. Devices share no state with each
//! other.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::command::{Command, SwitchCommand};
use crate::error::Error;
use crate::protocol::{CommandSender, EndpointConfig, ListenerState, TelegramListener};
use crate::subscription::{SnapshotChannel, SnapshotSubscription, SubscriptionId};
use crate::types::{SlotKind, SwitchState};

/// A bound NET-PwrCtrl device.
///
/// # Examples
///
/// ```no_run
/// use pwrctrl_lib::Device;
/// use pwrctrl_lib::protocol::EndpointConfig;
/// use pwrctrl_lib::types::SwitchState;
///
/// # async fn example() -> pwrctrl_lib::Result<()> {
/// let config = EndpointConfig::new("192.168.0.244".parse().unwrap())
///     .with_credentials("admin", "anel");
/// let device = Device::bind(config).await?;
///
/// let mut snapshots = device.subscribe();
/// device.switch_relay(1, SwitchState::On).await?;
///
/// if let Some(snapshot) = snapshots.recv().await {
///     println!("relay 1 on: {:?}", snapshot.relay(1).map(|r| r.on));
/// }
///
/// device.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Device {
    config: EndpointConfig,
    channel: Arc<SnapshotChannel>,
    listener: TelegramListener,
    sender: CommandSender,
}

impl Device {
    /// Binds the device's listening endpoint and sends the discovery probe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the receive port cannot be bound.
    pub async fn bind(config: EndpointConfig) -> Result<Self, Error> {
        let channel = Arc::new(SnapshotChannel::new());
        let listener = TelegramListener::bind(&config, Arc::clone(&channel)).await?;
        let sender = CommandSender::new(&config);

        Ok(Self {
            config,
            channel,
            listener,
            sender,
        })
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Returns the local address of the listening endpoint.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Subscribes to the snapshots published by this device.
    ///
    /// The subscription ends when the listener closes.
    pub fn subscribe(&self) -> SnapshotSubscription {
        self.channel.subscribe()
    }

    /// Removes a subscription. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    /// Returns the number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.channel.subscriber_count()
    }

    /// Sends a command to the device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the datagram cannot be sent.
    pub async fn send_command<C: Command + ?Sized>(&self, command: &C) -> Result<usize, Error> {
        Ok(self.sender.send(command).await?)
    }

    // ========== Switching ==========

    /// Switches a relay or IO pin from a raw numeric state.
    ///
    /// Nothing is sent when the request is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if `state` is not 0 or 1 or `ordinal` is 0,
    /// or [`Error::Protocol`] if the datagram cannot be sent.
    pub async fn switch(&self, kind: SlotKind, ordinal: u8, state: i64) -> Result<usize, Error> {
        let command = match SwitchCommand::build(kind, ordinal, state) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(
                    device_ip = %self.config.device_ip(),
                    kind = %kind,
                    ordinal,
                    state,
                    error = %e,
                    "Rejected switch request"
                );
                return Err(e.into());
            }
        };
        self.send_command(&command).await
    }

    /// Switches relay `ordinal`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if `ordinal` is 0, or [`Error::Protocol`]
    /// if the datagram cannot be sent.
    pub async fn switch_relay(&self, ordinal: u8, state: SwitchState) -> Result<usize, Error> {
        self.send_command(&SwitchCommand::relay(ordinal, state)?)
            .await
    }

    /// Switches IO pin `ordinal`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if `ordinal` is 0, or [`Error::Protocol`]
    /// if the datagram cannot be sent.
    pub async fn switch_io(&self, ordinal: u8, state: SwitchState) -> Result<usize, Error> {
        self.send_command(&SwitchCommand::io(ordinal, state)?).await
    }

    // ========== Lifecycle ==========

    /// Returns the listener's lifecycle state.
    #[must_use]
    pub fn listener_state(&self) -> ListenerState {
        self.listener.state()
    }

    /// Returns a receiver observing the listener's lifecycle.
    #[must_use]
    pub fn watch_listener_state(&self) -> watch::Receiver<ListenerState> {
        self.listener.watch_state()
    }

    /// Returns the socket error that closed the listener, if any.
    #[must_use]
    pub fn listener_error(&self) -> Option<String> {
        self.listener.last_error()
    }

    /// Returns `true` once the listener has closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.listener_state() == ListenerState::Closed
    }

    /// Closes the listening endpoint. Safe to call more than once.
    ///
    /// Commands can still be sent after closing.
    pub async fn close(&self) {
        self.listener.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProtocolError, ValueError};
    use tokio::net::UdpSocket;

    fn loopback() -> EndpointConfig {
        let ip = "127.0.0.1".parse().unwrap();
        EndpointConfig::new(ip)
            .with_bind_addr(ip)
            .with_receive_port(0)
            .with_broadcast_addr(ip)
    }

    #[tokio::test]
    async fn bind_reaches_listening() {
        let device = Device::bind(loopback()).await.unwrap();
        assert_eq!(device.listener_state(), ListenerState::Listening);
        assert_ne!(device.local_addr().port(), 0);
        device.close().await;
        assert!(device.is_closed());
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = Device::bind(loopback().with_receive_port(port))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Bind { .. })));
    }

    #[tokio::test]
    async fn invalid_switch_state_is_rejected() {
        let device = Device::bind(loopback()).await.unwrap();
        let err = device.switch(SlotKind::Relay, 1, 2).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Value(ValueError::InvalidSwitchState(2))
        ));
        device.close().await;
    }

    #[tokio::test]
    async fn close_ends_subscriptions() {
        let device = Device::bind(loopback()).await.unwrap();
        let mut sub = device.subscribe();
        assert_eq!(device.subscriber_count(), 1);

        device.close().await;
        device.close().await;
        assert!(sub.recv().await.is_none());
        assert_eq!(device.subscriber_count(), 0);
    }
}
