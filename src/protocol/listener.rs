// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery probe and status telegram listener.

use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ProtocolError;
use crate::protocol::EndpointConfig;
use crate::subscription::SnapshotChannel;
use crate::telegram;

/// Payload of the discovery probe.
pub const DISCOVERY_PROBE: &[u8] = b"wer da?";

/// Receive buffer size. Telegrams are well below one Ethernet frame.
const MAX_DATAGRAM_SIZE: usize = 2048;

/// Lifecycle of a [`TelegramListener`].
///
/// `Closed` is terminal and is reached on explicit close or on a socket
/// error while listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// No socket has been bound yet.
    Unbound,
    /// The receive port is bound.
    Bound,
    /// The probe was sent and telegrams are being received.
    Listening,
    /// The socket is gone; no further snapshots are published.
    Closed,
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unbound => "unbound",
            Self::Bound => "bound",
            Self::Listening => "listening",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Long-lived listening endpoint of one device.
///
/// Binding the listener sends the discovery probe and starts a task that
/// decodes every datagram from the configured device IP. Snapshots whose
/// embedded IP also matches are stamped with the current time and
/// published on the snapshot channel. Everything else is dropped.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use pwrctrl_lib::protocol::{EndpointConfig, ListenerState, TelegramListener};
/// use pwrctrl_lib::subscription::SnapshotChannel;
///
/// # async fn example() -> Result<(), pwrctrl_lib::error::ProtocolError> {
/// let channel = Arc::new(SnapshotChannel::new());
/// let mut sub = channel.subscribe();
///
/// let config = EndpointConfig::new("192.168.0.244".parse().unwrap());
/// let listener = TelegramListener::bind(&config, Arc::clone(&channel)).await?;
/// assert_eq!(listener.state(), ListenerState::Listening);
///
/// if let Some(snapshot) = sub.recv().await {
///     println!("{:?}", snapshot.relays());
/// }
///
/// listener.close().await;
/// # Ok(())
/// # }
/// ```
pub struct TelegramListener {
    device_ip: IpAddr,
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    state: Arc<watch::Sender<ListenerState>>,
    last_error: Arc<Mutex<Option<String>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramListener {
    /// Binds the receive port, sends the discovery probe and starts
    /// listening.
    ///
    /// A failed probe is logged and does not prevent listening.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Bind`] if the receive port cannot be bound.
    /// There is no retry; bind a new listener to try again.
    pub async fn bind(
        config: &EndpointConfig,
        channel: Arc<SnapshotChannel>,
    ) -> Result<Self, ProtocolError> {
        let state = Arc::new(watch::Sender::new(ListenerState::Unbound));
        let device_ip = config.device_ip();
        let addr = config.bind_socket_addr();

        let socket = match UdpSocket::bind(addr).await {
            Ok(socket) => socket,
            Err(source) => {
                tracing::error!(
                    device_ip = %device_ip,
                    addr = %addr,
                    error = %source,
                    "Failed to bind listening endpoint"
                );
                return Err(ProtocolError::Bind { addr, source });
            }
        };
        let local_addr = socket.local_addr()?;
        state.send_replace(ListenerState::Bound);
        tracing::info!(device_ip = %device_ip, addr = %local_addr, "Listening endpoint bound");

        send_probe(&socket, config).await;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let last_error = Arc::new(Mutex::new(None));

        state.send_replace(ListenerState::Listening);
        let task = tokio::spawn(listen(
            socket,
            device_ip,
            channel,
            Arc::clone(&state),
            shutdown_rx,
            Arc::clone(&last_error),
        ));

        Ok(Self {
            device_ip,
            local_addr,
            shutdown,
            state,
            last_error,
            task: Mutex::new(Some(task)),
        })
    }

    /// Returns the local address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the device IP telegrams are accepted from.
    #[must_use]
    pub fn device_ip(&self) -> IpAddr {
        self.device_ip
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes lifecycle changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    /// Returns the socket error that closed the listener, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Stops listening.
    ///
    /// Once this returns no further snapshot is published and every
    /// subscription of the channel has ended. Closing twice is a no-op.
    pub async fn close(&self) {
        self.shutdown.send_replace(true);

        let task = self.task.lock().take();
        if let Some(task) = task {
            // The task result carries nothing; a panic has already been reported.
            let _ = task.await;
            tracing::debug!(device_ip = %self.device_ip, "Listening endpoint closed");
        }
        self.state.send_replace(ListenerState::Closed);
    }
}

impl Drop for TelegramListener {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

impl fmt::Debug for TelegramListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramListener")
            .field("device_ip", &self.device_ip)
            .field("local_addr", &self.local_addr)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

async fn send_probe(socket: &UdpSocket, config: &EndpointConfig) {
    if let Err(e) = socket.set_broadcast(true) {
        tracing::warn!(error = %e, "Failed to enable broadcast");
    }
    if let Err(e) = socket.set_multicast_ttl_v4(config.multicast_ttl()) {
        tracing::warn!(error = %e, "Failed to set multicast TTL");
    }

    let target = config.probe_addr();
    match socket.send_to(DISCOVERY_PROBE, target).await {
        Ok(_) => tracing::debug!(addr = %target, "Discovery probe sent"),
        Err(e) => tracing::warn!(addr = %target, error = %e, "Failed to send discovery probe"),
    }
}

async fn listen(
    socket: UdpSocket,
    device_ip: IpAddr,
    channel: Arc<SnapshotChannel>,
    state: Arc<watch::Sender<ListenerState>>,
    mut shutdown: watch::Receiver<bool>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    let failure = loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break None;
                }
            }
            result = socket.recv_from(&mut buf) => match result {
                Ok((len, from)) => {
                    accept(&buf[..len], from, device_ip, &channel);
                }
                Err(e) => break Some(e),
            },
        }
    };

    teardown(device_ip, failure.as_ref(), &channel, &state, &last_error);
}

/// Ends every subscription and marks the listener closed, recording the
/// socket error that stopped it, if any.
fn teardown(
    device_ip: IpAddr,
    failure: Option<&io::Error>,
    channel: &SnapshotChannel,
    state: &watch::Sender<ListenerState>,
    last_error: &Mutex<Option<String>>,
) {
    if let Some(e) = failure {
        tracing::error!(
            device_ip = %device_ip,
            error = %e,
            "Socket error, closing listening endpoint"
        );
        *last_error.lock() = Some(e.to_string());
    }

    channel.close();
    state.send_replace(ListenerState::Closed);
}

/// Decodes and publishes one datagram. Returns `true` if it was published.
fn accept(payload: &[u8], from: SocketAddr, device_ip: IpAddr, channel: &SnapshotChannel) -> bool {
    tracing::debug!(from = %from, len = payload.len(), "Datagram received");

    if from.ip() != device_ip {
        tracing::debug!(from = %from, device_ip = %device_ip, "Dropping datagram from other sender");
        return false;
    }

    let snapshot = match telegram::decode_bytes(payload) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(device_ip = %device_ip, error = %e, "Failed to decode telegram");
            return false;
        }
    };

    let reported = snapshot.identity().ip.parse::<IpAddr>().ok();
    if reported != Some(device_ip) {
        tracing::debug!(
            device_ip = %device_ip,
            reported = %snapshot.identity().ip,
            "Dropping telegram for other IP"
        );
        return false;
    }

    let snapshot = Arc::new(snapshot.captured(Utc::now()));
    let delivered = channel.publish(snapshot);
    tracing::debug!(device_ip = %device_ip, subscribers = delivered, "Snapshot published");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const TELEGRAM: &str = "NET-PwrCtrl:Hut:10.0.0.5:255.255.255.0:10.0.0.1:0.4.163.10.9.1:\
                            A,1:B,0:C,0:D,0:E,0:F,0:G,0:H,0:0:80";

    fn from(ip: &str) -> SocketAddr {
        SocketAddr::new(ip.parse().unwrap(), 75)
    }

    fn device_ip() -> IpAddr {
        "10.0.0.5".parse().unwrap()
    }

    #[test]
    fn accepts_matching_sender() {
        let channel = SnapshotChannel::new();
        let mut sub = channel.subscribe();

        assert!(accept(TELEGRAM.as_bytes(), from("10.0.0.5"), device_ip(), &channel));

        let snapshot = sub.try_recv().unwrap();
        assert_eq!(snapshot.identity().name, "Hut");
        assert!(snapshot.captured_at().is_some());
    }

    #[test]
    fn drops_other_sender() {
        let channel = SnapshotChannel::new();
        let mut sub = channel.subscribe();

        assert!(!accept(TELEGRAM.as_bytes(), from("10.0.0.6"), device_ip(), &channel));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn drops_telegram_for_other_ip() {
        let channel = SnapshotChannel::new();
        let raw = TELEGRAM.replace("10.0.0.5", "10.0.0.7");

        assert!(!accept(raw.as_bytes(), from("10.0.0.5"), device_ip(), &channel));
    }

    #[test]
    fn drops_undecodable_payload() {
        let channel = SnapshotChannel::new();
        assert!(!accept(b"wer da?", from("10.0.0.5"), device_ip(), &channel));
        assert!(!accept(
            b"NET-PwrCtrl:Hut:NoPass:x",
            from("10.0.0.5"),
            device_ip(),
            &channel
        ));
    }

    #[tokio::test]
    async fn socket_error_closes_listener() {
        let channel = SnapshotChannel::new();
        let mut sub = channel.subscribe();
        let state = watch::Sender::new(ListenerState::Listening);
        let last_error = Mutex::new(None);
        let error = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset");

        teardown(device_ip(), Some(&error), &channel, &state, &last_error);

        assert_eq!(*state.borrow(), ListenerState::Closed);
        assert_eq!(last_error.lock().as_deref(), Some("connection reset"));
        assert!(channel.is_closed());
        assert!(sub.recv().await.is_none());
    }

    #[test]
    fn shutdown_leaves_no_error() {
        let channel = SnapshotChannel::new();
        let state = watch::Sender::new(ListenerState::Listening);
        let last_error = Mutex::new(None);

        teardown(device_ip(), None, &channel, &state, &last_error);

        assert_eq!(*state.borrow(), ListenerState::Closed);
        assert!(last_error.lock().is_none());
        assert!(channel.is_closed());
    }

    #[test]
    fn state_display() {
        assert_eq!(ListenerState::Listening.to_string(), "listening");
        assert_eq!(ListenerState::Closed.to_string(), "closed");
    }
}
