// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP endpoint configuration of one device.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::command::Credentials;

/// Configuration for talking to one NET-PwrCtrl device.
///
/// The configuration is fixed for the lifetime of a listener. Changing it
/// means closing the device and binding a new one.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::protocol::EndpointConfig;
///
/// // Factory defaults: receive on 77, send to 75, admin/anel
/// let config = EndpointConfig::new("192.168.0.244".parse().unwrap());
///
/// // With all options
/// let config = EndpointConfig::new("192.168.0.244".parse().unwrap())
///     .with_receive_port(7700)
///     .with_send_port(7500)
///     .with_credentials("user7", "secret")
///     .with_xor_credentials(true);
///
/// assert_eq!(config.send_addr().to_string(), "192.168.0.244:7500");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    device_ip: IpAddr,
    receive_port: u16,
    send_port: u16,
    credentials: Credentials,
    bind_addr: IpAddr,
    broadcast_addr: IpAddr,
    multicast_ttl: u32,
}

impl EndpointConfig {
    /// Default port the device sends its status telegrams to.
    pub const DEFAULT_RECEIVE_PORT: u16 = 77;
    /// Default port the device accepts probes and commands on.
    pub const DEFAULT_SEND_PORT: u16 = 75;
    /// Default multicast TTL of the listening socket.
    pub const DEFAULT_MULTICAST_TTL: u32 = 128;

    /// Creates a configuration for the device at `device_ip`.
    #[must_use]
    pub fn new(device_ip: IpAddr) -> Self {
        Self {
            device_ip,
            receive_port: Self::DEFAULT_RECEIVE_PORT,
            send_port: Self::DEFAULT_SEND_PORT,
            credentials: Credentials::default(),
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            broadcast_addr: IpAddr::V4(Ipv4Addr::BROADCAST),
            multicast_ttl: Self::DEFAULT_MULTICAST_TTL,
        }
    }

    /// Sets the local port status telegrams are received on.
    ///
    /// Port 0 binds an ephemeral port.
    #[must_use]
    pub fn with_receive_port(mut self, port: u16) -> Self {
        self.receive_port = port;
        self
    }

    /// Sets the device port probes and commands are sent to.
    #[must_use]
    pub fn with_send_port(mut self, port: u16) -> Self {
        self.send_port = port;
        self
    }

    /// Sets the device's web interface credentials.
    ///
    /// Keeps the current XOR selection.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let xor = self.credentials.is_xor();
        self.credentials = Credentials::new(username, password).with_xor(xor);
        self
    }

    /// Selects whether credentials are sent obfuscated.
    #[must_use]
    pub fn with_xor_credentials(mut self, xor: bool) -> Self {
        self.credentials = self.credentials.with_xor(xor);
        self
    }

    /// Sets the local address the listening socket binds to.
    #[must_use]
    pub fn with_bind_addr(mut self, addr: IpAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Sets the address the discovery probe is sent to.
    #[must_use]
    pub fn with_broadcast_addr(mut self, addr: IpAddr) -> Self {
        self.broadcast_addr = addr;
        self
    }

    /// Sets the multicast TTL of the listening socket.
    #[must_use]
    pub fn with_multicast_ttl(mut self, ttl: u32) -> Self {
        self.multicast_ttl = ttl;
        self
    }

    /// Returns the device IP.
    #[must_use]
    pub fn device_ip(&self) -> IpAddr {
        self.device_ip
    }

    /// Returns the local receive port.
    #[must_use]
    pub fn receive_port(&self) -> u16 {
        self.receive_port
    }

    /// Returns the device send port.
    #[must_use]
    pub fn send_port(&self) -> u16 {
        self.send_port
    }

    /// Returns the credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the local bind address.
    #[must_use]
    pub fn bind_addr(&self) -> IpAddr {
        self.bind_addr
    }

    /// Returns the probe destination address.
    #[must_use]
    pub fn broadcast_addr(&self) -> IpAddr {
        self.broadcast_addr
    }

    /// Returns the multicast TTL.
    #[must_use]
    pub fn multicast_ttl(&self) -> u32 {
        self.multicast_ttl
    }

    /// Returns the socket address the listener binds.
    #[must_use]
    pub fn bind_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.receive_port)
    }

    /// Returns the socket address commands are sent to.
    #[must_use]
    pub fn send_addr(&self) -> SocketAddr {
        SocketAddr::new(self.device_ip, self.send_port)
    }

    /// Returns the socket address the discovery probe is sent to.
    #[must_use]
    pub fn probe_addr(&self) -> SocketAddr {
        SocketAddr::new(self.broadcast_addr, self.send_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn defaults() {
        let config = EndpointConfig::new(ip("192.168.0.244"));
        assert_eq!(config.receive_port(), 77);
        assert_eq!(config.send_port(), 75);
        assert_eq!(config.multicast_ttl(), 128);
        assert_eq!(config.credentials(), &Credentials::new("admin", "anel"));
        assert_eq!(config.bind_socket_addr().to_string(), "0.0.0.0:77");
        assert_eq!(config.probe_addr().to_string(), "255.255.255.255:75");
        assert_eq!(config.send_addr().to_string(), "192.168.0.244:75");
    }

    #[test]
    fn builder_overrides() {
        let config = EndpointConfig::new(ip("127.0.0.1"))
            .with_receive_port(0)
            .with_send_port(9000)
            .with_bind_addr(ip("127.0.0.1"))
            .with_broadcast_addr(ip("127.0.0.1"))
            .with_multicast_ttl(1);

        assert_eq!(config.bind_socket_addr().to_string(), "127.0.0.1:0");
        assert_eq!(config.probe_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.multicast_ttl(), 1);
    }

    #[test]
    fn xor_selection_survives_credential_change() {
        let config = EndpointConfig::new(ip("10.0.0.2"))
            .with_xor_credentials(true)
            .with_credentials("user", "pw");

        assert!(config.credentials().is_xor());
        assert_eq!(config.credentials().username(), "user");
        assert_eq!(config.credentials().password(), "pw");
    }
}
