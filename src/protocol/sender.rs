// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command datagram sender.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::command::{Command, Credentials};
use crate::error::ProtocolError;
use crate::protocol::EndpointConfig;

/// Sends command datagrams to one device.
///
/// Every send opens its own ephemeral socket, which is closed as soon as
/// the datagram has been handed to the network stack. Sends may run
/// concurrently with each other and with the listener; they are neither
/// ordered nor retried.
///
/// # Examples
///
/// ```no_run
/// use pwrctrl_lib::command::SwitchCommand;
/// use pwrctrl_lib::protocol::{CommandSender, EndpointConfig};
/// use pwrctrl_lib::types::SwitchState;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = CommandSender::new(&EndpointConfig::new("192.168.0.244".parse()?));
/// sender.send(&SwitchCommand::relay(1, SwitchState::On)?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CommandSender {
    target: SocketAddr,
    credentials: Credentials,
}

impl CommandSender {
    /// Creates a sender for the device described by `config`.
    #[must_use]
    pub fn new(config: &EndpointConfig) -> Self {
        Self {
            target: config.send_addr(),
            credentials: config.credentials().clone(),
        }
    }

    /// Returns the address commands are sent to.
    #[must_use]
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Sends one command and returns the number of bytes sent.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Send`] if the ephemeral socket cannot be
    /// opened or the datagram cannot be transmitted.
    pub async fn send<C: Command + ?Sized>(&self, command: &C) -> Result<usize, ProtocolError> {
        let token = command.token();
        let payload = command.to_datagram(&self.credentials);

        match send_datagram(self.target, &payload).await {
            Ok(sent) => {
                tracing::info!(addr = %self.target, command = %token, "Command sent");
                Ok(sent)
            }
            Err(source) => {
                tracing::error!(
                    addr = %self.target,
                    command = %token,
                    error = %source,
                    "Failed to send command"
                );
                Err(ProtocolError::Send {
                    addr: self.target,
                    source,
                })
            }
        }
    }
}

async fn send_datagram(target: SocketAddr, payload: &[u8]) -> std::io::Result<usize> {
    let local: IpAddr = match target {
        SocketAddr::V4(_) => Ipv4Addr::UNSPECIFIED.into(),
        SocketAddr::V6(_) => Ipv6Addr::UNSPECIFIED.into(),
    };
    let socket = UdpSocket::bind(SocketAddr::new(local, 0)).await?;
    socket.send_to(payload, target).await
}
