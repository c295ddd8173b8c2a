// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration types for the device manager.

use std::net::IpAddr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::command::Credentials;
use crate::error::DeviceError;
use crate::protocol::EndpointConfig;

/// Configuration for a managed device.
///
/// Deserializes from the device list format used by existing installations,
/// where ports may be numbers or numeric strings:
///
/// ```json
/// {
///   "DeviceName": "HUTOG",
///   "DeviceIP": "192.168.0.244",
///   "UDPSendPort": "75",
///   "UDPRecievePort": 77,
///   "Username": "admin",
///   "Password": "anel"
/// }
/// ```
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::manager::DeviceConfig;
///
/// let config = DeviceConfig::new("HUTOG", "192.168.0.244")
///     .with_send_port(7500)
///     .with_credentials("user7", "secret");
///
/// let endpoint = config.to_endpoint().unwrap();
/// assert_eq!(endpoint.send_addr().to_string(), "192.168.0.244:7500");
///
/// let configs = DeviceConfig::list_from_json(
///     r#"[{ "DeviceName": "HUTEG", "DeviceIP": "192.168.0.245" }]"#,
/// ).unwrap();
/// assert_eq!(configs[0].name, "HUTEG");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Display name, unique within a manager.
    #[serde(rename = "DeviceName")]
    pub name: String,
    /// Device IP address.
    #[serde(rename = "DeviceIP")]
    pub device_ip: String,
    /// Device port probes and commands are sent to.
    #[serde(
        rename = "UDPSendPort",
        default = "default_send_port",
        deserialize_with = "port"
    )]
    pub send_port: u16,
    /// Local port status telegrams are received on.
    #[serde(
        rename = "UDPRecievePort",
        alias = "UDPReceivePort",
        default = "default_receive_port",
        deserialize_with = "port"
    )]
    pub receive_port: u16,
    /// Web interface username.
    #[serde(rename = "Username", default = "default_username")]
    pub username: String,
    /// Web interface password.
    #[serde(rename = "Password", default = "default_password")]
    pub password: String,
    /// Whether credentials are sent obfuscated.
    #[serde(rename = "XorUserPassword", default)]
    pub xor_credentials: bool,
}

impl DeviceConfig {
    /// Creates a configuration with factory default ports and credentials.
    #[must_use]
    pub fn new(name: impl Into<String>, device_ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_ip: device_ip.into(),
            send_port: EndpointConfig::DEFAULT_SEND_PORT,
            receive_port: EndpointConfig::DEFAULT_RECEIVE_PORT,
            username: Credentials::DEFAULT_USERNAME.to_string(),
            password: Credentials::DEFAULT_PASSWORD.to_string(),
            xor_credentials: false,
        }
    }

    /// Sets the device send port.
    #[must_use]
    pub fn with_send_port(mut self, port: u16) -> Self {
        self.send_port = port;
        self
    }

    /// Sets the local receive port.
    #[must_use]
    pub fn with_receive_port(mut self, port: u16) -> Self {
        self.receive_port = port;
        self
    }

    /// Sets the web interface credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Selects whether credentials are sent obfuscated.
    #[must_use]
    pub fn with_xor_credentials(mut self, xor: bool) -> Self {
        self.xor_credentials = xor;
        self
    }

    /// Parses one configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Config`] if the JSON does not describe a device.
    pub fn from_json(json: &str) -> Result<Self, DeviceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a device list from JSON.
    ///
    /// Accepts a bare array or an object holding the array under
    /// `getAnelDevices`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Config`] if the JSON has neither shape.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, DeviceError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DeviceList {
            Bare(Vec<DeviceConfig>),
            Adapter {
                #[serde(rename = "getAnelDevices")]
                devices: Vec<DeviceConfig>,
            },
        }

        Ok(match serde_json::from_str(json)? {
            DeviceList::Bare(devices) | DeviceList::Adapter { devices } => devices,
        })
    }

    /// Builds the endpoint configuration of this device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InvalidConfiguration`] if the name is empty or
    /// the device IP is not an IP address.
    pub fn to_endpoint(&self) -> Result<EndpointConfig, DeviceError> {
        if self.name.trim().is_empty() {
            return Err(DeviceError::InvalidConfiguration(
                "device name is empty".to_string(),
            ));
        }
        let ip: IpAddr = self.device_ip.trim().parse().map_err(|_| {
            DeviceError::InvalidConfiguration(format!(
                "{}: invalid device IP {:?}",
                self.name, self.device_ip
            ))
        })?;

        Ok(EndpointConfig::new(ip)
            .with_send_port(self.send_port)
            .with_receive_port(self.receive_port)
            .with_credentials(&self.username, &self.password)
            .with_xor_credentials(self.xor_credentials))
    }
}

fn default_send_port() -> u16 {
    EndpointConfig::DEFAULT_SEND_PORT
}

fn default_receive_port() -> u16 {
    EndpointConfig::DEFAULT_RECEIVE_PORT
}

fn default_username() -> String {
    Credentials::DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    Credentials::DEFAULT_PASSWORD.to_string()
}

/// Accepts a port given as a number or a numeric string.
fn port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_adapter_shape() {
        let json = r#"{
            "DeviceName": "HUTOG",
            "DeviceIP": "192.168.0.244",
            "UDPSendPort": "7500",
            "UDPRecievePort": 7700,
            "Username": "user7",
            "Password": "secret",
            "XorUserPassword": true
        }"#;

        let config = DeviceConfig::from_json(json).unwrap();
        assert_eq!(config.name, "HUTOG");
        assert_eq!(config.send_port, 7500);
        assert_eq!(config.receive_port, 7700);
        assert!(config.xor_credentials);

        let endpoint = config.to_endpoint().unwrap();
        assert_eq!(endpoint.send_addr().to_string(), "192.168.0.244:7500");
        assert_eq!(endpoint.receive_port(), 7700);
        assert_eq!(endpoint.credentials().username(), "user7");
        assert!(endpoint.credentials().is_xor());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config =
            DeviceConfig::from_json(r#"{ "DeviceName": "a", "DeviceIP": "10.0.0.2" }"#).unwrap();
        assert_eq!(config, DeviceConfig::new("a", "10.0.0.2"));
    }

    #[test]
    fn receive_port_alias() {
        let config = DeviceConfig::from_json(
            r#"{ "DeviceName": "a", "DeviceIP": "10.0.0.2", "UDPReceivePort": "1077" }"#,
        )
        .unwrap();
        assert_eq!(config.receive_port, 1077);
    }

    #[test]
    fn rejects_bad_port() {
        let err = DeviceConfig::from_json(
            r#"{ "DeviceName": "a", "DeviceIP": "10.0.0.2", "UDPSendPort": "seventy" }"#,
        )
        .unwrap_err();
        assert!(matches!(err, DeviceError::Config(_)));

        assert!(
            DeviceConfig::from_json(
                r#"{ "DeviceName": "a", "DeviceIP": "10.0.0.2", "UDPSendPort": 70000 }"#
            )
            .is_err()
        );
    }

    #[test]
    fn list_shapes() {
        let bare = r#"[
            { "DeviceName": "a", "DeviceIP": "10.0.0.2" },
            { "DeviceName": "b", "DeviceIP": "10.0.0.3" }
        ]"#;
        assert_eq!(DeviceConfig::list_from_json(bare).unwrap().len(), 2);

        let wrapped = r#"{ "getAnelDevices": [{ "DeviceName": "a", "DeviceIP": "10.0.0.2" }] }"#;
        let configs = DeviceConfig::list_from_json(wrapped).unwrap();
        assert_eq!(configs[0].device_ip, "10.0.0.2");
    }

    #[test]
    fn invalid_ip_is_reported() {
        let err = DeviceConfig::new("a", "hut.local").to_endpoint().unwrap_err();
        assert!(matches!(err, DeviceError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("hut.local"));
    }

    #[test]
    fn empty_name_is_reported() {
        let err = DeviceConfig::new(" ", "10.0.0.2").to_endpoint().unwrap_err();
        assert!(matches!(err, DeviceError::InvalidConfiguration(_)));
    }

    #[test]
    fn serializes_adapter_keys() {
        let json = serde_json::to_value(DeviceConfig::new("a", "10.0.0.2")).unwrap();
        assert_eq!(json["DeviceName"], "a");
        assert_eq!(json["UDPRecievePort"], 77);
        assert_eq!(json["UDPSendPort"], 75);
    }
}
