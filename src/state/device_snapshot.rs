// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device snapshot produced by one successful telegram decode.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::DeviceVariant;

use super::{IoPin, Relay};

/// Temperature value reported when the device has no temperature reading.
pub const TEMPERATURE_UNAVAILABLE: f64 = -127.0;

/// Network identity of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    /// Device type marker (always `NET-PwrCtrl` for decoded telegrams).
    pub device_type: String,
    /// Configured device name, trimmed.
    pub name: String,
    /// IP address as reported by the device.
    pub ip: String,
    /// Netmask as reported by the device.
    pub netmask: String,
    /// Gateway as reported by the device.
    pub gateway: String,
    /// MAC address as colon-separated uppercase hex (`00:04:A3:0B:11:22`).
    pub mac: String,
}

/// Status block of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    /// Blocked code (bitmask of locked relays).
    pub blocked: u32,
    /// Port of the device web interface.
    pub http_port: u16,
    /// Board temperature in °C, or [`TEMPERATURE_UNAVAILABLE`].
    pub temperature: f64,
    /// Firmware version string, reported from firmware 4 onwards.
    pub firmware: Option<String>,
    /// Hardware/firmware class.
    pub variant: DeviceVariant,
    /// Whether the device expects XOR-obfuscated credentials.
    pub xor_credentials: bool,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self {
            blocked: 0,
            http_port: 0,
            temperature: TEMPERATURE_UNAVAILABLE,
            firmware: None,
            variant: DeviceVariant::default(),
            xor_credentials: false,
        }
    }
}

/// Power meter readings of devices with power measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PowerTelemetry {
    /// RMS voltage in Volts.
    pub voltage_rms: f64,
    /// RMS current in Amperes.
    pub current_rms: f64,
    /// Line frequency in Hertz.
    pub line_frequency: f64,
    /// Active power in Watts.
    pub active_power: f64,
    /// Apparent power in VA.
    pub apparent_power: f64,
    /// Reactive power in `VAr`.
    pub reactive_power: f64,
    /// Power factor.
    pub power_factor: f64,
}

/// Readings of the external sensor port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorReading {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Brightness in lux.
    pub brightness: f64,
}

/// Immutable snapshot of a device, decoded from one status telegram.
///
/// A snapshot is built fresh on every successful decode and superseded by
/// the next one; snapshots are never merged. Relays and IO pins are empty
/// for variants that do not expose them.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::telegram;
///
/// let raw = "NET-PwrCtrl:Office:192.168.0.20:255.255.255.0:192.168.0.1:\
///            0.4.163.11.17.34:Lamp,1:Fan,0:R3,0:R4,0:R5,0:R6,0:R7,0:R8,0:0:80";
/// let snapshot = telegram::decode(raw).unwrap();
///
/// assert_eq!(snapshot.identity().mac, "00:04:A3:0B:11:22");
/// assert!(snapshot.relay(1).unwrap().on);
/// assert!(snapshot.io_pins().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub(crate) identity: DeviceIdentity,
    pub(crate) status: DeviceStatus,
    pub(crate) power: Option<PowerTelemetry>,
    pub(crate) sensor: Option<SensorReading>,
    pub(crate) relays: Vec<Relay>,
    pub(crate) io_pins: Vec<IoPin>,
    pub(crate) captured_at: Option<DateTime<Utc>>,
}

impl DeviceSnapshot {
    /// Returns the network identity.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns the status block.
    #[must_use]
    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }

    /// Returns the device variant.
    #[must_use]
    pub fn variant(&self) -> &DeviceVariant {
        &self.status.variant
    }

    /// Returns the board temperature, if the device reported one.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn temperature(&self) -> Option<f64> {
        (self.status.temperature != TEMPERATURE_UNAVAILABLE).then_some(self.status.temperature)
    }

    /// Returns the power meter readings, if the device measures power.
    #[must_use]
    pub fn power(&self) -> Option<&PowerTelemetry> {
        self.power.as_ref()
    }

    /// Returns `true` if the telegram carried power measurements.
    #[must_use]
    pub fn has_power_measurement(&self) -> bool {
        self.power.is_some()
    }

    /// Returns the external sensor readings, if a sensor is ready.
    #[must_use]
    pub fn sensor(&self) -> Option<&SensorReading> {
        self.sensor.as_ref()
    }

    /// Returns `true` if the external sensor reported readings.
    #[must_use]
    pub fn is_sensor_ready(&self) -> bool {
        self.sensor.is_some()
    }

    /// Returns all relay states.
    #[must_use]
    pub fn relays(&self) -> &[Relay] {
        &self.relays
    }

    /// Returns the relay with the given 1-based ordinal.
    #[must_use]
    pub fn relay(&self, number: u8) -> Option<&Relay> {
        self.relays.iter().find(|r| r.number == number)
    }

    /// Returns all IO pin states.
    #[must_use]
    pub fn io_pins(&self) -> &[IoPin] {
        &self.io_pins
    }

    /// Returns the IO pin with the given 1-based ordinal.
    #[must_use]
    pub fn io_pin(&self, number: u8) -> Option<&IoPin> {
        self.io_pins.iter().find(|p| p.number == number)
    }

    /// Returns when the snapshot was published by the listener.
    ///
    /// `None` for snapshots obtained directly from [`crate::telegram::decode`].
    #[must_use]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    /// Returns `true` if no identity was decoded.
    ///
    /// Such a snapshot never describes a device and must not be treated as
    /// an update.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identity.device_type.is_empty() || self.identity.ip.is_empty()
    }

    /// Returns a copy stamped with the given capture time.
    #[must_use]
    pub fn captured(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    /// Copies the relay energy accumulators from a previous snapshot.
    ///
    /// Relays are matched by ordinal; relays absent from `previous` keep
    /// zeroed accumulators.
    pub fn carry_relay_accounting(&mut self, previous: &DeviceSnapshot) {
        for relay in &mut self.relays {
            if let Some(prev) = previous.relay(relay.number) {
                relay.base_power_watt = prev.base_power_watt;
                relay.total_on_duration_secs = prev.total_on_duration_secs;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_relays(relays: Vec<Relay>) -> DeviceSnapshot {
        DeviceSnapshot {
            relays,
            ..DeviceSnapshot::default()
        }
    }

    #[test]
    fn default_snapshot_is_empty() {
        let snapshot = DeviceSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.temperature(), None);
        assert!(!snapshot.has_power_measurement());
        assert!(!snapshot.is_sensor_ready());
        assert!(snapshot.captured_at().is_none());
    }

    #[test]
    fn temperature_sentinel() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot.status.temperature = 23.5;
        assert_eq!(snapshot.temperature(), Some(23.5));
    }

    #[test]
    fn relay_lookup_by_ordinal() {
        let snapshot = snapshot_with_relays(vec![
            Relay::new(1, "A", true),
            Relay::new(2, "B", false),
        ]);
        assert_eq!(snapshot.relay(2).unwrap().name, "B");
        assert!(snapshot.relay(3).is_none());
    }

    #[test]
    fn carry_relay_accounting_matches_ordinals() {
        let previous = snapshot_with_relays(vec![
            Relay::new(1, "A", true)
                .with_base_power_watt(100.0)
                .with_total_on_duration_secs(3600),
        ]);
        let mut next = snapshot_with_relays(vec![Relay::new(1, "A", false), Relay::new(2, "B", true)]);

        next.carry_relay_accounting(&previous);

        assert!((next.relay(1).unwrap().total_energy_wh() - 100.0).abs() < 1e-9);
        assert_eq!(next.relay(2).unwrap().total_on_duration_secs, 0);
        assert!(!next.relay(1).unwrap().on);
    }

    #[test]
    fn captured_sets_timestamp() {
        let now = Utc::now();
        let snapshot = DeviceSnapshot::default().captured(now);
        assert_eq!(snapshot.captured_at(), Some(now));
    }

    #[test]
    fn serializes_to_json() {
        let snapshot = snapshot_with_relays(vec![Relay::new(1, "A", true)]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["relays"][0]["name"], "A");
        assert_eq!(json["status"]["variant"], "unknown");
    }
}
