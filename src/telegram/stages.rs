// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decode stages of a status telegram.
//!
//! Each firmware generation appends fields to the telegram. The decoder runs
//! the stages in [`DecodeStage::ALL`] order; a stage only runs when its
//! field-count gate is open, and each stage writes its own part of the
//! snapshot.
//!
//! | Stage | Gate | Fields |
//! |-------|------|--------|
//! | Identity | always | 0-5 |
//! | Relays | always | 6-13 |
//! | Status | always | 14-18 |
//! | Io | more than 20 fields | 16-25 |
//! | `ExtendedVariant` | more than 26 fields (firmware 6.0) | 26 |
//! | Power | more than 26 fields | 27-34 |
//! | Sensor | more than 26 fields | tail - 6 .. tail - 3 |
//! | `CredentialFlag` | more than 26 fields | tail - 2 |

use std::fmt;

use crate::error::DecodeError;
use crate::state::{DeviceSnapshot, IoPin, PowerTelemetry, Relay, SensorReading};
use crate::types::DeviceVariant;

use super::fields::{Fields, flag, format_mac, integer, number, strip_unit};

/// Marker prefix of the extended type header of pre-6.0 firmware.
const EXTENDED_HEADER_MARKER: &str = "NET-PWRCTRL";
/// Marker of devices expecting XOR-obfuscated credentials.
const XOR_MARKER: &str = "xor";
/// Marker preceding the power meter block.
const POWER_MARKER: &str = "p";
/// Marker preceding the external sensor block.
const SENSOR_MARKER: &str = "s";

const RELAY_FIELD_START: usize = 6;
const RELAY_SLOTS: usize = 8;
const IO_FIELD_START: usize = 16;
const IO_SLOTS: u8 = 8;
const BLOCKED_FIELD: usize = 14;
const HTTP_PORT_FIELD: usize = 15;
const TEMPERATURE_FIELD: usize = 24;
const FIRMWARE_FIELD: usize = 25;
const VARIANT_CODE_FIELD: usize = 26;
const POWER_MARKER_FIELD: usize = 27;
const POWER_FIELD_START: usize = 28;

/// Telegrams longer than this carry the IO block.
const IO_BLOCK_MIN_EXCLUSIVE: usize = 20;
/// Telegrams longer than this come from firmware 6.0 or newer.
const FW6_MIN_EXCLUSIVE: usize = 26;

/// One step of telegram decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Device type, name, IP, netmask, gateway and MAC.
    Identity,
    /// The eight default relay slots.
    Relays,
    /// Blocked code, HTTP port and pre-6.0 variant detection.
    Status,
    /// IO pins, board temperature and firmware version.
    Io,
    /// Firmware 6.0 variant code.
    ExtendedVariant,
    /// Power meter readings.
    Power,
    /// External sensor readings.
    Sensor,
    /// Credential obfuscation flag from the telegram tail.
    CredentialFlag,
}

impl DecodeStage {
    /// All stages in execution order.
    pub const ALL: [Self; 8] = [
        Self::Identity,
        Self::Relays,
        Self::Status,
        Self::Io,
        Self::ExtendedVariant,
        Self::Power,
        Self::Sensor,
        Self::CredentialFlag,
    ];

    /// Returns `true` if a telegram with `field_count` fields carries this
    /// stage's section.
    #[must_use]
    pub fn applies(self, field_count: usize) -> bool {
        match self {
            Self::Identity | Self::Relays | Self::Status => true,
            Self::Io => field_count > IO_BLOCK_MIN_EXCLUSIVE,
            Self::ExtendedVariant | Self::Power | Self::Sensor | Self::CredentialFlag => {
                field_count > FW6_MIN_EXCLUSIVE
            }
        }
    }

    /// Applies this stage to the snapshot under construction.
    pub(crate) fn apply(
        self,
        fields: &Fields<'_>,
        snapshot: &mut DeviceSnapshot,
    ) -> Result<(), DecodeError> {
        match self {
            Self::Identity => identity(fields, snapshot),
            Self::Relays => {
                snapshot.relays = relays(fields, RELAY_SLOTS)?;
                Ok(())
            }
            Self::Status => status(fields, snapshot),
            Self::Io => io(fields, snapshot),
            Self::ExtendedVariant => extended_variant(fields, snapshot),
            Self::Power => power(fields, snapshot),
            Self::Sensor => {
                sensor(fields, snapshot);
                Ok(())
            }
            Self::CredentialFlag => {
                snapshot.status.xor_credentials = fields.from_end(2) == Some(XOR_MARKER);
                Ok(())
            }
        }
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn identity(fields: &Fields<'_>, snapshot: &mut DeviceSnapshot) -> Result<(), DecodeError> {
    let identity = &mut snapshot.identity;
    identity.device_type = fields.get(0)?.to_string();
    identity.name = fields.get(1)?.trim().to_string();
    identity.ip = fields.get(2)?.to_string();
    identity.netmask = fields.get(3)?.to_string();
    identity.gateway = fields.get(4)?.to_string();
    identity.mac = format_mac(fields.get(5)?);
    Ok(())
}

/// Reads `count` relay slots formatted `name,status`.
fn relays(fields: &Fields<'_>, count: usize) -> Result<Vec<Relay>, DecodeError> {
    (0..count)
        .map(|i| {
            let mut parts = fields.get(RELAY_FIELD_START + i)?.split(',');
            let name = parts.next().unwrap_or_default();
            let on = parts.next().is_some_and(flag);
            Ok::<_, DecodeError>(Relay::new(ordinal(i), name, on))
        })
        .collect()
}

fn status(fields: &Fields<'_>, snapshot: &mut DeviceSnapshot) -> Result<(), DecodeError> {
    let status = &mut snapshot.status;
    status.blocked = integer(fields.get(BLOCKED_FIELD)?);
    status.http_port = integer(fields.get(HTTP_PORT_FIELD)?);

    match fields.opt(IO_FIELD_START) {
        Some(header) if header.starts_with(EXTENDED_HEADER_MARKER) => {
            status.variant = fields
                .opt(IO_FIELD_START + 1)
                .map_or(DeviceVariant::Unknown, |raw| {
                    DeviceVariant::Reported(raw.to_string())
                });
            status.xor_credentials = fields.is(IO_FIELD_START + 2, XOR_MARKER);
        }
        _ => status.variant = DeviceVariant::from_blocked_code(status.blocked),
    }
    Ok(())
}

/// Reads the eight IO slots formatted `name,direction,status`, followed by
/// the board temperature and firmware version.
fn io(fields: &Fields<'_>, snapshot: &mut DeviceSnapshot) -> Result<(), DecodeError> {
    snapshot.io_pins = (0..IO_SLOTS)
        .map(|i| {
            let mut parts = fields.get(IO_FIELD_START + usize::from(i))?.split(',');
            let name = parts.next().unwrap_or_default();
            let direction: u8 = parts.next().map(integer).unwrap_or_default();
            let on = parts.next().is_some_and(flag);
            Ok::<_, DecodeError>(IoPin::new(i + 1, name, direction, on))
        })
        .collect::<Result<_, DecodeError>>()?;

    snapshot.status.temperature =
        number(strip_unit(fields.get(TEMPERATURE_FIELD)?));
    snapshot.status.firmware = Some(fields.get(FIRMWARE_FIELD)?.to_string());
    Ok(())
}

fn extended_variant(
    fields: &Fields<'_>,
    snapshot: &mut DeviceSnapshot,
) -> Result<(), DecodeError> {
    let variant = DeviceVariant::from_code(fields.get(VARIANT_CODE_FIELD)?);

    if !variant.supports_io() {
        snapshot.io_pins.clear();
    }
    if variant.relay_slots() != snapshot.relays.len() {
        tracing::debug!(
            variant = %variant,
            slots = variant.relay_slots(),
            "Re-reading relays for reduced relay variant"
        );
        snapshot.relays = relays(fields, variant.relay_slots())?;
    }

    snapshot.status.variant = variant;
    Ok(())
}

fn power(fields: &Fields<'_>, snapshot: &mut DeviceSnapshot) -> Result<(), DecodeError> {
    if !fields.is(POWER_MARKER_FIELD, POWER_MARKER) {
        snapshot.power = None;
        return Ok(());
    }

    let reading = |offset: usize| -> Result<f64, DecodeError> {
        fields
            .get(POWER_FIELD_START + offset)
            .map(number)
    };

    snapshot.power = Some(PowerTelemetry {
        voltage_rms: reading(0)?,
        current_rms: reading(1)?,
        line_frequency: reading(2)?,
        active_power: reading(3)?,
        apparent_power: reading(4)?,
        reactive_power: reading(5)?,
        power_factor: reading(6)?,
    });
    Ok(())
}

fn sensor(fields: &Fields<'_>, snapshot: &mut DeviceSnapshot) {
    if fields.from_end(6) != Some(SENSOR_MARKER) {
        snapshot.sensor = None;
        return;
    }

    let reading = |offset: usize| fields.from_end(offset).map_or(f64::NAN, number);
    snapshot.sensor = Some(SensorReading {
        temperature: reading(5),
        humidity: reading(4),
        brightness: reading(3),
    });
}

#[allow(clippy::cast_possible_truncation)]
fn ordinal(index: usize) -> u8 {
    // Slot counts are at most 8.
    (index + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_by_field_count() {
        assert!(DecodeStage::Identity.applies(16));
        assert!(!DecodeStage::Io.applies(20));
        assert!(DecodeStage::Io.applies(21));
        assert!(!DecodeStage::ExtendedVariant.applies(26));
        assert!(DecodeStage::ExtendedVariant.applies(27));
        assert!(DecodeStage::CredentialFlag.applies(40));
    }

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(DecodeStage::ALL[0], DecodeStage::Identity);
        assert_eq!(DecodeStage::ALL[7], DecodeStage::CredentialFlag);
        assert_eq!(DecodeStage::Power.to_string(), "Power");
    }

    #[test]
    fn relay_slot_parsing() {
        let fields = Fields::split("x:x:x:x:x:x:Lamp,1:Fan,0:Broken");
        let relays = relays(&fields, 3).unwrap();
        assert_eq!(relays[0], Relay::new(1, "Lamp", true));
        assert_eq!(relays[1], Relay::new(2, "Fan", false));
        assert_eq!(relays[2], Relay::new(3, "Broken", false));
    }

    #[test]
    fn relays_stage_reads_eight_slots() {
        let fields = Fields::split(
            "NET-PwrCtrl:Hut:1.2.3.4:255.255.255.0:1.2.3.1:0.0.0.0.0.1:\
             R1,1:R2,0:R3,0:R4,0:R5,0:R6,0:R7,0:R8,1:0:80",
        );
        let mut snapshot = DeviceSnapshot::default();

        DecodeStage::Relays.apply(&fields, &mut snapshot).unwrap();

        assert_eq!(snapshot.relays.len(), 8);
        assert_eq!(snapshot.relays[7], Relay::new(8, "R8", true));
    }

    #[test]
    fn relay_slots_guarded() {
        let fields = Fields::split("x:x:x:x:x:x:Lamp,1");
        assert_eq!(
            relays(&fields, 2),
            Err(DecodeError::MissingField { index: 7, len: 7 })
        );
    }
}
