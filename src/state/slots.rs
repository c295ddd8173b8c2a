// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay and IO pin states reported by a device.

use serde::Serialize;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// State of one relay as reported in a telegram.
///
/// The energy accumulators (`base_power_watt`, `total_on_duration_secs`) are
/// not part of the wire protocol. The decoder leaves them at zero; callers
/// that want energy accounting set them and carry them across snapshots
/// (see [`DeviceSnapshot::carry_relay_accounting`](super::DeviceSnapshot::carry_relay_accounting)).
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::state::Relay;
///
/// let relay = Relay::new(1, "Lamp", true)
///     .with_base_power_watt(60.0)
///     .with_total_on_duration_secs(7200);
///
/// assert!((relay.total_energy_wh() - 120.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relay {
    /// 1-based relay ordinal.
    pub number: u8,
    /// Name configured on the device.
    pub name: String,
    /// Whether the relay is switched on.
    pub on: bool,
    /// Nominal power draw of the attached load in Watts.
    pub base_power_watt: f64,
    /// Accumulated on-time in seconds.
    pub total_on_duration_secs: u64,
}

impl Relay {
    /// Creates a relay state with zeroed energy accumulators.
    #[must_use]
    pub fn new(number: u8, name: impl Into<String>, on: bool) -> Self {
        Self {
            number,
            name: name.into(),
            on,
            base_power_watt: 0.0,
            total_on_duration_secs: 0,
        }
    }

    /// Sets the nominal power draw of the attached load.
    #[must_use]
    pub fn with_base_power_watt(mut self, watt: f64) -> Self {
        self.base_power_watt = watt;
        self
    }

    /// Sets the accumulated on-time.
    #[must_use]
    pub fn with_total_on_duration_secs(mut self, secs: u64) -> Self {
        self.total_on_duration_secs = secs;
        self
    }

    /// Total energy consumed by the attached load in Wh.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_energy_wh(&self) -> f64 {
        self.base_power_watt * self.total_on_duration_secs as f64 / SECONDS_PER_HOUR
    }
}

/// State of one digital IO pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IoPin {
    /// 1-based pin ordinal.
    pub number: u8,
    /// Name configured on the device.
    pub name: String,
    /// Direction code as reported by the device (0 = output, 1 = input).
    pub direction: u8,
    /// Whether the pin is high/on.
    pub on: bool,
}

impl IoPin {
    /// Creates an IO pin state.
    #[must_use]
    pub fn new(number: u8, name: impl Into<String>, direction: u8, on: bool) -> Self {
        Self {
            number,
            name: name.into(),
            direction,
            on,
        }
    }

    /// Returns `true` if the pin is configured as an input.
    #[must_use]
    pub fn is_input(&self) -> bool {
        self.direction != 0
    }
}
