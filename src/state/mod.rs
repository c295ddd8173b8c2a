// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device snapshot types.
//!
//! A [`DeviceSnapshot`] is the typed result of decoding one status telegram:
//! identity, status, optional power and sensor readings, and the
//! [`Relay`] and [`IoPin`] states the device exposes.

mod device_snapshot;
mod slots;

pub use device_snapshot::{
    DeviceIdentity, DeviceSnapshot, DeviceStatus, PowerTelemetry, SensorReading,
    TEMPERATURE_UNAVAILABLE,
};
pub use slots::{IoPin, Relay};
