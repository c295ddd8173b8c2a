// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status telegram decoding.
//!
//! NET-PwrCtrl devices answer a discovery probe with a colon-separated ASCII
//! telegram. The number of fields grows with the firmware version, so
//! decoding is a fixed sequence of [`DecodeStage`]s, each gated on the field
//! count:
//!
//! ```text
//! NET-PwrCtrl:<name>:<ip>:<netmask>:<gateway>:<mac>:<relay1>..<relay8>:<blocked>:<http port>
//!   [:<io1>..<io8>:<temperature>:<firmware>]
//!   [:<variant code>:p:<7 power readings>...:s:<temp>:<humidity>:<brightness>:xor:<end>]
//! ```
//!
//! Decoding is pure and never panics: telegrams that are malformed, come
//! from a foreign device, or carry `NoPass` yield a [`DecodeError`].
//!
//! # Examples
//!
//! ```
//! use pwrctrl_lib::telegram;
//!
//! let raw = "NET-PwrCtrl:Name:1.2.3.4:255.255.255.0:1.2.3.1:0.0.0.0.0.1:\
//!            R1,1:R2,0:R3,0:R4,0:R5,0:R6,0:R7,0:R8,0:0:80";
//! let snapshot = telegram::decode(raw).unwrap();
//!
//! assert_eq!(snapshot.identity().ip, "1.2.3.4");
//! assert_eq!(snapshot.status().temperature, -127.0);
//!
//! assert!(telegram::decode("NET-PwrCtrl:Name:NoPass").is_err());
//! ```

mod fields;
mod stages;

pub use stages::DecodeStage;

use crate::error::DecodeError;
use crate::state::DeviceSnapshot;

use fields::Fields;

/// Field 0 of every telegram.
pub const DEVICE_MARKER: &str = "NET-PwrCtrl";
/// Field 2 of a device that refuses to report without a password.
pub const NO_PASS_MARKER: &str = "NoPass";

/// Decodes a status telegram into a device snapshot.
///
/// The returned snapshot has no capture time; the listener stamps it when
/// publishing.
///
/// # Errors
///
/// - [`DecodeError::Empty`] for blank input
/// - [`DecodeError::InvalidMarker`] if field 0 is not `NET-PwrCtrl`
/// - [`DecodeError::NoPass`] if field 2 is `NoPass`
/// - [`DecodeError::MissingField`] if the telegram is shorter than its
///   layout requires
pub fn decode(raw: &str) -> Result<DeviceSnapshot, DecodeError> {
    if raw.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let fields = Fields::split(raw);

    let marker = fields.get(0)?;
    if marker != DEVICE_MARKER {
        return Err(DecodeError::InvalidMarker(marker.to_string()));
    }
    if fields.is(2, NO_PASS_MARKER) {
        return Err(DecodeError::NoPass);
    }

    let mut snapshot = DeviceSnapshot::default();
    for stage in DecodeStage::ALL {
        if stage.applies(fields.len()) {
            stage.apply(&fields, &mut snapshot)?;
        }
    }
    Ok(snapshot)
}

/// Decodes a raw datagram payload.
///
/// Invalid UTF-8 is replaced rather than rejected, so unit suffixes sent in
/// a legacy code page still decode.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_bytes(payload: &[u8]) -> Result<DeviceSnapshot, DecodeError> {
    decode(&String::from_utf8_lossy(payload))
}
