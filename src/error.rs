// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `PwrCtrl` library.
//!
//! Every error is scoped to the device or operation that produced it:
//! value validation of switch requests, telegram decoding, UDP transport,
//! and device configuration.

use std::net::SocketAddr;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while decoding a status telegram.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error occurred during UDP communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Device was not found in the manager.
    #[error("device not found")]
    DeviceNotFound,
}

/// Errors related to value validation of switch requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A requested switch state is neither 0 (off) nor 1 (on).
    #[error("invalid switch state {0}, expected 0 or 1")]
    InvalidSwitchState(i64),

    /// Relay and IO ordinals start at 1.
    #[error("invalid slot ordinal {0}, ordinals start at 1")]
    InvalidOrdinal(u8),

    /// An unknown slot kind was provided.
    #[error("invalid slot kind: {0}")]
    InvalidSlotKind(String),

    /// A state path is not of the form `<device>.<relais|io>.<n>.Status`.
    #[error("invalid state path: {0}")]
    InvalidStatePath(String),
}

/// Reasons a status telegram could not be decoded.
///
/// A decode error never tears down the listener: the datagram is dropped
/// and nothing is published.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The datagram carried no text.
    #[error("empty telegram")]
    Empty,

    /// Field 0 is not the `NET-PwrCtrl` device marker.
    #[error("invalid device marker: {0:?}")]
    InvalidMarker(String),

    /// The device answered with `NoPass` instead of its IP address.
    #[error("device reported NoPass")]
    NoPass,

    /// A field required by the telegram layout is missing.
    #[error("missing field {index} (telegram has {len} fields)")]
    MissingField {
        /// Zero-based index of the missing field.
        index: usize,
        /// Number of fields actually present.
        len: usize,
    },
}

/// Errors related to UDP communication with a device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The listening endpoint could not be bound.
    #[error("failed to bind UDP endpoint on {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A command datagram could not be transmitted.
    #[error("failed to send command to {addr}: {source}")]
    Send {
        /// Destination of the command.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Generic socket I/O error.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to device configuration and operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Device configuration is invalid.
    #[error("invalid device configuration: {0}")]
    InvalidConfiguration(String),

    /// Device configuration could not be parsed.
    #[error("failed to parse device configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A device with the same display name is already managed.
    #[error("duplicate device name: {0}")]
    DuplicateName(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
