// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Guarded field access and lenient value parsing for telegrams.

use std::str::FromStr;

use crate::error::DecodeError;

/// Colon-separated fields of one telegram.
///
/// All access is bounds-checked; a missing required field surfaces as
/// [`DecodeError::MissingField`] instead of a panic.
#[derive(Debug)]
pub(crate) struct Fields<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub(crate) fn split(raw: &'a str) -> Self {
        Self {
            parts: raw.split(':').collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns a required field.
    pub(crate) fn get(&self, index: usize) -> Result<&'a str, DecodeError> {
        self.parts
            .get(index)
            .copied()
            .ok_or(DecodeError::MissingField {
                index,
                len: self.parts.len(),
            })
    }

    /// Returns an optional field.
    pub(crate) fn opt(&self, index: usize) -> Option<&'a str> {
        self.parts.get(index).copied()
    }

    /// Returns the field `offset` positions before the end (`1` is the last).
    pub(crate) fn from_end(&self, offset: usize) -> Option<&'a str> {
        self.parts
            .len()
            .checked_sub(offset)
            .and_then(|i| self.opt(i))
    }

    /// Returns `true` if the optional field equals `marker`.
    pub(crate) fn is(&self, index: usize, marker: &str) -> bool {
        self.opt(index) == Some(marker)
    }
}

/// Parses a decimal field. Blank is zero, anything unparsable is NaN.
pub(crate) fn number(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Parses an integer field, falling back to zero.
pub(crate) fn integer<T: FromStr + Default>(value: &str) -> T {
    value.trim().parse().unwrap_or_default()
}

/// Interprets a status digit: any non-zero number is on.
#[allow(clippy::float_cmp)]
pub(crate) fn flag(value: &str) -> bool {
    let n = number(value);
    n != 0.0 && !n.is_nan()
}

/// Drops the two-character unit suffix of a temperature field (`23.5°C`).
pub(crate) fn strip_unit(value: &str) -> &str {
    match value.char_indices().rev().nth(1) {
        Some((idx, _)) => &value[..idx],
        None => "",
    }
}

/// Converts six dot-separated decimal octets to colon-separated hex.
///
/// Values that do not consist of at least six decimal octets are returned
/// unchanged.
pub(crate) fn format_mac(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() < 6 {
        return raw.to_string();
    }

    let octets: Option<Vec<u8>> = parts.iter().map(|p| p.trim().parse().ok()).collect();
    match octets {
        Some(octets) => octets
            .iter()
            .map(|o| format!("{o:02X}"))
            .collect::<Vec<_>>()
            .join(":"),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guarded_access() {
        let fields = Fields::split("a:b:c");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get(1), Ok("b"));
        assert_eq!(
            fields.get(3),
            Err(DecodeError::MissingField { index: 3, len: 3 })
        );
        assert_eq!(fields.opt(5), None);
        assert_eq!(fields.from_end(1), Some("c"));
        assert_eq!(fields.from_end(4), None);
        assert!(fields.is(0, "a"));
    }

    #[test]
    fn number_parsing() {
        assert!((number("230.5") - 230.5).abs() < f64::EPSILON);
        assert!(number(" ").abs() < f64::EPSILON);
        assert!(number("abc").is_nan());
        assert_eq!(integer::<u16>("80"), 80);
        assert_eq!(integer::<u16>("x"), 0);
    }

    #[test]
    fn status_flags() {
        assert!(flag("1"));
        assert!(!flag("0"));
        assert!(!flag(""));
        assert!(!flag("on"));
    }

    #[test]
    fn strip_unit_suffix() {
        assert_eq!(strip_unit("23.5°C"), "23.5");
        assert_eq!(strip_unit("21.0 C"), "21.0");
        assert_eq!(strip_unit("C"), "");
        assert_eq!(strip_unit(""), "");
    }

    #[test]
    fn mac_conversion() {
        assert_eq!(format_mac("0.1.2.255.10.1"), "00:01:02:FF:0A:01");
        assert_eq!(format_mac("0.0.0.0.0.1"), "00:00:00:00:00:01");
    }

    #[test]
    fn mac_passthrough() {
        assert_eq!(format_mac("00:04:A3:0B:11:22"), "00:04:A3:0B:11:22");
        assert_eq!(format_mac("1.2.3"), "1.2.3");
        assert_eq!(format_mac("1.2.3.4.5.999"), "1.2.3.4.5.999");
    }
}
