// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device credentials and the legacy credential obfuscation.
//!
//! NET-PwrCtrl devices authenticate switch commands with the web interface
//! username and password appended to the command token. Devices configured
//! for it expect the credentials XOR-ed with the password and base64
//! encoded. This is obfuscation, not cryptography: anyone who sees one
//! datagram can recover the password.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Obfuscates `secret` with the device's legacy XOR scheme.
///
/// Byte `i` of `secret` is XOR-ed with byte `i mod len(key)` of `key`, and
/// the result is base64 encoded with the standard alphabet and `=` padding.
/// An empty key leaves the bytes unchanged.
///
/// # Examples
///
/// ```
/// use pwrctrl_lib::command::legacy_obfuscate;
///
/// let token = legacy_obfuscate("adminanel", "anel");
/// assert_eq!(token, "AAoIBQ8PCwkN");
/// assert_eq!(token, legacy_obfuscate("adminanel", "anel"));
/// ```
#[must_use]
pub fn legacy_obfuscate(secret: &str, key: &str) -> String {
    let key = key.as_bytes();
    let xored: Vec<u8> = secret
        .bytes()
        .enumerate()
        .map(|(i, b)| if key.is_empty() { b } else { b ^ key[i % key.len()] })
        .collect();
    STANDARD.encode(xored)
}

/// Username and password of a device, plus how the device expects them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    xor: bool,
}

impl Credentials {
    /// Factory default username.
    pub const DEFAULT_USERNAME: &'static str = "admin";
    /// Factory default password.
    pub const DEFAULT_PASSWORD: &'static str = "anel";

    /// Creates plaintext credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            xor: false,
        }
    }

    /// Selects whether the credentials are sent obfuscated.
    #[must_use]
    pub fn with_xor(mut self, xor: bool) -> Self {
        self.xor = xor;
        self
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns `true` if the credentials are sent obfuscated.
    #[must_use]
    pub fn is_xor(&self) -> bool {
        self.xor
    }

    /// Encodes the credentials as they appear after the command token.
    ///
    /// Plain mode sends `username + password`; XOR mode sends
    /// [`legacy_obfuscate`]`(username + password, password)`.
    #[must_use]
    pub fn encode(&self) -> String {
        let joined = format!("{}{}", self.username, self.password);
        if self.xor {
            legacy_obfuscate(&joined, &self.password)
        } else {
            joined
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(Self::DEFAULT_USERNAME, Self::DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("xor", &self.xor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscation_is_deterministic() {
        let a = legacy_obfuscate("adminanel", "anel");
        let b = legacy_obfuscate("adminanel", "anel");
        assert_eq!(a, b);
        assert_eq!(a, "AAoIBQ8PCwkN");
    }

    #[test]
    fn obfuscation_padding_follows_length() {
        for (secret, pad) in [("abc", 0), ("abcd", 2), ("abcde", 1), ("abcdef", 0)] {
            let token = legacy_obfuscate(secret, "key");
            assert_eq!(token.len() % 4, 0, "secret {secret}");
            let trailing = token.chars().rev().take_while(|c| *c == '=').count();
            assert_eq!(trailing, pad, "secret {secret}");
        }
    }

    #[test]
    fn obfuscation_xors_with_cycled_key() {
        // 'a' ^ 'a' = 0, 'b' ^ 'b' = 0, 'c' ^ 'a' = 2
        assert_eq!(legacy_obfuscate("abc", "ab"), STANDARD.encode([0u8, 0, 2]));
    }

    #[test]
    fn empty_key_leaves_bytes() {
        assert_eq!(legacy_obfuscate("abc", ""), "YWJj");
    }

    #[test]
    fn plain_credentials() {
        let creds = Credentials::default();
        assert_eq!(creds.encode(), "adminanel");
        assert!(!creds.is_xor());
    }

    #[test]
    fn xor_credentials() {
        let creds = Credentials::new("admin", "anel").with_xor(true);
        assert_eq!(creds.encode(), legacy_obfuscate("adminanel", "anel"));
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials::new("user", "secret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("secret"));
    }
}
