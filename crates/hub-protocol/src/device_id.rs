//! The 4-hex-character identifier that names a sensor device on the hub.

use std::fmt;

/// A canonicalized (upper-case) 4-hex-character device identifier.
///
/// Accepted on input in either case; always rendered and compared in upper
/// case once parsed, so it is safe to use directly as a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId([u8; 4]);

impl DeviceId {
    /// Parses a 4-character hex string, case-insensitively. Returns `None`
    /// for anything else (wrong length, non-hex characters).
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return None;
        }
        let mut upper = [0u8; 4];
        for (i, &b) in bytes.iter().enumerate() {
            if !b.is_ascii_hexdigit() {
                return None;
            }
            upper[i] = b.to_ascii_uppercase();
        }
        Some(DeviceId(upper))
    }

    pub fn as_str(&self) -> &str {
        // Safe: constructed only from ASCII hex digits.
        std::str::from_utf8(&self.0).expect("device id bytes are always ASCII")
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
