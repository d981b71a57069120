//! Content fingerprints of the code/tests pair a test run executed against.
//!
//! A [`Fingerprint`] is a blake3 hash over the length-prefixed code and test
//! code. Recording it with every run result lets a reader tell whether the
//! result still describes the snippet's current artifacts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Blake3 hash of a `(code, test_code)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// Fingerprints the given artifacts.
    ///
    /// Each field is prefixed with its byte length so that moving text
    /// between code and tests always changes the hash.
    pub fn of(code: &str, test_code: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(code.len() as u64).to_le_bytes());
        hasher.update(code.as_bytes());
        hasher.update(&(test_code.len() as u64).to_le_bytes());
        hasher.update(test_code.as_bytes());
        Fingerprint(hasher.finalize())
    }

    /// Lowercase hex encoding (64 characters).
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        blake3::Hash::from_hex(s.trim())
            .map(Fingerprint)
            .map_err(|_| CoreError::InvalidFingerprint {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.to_hex()
    }
}
