//! The share identifier.
//!
//! A `ShareId` is the external handle of a share and the key under which its
//! metadata record and payload directory are stored. It is 128 bits of
//! OS-seeded randomness rendered as 32 lowercase hex characters. Parsing is
//! strict so that an id can always be used as a path component.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Number of random bytes in a share id.
const SHARE_ID_BYTES: usize = 16;

/// Length of the hex-encoded share id.
pub const SHARE_ID_LEN: usize = SHARE_ID_BYTES * 2;

/// Unique, unguessable identifier for a share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShareId(String);

impl ShareId {
    /// Generate a new random share id.
    pub fn generate() -> Self {
        let bytes: [u8; SHARE_ID_BYTES] = rand::random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Parse a share id, rejecting anything that is not 32 lowercase hex chars.
    ///
    /// Malformed ids are reported as `NotFound` so that callers cannot tell
    /// a syntactically wrong id from an unknown one.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        if is_valid_share_id(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::not_found("Share not found"))
        }
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

fn is_valid_share_id(value: &str) -> bool {
    value.len() == SHARE_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShareId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ShareId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ShareId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|_| serde::de::Error::custom("invalid share id"))
    }
}
