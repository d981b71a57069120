//! Stable ID newtype for snippets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique snippet identifier.
///
/// Assigned by the store on creation and never reused while the snippet
/// lives. The inner `i64` aligns with SQLite's `INTEGER PRIMARY KEY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnippetId(pub i64);

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SnippetId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SnippetId)
    }
}
