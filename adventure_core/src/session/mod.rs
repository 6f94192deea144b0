//! Session tracking - where each player currently stands in the story.

mod store;

pub use store::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized user identifier.
///
/// Transports hand out identifiers as numbers or strings; both normalize to
/// the same trimmed string so `42`, `"42"` and `" 42 "` name one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&String> for UserId {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl From<&UserId> for UserId {
    fn from(id: &UserId) -> Self {
        id.clone()
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

impl From<u32> for UserId {
    fn from(raw: u32) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one playthrough, from start to ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaythroughId(pub Uuid);

impl PlaythroughId {
    /// Create a new random playthrough ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlaythroughId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaythroughId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
