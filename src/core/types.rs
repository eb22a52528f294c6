//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`NodeId`] - Stable identifier of a tree node (0 is the virtual tree root)
//! - [`LanguageId`] - Language of a node record (0 is the default language)
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Examples
//!
//! ```
//! use slugsync::core::types::{LanguageId, NodeId};
//!
//! let id = NodeId::new(42);
//! assert_eq!(id.to_string(), "42");
//! assert!(NodeId::TREE_ROOT.is_tree_root());
//!
//! assert!(LanguageId::DEFAULT.is_default());
//! assert!(!LanguageId::new(2).is_default());
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("invalid language id: {0}")]
    InvalidLanguageId(String),
}

/// Identifier of a node in the content tree.
///
/// Ids are unique across languages: a translation is its own record with
/// its own id, pointing back to the default-language node it translates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The virtual root every top-level node hangs off.
    pub const TREE_ROOT: NodeId = NodeId(0);

    /// Create a node id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Check if this is the virtual tree root (id 0).
    pub const fn is_tree_root(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for NodeId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| TypeError::InvalidNodeId(s.to_string()))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Language of a node record.
///
/// `0` is the default language; anything greater marks a translation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LanguageId(u32);

impl LanguageId {
    /// The default language.
    pub const DEFAULT: LanguageId = LanguageId(0);

    /// Create a language id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Check if this is the default language.
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for LanguageId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for LanguageId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| TypeError::InvalidLanguageId(s.to_string()))
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use slugsync::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// println!("Current time: {}", now);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }

    /// Nanoseconds since the Unix epoch, saturating for far-future dates.
    pub fn as_nanos(&self) -> i64 {
        self.0
            .timestamp_nanos_opt()
            .unwrap_or_else(|| self.0.timestamp().saturating_mul(1_000_000_000))
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
