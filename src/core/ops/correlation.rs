//! core::ops::correlation
//!
//! Correlation groups tying the writes of one run together.
//!
//! # Format
//!
//! A [`CorrelationId`] renders as `<subject>/<aspect>`, where the subject is
//! 16 lowercase hex characters and the aspect is `slug` or `redirect`:
//!
//! ```text
//! 3f9a0c1d2e4b5a67/slug
//! 3f9a0c1d2e4b5a67/redirect
//! ```
//!
//! Both ids of a [`CorrelationGroup`] share the subject. Revert looks writes
//! up by subject and uses the aspect to decide what to undo.
//!
//! # Invariants
//!
//! - One group per top-level run, shared by every write in that run
//! - The subject is a pure function of the seed

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::types::{NodeId, UtcTimestamp};

/// Length of a subject in hex characters.
pub const SUBJECT_LEN: usize = 16;

/// Errors from parsing correlation ids.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("invalid correlation subject '{0}': expected {SUBJECT_LEN} lowercase hex characters")]
    InvalidSubject(String),

    #[error("invalid correlation aspect '{0}': expected 'slug' or 'redirect'")]
    InvalidAspect(String),

    #[error("invalid correlation id '{0}': expected '<subject>/<aspect>'")]
    Malformed(String),
}

/// Which kind of write an id tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aspect {
    Slug,
    Redirect,
}

impl Aspect {
    /// The tag as written in ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Aspect::Slug => "slug",
            Aspect::Redirect => "redirect",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = CorrelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slug" => Ok(Aspect::Slug),
            "redirect" => Ok(Aspect::Redirect),
            other => Err(CorrelationError::InvalidAspect(other.to_string())),
        }
    }
}

/// Validate a bare subject string.
pub fn validate_subject(subject: &str) -> Result<(), CorrelationError> {
    let well_formed = subject.len() == SUBJECT_LEN
        && subject
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if well_formed {
        Ok(())
    } else {
        Err(CorrelationError::InvalidSubject(subject.to_string()))
    }
}

/// A subject plus an aspect tag.
///
/// Serializes as its string form.
///
/// # Example
///
/// ```
/// use slugsync::core::ops::correlation::{Aspect, CorrelationId};
///
/// let id: CorrelationId = "00112233aabbccdd/redirect".parse().unwrap();
/// assert_eq!(id.subject(), "00112233aabbccdd");
/// assert_eq!(id.aspect(), Aspect::Redirect);
/// assert_eq!(id.to_string(), "00112233aabbccdd/redirect");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId {
    subject: String,
    aspect: Aspect,
}

impl CorrelationId {
    /// Create an id from a validated subject.
    pub fn new(subject: &str, aspect: Aspect) -> Result<Self, CorrelationError> {
        validate_subject(subject)?;
        Ok(Self {
            subject: subject.to_string(),
            aspect,
        })
    }

    /// The shared subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The aspect tag.
    pub fn aspect(&self) -> Aspect {
        self.aspect
    }

    /// Check whether this id belongs to the given subject.
    pub fn has_subject(&self, subject: &str) -> bool {
        self.subject == subject
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject, self.aspect)
    }
}

impl FromStr for CorrelationId {
    type Err = CorrelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subject, aspect) = s
            .split_once('/')
            .ok_or_else(|| CorrelationError::Malformed(s.to_string()))?;
        Self::new(subject, aspect.parse()?)
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = CorrelationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.to_string()
    }
}

/// The pair of ids stamped onto every write of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationGroup {
    pub slug: CorrelationId,
    pub redirect: CorrelationId,
}

impl CorrelationGroup {
    /// Derive a group from a triggering node and a moment in time.
    ///
    /// The subject is the first 8 bytes of
    /// `SHA-256("<node id>:<unix nanos>")`, hex encoded.
    pub fn create(node: NodeId, at: &UtcTimestamp) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}", node, at.as_nanos()).as_bytes());
        let digest = hasher.finalize();
        let subject = hex::encode(&digest[..SUBJECT_LEN / 2]);
        Self::from_subject_unchecked(subject)
    }

    /// Rebuild the group for a known subject.
    pub fn from_subject(subject: &str) -> Result<Self, CorrelationError> {
        validate_subject(subject)?;
        Ok(Self::from_subject_unchecked(subject.to_string()))
    }

    fn from_subject_unchecked(subject: String) -> Self {
        Self {
            slug: CorrelationId {
                subject: subject.clone(),
                aspect: Aspect::Slug,
            },
            redirect: CorrelationId {
                subject,
                aspect: Aspect::Redirect,
            },
        }
    }

    /// The shared subject.
    pub fn subject(&self) -> &str {
        self.slug.subject()
    }
}
