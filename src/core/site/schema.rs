//! core::site::schema
//!
//! Site document schema (v1).
//!
//! # Schema Design
//!
//! A site document is:
//! - Self-describing with `kind` and `schema_version`
//! - Strictly parsed (unknown fields rejected)
//! - Validated after parsing (unique ids, resolvable parents, absolute slugs)
//!
//! It holds the content tree, the redirect table, the slug history used for
//! grouped revert, and per-actor edit grants.
//!
//! # Example
//!
//! ```
//! use slugsync::core::site::{parse_site, Node, SiteDocument, SITE_KIND};
//!
//! let mut doc = SiteDocument::new();
//! doc.nodes.push(Node::new(1, 0, "Home").with_slug("/"));
//! doc.nodes.push(Node::new(2, 1, "About Us").with_slug("/about-us"));
//!
//! let json = doc.to_json_pretty().unwrap();
//! let parsed = parse_site(&json).unwrap();
//! assert_eq!(parsed.kind, SITE_KIND);
//! assert_eq!(parsed.nodes.len(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ops::correlation::CorrelationId;
use crate::core::types::{LanguageId, NodeId, UtcTimestamp};

/// The kind identifier for site documents.
pub const SITE_KIND: &str = "slugsync.site";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Type tag given to nodes that do not declare one.
pub const DEFAULT_TYPE: &str = "page";

/// Errors from site document parsing and validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse site document: {0}")]
    ParseError(String),

    #[error("invalid kind '{found}', expected '{}'", SITE_KIND)]
    InvalidKind { found: String },

    #[error("unsupported schema version {0}, supported: {SCHEMA_VERSION}")]
    UnsupportedVersion(u32),

    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("node id 0 is reserved for the tree root")]
    ReservedNodeId,

    #[error("node {node} has unknown parent {parent}")]
    UnknownParent { node: NodeId, parent: NodeId },

    #[error("node {node} has invalid slug '{slug}': slugs must start with '/'")]
    InvalidSlug { node: NodeId, slug: String },

    #[error("node {0} is its own ancestor")]
    ParentCycle(NodeId),

    #[error("node {node}: {message}")]
    InvalidTranslation { node: NodeId, message: String },

    #[error("duplicate redirect id {0}")]
    DuplicateRedirect(u64),
}

/// A node of the content tree.
///
/// Translations are separate records: `language_id > 0` and
/// `translation_parent_id` pointing at the default-language node. They share
/// the `parent_id` of the node they translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub id: NodeId,

    #[serde(default)]
    pub parent_id: NodeId,

    /// Canonical path; empty only for the tree root or a never-slugged node.
    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_title: Option<String>,

    #[serde(default = "default_type_tag")]
    pub type_tag: String,

    #[serde(default = "default_true")]
    pub sync_enabled: bool,

    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub language_id: LanguageId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_parent_id: Option<NodeId>,

    #[serde(default)]
    pub hidden: bool,
}

fn default_type_tag() -> String {
    DEFAULT_TYPE.to_string()
}

fn default_true() -> bool {
    true
}

impl Node {
    /// Create a default-language page with no slug yet.
    pub fn new(id: u32, parent_id: u32, title: &str) -> Self {
        Self {
            id: NodeId::new(id),
            parent_id: NodeId::new(parent_id),
            slug: String::new(),
            title: title.to_string(),
            nav_title: None,
            type_tag: default_type_tag(),
            sync_enabled: true,
            locked: false,
            language_id: LanguageId::DEFAULT,
            translation_parent_id: None,
            hidden: false,
        }
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.to_string();
        self
    }

    pub fn with_nav_title(mut self, nav_title: &str) -> Self {
        self.nav_title = Some(nav_title.to_string());
        self
    }

    pub fn with_type_tag(mut self, type_tag: &str) -> Self {
        self.type_tag = type_tag.to_string();
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_sync(mut self, sync_enabled: bool) -> Self {
        self.sync_enabled = sync_enabled;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Turn this record into a translation of `default_node`.
    pub fn with_translation_of(mut self, default_node: NodeId, language: LanguageId) -> Self {
        self.translation_parent_id = Some(default_node);
        self.language_id = language;
        self
    }

    /// Whether this record is a translation.
    pub fn is_translation(&self) -> bool {
        !self.language_id.is_default()
    }

    /// The default-language node this record stands for.
    pub fn identity(&self) -> NodeId {
        self.translation_parent_id.unwrap_or(self.id)
    }

    /// Look up a free-text source field by name.
    ///
    /// Known fields are `title` and `nav_title`.
    pub fn source_field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(self.title.as_str()),
            "nav_title" => self.nav_title.as_deref(),
            _ => None,
        }
    }

    /// Validate the record in isolation.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.id.is_tree_root() {
            return Err(SchemaError::ReservedNodeId);
        }
        if !self.slug.is_empty() && !self.slug.starts_with('/') {
            return Err(SchemaError::InvalidSlug {
                node: self.id,
                slug: self.slug.clone(),
            });
        }
        match (self.is_translation(), self.translation_parent_id) {
            (true, None) => Err(SchemaError::InvalidTranslation {
                node: self.id,
                message: "translation without translation_parent_id".to_string(),
            }),
            (false, Some(_)) => Err(SchemaError::InvalidTranslation {
                node: self.id,
                message: "default-language node with translation_parent_id".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// A stored redirect from a legacy path to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Redirect {
    pub id: u64,
    pub source_host: String,
    pub source_path: String,
    pub target: NodeId,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationId>,
    pub created_at: UtcTimestamp,
}

/// A redirect about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedirect {
    pub source_host: String,
    pub source_path: String,
    pub target: NodeId,
    pub correlation: Option<CorrelationId>,
}

/// One recorded slug write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlugChange {
    pub node: NodeId,
    pub old_slug: String,
    pub new_slug: String,
    pub correlation: CorrelationId,
    pub recorded_at: UtcTimestamp,
}

/// Persistent form of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteDocument {
    pub kind: String,
    pub schema_version: u32,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub redirects: Vec<Redirect>,
    #[serde(default)]
    pub history: Vec<SlugChange>,
    /// Actor name to the node ids that actor may edit.
    #[serde(default)]
    pub grants: BTreeMap<String, Vec<NodeId>>,
}

impl Default for SiteDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteDocument {
    /// Create an empty site.
    pub fn new() -> Self {
        Self {
            kind: SITE_KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            nodes: Vec::new(),
            redirects: Vec::new(),
            history: Vec::new(),
            grants: BTreeMap::new(),
        }
    }

    /// Validate the whole document.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.kind != SITE_KIND {
            return Err(SchemaError::InvalidKind {
                found: self.kind.clone(),
            });
        }
        if self.schema_version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion(self.schema_version));
        }

        let mut by_id = BTreeMap::new();
        for node in &self.nodes {
            node.validate()?;
            if by_id.insert(node.id, node).is_some() {
                return Err(SchemaError::DuplicateNode(node.id));
            }
        }

        for node in &self.nodes {
            if !node.parent_id.is_tree_root() && !by_id.contains_key(&node.parent_id) {
                return Err(SchemaError::UnknownParent {
                    node: node.id,
                    parent: node.parent_id,
                });
            }
            if let Some(original) = node.translation_parent_id {
                match by_id.get(&original) {
                    Some(target) if !target.is_translation() => {}
                    Some(_) => {
                        return Err(SchemaError::InvalidTranslation {
                            node: node.id,
                            message: format!("translates {original}, which is itself a translation"),
                        })
                    }
                    None => {
                        return Err(SchemaError::InvalidTranslation {
                            node: node.id,
                            message: format!("translates unknown node {original}"),
                        })
                    }
                }
            }
        }

        for node in &self.nodes {
            let mut ancestor = node.parent_id;
            let mut seen = BTreeSet::from([node.id]);
            while let Some(parent) = by_id.get(&ancestor) {
                if !seen.insert(parent.id) {
                    return Err(SchemaError::ParentCycle(node.id));
                }
                ancestor = parent.parent_id;
            }
        }

        let mut redirect_ids = BTreeSet::new();
        for redirect in &self.redirects {
            if !redirect_ids.insert(redirect.id) {
                return Err(SchemaError::DuplicateRedirect(redirect.id));
            }
        }

        Ok(())
    }

    /// Serialize as pretty JSON for writing to disk.
    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::ParseError(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SiteEnvelope {
    kind: String,
    schema_version: u32,
}

/// Parse a site document with version dispatch and validation.
///
/// # Errors
///
/// - Malformed JSON or unknown fields
/// - `kind` other than [`SITE_KIND`]
/// - Unsupported `schema_version`
/// - Any structural problem reported by [`SiteDocument::validate`]
pub fn parse_site(json: &str) -> Result<SiteDocument, SchemaError> {
    let envelope: SiteEnvelope =
        serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;

    if envelope.kind != SITE_KIND {
        return Err(SchemaError::InvalidKind {
            found: envelope.kind,
        });
    }

    match envelope.schema_version {
        1 => {
            let doc: SiteDocument =
                serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;
            doc.validate()?;
            Ok(doc)
        }
        v => Err(SchemaError::UnsupportedVersion(v)),
    }
}
