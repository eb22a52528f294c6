//! store::traits
//!
//! Record and redirect store contracts consumed by the engine.
//!
//! # Design
//!
//! The engine only reads nodes and writes slugs and redirects through these
//! traits; it never sees the persistence technology behind them. Every
//! method returns `Result` so a failing backend aborts the current run.
//!
//! # Ordering
//!
//! `get_children` and `get_translations` return records in ascending id
//! (translations: ascending language) so runs are reproducible.
//!
//! # Example
//!
//! ```
//! use slugsync::core::site::Node;
//! use slugsync::core::types::{LanguageId, NodeId};
//! use slugsync::store::{MemoryStore, RecordStore};
//!
//! let store = MemoryStore::with_nodes(vec![
//!     Node::new(1, 0, "Root").with_slug("/"),
//!     Node::new(3, 1, "B").with_slug("/b"),
//!     Node::new(2, 1, "A").with_slug("/a"),
//! ]);
//! let children = store.get_children(NodeId::new(1), LanguageId::DEFAULT).unwrap();
//! let ids: Vec<u32> = children.iter().map(|n| n.id.get()).collect();
//! assert_eq!(ids, vec![2, 3]);
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::core::ops::correlation::CorrelationId;
use crate::core::ops::lock::LockError;
use crate::core::site::{NewRedirect, Node, Redirect, SchemaError, SlugChange};
use crate::core::types::{LanguageId, NodeId};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("node {0} is its own ancestor")]
    Cycle(NodeId),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Reads nodes and writes slugs.
pub trait RecordStore {
    /// Name of the backend, for logs.
    fn name(&self) -> &'static str;

    /// Look up one node record (any language).
    fn get_node(&self, id: NodeId) -> Result<Option<Node>, StoreError>;

    /// Children of `parent` in `language`, ascending by id.
    ///
    /// For the default language these are the default-language records;
    /// for another language, the translation records filed under `parent`.
    fn get_children(&self, parent: NodeId, language: LanguageId)
        -> Result<Vec<Node>, StoreError>;

    /// Translations of a default-language node, ascending by language.
    fn get_translations(&self, default_node: NodeId) -> Result<Vec<Node>, StoreError>;

    /// Ancestors of a node, nearest first, ending at a site root.
    ///
    /// The node itself is not included.
    fn rootline(&self, id: NodeId) -> Result<Vec<Node>, StoreError>;

    /// Persist a new slug, recording the change under `correlation`.
    fn write_slug(
        &self,
        id: NodeId,
        slug: &str,
        correlation: &CorrelationId,
    ) -> Result<(), StoreError>;

    /// Replace a node's title.
    fn write_title(&self, id: NodeId, title: &str) -> Result<(), StoreError>;

    /// Slug writes recorded under a correlation subject, in write order.
    fn slug_history(&self, subject: &str) -> Result<Vec<SlugChange>, StoreError>;
}

/// Redirect bookkeeping.
pub trait RedirectStore {
    /// Store a live redirect.
    fn create(&self, redirect: NewRedirect) -> Result<Redirect, StoreError>;

    /// Store a redirect already flagged as deleted.
    fn mark_deleted(&self, redirect: NewRedirect) -> Result<Redirect, StoreError>;

    /// Flag every live redirect for `source_host` whose source path equals
    /// `source_path` (ignoring a trailing slash) as deleted.
    ///
    /// Returns the number of redirects affected.
    fn delete(&self, source_path: &str, source_host: &str) -> Result<usize, StoreError>;

    /// Flag every live redirect created under `correlation` as deleted.
    fn delete_by_correlation(&self, correlation: &CorrelationId) -> Result<usize, StoreError>;

    /// All live redirects, ascending by id.
    fn active(&self) -> Result<Vec<Redirect>, StoreError>;
}
