//! store::memory
//!
//! In-memory store for deterministic runs and tests.
//!
//! # Design
//!
//! [`MemoryStore`] implements both [`RecordStore`] and [`RedirectStore`] over
//! one shared state. Clones share that state, so a test can hand the store
//! to the engine and inspect it afterwards. Mutating calls are recorded as
//! [`StoreOperation`]s, and a single call can be made to fail with
//! [`FailOn`].
//!
//! # Example
//!
//! ```
//! use slugsync::core::ops::CorrelationGroup;
//! use slugsync::core::site::Node;
//! use slugsync::core::types::{NodeId, UtcTimestamp};
//! use slugsync::store::{FailOn, MemoryStore, RecordStore};
//!
//! let store = MemoryStore::with_nodes(vec![Node::new(1, 0, "Root").with_slug("/")])
//!     .fail_on(FailOn::WriteSlug(NodeId::new(1)));
//! let group = CorrelationGroup::create(NodeId::new(1), &UtcTimestamp::now());
//!
//! assert!(store.write_slug(NodeId::new(1), "/new", &group.slug).is_err());
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::traits::{RecordStore, RedirectStore, StoreError};
use crate::core::ops::correlation::CorrelationId;
use crate::core::paths::same_path;
use crate::core::site::{NewRedirect, Node, Redirect, SiteDocument, SlugChange};
use crate::core::types::{LanguageId, NodeId, UtcTimestamp};

/// Shared in-memory site state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    nodes: BTreeMap<NodeId, Node>,
    redirects: Vec<Redirect>,
    history: Vec<SlugChange>,
    grants: BTreeMap<String, Vec<NodeId>>,
    next_redirect_id: u64,
    fail_on: Option<FailOn>,
    operations: Vec<StoreOperation>,
}

/// Which call should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    /// Fail `write_slug` for this node.
    WriteSlug(NodeId),
    /// Fail every `create` and `mark_deleted`.
    CreateRedirect,
    /// Fail every `delete`.
    DeleteRedirects,
    /// Fail `get_children` for this parent.
    GetChildren(NodeId),
}

/// Recorded mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    WriteSlug {
        id: NodeId,
        slug: String,
        correlation: CorrelationId,
    },
    CreateRedirect {
        source_host: String,
        source_path: String,
        target: NodeId,
    },
    MarkDeleted {
        source_host: String,
        source_path: String,
        target: NodeId,
    },
    DeleteRedirects {
        source_path: String,
        source_host: String,
        removed: usize,
    },
    DeleteByCorrelation {
        correlation: CorrelationId,
        removed: usize,
    },
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_document(SiteDocument::new())
    }

    /// Create a store holding the given nodes.
    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        let store = Self::new();
        for node in nodes {
            store.insert_node(node);
        }
        store
    }

    /// Load a site document.
    pub fn from_document(doc: SiteDocument) -> Self {
        let next_redirect_id = doc.redirects.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                nodes: doc.nodes.into_iter().map(|n| (n.id, n)).collect(),
                redirects: doc.redirects,
                history: doc.history,
                grants: doc.grants,
                next_redirect_id,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Snapshot the state as a site document.
    pub fn to_document(&self) -> SiteDocument {
        let state = self.state();
        SiteDocument {
            nodes: state.nodes.values().cloned().collect(),
            redirects: state.redirects.clone(),
            history: state.history.clone(),
            grants: state.grants.clone(),
            ..SiteDocument::new()
        }
    }

    /// Make one kind of call fail.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().fail_on = Some(fail_on);
        self
    }

    pub fn clear_fail_on(&self) {
        self.state().fail_on = None;
    }

    /// Recorded mutating calls, oldest first.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.state().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    /// Add or replace a node.
    pub fn insert_node(&self, node: Node) {
        self.state().nodes.insert(node.id, node);
    }

    /// Current copy of a node.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.state().nodes.get(&id).cloned()
    }

    /// Current slug of a node, or `None` if it does not exist.
    pub fn slug_of(&self, id: u32) -> Option<String> {
        self.node(NodeId::new(id)).map(|n| n.slug)
    }

    /// Every redirect, including deleted ones.
    pub fn all_redirects(&self) -> Vec<Redirect> {
        self.state().redirects.clone()
    }

    /// Replace a node's title.
    pub fn set_title(&self, id: NodeId, title: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        let node = state
            .nodes
            .get_mut(&id)
            .ok_or(StoreError::NodeNotFound(id))?;
        node.title = title.to_string();
        Ok(())
    }

    /// Set or clear a node's lock flag.
    pub fn set_locked(&self, id: NodeId, locked: bool) -> Result<(), StoreError> {
        let mut state = self.state();
        let node = state
            .nodes
            .get_mut(&id)
            .ok_or(StoreError::NodeNotFound(id))?;
        node.locked = locked;
        Ok(())
    }

    /// Node ids the actor was granted.
    pub fn grants_for(&self, actor: &str) -> Vec<NodeId> {
        self.state().grants.get(actor).cloned().unwrap_or_default()
    }

    /// Grant an actor edit access to nodes.
    pub fn grant(&self, actor: &str, ids: impl IntoIterator<Item = NodeId>) {
        let mut state = self.state();
        let entry = state.grants.entry(actor.to_string()).or_default();
        for id in ids {
            if !entry.contains(&id) {
                entry.push(id);
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn injected(what: &str) -> StoreError {
        StoreError::Unavailable(format!("injected failure in {what}"))
    }

    fn insert_redirect(&self, redirect: NewRedirect, deleted: bool) -> Result<Redirect, StoreError> {
        let mut state = self.state();
        state.operations.push(if deleted {
            StoreOperation::MarkDeleted {
                source_host: redirect.source_host.clone(),
                source_path: redirect.source_path.clone(),
                target: redirect.target,
            }
        } else {
            StoreOperation::CreateRedirect {
                source_host: redirect.source_host.clone(),
                source_path: redirect.source_path.clone(),
                target: redirect.target,
            }
        });
        if state.fail_on == Some(FailOn::CreateRedirect) {
            return Err(Self::injected("create redirect"));
        }

        let stored = Redirect {
            id: state.next_redirect_id,
            source_host: redirect.source_host,
            source_path: redirect.source_path,
            target: redirect.target,
            deleted,
            correlation: redirect.correlation,
            created_at: UtcTimestamp::now(),
        };
        state.next_redirect_id += 1;
        state.redirects.push(stored.clone());
        Ok(stored)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get_node(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        Ok(self.node(id))
    }

    fn get_children(
        &self,
        parent: NodeId,
        language: LanguageId,
    ) -> Result<Vec<Node>, StoreError> {
        let state = self.state();
        if state.fail_on == Some(FailOn::GetChildren(parent)) {
            return Err(Self::injected("get_children"));
        }
        Ok(state
            .nodes
            .values()
            .filter(|n| n.parent_id == parent && n.language_id == language)
            .cloned()
            .collect())
    }

    fn get_translations(&self, default_node: NodeId) -> Result<Vec<Node>, StoreError> {
        let mut translations: Vec<Node> = self
            .state()
            .nodes
            .values()
            .filter(|n| n.translation_parent_id == Some(default_node))
            .cloned()
            .collect();
        translations.sort_by_key(|n| (n.language_id, n.id));
        Ok(translations)
    }

    fn rootline(&self, id: NodeId) -> Result<Vec<Node>, StoreError> {
        let state = self.state();
        let node = state.nodes.get(&id).ok_or(StoreError::NodeNotFound(id))?;

        let mut chain = Vec::new();
        let mut parent = node.parent_id;
        while !parent.is_tree_root() && chain.len() <= state.nodes.len() {
            let Some(ancestor) = state.nodes.get(&parent) else {
                break;
            };
            chain.push(ancestor.clone());
            parent = ancestor.parent_id;
        }
        Ok(chain)
    }

    fn write_slug(
        &self,
        id: NodeId,
        slug: &str,
        correlation: &CorrelationId,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        state.operations.push(StoreOperation::WriteSlug {
            id,
            slug: slug.to_string(),
            correlation: correlation.clone(),
        });
        if state.fail_on == Some(FailOn::WriteSlug(id)) {
            return Err(Self::injected(&format!("write_slug for node {id}")));
        }

        let node = state
            .nodes
            .get_mut(&id)
            .ok_or(StoreError::NodeNotFound(id))?;
        let old_slug = std::mem::replace(&mut node.slug, slug.to_string());
        state.history.push(SlugChange {
            node: id,
            old_slug,
            new_slug: slug.to_string(),
            correlation: correlation.clone(),
            recorded_at: UtcTimestamp::now(),
        });
        Ok(())
    }

    fn write_title(&self, id: NodeId, title: &str) -> Result<(), StoreError> {
        self.set_title(id, title)
    }

    fn slug_history(&self, subject: &str) -> Result<Vec<SlugChange>, StoreError> {
        Ok(self
            .state()
            .history
            .iter()
            .filter(|change| change.correlation.has_subject(subject))
            .cloned()
            .collect())
    }
}

impl RedirectStore for MemoryStore {
    fn create(&self, redirect: NewRedirect) -> Result<Redirect, StoreError> {
        self.insert_redirect(redirect, false)
    }

    fn mark_deleted(&self, redirect: NewRedirect) -> Result<Redirect, StoreError> {
        self.insert_redirect(redirect, true)
    }

    fn delete(&self, source_path: &str, source_host: &str) -> Result<usize, StoreError> {
        let mut state = self.state();
        if state.fail_on == Some(FailOn::DeleteRedirects) {
            return Err(Self::injected("delete redirects"));
        }

        let mut removed = 0;
        for redirect in state.redirects.iter_mut().filter(|r| {
            !r.deleted && r.source_host == source_host && same_path(&r.source_path, source_path)
        }) {
            redirect.deleted = true;
            removed += 1;
        }
        state.operations.push(StoreOperation::DeleteRedirects {
            source_path: source_path.to_string(),
            source_host: source_host.to_string(),
            removed,
        });
        Ok(removed)
    }

    fn delete_by_correlation(&self, correlation: &CorrelationId) -> Result<usize, StoreError> {
        let mut state = self.state();
        let mut removed = 0;
        for redirect in state
            .redirects
            .iter_mut()
            .filter(|r| !r.deleted && r.correlation.as_ref() == Some(correlation))
        {
            redirect.deleted = true;
            removed += 1;
        }
        state.operations.push(StoreOperation::DeleteByCorrelation {
            correlation: correlation.clone(),
            removed,
        });
        Ok(removed)
    }

    fn active(&self) -> Result<Vec<Redirect>, StoreError> {
        Ok(self
            .state()
            .redirects
            .iter()
            .filter(|r| !r.deleted)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ops::CorrelationGroup;

    fn group() -> CorrelationGroup {
        CorrelationGroup::from_subject("00112233aabbccdd").unwrap()
    }

    fn tree() -> MemoryStore {
        MemoryStore::with_nodes(vec![
            Node::new(1, 0, "Root").with_slug("/"),
            Node::new(5, 1, "Five").with_slug("/five"),
            Node::new(2, 1, "Two").with_slug("/two"),
            Node::new(3, 2, "Three").with_slug("/two/three"),
            Node::new(9, 1, "Zwei")
                .with_slug("/zwei")
                .with_translation_of(NodeId::new(2), LanguageId::new(2)),
            Node::new(8, 1, "Deux")
                .with_slug("/deux")
                .with_translation_of(NodeId::new(2), LanguageId::new(1)),
        ])
    }

    fn redirect(path: &str, host: &str) -> NewRedirect {
        NewRedirect {
            source_host: host.to_string(),
            source_path: path.to_string(),
            target: NodeId::new(2),
            correlation: Some(group().redirect),
        }
    }

    mod records {
        use super::*;

        #[test]
        fn children_ascending_by_language() {
            let store = tree();
            let ids: Vec<u32> = store
                .get_children(NodeId::new(1), LanguageId::DEFAULT)
                .unwrap()
                .iter()
                .map(|n| n.id.get())
                .collect();
            assert_eq!(ids, vec![2, 5]);

            let french = store.get_children(NodeId::new(1), LanguageId::new(1)).unwrap();
            assert_eq!(french.len(), 1);
            assert_eq!(french[0].id, NodeId::new(8));
        }

        #[test]
        fn translations_sorted_by_language() {
            let langs: Vec<u32> = tree()
                .get_translations(NodeId::new(2))
                .unwrap()
                .iter()
                .map(|n| n.language_id.get())
                .collect();
            assert_eq!(langs, vec![1, 2]);
        }

        #[test]
        fn rootline_nearest_first() {
            let chain = tree().rootline(NodeId::new(3)).unwrap();
            let ids: Vec<u32> = chain.iter().map(|n| n.id.get()).collect();
            assert_eq!(ids, vec![2, 1]);
        }

        #[test]
        fn rootline_of_unknown_node() {
            assert!(matches!(
                tree().rootline(NodeId::new(42)),
                Err(StoreError::NodeNotFound(_))
            ));
        }

        #[test]
        fn write_slug_records_history() {
            let store = tree();
            let group = group();
            store
                .write_slug(NodeId::new(5), "/funf", &group.slug)
                .unwrap();

            assert_eq!(store.slug_of(5).as_deref(), Some("/funf"));
            let history = store.slug_history(group.subject()).unwrap();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].old_slug, "/five");
            assert_eq!(history[0].new_slug, "/funf");
            assert!(store.slug_history("ffffffffffffffff").unwrap().is_empty());
        }

        #[test]
        fn write_slug_failure_leaves_node() {
            let store = tree().fail_on(FailOn::WriteSlug(NodeId::new(5)));
            assert!(store
                .write_slug(NodeId::new(5), "/x", &group().slug)
                .is_err());
            assert_eq!(store.slug_of(5).as_deref(), Some("/five"));
            assert_eq!(store.operations().len(), 1);

            store.clear_fail_on();
            assert!(store.write_slug(NodeId::new(5), "/x", &group().slug).is_ok());
        }

        #[test]
        fn document_roundtrip() {
            let store = tree();
            store.grant("alice", [NodeId::new(2)]);
            let doc = store.to_document();
            doc.validate().unwrap();

            let again = MemoryStore::from_document(doc.clone());
            assert_eq!(again.to_document(), doc);
            assert_eq!(again.grants_for("alice"), vec![NodeId::new(2)]);
            assert!(again.grants_for("bob").is_empty());
        }
    }

    mod redirects {
        use super::*;

        #[test]
        fn create_assigns_ids() {
            let store = MemoryStore::new();
            let a = store.create(redirect("/a", "*")).unwrap();
            let b = store.create(redirect("/b", "*")).unwrap();
            assert_eq!(a.id + 1, b.id);
            assert_eq!(store.active().unwrap().len(), 2);
        }

        #[test]
        fn mark_deleted_is_not_active() {
            let store = MemoryStore::new();
            let stored = store.mark_deleted(redirect("/a", "*")).unwrap();
            assert!(stored.deleted);
            assert!(store.active().unwrap().is_empty());
            assert_eq!(store.all_redirects().len(), 1);
        }

        #[test]
        fn delete_scoped_to_host() {
            let store = MemoryStore::new();
            store.create(redirect("/a/", "example.org")).unwrap();
            store.create(redirect("/a", "other.org")).unwrap();

            assert_eq!(store.delete("/a", "example.org").unwrap(), 1);
            let active = store.active().unwrap();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].source_host, "other.org");
        }

        #[test]
        fn delete_by_correlation() {
            let store = MemoryStore::new();
            store.create(redirect("/a", "*")).unwrap();
            store
                .create(NewRedirect {
                    correlation: None,
                    ..redirect("/b", "*")
                })
                .unwrap();

            assert_eq!(store.delete_by_correlation(&group().redirect).unwrap(), 1);
            assert_eq!(store.active().unwrap()[0].source_path, "/b");
        }

        #[test]
        fn injected_create_failure() {
            let store = MemoryStore::new().fail_on(FailOn::CreateRedirect);
            assert!(store.create(redirect("/a", "*")).is_err());
            assert!(store.all_redirects().is_empty());
        }
    }
}
