//! engine::sync
//!
//! The subtree synchronizer.
//!
//! # Algorithm
//!
//! Depth-first, pre-order, children in ascending id:
//!
//! ```text
//! for child of node:
//!     Excluded  -> skipped, translations untouched, descend
//!     Locked    -> skipped, translations evaluated, descend unless lock-descendants
//!     Manage    -> regenerate, translations evaluated, descend
//! ```
//!
//! Each translation is classified on its own flags and regenerated under
//! the parent's slug in the same language (falling back to the parent's
//! default-language slug).
//!
//! # Invariants
//!
//! - One [`CorrelationGroup`] per run, stamped on every write of the run
//! - The first store failure aborts the run; writes already made stay
//! - Only elevated actors may synchronize
//! - No node is walked twice in one run; a parent cycle aborts the run
//!
//! # Example
//!
//! ```
//! use slugsync::core::config::Settings;
//! use slugsync::core::site::Node;
//! use slugsync::core::types::NodeId;
//! use slugsync::engine::{Actor, Context, Synchronizer};
//! use slugsync::store::MemoryStore;
//!
//! let store = MemoryStore::with_nodes(vec![
//!     Node::new(1, 0, "Root").with_slug("/"),
//!     Node::new(2, 1, "Parent Page").with_slug("/parent-page"),
//!     Node::new(3, 2, "Child Page").with_slug("/old-parent/child-page"),
//! ]);
//! let sync = Synchronizer::new(&store, &store, &Settings::default());
//! let report = sync
//!     .synchronize(NodeId::new(2), &Context::new(Actor::admin("ada")))
//!     .unwrap();
//!
//! assert_eq!(report.updated, 1);
//! assert_eq!(store.slug_of(3).as_deref(), Some("/parent-page/child-page"));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use super::generator::SlugGenerator;
use super::redirect::RedirectGuard;
use super::Context;
use crate::core::config::Settings;
use crate::core::ops::CorrelationGroup;
use crate::core::policy::{decide, Decision, ExclusionPolicy, LockPolicy};
use crate::core::site::{NewRedirect, Node};
use crate::core::types::{LanguageId, NodeId, UtcTimestamp};
use crate::store::{RecordStore, RedirectStore, StoreError};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Slugs written.
    pub updated: usize,
    /// Nodes skipped as locked or excluded.
    pub skipped: usize,
    /// Ids stamped on every write of the run.
    pub correlation: CorrelationGroup,
}

/// Errors from a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("actor '{actor}' may not synchronize slugs")]
    PermissionDenied { actor: String },

    #[error("node {0} does not exist")]
    InvalidTarget(NodeId),

    /// A store call failed. Writes made before the failure are kept and can
    /// be reverted through `correlation`.
    #[error(
        "run {} aborted after {updated} updated and {skipped} skipped: {source}",
        .correlation.subject()
    )]
    Persistence {
        source: StoreError,
        updated: usize,
        skipped: usize,
        correlation: CorrelationGroup,
    },
}

/// Walks subtrees and keeps their slugs consistent.
pub struct Synchronizer<'s> {
    pub(crate) records: &'s dyn RecordStore,
    pub(crate) redirects: &'s dyn RedirectStore,
    pub(crate) generator: SlugGenerator,
    pub(crate) lock: LockPolicy,
    pub(crate) exclusion: ExclusionPolicy,
    create_redirects: bool,
    default_host: String,
}

impl<'s> Synchronizer<'s> {
    /// Build a synchronizer from resolved settings.
    pub fn new(
        records: &'s dyn RecordStore,
        redirects: &'s dyn RedirectStore,
        settings: &Settings,
    ) -> Self {
        Self {
            records,
            redirects,
            generator: SlugGenerator::new(settings),
            lock: LockPolicy::new(settings.lock, settings.lock_descendants),
            exclusion: ExclusionPolicy::new(settings.exclude_types.iter().cloned()),
            create_redirects: settings.create_redirects,
            default_host: settings.redirect_host.clone(),
        }
    }

    /// Append a post-modifier to the slug generator.
    pub fn with_post_modifier<F>(mut self, modifier: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.generator = self.generator.with_post_modifier(modifier);
        self
    }

    pub fn generator(&self) -> &SlugGenerator {
        &self.generator
    }

    /// Re-synchronize every descendant of `root`.
    ///
    /// The root itself is not touched. A translation root is walked from the
    /// node it translates.
    pub fn synchronize(&self, root: NodeId, ctx: &Context) -> Result<SyncReport, SyncError> {
        let span = info_span!("slugsync::synchronize", root = %root, actor = %ctx.actor.name);
        let _enter = span.enter();

        if !ctx.actor.admin {
            return Err(SyncError::PermissionDenied {
                actor: ctx.actor.name.clone(),
            });
        }

        let mut run = self.begin(ctx, root);
        let target = self.target(&run, root)?;
        let result = self.walk_from(&mut run, &target);
        self.finish(run, result)
    }

    /// Start a run triggered by `trigger`.
    pub(crate) fn begin<'c>(&self, ctx: &'c Context, trigger: NodeId) -> Run<'c> {
        Run {
            ctx,
            group: CorrelationGroup::create(trigger, &UtcTimestamp::now()),
            updated: 0,
            skipped: 0,
            walked: BTreeSet::new(),
        }
    }

    /// Load the node a run operates on.
    pub(crate) fn target(&self, run: &Run<'_>, id: NodeId) -> Result<Node, SyncError> {
        match self.records.get_node(id) {
            Ok(Some(node)) => Ok(node),
            Ok(None) => Err(SyncError::InvalidTarget(id)),
            Err(source) => Err(run.failure(source)),
        }
    }

    /// Close a run, turning a store failure into [`SyncError::Persistence`].
    pub(crate) fn finish(
        &self,
        run: Run<'_>,
        result: Result<(), StoreError>,
    ) -> Result<SyncReport, SyncError> {
        match result {
            Ok(()) => {
                info!(
                    updated = run.updated,
                    skipped = run.skipped,
                    correlation = run.group.subject(),
                    "synchronization finished"
                );
                Ok(run.into_report())
            }
            Err(source) => Err(run.failure(source)),
        }
    }

    /// Walk the subtree below `node` using the slugs it currently hands down.
    fn walk_from(&self, run: &mut Run<'_>, node: &Node) -> Result<(), StoreError> {
        let identity = node.identity();
        let default_node = if node.is_translation() {
            self.records
                .get_node(identity)?
                .ok_or(StoreError::NodeNotFound(identity))?
        } else {
            node.clone()
        };
        let slugs = self.slugs_of(&default_node)?;
        self.walk(run, identity, &slugs)
    }

    /// Re-evaluate one node under its current parent, then walk its subtree.
    pub(crate) fn resync_node(&self, run: &mut Run<'_>, node: &Node) -> Result<(), StoreError> {
        let parent_slug = self.parent_slug_of(node)?;
        let decision = decide(&self.lock, &self.exclusion, node);
        let own = self.visit(run, node, &parent_slug, decision)?;
        if decision.descends() {
            self.descend(run, node, own)
        } else {
            Ok(())
        }
    }

    /// Walk the subtree below `node`, which now hands down `own`.
    pub(crate) fn descend(
        &self,
        run: &mut Run<'_>,
        node: &Node,
        own: String,
    ) -> Result<(), StoreError> {
        let identity = node.identity();
        let mut slugs = if node.is_translation() {
            let default_node = self
                .records
                .get_node(identity)?
                .ok_or(StoreError::NodeNotFound(identity))?;
            self.slugs_of(&default_node)?
        } else {
            self.slugs_of(node)?
        };
        slugs.set(node.language_id, own);
        self.walk(run, identity, &slugs)
    }

    fn walk(
        &self,
        run: &mut Run<'_>,
        parent: NodeId,
        slugs: &ParentSlugs,
    ) -> Result<(), StoreError> {
        if !run.walked.insert(parent) {
            return Err(StoreError::Cycle(parent));
        }
        for child in self.records.get_children(parent, LanguageId::DEFAULT)? {
            if run.walked.contains(&child.id) {
                return Err(StoreError::Cycle(child.id));
            }
            let decision = decide(&self.lock, &self.exclusion, &child);
            let own = self.visit(run, &child, slugs.get(LanguageId::DEFAULT), decision)?;

            let mut next = ParentSlugs::new(own);
            if decision == Decision::Excluded {
                for translation in self.records.get_translations(child.id)? {
                    let slug = passed_down(&translation, slugs.get(translation.language_id));
                    next.set(translation.language_id, slug);
                }
            } else {
                self.fan_out(run, &child, slugs, &mut next)?;
            }

            if decision.descends() {
                self.walk(run, child.id, &next)?;
            } else {
                debug!(node = %child.id, "locked; subtree left alone");
            }
        }
        Ok(())
    }

    fn fan_out(
        &self,
        run: &mut Run<'_>,
        node: &Node,
        slugs: &ParentSlugs,
        next: &mut ParentSlugs,
    ) -> Result<(), StoreError> {
        for translation in self.records.get_translations(node.id)? {
            let language = translation.language_id;
            let decision = decide(&self.lock, &self.exclusion, &translation);
            let slug = self.visit(run, &translation, slugs.get(language), decision)?;
            next.set(language, slug);
        }
        Ok(())
    }

    /// Apply a decision to one record; returns the slug it hands down.
    fn visit(
        &self,
        run: &mut Run<'_>,
        node: &Node,
        parent_slug: &str,
        decision: Decision,
    ) -> Result<String, StoreError> {
        match decision {
            Decision::Excluded => {
                run.skipped += 1;
                debug!(node = %node.id, type_tag = %node.type_tag, "excluded type; skipped");
                Ok(passed_down(node, parent_slug))
            }
            Decision::Locked { .. } => {
                run.skipped += 1;
                debug!(node = %node.id, language = %node.language_id, "locked; skipped");
                Ok(passed_down(node, parent_slug))
            }
            Decision::Manage => self.regenerate(run, node, parent_slug),
        }
    }

    fn regenerate(
        &self,
        run: &mut Run<'_>,
        node: &Node,
        parent_slug: &str,
    ) -> Result<String, StoreError> {
        let target = self.generator.target_slug(node, parent_slug);
        if target == node.slug {
            debug!(node = %node.id, slug = %target, "slug already current");
        } else {
            self.persist(run, node, &target)?;
        }
        Ok(target)
    }

    /// Write a new slug and keep the redirect table consistent with it.
    pub(crate) fn persist(
        &self,
        run: &mut Run<'_>,
        node: &Node,
        new_slug: &str,
    ) -> Result<(), StoreError> {
        self.records.write_slug(node.id, new_slug, &run.group.slug)?;
        run.updated += 1;
        debug!(
            node = %node.id,
            language = %node.language_id,
            old = %node.slug,
            new = new_slug,
            "slug updated"
        );

        let host = self.host(run.ctx);
        let candidate = (self.redirects_enabled(run.ctx) && !node.slug.is_empty()).then(|| {
            NewRedirect {
                source_host: host.to_string(),
                source_path: node.slug.clone(),
                target: node.id,
                correlation: Some(run.group.redirect.clone()),
            }
        });
        RedirectGuard::new(self.redirects).apply(candidate, new_slug, host)?;
        Ok(())
    }

    pub(crate) fn host<'c>(&'c self, ctx: &'c Context) -> &'c str {
        ctx.host.as_deref().unwrap_or(&self.default_host)
    }

    fn redirects_enabled(&self, ctx: &Context) -> bool {
        self.create_redirects && !ctx.suppress_redirects
    }

    /// Slug of the node's parent in the node's language.
    ///
    /// Parents without a slug of their own hand down their parent's.
    pub(crate) fn parent_slug_of(&self, node: &Node) -> Result<String, StoreError> {
        let mut seen = BTreeSet::from([node.id]);
        let mut language = node.is_translation().then_some(node.language_id);
        let mut parent_id = node.parent_id;

        loop {
            if parent_id.is_tree_root() {
                return Ok(String::new());
            }
            if !seen.insert(parent_id) {
                return Err(StoreError::Cycle(parent_id));
            }
            let Some(parent) = self.records.get_node(parent_id)? else {
                return Ok(String::new());
            };

            if let Some(language) = language.take() {
                let translated = self
                    .records
                    .get_translations(parent.id)?
                    .into_iter()
                    .find(|t| t.language_id == language && !t.slug.is_empty());
                if let Some(translated) = translated {
                    return Ok(translated.slug);
                }
            }

            if !parent.slug.is_empty() {
                return Ok(parent.slug);
            }
            parent_id = parent.parent_id;
        }
    }

    /// Slugs a default-language node currently hands to its children.
    fn slugs_of(&self, node: &Node) -> Result<ParentSlugs, StoreError> {
        let default = if node.slug.is_empty() {
            self.parent_slug_of(node)?
        } else {
            node.slug.clone()
        };
        let mut slugs = ParentSlugs::new(default);
        for translation in self.records.get_translations(node.id)? {
            if !translation.slug.is_empty() {
                slugs.set(translation.language_id, translation.slug);
            }
        }
        Ok(slugs)
    }
}

/// State owned by one run.
pub(crate) struct Run<'c> {
    pub(crate) ctx: &'c Context,
    pub(crate) group: CorrelationGroup,
    pub(crate) updated: usize,
    pub(crate) skipped: usize,
    /// Parents whose children this run has walked.
    walked: BTreeSet<NodeId>,
}

impl Run<'_> {
    pub(crate) fn failure(&self, source: StoreError) -> SyncError {
        warn!(
            error = %source,
            updated = self.updated,
            skipped = self.skipped,
            correlation = self.group.subject(),
            "run aborted; earlier writes kept"
        );
        SyncError::Persistence {
            source,
            updated: self.updated,
            skipped: self.skipped,
            correlation: self.group.clone(),
        }
    }

    fn into_report(self) -> SyncReport {
        SyncReport {
            updated: self.updated,
            skipped: self.skipped,
            correlation: self.group,
        }
    }
}

/// Parent slugs per language, falling back to the default language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParentSlugs {
    default: String,
    translated: BTreeMap<LanguageId, String>,
}

impl ParentSlugs {
    fn new(default: String) -> Self {
        Self {
            default,
            translated: BTreeMap::new(),
        }
    }

    fn get(&self, language: LanguageId) -> &str {
        self.translated
            .get(&language)
            .map(String::as_str)
            .unwrap_or(&self.default)
    }

    fn set(&mut self, language: LanguageId, slug: String) {
        if language.is_default() {
            self.default = slug;
        } else {
            self.translated.insert(language, slug);
        }
    }
}

/// Slug a skipped record hands to its children.
fn passed_down(node: &Node, parent_slug: &str) -> String {
    if node.slug.is_empty() {
        parent_slug.to_string()
    } else {
        node.slug.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Actor;
    use crate::store::{FailOn, MemoryStore, StoreOperation};

    fn admin() -> Context {
        Context::new(Actor::admin("ada"))
    }

    fn settings() -> Settings {
        Settings::default()
    }

    fn de() -> LanguageId {
        LanguageId::new(1)
    }

    mod walk {
        use super::*;

        #[test]
        fn updates_stale_children_recursively() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Products").with_slug("/products"),
                Node::new(3, 2, "Shoes").with_slug("/old/shoes"),
                Node::new(4, 3, "Boots").with_slug("/old/shoes/boots"),
            ]);
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(2), &admin())
                .unwrap();

            assert_eq!(report.updated, 2);
            assert_eq!(report.skipped, 0);
            assert_eq!(store.slug_of(3).as_deref(), Some("/products/shoes"));
            assert_eq!(store.slug_of(4).as_deref(), Some("/products/shoes/boots"));
            assert_eq!(store.slug_of(2).as_deref(), Some("/products"));
        }

        #[test]
        fn current_slugs_are_not_rewritten() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "About").with_slug("/about"),
            ]);
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert_eq!(report.updated, 0);
            assert!(store.operations().is_empty());
        }

        #[test]
        fn excluded_node_hands_down_parent_slug() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Folder").with_type_tag("folder"),
                Node::new(3, 2, "Inside").with_slug("/x/inside"),
            ]);
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert_eq!(report.skipped, 1);
            assert_eq!(store.slug_of(2).as_deref(), Some(""));
            assert_eq!(store.slug_of(3).as_deref(), Some("/inside"));
        }

        #[test]
        fn locked_node_hands_down_own_slug() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Renamed").with_slug("/kept").with_locked(true),
                Node::new(3, 2, "Child").with_slug("/elsewhere/child"),
            ]);
            Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert_eq!(store.slug_of(2).as_deref(), Some("/kept"));
            assert_eq!(store.slug_of(3).as_deref(), Some("/kept/child"));
        }

        #[test]
        fn lock_descendants_stops_walk() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Locked").with_slug("/locked").with_locked(true),
                Node::new(3, 2, "Child").with_slug("/stale"),
            ]);
            let settings = Settings {
                lock_descendants: true,
                ..Settings::default()
            };
            let report = Synchronizer::new(&store, &store, &settings)
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert_eq!(report.skipped, 1);
            assert_eq!(report.updated, 0);
            assert_eq!(store.slug_of(3).as_deref(), Some("/stale"));
        }

        #[test]
        fn lock_feature_off_regenerates_locked_nodes() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Fresh").with_slug("/kept").with_locked(true),
            ]);
            let settings = Settings {
                lock: false,
                ..Settings::default()
            };
            let report = Synchronizer::new(&store, &store, &settings)
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert_eq!(report.updated, 1);
            assert_eq!(store.slug_of(2).as_deref(), Some("/fresh"));
        }

        #[test]
        fn post_modifier_applies_to_every_segment() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "News").with_slug("/news"),
                Node::new(3, 2, "Item").with_slug("/news/item"),
            ]);
            Synchronizer::new(&store, &store, &settings())
                .with_post_modifier(|segment| format!("{segment}-x"))
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert_eq!(store.slug_of(3).as_deref(), Some("/news-x/item-x"));
        }
    }

    mod translations {
        use super::*;

        fn tree() -> MemoryStore {
            MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Company").with_slug("/company"),
                Node::new(20, 1, "Firma")
                    .with_slug("/firma")
                    .with_translation_of(NodeId::new(2), LanguageId::new(1)),
                Node::new(3, 2, "Team").with_slug("/old/team"),
                Node::new(30, 2, "Mannschaft")
                    .with_slug("/alt/mannschaft")
                    .with_translation_of(NodeId::new(3), LanguageId::new(1)),
            ])
        }

        #[test]
        fn translation_uses_translated_parent_slug() {
            let store = tree();
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(2), &admin())
                .unwrap();

            assert_eq!(report.updated, 2);
            assert_eq!(store.slug_of(3).as_deref(), Some("/company/team"));
            assert_eq!(store.slug_of(30).as_deref(), Some("/firma/mannschaft"));
        }

        #[test]
        fn translation_root_walks_default_node() {
            let store = tree();
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(20), &admin())
                .unwrap();

            assert_eq!(report.updated, 2);
        }

        #[test]
        fn missing_parent_translation_falls_back() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Company").with_slug("/company"),
                Node::new(3, 2, "Team").with_slug("/company/team"),
                Node::new(30, 2, "Mannschaft")
                    .with_translation_of(NodeId::new(3), de()),
            ]);
            Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(2), &admin())
                .unwrap();

            assert_eq!(store.slug_of(30).as_deref(), Some("/company/mannschaft"));
        }

        #[test]
        fn translations_of_excluded_node_are_not_visited() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Spacer").with_type_tag("spacer"),
                Node::new(20, 1, "Abstand")
                    .with_slug("/abstand")
                    .with_type_tag("spacer")
                    .with_translation_of(NodeId::new(2), de()),
            ]);
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert_eq!(report.skipped, 1);
            assert_eq!(store.slug_of(20).as_deref(), Some("/abstand"));
        }
    }

    mod redirects {
        use super::*;

        fn tree() -> MemoryStore {
            MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "Page B").with_slug("/page-a"),
            ])
        }

        #[test]
        fn old_slug_redirects_to_node() {
            let store = tree();
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            let active = store.active().unwrap();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].source_path, "/page-a");
            assert_eq!(active[0].source_host, "*");
            assert_eq!(active[0].target, NodeId::new(2));
            assert_eq!(active[0].correlation.as_ref(), Some(&report.correlation.redirect));
        }

        #[test]
        fn request_host_wins() {
            let store = tree();
            Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin().with_host("example.org"))
                .unwrap();

            assert_eq!(store.active().unwrap()[0].source_host, "example.org");
        }

        #[test]
        fn suppressed_for_request() {
            let store = tree();
            Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin().suppressing_redirects())
                .unwrap();

            assert!(store.active().unwrap().is_empty());
            assert_eq!(store.slug_of(2).as_deref(), Some("/page-b"));
        }

        #[test]
        fn disabled_in_settings() {
            let store = tree();
            let settings = Settings {
                create_redirects: false,
                ..Settings::default()
            };
            Synchronizer::new(&store, &store, &settings)
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            assert!(store.active().unwrap().is_empty());
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn editor_may_not_synchronize() {
            let store = MemoryStore::new();
            let err = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &Context::new(Actor::editor("eve")))
                .unwrap_err();

            assert!(matches!(err, SyncError::PermissionDenied { ref actor } if actor == "eve"));
        }

        #[test]
        fn unknown_root() {
            let store = MemoryStore::new();
            let err = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(99), &admin())
                .unwrap_err();

            assert!(matches!(err, SyncError::InvalidTarget(id) if id == NodeId::new(99)));
        }

        #[test]
        fn write_failure_aborts_and_keeps_prior_writes() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "A").with_slug("/stale-a"),
                Node::new(3, 1, "B").with_slug("/stale-b"),
                Node::new(4, 1, "C").with_slug("/stale-c"),
            ])
            .fail_on(FailOn::WriteSlug(NodeId::new(3)));

            let err = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap_err();

            match err {
                SyncError::Persistence { updated, .. } => assert_eq!(updated, 1),
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(store.slug_of(2).as_deref(), Some("/a"));
            assert_eq!(store.slug_of(4).as_deref(), Some("/stale-c"));
        }

        #[test]
        fn redirect_failure_aborts() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "A").with_slug("/stale-a"),
            ])
            .fail_on(FailOn::CreateRedirect);

            let err = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap_err();

            assert!(matches!(err, SyncError::Persistence { updated: 1, .. }));
        }

        #[test]
        fn parent_cycle_aborts_walk() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 3, "A").with_slug("/a"),
                Node::new(3, 2, "B").with_slug("/a/b"),
            ]);
            let err = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(2), &admin())
                .unwrap_err();

            assert!(matches!(
                err,
                SyncError::Persistence { source: StoreError::Cycle(id), updated: 0, .. }
                    if id == NodeId::new(2)
            ));
        }

        #[test]
        fn own_parent_aborts_walk() {
            let store = MemoryStore::with_nodes(vec![Node::new(2, 2, "Loop").with_slug("/loop")]);
            let err = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(2), &admin())
                .unwrap_err();

            assert!(matches!(
                err,
                SyncError::Persistence { source: StoreError::Cycle(_), .. }
            ));
        }

        #[test]
        fn parent_slug_lookup_stops_at_cycle() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(2, 3, "A"),
                Node::new(3, 2, "B"),
                Node::new(4, 3, "C"),
            ]);
            let sync = Synchronizer::new(&store, &store, &settings());

            let node = store.node(NodeId::new(4)).unwrap();
            assert!(matches!(sync.parent_slug_of(&node), Err(StoreError::Cycle(_))));
            let node = store.node(NodeId::new(2)).unwrap();
            assert!(matches!(sync.parent_slug_of(&node), Err(StoreError::Cycle(_))));
        }

        #[test]
        fn every_write_shares_one_group() {
            let store = MemoryStore::with_nodes(vec![
                Node::new(1, 0, "Root").with_slug("/"),
                Node::new(2, 1, "A").with_slug("/x"),
                Node::new(3, 2, "B").with_slug("/x/y"),
            ]);
            let report = Synchronizer::new(&store, &store, &settings())
                .synchronize(NodeId::new(1), &admin())
                .unwrap();

            let correlations: Vec<_> = store
                .operations()
                .into_iter()
                .filter_map(|op| match op {
                    StoreOperation::WriteSlug { correlation, .. } => Some(correlation),
                    _ => None,
                })
                .collect();
            assert_eq!(correlations.len(), 2);
            assert!(correlations.iter().all(|c| *c == report.correlation.slug));
        }
    }

    mod parent_slugs {
        use super::*;

        #[test]
        fn falls_back_to_default() {
            let mut slugs = ParentSlugs::new("/company".to_string());
            slugs.set(de(), "/firma".to_string());

            assert_eq!(slugs.get(de()), "/firma");
            assert_eq!(slugs.get(LanguageId::new(2)), "/company");
            assert_eq!(slugs.get(LanguageId::DEFAULT), "/company");
        }
    }
}
