//! engine::edit
//!
//! Editor-facing changes: renaming a node and editing its slug by hand.
//!
//! Both run as one correlated unit: the node's own write, its redirect, and
//! the re-synchronization of its subtree share a [`CorrelationGroup`].
//!
//! # Permissions
//!
//! Editors need `can_edit` on the node. A manual slug must also stay inside
//! the node's locked prefix (see [`crate::core::permission`]). Elevated
//! actors bypass both checks.
//!
//! [`CorrelationGroup`]: crate::core::ops::CorrelationGroup

use thiserror::Error;
use tracing::{debug, info_span};

use super::sync::{Run, SyncError, SyncReport, Synchronizer};
use super::Context;
use crate::core::permission::{
    editable_page_ids, locked_prefix, validate_slug_change, PermissionOracle,
};
use crate::core::policy::{decide, Decision};
use crate::core::site::Node;
use crate::core::types::NodeId;
use crate::store::StoreError;

/// Errors from rename and manual slug edits.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("actor '{actor}' may not edit node {node}")]
    PermissionDenied { actor: String, node: NodeId },

    #[error("node {0} is locked")]
    Locked(NodeId),

    #[error("node {0} has an excluded type and no slug of its own")]
    Excluded(NodeId),

    #[error("slug is empty after normalization")]
    EmptySlug,

    #[error("slug '{requested}' leaves the locked prefix '{prefix}'")]
    OutsidePrefix { prefix: String, requested: String },
}

impl<'s> Synchronizer<'s> {
    /// Change a node's title and re-synchronize it and its subtree.
    ///
    /// A locked or excluded node keeps its slug; its subtree is still
    /// walked (unless lock-descendants mode stops it).
    pub fn rename(
        &self,
        id: NodeId,
        title: &str,
        ctx: &Context,
        oracle: &dyn PermissionOracle,
    ) -> Result<SyncReport, EditError> {
        let span = info_span!("slugsync::rename", node = %id, actor = %ctx.actor.name);
        let _enter = span.enter();

        let mut run = self.begin(ctx, id);
        let node = self.target(&run, id)?;
        ensure_can_edit(ctx, oracle, &node)?;

        let result = self.apply_rename(&mut run, node, title);
        Ok(self.finish(run, result)?)
    }

    /// Set a node's slug by hand and re-synchronize its subtree.
    ///
    /// The requested slug is normalized segment by segment first.
    pub fn edit_slug(
        &self,
        id: NodeId,
        requested: &str,
        ctx: &Context,
        oracle: &dyn PermissionOracle,
    ) -> Result<SyncReport, EditError> {
        let span = info_span!("slugsync::edit_slug", node = %id, actor = %ctx.actor.name);
        let _enter = span.enter();

        let mut run = self.begin(ctx, id);
        let node = self.target(&run, id)?;
        ensure_can_edit(ctx, oracle, &node)?;

        match decide(&self.lock, &self.exclusion, &node) {
            Decision::Excluded => return Err(EditError::Excluded(id)),
            Decision::Locked { .. } => return Err(EditError::Locked(id)),
            Decision::Manage => {}
        }

        let slug = self.generator.normalize_path(requested);
        if slug.is_empty() {
            return Err(EditError::EmptySlug);
        }

        if !ctx.actor.admin {
            let prefix = self
                .prefix_for(&node, oracle)
                .map_err(|source| run.failure(source))?;
            if !validate_slug_change(&prefix, &slug) {
                return Err(EditError::OutsidePrefix {
                    prefix,
                    requested: slug,
                });
            }
        }

        let result = self.apply_edit(&mut run, &node, &slug);
        Ok(self.finish(run, result)?)
    }

    /// The part of the node's slug the actor behind `oracle` may not alter.
    pub fn prefix_for(
        &self,
        node: &Node,
        oracle: &dyn PermissionOracle,
    ) -> Result<String, StoreError> {
        let mut chain = vec![node.clone()];
        chain.extend(self.records.rootline(node.id)?);
        let editable = editable_page_ids(&chain, oracle);
        Ok(locked_prefix(&chain, &editable, &node.slug))
    }

    fn apply_rename(&self, run: &mut Run<'_>, node: Node, title: &str) -> Result<(), StoreError> {
        self.records.write_title(node.id, title)?;
        debug!(node = %node.id, title, "title updated");
        let node = Node {
            title: title.to_string(),
            ..node
        };
        self.resync_node(run, &node)
    }

    fn apply_edit(&self, run: &mut Run<'_>, node: &Node, slug: &str) -> Result<(), StoreError> {
        if slug != node.slug {
            self.persist(run, node, slug)?;
        }
        self.descend(run, node, slug.to_string())
    }
}

fn ensure_can_edit(
    ctx: &Context,
    oracle: &dyn PermissionOracle,
    node: &Node,
) -> Result<(), EditError> {
    if ctx.actor.admin || oracle.can_edit(node) {
        Ok(())
    } else {
        Err(EditError::PermissionDenied {
            actor: ctx.actor.name.clone(),
            node: node.id,
        })
    }
}
