//! engine::revert
//!
//! Grouped revert of a past run.
//!
//! # Semantics
//!
//! Every slug written under a correlation subject is restored to its value
//! before the run, newest write first. A node whose slug changed again
//! since the run is left alone and reported as a conflict. Restoring a slug
//! removes live redirects on the request host that claim it.
//!
//! With [`RevertScope::SlugAndRedirects`], every redirect the run created is
//! deleted as well.
//!
//! A revert is itself a run with its own correlation group, so it can be
//! reverted in turn.

use thiserror::Error;
use tracing::{info, info_span, warn};

use super::redirect::RedirectGuard;
use super::sync::Synchronizer;
use super::Context;
use crate::core::ops::{CorrelationError, CorrelationGroup};
use crate::core::types::UtcTimestamp;
use crate::store::StoreError;

/// What a revert undoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevertScope {
    /// Restore slugs only.
    SlugOnly,
    /// Restore slugs and delete the redirects the run created.
    #[default]
    SlugAndRedirects,
}

/// Outcome of a revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertReport {
    /// Slugs restored.
    pub restored: usize,
    /// Writes not restored because the slug changed since.
    pub conflicts: usize,
    /// Redirects deleted.
    pub redirects_removed: usize,
    /// Group stamped on the revert's own writes.
    pub correlation: CorrelationGroup,
}

/// Errors from a revert.
#[derive(Debug, Error)]
pub enum RevertError {
    #[error("actor '{actor}' may not revert runs")]
    PermissionDenied { actor: String },

    #[error("no slug changes recorded under '{0}'")]
    UnknownSubject(String),

    #[error(transparent)]
    InvalidSubject(#[from] CorrelationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<'s> Synchronizer<'s> {
    /// Undo the run recorded under `subject`.
    pub fn revert(
        &self,
        subject: &str,
        scope: RevertScope,
        ctx: &Context,
    ) -> Result<RevertReport, RevertError> {
        let span = info_span!("slugsync::revert", subject, actor = %ctx.actor.name);
        let _enter = span.enter();

        if !ctx.actor.admin {
            return Err(RevertError::PermissionDenied {
                actor: ctx.actor.name.clone(),
            });
        }

        let reverted = CorrelationGroup::from_subject(subject)?;
        let history = self.records.slug_history(reverted.subject())?;
        let Some(first) = history.first() else {
            return Err(RevertError::UnknownSubject(subject.to_string()));
        };

        let group = CorrelationGroup::create(first.node, &UtcTimestamp::now());
        let guard = RedirectGuard::new(self.redirects);
        let host = self.host(ctx);
        let mut report = RevertReport {
            restored: 0,
            conflicts: 0,
            redirects_removed: 0,
            correlation: group,
        };

        for change in history.iter().rev() {
            let current = self.records.get_node(change.node)?;
            let Some(node) = current.filter(|node| node.slug == change.new_slug) else {
                warn!(
                    node = %change.node,
                    expected = %change.new_slug,
                    "slug changed since the run; not restored"
                );
                report.conflicts += 1;
                continue;
            };

            self.records
                .write_slug(node.id, &change.old_slug, &report.correlation.slug)?;
            report.restored += 1;
            if !change.old_slug.is_empty() {
                report.redirects_removed += guard.apply(None, &change.old_slug, host)?.stale_removed;
            }
        }

        if scope == RevertScope::SlugAndRedirects {
            report.redirects_removed += self.redirects.delete_by_correlation(&reverted.redirect)?;
        }

        info!(
            restored = report.restored,
            conflicts = report.conflicts,
            redirects_removed = report.redirects_removed,
            "revert finished"
        );
        Ok(report)
    }
}
