//! engine::redirect
//!
//! Keeps the redirect table consistent after a slug change.
//!
//! # Rules
//!
//! After a node's slug changes to `new_slug` on host `h`:
//! 1. Every live redirect on `h` whose source path is `new_slug` is
//!    deleted, since it would shadow the live node. Other hosts are never
//!    touched.
//! 2. The candidate redirect from the old slug is stored, unless its source
//!    path is `new_slug` itself; that one is stored already deleted.
//!
//! Paths are compared ignoring a trailing slash.

use tracing::debug;

use crate::core::paths::same_path;
use crate::core::site::{NewRedirect, Redirect};
use crate::store::{RedirectStore, StoreError};

/// What the guard did for one slug change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuardOutcome {
    /// The stored candidate, if there was one.
    pub stored: Option<Redirect>,
    /// Whether the candidate pointed at its own target path.
    pub self_reference: bool,
    /// Live redirects removed because they claimed the new slug.
    pub stale_removed: usize,
}

/// Applies the redirect rules through a [`RedirectStore`].
pub struct RedirectGuard<'a> {
    store: &'a dyn RedirectStore,
}

impl<'a> RedirectGuard<'a> {
    pub fn new(store: &'a dyn RedirectStore) -> Self {
        Self { store }
    }

    /// Whether `candidate` would redirect the new slug to itself.
    pub fn is_self_reference(candidate: &NewRedirect, new_slug: &str) -> bool {
        same_path(&candidate.source_path, new_slug)
    }

    /// React to a persisted slug change.
    ///
    /// Store failures are returned as-is; the rules themselves never fail.
    pub fn apply(
        &self,
        candidate: Option<NewRedirect>,
        new_slug: &str,
        host: &str,
    ) -> Result<GuardOutcome, StoreError> {
        let stale_removed = self.store.delete(new_slug, host)?;
        if stale_removed > 0 {
            debug!(slug = new_slug, host, stale_removed, "removed redirects shadowing new slug");
        }

        let Some(candidate) = candidate else {
            return Ok(GuardOutcome {
                stale_removed,
                ..GuardOutcome::default()
            });
        };

        let self_reference = Self::is_self_reference(&candidate, new_slug);
        let stored = if self_reference {
            debug!(
                source = %candidate.source_path,
                target = %candidate.target,
                "redirect would point at itself; storing it deleted"
            );
            self.store.mark_deleted(candidate)?
        } else {
            self.store.create(candidate)?
        };

        Ok(GuardOutcome {
            stored: Some(stored),
            self_reference,
            stale_removed,
        })
    }
}
