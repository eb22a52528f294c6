//! engine
//!
//! Slug synchronization over a content tree.
//!
//! # Architecture
//!
//! The [`Synchronizer`] is the single entry point. It is built from the two
//! store traits and the resolved [`Settings`](crate::core::config::Settings),
//! and every operation takes an explicit [`Context`] describing the request:
//!
//! ```text
//! synchronize(root)      walk the subtree below root       (elevated)
//! rename(node, title)    retitle, regenerate, walk         (can_edit)
//! edit_slug(node, slug)  set slug by hand, walk            (can_edit + prefix)
//! revert(subject)        undo a past run                   (elevated)
//! ```
//!
//! # Invariants
//!
//! - Each operation is one run with one correlation group
//! - All writes go through the store traits
//! - A store failure aborts the run; nothing is rolled back
//!
//! # Modules
//!
//! - [`generator`] - Slug generation from source fields
//! - [`redirect`] - Redirect table upkeep after a slug change
//! - [`sync`] - The subtree walk
//! - [`edit`] - Rename and manual slug edits
//! - [`revert`] - Grouped revert
//! - [`trigger`] - Response body for outside callers

pub mod edit;
pub mod generator;
pub mod redirect;
pub mod revert;
pub mod sync;
pub mod trigger;

pub use edit::EditError;
pub use generator::{PostModifier, SlugGenerator};
pub use redirect::{GuardOutcome, RedirectGuard};
pub use revert::{RevertError, RevertReport, RevertScope};
pub use sync::{SyncError, SyncReport, Synchronizer};
pub use trigger::{trigger, Correlations, TriggerResponse};

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    /// Holds the elevated capability (synchronize, revert, bypass prefixes).
    pub admin: bool,
}

impl Actor {
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: true,
        }
    }

    pub fn editor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: false,
        }
    }
}

/// Request-scoped values passed into every engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub actor: Actor,
    /// Host new redirects are filed under. Falls back to the configured host.
    pub host: Option<String>,
    /// Skip redirect creation for this request.
    pub suppress_redirects: bool,
}

impl Context {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            host: None,
            suppress_redirects: false,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn suppressing_redirects(mut self) -> Self {
        self.suppress_redirects = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod context {
        use super::*;

        #[test]
        fn default_values() {
            let ctx = Context::new(Actor::editor("eve"));
            assert_eq!(ctx.actor.name, "eve");
            assert!(!ctx.actor.admin);
            assert!(ctx.host.is_none());
            assert!(!ctx.suppress_redirects);
        }

        #[test]
        fn builders() {
            let ctx = Context::new(Actor::admin("ada"))
                .with_host("example.org")
                .suppressing_redirects();
            assert!(ctx.actor.admin);
            assert_eq!(ctx.host.as_deref(), Some("example.org"));
            assert!(ctx.suppress_redirects);
        }
    }
}
