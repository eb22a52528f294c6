//! core::policy
//!
//! Lock and exclusion policies for the subtree walk.
//!
//! # Semantics
//!
//! - A node is locked only when the lock feature is enabled and the node's
//!   own `locked` flag is set. Locks are not inherited.
//! - With lock-descendants mode on, a locked node also stops the walk: its
//!   subtree is neither updated nor evaluated.
//! - An excluded node (by type tag) is skipped, but the walk always
//!   continues into its children.
//!
//! # Example
//!
//! ```
//! use slugsync::core::policy::{Decision, ExclusionPolicy, LockPolicy, decide};
//! use slugsync::core::site::Node;
//!
//! let lock = LockPolicy::new(true, false);
//! let exclusion = ExclusionPolicy::new(["spacer"]);
//!
//! let locked = Node::new(2, 1, "Locked").with_locked(true);
//! assert_eq!(decide(&lock, &exclusion, &locked), Decision::Locked { descend: true });
//!
//! let spacer = Node::new(3, 1, "Spacer").with_type_tag("spacer");
//! assert_eq!(decide(&lock, &exclusion, &spacer), Decision::Excluded);
//! ```

use std::collections::BTreeSet;

use crate::core::site::Node;

/// Resolves whether a node is exempt from regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    enabled: bool,
    lock_descendants: bool,
}

impl LockPolicy {
    /// Create a lock policy.
    pub fn new(enabled: bool, lock_descendants: bool) -> Self {
        Self {
            enabled,
            lock_descendants,
        }
    }

    /// Lock feature off: nothing is ever locked.
    pub fn disabled() -> Self {
        Self::new(false, false)
    }

    /// Check whether the node is locked.
    pub fn is_locked(&self, node: &Node) -> bool {
        self.enabled && node.locked
    }

    /// Check whether the walk must stop at this node.
    pub fn halts_descent(&self, node: &Node) -> bool {
        self.lock_descendants && self.is_locked(node)
    }

    /// Whether lock-descendants mode is on.
    pub fn locks_descendants(&self) -> bool {
        self.lock_descendants
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self::new(true, false)
    }
}

/// Resolves whether a node type has no slug of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    types: BTreeSet<String>,
}

impl ExclusionPolicy {
    /// Create a policy excluding the given type tags.
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether the node's type is excluded.
    pub fn is_excluded(&self, node: &Node) -> bool {
        self.types.contains(&node.type_tag)
    }

    /// The excluded type tags, sorted.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }
}

/// What the walk does with one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Skipped; children are still visited.
    Excluded,
    /// Skipped; children are visited only when `descend` is set.
    Locked { descend: bool },
    /// Slug is regenerated.
    Manage,
}

impl Decision {
    /// Whether the walk continues into the node's children.
    pub fn descends(self) -> bool {
        match self {
            Decision::Excluded | Decision::Manage => true,
            Decision::Locked { descend } => descend,
        }
    }

    /// Whether the node counts as skipped.
    pub fn is_skip(self) -> bool {
        !matches!(self, Decision::Manage)
    }
}

/// Classify a node. Exclusion is checked before locking.
pub fn decide(lock: &LockPolicy, exclusion: &ExclusionPolicy, node: &Node) -> Decision {
    if exclusion.is_excluded(node) {
        Decision::Excluded
    } else if lock.is_locked(node) {
        Decision::Locked {
            descend: !lock.halts_descent(node),
        }
    } else {
        Decision::Manage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: u32) -> Node {
        Node::new(id, 1, "Page")
    }

    mod lock_policy {
        use super::*;

        #[test]
        fn requires_flag_and_feature() {
            let node = page(2).with_locked(true);
            assert!(LockPolicy::new(true, false).is_locked(&node));
            assert!(!LockPolicy::disabled().is_locked(&node));
            assert!(!LockPolicy::default().is_locked(&page(3)));
        }

        #[test]
        fn halts_only_in_descendant_mode() {
            let node = page(2).with_locked(true);
            assert!(!LockPolicy::new(true, false).halts_descent(&node));
            assert!(LockPolicy::new(true, true).halts_descent(&node));
            assert!(!LockPolicy::new(true, true).halts_descent(&page(3)));
        }

        #[test]
        fn hidden_does_not_lock() {
            let node = page(2).with_hidden(true);
            assert!(!LockPolicy::default().is_locked(&node));
        }
    }

    mod exclusion_policy {
        use super::*;

        #[test]
        fn matches_type_tag() {
            let policy = ExclusionPolicy::new(["spacer", "folder"]);
            assert!(policy.is_excluded(&page(2).with_type_tag("folder")));
            assert!(!policy.is_excluded(&page(2)));
        }

        #[test]
        fn empty_set_excludes_nothing() {
            let policy = ExclusionPolicy::default();
            assert!(!policy.is_excluded(&page(2).with_type_tag("spacer")));
        }
    }

    mod decide {
        use super::*;

        #[test]
        fn exclusion_wins_over_lock() {
            let node = page(2).with_type_tag("spacer").with_locked(true);
            let decision = decide(
                &LockPolicy::new(true, true),
                &ExclusionPolicy::new(["spacer"]),
                &node,
            );
            assert_eq!(decision, Decision::Excluded);
            assert!(decision.descends());
        }

        #[test]
        fn locked_descent_follows_mode() {
            let node = page(2).with_locked(true);
            let exclusion = ExclusionPolicy::default();

            let open = decide(&LockPolicy::new(true, false), &exclusion, &node);
            assert!(open.is_skip());
            assert!(open.descends());

            let closed = decide(&LockPolicy::new(true, true), &exclusion, &node);
            assert!(closed.is_skip());
            assert!(!closed.descends());
        }

        #[test]
        fn plain_node_is_managed() {
            let decision = decide(&LockPolicy::default(), &ExclusionPolicy::default(), &page(2));
            assert_eq!(decision, Decision::Manage);
            assert!(!decision.is_skip());
        }
    }
}
