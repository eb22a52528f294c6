//! core::permission
//!
//! Permission-scoped path prefixes.
//!
//! # Overview
//!
//! An actor who may edit only part of a rootline must not move a node out
//! from under the ancestors they cannot touch. The *locked prefix* is the
//! part of a slug the actor cannot alter; every manual edit is checked
//! against it with [`validate_slug_change`].
//!
//! Chains are ordered nearest-first: the node (or its parent) first, the
//! tree root last.
//!
//! # Root pages
//!
//! Site roots (id 0, or any page hanging directly off the tree root) are
//! ignored when resolving the prefix, even when the oracle reports them
//! editable. Permissive root grants are a common misconfiguration and do
//! not count as a real grant.

use crate::core::paths::{has_path_prefix, parent_path, prefix_segments, segment_count};
use crate::core::site::Node;
use crate::core::types::NodeId;

/// Answers "can the current actor edit this node".
///
/// Any `Fn(&Node) -> bool` is an oracle.
///
/// # Example
///
/// ```
/// use slugsync::core::permission::PermissionOracle;
/// use slugsync::core::site::Node;
///
/// let only_even = |node: &Node| node.id.get() % 2 == 0;
/// assert!(only_even.can_edit(&Node::new(4, 1, "Four")));
/// assert!(!only_even.can_edit(&Node::new(5, 1, "Five")));
/// ```
pub trait PermissionOracle {
    /// Check whether the node may be edited.
    fn can_edit(&self, node: &Node) -> bool;
}

impl<F> PermissionOracle for F
where
    F: Fn(&Node) -> bool,
{
    fn can_edit(&self, node: &Node) -> bool {
        self(node)
    }
}

/// Oracle granting everything. Used for elevated actors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionOracle for AllowAll {
    fn can_edit(&self, _node: &Node) -> bool {
        true
    }
}

/// Oracle backed by an explicit list of granted node ids.
///
/// A translation is editable when its own id or the id of the
/// default-language node it translates is granted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantList {
    granted: Vec<NodeId>,
}

impl GrantList {
    /// Create a grant list.
    pub fn new(granted: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    /// The granted ids.
    pub fn granted(&self) -> &[NodeId] {
        &self.granted
    }
}

impl PermissionOracle for GrantList {
    fn can_edit(&self, node: &Node) -> bool {
        self.granted.contains(&node.id)
            || node
                .translation_parent_id
                .is_some_and(|parent| self.granted.contains(&parent))
    }
}

/// Ids of chain entries the actor may edit, in chain order.
pub fn editable_page_ids(chain: &[Node], oracle: &dyn PermissionOracle) -> Vec<NodeId> {
    chain
        .iter()
        .filter(|node| oracle.can_edit(node))
        .map(|node| node.id)
        .collect()
}

/// Compute the prefix of `current_slug` the actor may not alter.
///
/// Walks the chain nearest-first, ignoring site roots. Starting at the
/// nearest editable entry, the run of editable entries is followed upward;
/// the parent path of the topmost entry in that run is the locked prefix.
/// Returns `""` when nothing in the chain is editable.
///
/// When the chain's stored slugs have drifted from `current_slug` (for
/// example under a locked ancestor), the prefix is taken from
/// `current_slug` at the same depth instead.
///
/// # Example
///
/// ```
/// use slugsync::core::permission::locked_prefix;
/// use slugsync::core::site::Node;
/// use slugsync::core::types::NodeId;
///
/// let chain = vec![
///     Node::new(3, 2, "Department").with_slug("/home/department"),
///     Node::new(2, 1, "Home").with_slug("/home"),
///     Node::new(1, 0, "Root").with_slug("/"),
/// ];
/// let prefix = locked_prefix(&chain, &[NodeId::new(3)], "/home/department/institute");
/// assert_eq!(prefix, "/home");
/// ```
pub fn locked_prefix(chain: &[Node], editable: &[NodeId], current_slug: &str) -> String {
    let mut topmost: Option<&Node> = None;

    for node in chain {
        let grants = !is_site_root(node) && editable.contains(&node.id);
        if grants {
            topmost = Some(node);
        } else if topmost.is_some() {
            break;
        }
    }

    let Some(boundary) = topmost else {
        return String::new();
    };

    let prefix = parent_path(&boundary.slug);
    if current_slug.is_empty() || has_path_prefix(current_slug, &prefix) {
        prefix
    } else {
        prefix_segments(current_slug, segment_count(&prefix))
    }
}

/// Check that `new_slug` stays inside `locked_prefix`.
///
/// The comparison respects segment boundaries: `/home/department-b` does
/// not continue `/home/department`. An empty prefix always validates.
pub fn validate_slug_change(locked_prefix: &str, new_slug: &str) -> bool {
    has_path_prefix(new_slug, locked_prefix)
}

fn is_site_root(node: &Node) -> bool {
    node.id.is_tree_root() || node.parent_id.is_tree_root()
}
