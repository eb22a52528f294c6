//! engine::generator
//!
//! Slug generation from a node's source fields.
//!
//! # Pipeline
//!
//! 1. Take the first configured source field with non-blank text
//! 2. Normalize it into a segment
//! 3. Run the post-modifiers, in order
//! 4. Fall back to `default-<hash>` if nothing is left
//! 5. Join under the parent slug (unless parent prefixing is off)
//!
//! Nodes that do not regenerate (sync disabled for the node, or globally)
//! keep their own last segment and are only re-prefixed.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::core::config::Settings;
use crate::core::naming::SegmentNormalizer;
use crate::core::paths;
use crate::core::site::Node;

/// A pure transform applied to every generated segment.
pub type PostModifier = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Builds slugs for nodes.
pub struct SlugGenerator {
    normalizer: SegmentNormalizer,
    source_fields: Vec<String>,
    prefix_parent_slug: bool,
    synchronize: bool,
    post_modifiers: Vec<PostModifier>,
}

impl fmt::Debug for SlugGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlugGenerator")
            .field("normalizer", &self.normalizer)
            .field("source_fields", &self.source_fields)
            .field("prefix_parent_slug", &self.prefix_parent_slug)
            .field("synchronize", &self.synchronize)
            .field("post_modifiers", &self.post_modifiers.len())
            .finish()
    }
}

impl SlugGenerator {
    /// Create a generator from resolved settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            normalizer: SegmentNormalizer::new(settings.normalizer.clone()),
            source_fields: settings.source_fields.clone(),
            prefix_parent_slug: settings.prefix_parent_slug,
            synchronize: settings.synchronize,
            post_modifiers: Vec::new(),
        }
    }

    /// Append a post-modifier. Modifiers run in the order they were added.
    ///
    /// # Example
    ///
    /// ```
    /// use slugsync::core::config::Settings;
    /// use slugsync::core::site::Node;
    /// use slugsync::engine::generator::SlugGenerator;
    ///
    /// let generator = SlugGenerator::new(&Settings::default())
    ///     .with_post_modifier(|segment| format!("{segment}-2024"));
    /// let node = Node::new(2, 1, "Annual Report");
    /// assert_eq!(generator.generate(&node, "/reports"), "/reports/annual-report-2024");
    /// ```
    pub fn with_post_modifier<F>(mut self, modifier: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.post_modifiers.push(Box::new(modifier));
        self
    }

    pub fn normalizer(&self) -> &SegmentNormalizer {
        &self.normalizer
    }

    /// Whether the node's slug is rebuilt from its source fields.
    pub fn regenerates(&self, node: &Node) -> bool {
        self.synchronize && node.sync_enabled
    }

    /// The node's own segment, never empty.
    pub fn segment(&self, node: &Node) -> String {
        let source = self
            .source_fields
            .iter()
            .filter_map(|field| node.source_field(field))
            .find(|text| !text.trim().is_empty())
            .unwrap_or("");

        let normalized = self.normalizer.normalize(source);
        let modified = self
            .post_modifiers
            .iter()
            .fold(normalized, |segment, modifier| modifier(&segment));

        if modified.trim_matches('/').is_empty() {
            default_segment(node)
        } else {
            modified
        }
    }

    /// Build a fresh slug for the node under `parent_slug`.
    pub fn generate(&self, node: &Node, parent_slug: &str) -> String {
        let parent = if self.prefix_parent_slug {
            parent_slug
        } else {
            ""
        };
        paths::join(parent, &self.segment(node))
    }

    /// The slug the node should have under `parent_slug`.
    ///
    /// Regenerating nodes (and nodes that never had a slug) get a fresh
    /// slug; the others keep their last segment.
    pub fn target_slug(&self, node: &Node, parent_slug: &str) -> String {
        if self.regenerates(node) || node.slug.is_empty() {
            self.generate(node, parent_slug)
        } else if self.prefix_parent_slug {
            paths::combine(parent_slug, &node.slug)
        } else {
            node.slug.clone()
        }
    }

    /// Normalize a hand-written slug segment by segment.
    ///
    /// Returns `""` when nothing survives. A trailing slash is kept.
    pub fn normalize_path(&self, requested: &str) -> String {
        let segments: Vec<String> = requested
            .split('/')
            .map(|segment| self.normalizer.normalize(segment))
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.is_empty() {
            return String::new();
        }
        let mut slug = format!("/{}", segments.join("/"));
        if requested.trim_end().ends_with('/') {
            slug.push('/');
        }
        slug
    }
}

/// `default-` plus 10 hex characters of SHA-256 over the node's id and
/// source fields.
fn default_segment(node: &Node) -> String {
    let mut hasher = Sha256::new();
    hasher.update(node.id.to_string().as_bytes());
    hasher.update([0x1f]);
    hasher.update(node.title.as_bytes());
    hasher.update([0x1f]);
    hasher.update(node.nav_title.as_deref().unwrap_or("").as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("default-{}", &digest[..10])
}
