//! core::paths
//!
//! Slug path arithmetic.
//!
//! # Overview
//!
//! A slug is an absolute path: it starts with `/`, uses `/` between
//! segments, and is empty only for the tree root. These helpers combine a
//! parent path with a child segment and take slugs apart again.
//!
//! # Invariants
//!
//! For any well-formed non-root slug `s`:
//!
//! ```
//! use slugsync::core::paths::{combine, last_segment, parent_path};
//!
//! let s = "/home/department/institute";
//! assert_eq!(combine(&parent_path(s), last_segment(s)), s);
//! ```

/// Combine a parent path with the final segment of `child`.
///
/// Any stale parent prefix on `child` is dropped: only its last segment is
/// kept. Slashes at the join point are collapsed to exactly one. An empty
/// parent (the tree root) yields `/segment`.
///
/// # Example
///
/// ```
/// use slugsync::core::paths::combine;
///
/// assert_eq!(combine("/parent-page", "/old-parent/child-page"), "/parent-page/child-page");
/// assert_eq!(combine("", "/child"), "/child");
/// assert_eq!(combine("/parent/", "child"), "/parent/child");
/// ```
pub fn combine(parent: &str, child: &str) -> String {
    join(parent, last_segment(child))
}

/// Join a parent path with a segment, keeping every part of the segment.
///
/// Unlike [`combine`], a multi-part segment such as `a/b` is kept whole,
/// and a trailing slash on the segment survives.
///
/// # Example
///
/// ```
/// use slugsync::core::paths::join;
///
/// assert_eq!(join("/docs", "api/v2"), "/docs/api/v2");
/// assert_eq!(join("/", "section/"), "/section/");
/// ```
pub fn join(parent: &str, segment: &str) -> String {
    let parent = parent.trim_matches('/');
    let segment = segment.trim_start_matches('/');

    let mut result = String::with_capacity(parent.len() + segment.len() + 2);
    if !parent.is_empty() {
        result.push('/');
        result.push_str(parent);
    }
    if !segment.is_empty() {
        result.push('/');
        result.push_str(segment);
    }
    if result.is_empty() {
        result.push('/');
    }
    result
}

/// Get the final segment of a slug, or an empty string for a blank slug.
///
/// # Example
///
/// ```
/// use slugsync::core::paths::last_segment;
///
/// assert_eq!(last_segment("/parent/child/"), "child");
/// assert_eq!(last_segment(""), "");
/// ```
pub fn last_segment(slug: &str) -> &str {
    slug.trim_matches('/').rsplit('/').next().unwrap_or("")
}

/// Get the path of a slug's parent, or an empty string for a top-level slug.
///
/// # Example
///
/// ```
/// use slugsync::core::paths::parent_path;
///
/// assert_eq!(parent_path("/home/department/institute"), "/home/department");
/// assert_eq!(parent_path("/home"), "");
/// ```
pub fn parent_path(slug: &str) -> String {
    let trimmed = slug.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) => format!("/{parent}"),
        None => String::new(),
    }
}

/// Number of non-empty segments in a slug.
pub fn segment_count(slug: &str) -> usize {
    segments(slug).count()
}

/// The first `count` segments of `slug` as a path, or `""` for zero.
///
/// # Example
///
/// ```
/// use slugsync::core::paths::prefix_segments;
///
/// assert_eq!(prefix_segments("/a/b/c", 2), "/a/b");
/// assert_eq!(prefix_segments("/a/b/c", 0), "");
/// assert_eq!(prefix_segments("/a", 5), "/a");
/// ```
pub fn prefix_segments(slug: &str, count: usize) -> String {
    segments(slug).take(count).fold(String::new(), |mut acc, s| {
        acc.push('/');
        acc.push_str(s);
        acc
    })
}

/// Tidy a hand-written slug: leading slash, no empty segments.
///
/// A trailing slash is kept when the input had one and is not the root.
///
/// # Example
///
/// ```
/// use slugsync::core::paths::clean;
///
/// assert_eq!(clean("home//about"), "/home/about");
/// assert_eq!(clean("/home/about/"), "/home/about/");
/// assert_eq!(clean("//"), "/");
/// ```
pub fn clean(slug: &str) -> String {
    let joined = prefix_segments(slug, usize::MAX);
    if joined.is_empty() {
        return "/".to_string();
    }
    if slug.ends_with('/') {
        format!("{joined}/")
    } else {
        joined
    }
}

/// Compare two slugs ignoring a trailing slash.
pub fn same_path(a: &str, b: &str) -> bool {
    without_trailing_slash(a) == without_trailing_slash(b)
}

/// Strip trailing slashes, mapping the root to `""`.
pub fn without_trailing_slash(slug: &str) -> &str {
    slug.trim_end_matches('/')
}

/// Check that `slug` equals `prefix` or continues it at a segment boundary.
///
/// An empty prefix matches everything.
///
/// # Example
///
/// ```
/// use slugsync::core::paths::has_path_prefix;
///
/// assert!(has_path_prefix("/home/department/new", "/home/department"));
/// assert!(!has_path_prefix("/home/department-b", "/home/department"));
/// assert!(has_path_prefix("/anything", ""));
/// ```
pub fn has_path_prefix(slug: &str, prefix: &str) -> bool {
    let prefix = without_trailing_slash(prefix);
    if prefix.is_empty() {
        return true;
    }
    match slug.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn segments(slug: &str) -> impl Iterator<Item = &str> {
    slug.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod combine {
        use super::*;

        #[test]
        fn replaces_stale_prefix() {
            assert_eq!(
                combine("/parent-page", "/old-parent/child-page"),
                "/parent-page/child-page"
            );
        }

        #[test]
        fn root_parent() {
            assert_eq!(combine("", "/child"), "/child");
            assert_eq!(combine("/", "/child"), "/child");
        }

        #[test]
        fn collapses_join_slashes() {
            assert_eq!(combine("/parent//", "//child"), "/parent/child");
            assert_eq!(combine("/parent/", "child/"), "/parent/child");
        }

        #[test]
        fn adds_missing_leading_slash() {
            assert_eq!(combine("parent", "child"), "/parent/child");
        }

        #[test]
        fn empty_child_yields_parent() {
            assert_eq!(combine("/parent", ""), "/parent");
            assert_eq!(combine("", ""), "/");
        }
    }

    mod join {
        use super::*;

        #[test]
        fn keeps_multi_part_segment() {
            assert_eq!(join("/docs", "api/v2"), "/docs/api/v2");
        }

        #[test]
        fn keeps_trailing_slash() {
            assert_eq!(join("/docs", "guide/"), "/docs/guide/");
        }
    }

    mod last_segment {
        use super::*;

        #[test]
        fn basics() {
            assert_eq!(last_segment("/parent/child/"), "child");
            assert_eq!(last_segment("/parent/child"), "child");
            assert_eq!(last_segment("child"), "child");
        }

        #[test]
        fn blank() {
            assert_eq!(last_segment(""), "");
            assert_eq!(last_segment("/"), "");
        }
    }

    mod parent_path {
        use super::*;

        #[test]
        fn basics() {
            assert_eq!(parent_path("/a/b/c"), "/a/b");
            assert_eq!(parent_path("/a/b/c/"), "/a/b");
            assert_eq!(parent_path("/a"), "");
            assert_eq!(parent_path(""), "");
            assert_eq!(parent_path("/"), "");
        }
    }

    #[test]
    fn roundtrip_samples() {
        for s in ["/a", "/a/b", "/home/department/institute", "/x/y/z/w"] {
            assert_eq!(combine(&parent_path(s), last_segment(s)), s);
        }
    }

    #[test]
    fn segment_helpers() {
        assert_eq!(segment_count("/a/b/c"), 3);
        assert_eq!(segment_count("/"), 0);
        assert_eq!(segment_count(""), 0);
        assert_eq!(prefix_segments("/a/b/c", 1), "/a");
    }

    #[test]
    fn clean_inputs() {
        assert_eq!(clean("a/b"), "/a/b");
        assert_eq!(clean("/a///b/"), "/a/b/");
        assert_eq!(clean(""), "/");
    }

    #[test]
    fn same_path_ignores_trailing_slash() {
        assert!(same_path("/page-a/", "/page-a"));
        assert!(same_path("/page-a", "/page-a"));
        assert!(!same_path("/page-a", "/page-b"));
    }

    #[test]
    fn path_prefix_boundaries() {
        assert!(has_path_prefix("/home/department", "/home/department"));
        assert!(has_path_prefix("/home/department/x", "/home/department/"));
        assert!(!has_path_prefix("/home/other-department/x", "/home/department"));
        assert!(!has_path_prefix("/home", "/home/department"));
    }
}
