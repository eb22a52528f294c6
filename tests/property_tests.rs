//! Property-based tests for normalization, path composition, and prefixes.
//!
//! These tests use proptest to verify invariants hold across randomly
//! generated inputs.

use proptest::prelude::*;

use slugsync::core::config::schema::parse_fallback;
use slugsync::core::config::Settings;
use slugsync::core::naming::normalize;
use slugsync::core::paths::{combine, last_segment, parent_path};
use slugsync::core::permission::validate_slug_change;
use slugsync::engine::SlugGenerator;

/// Characters editors actually type into titles, including markup,
/// combining accents, and non-breaking spaces.
fn title_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        prop::sample::select(vec![
            ' ', '\u{a0}', '\t', '-', '+', '_', '/', '<', '>', '&', '!', '?', '.', ',', '\'',
            'ä', 'Ö', 'ü', 'ß', 'é', 'È', 'ç', 'ø', 'Å', '\u{301}', '\u{308}', 'Σ', 'λ', 'Ж',
            'я', '中', '文',
        ]),
    ]
}

fn title() -> impl Strategy<Value = String> {
    prop::collection::vec(title_char(), 0..40).prop_map(|chars| chars.into_iter().collect())
}

/// Every fallback character the config validator accepts, from ASCII
/// punctuation and a few non-ASCII symbols.
fn accepted_fallback() -> impl Strategy<Value = char> {
    let candidates: Vec<char> = (0x21u8..0x7f)
        .map(char::from)
        .chain([
            '\u{a1}', '\u{a7}', '\u{ab}', '\u{b7}', '\u{bb}', '\u{bf}', '\u{2013}', '\u{2022}',
            '\u{37e}',
        ])
        .filter(|c| parse_fallback(&c.to_string()).is_ok())
        .collect();
    prop::sample::select(candidates)
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}(-[a-z0-9]{1,6}){0,2}"
}

/// Well-formed non-root slug: one or more segments.
fn slug() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..6).prop_map(|segments| format!("/{}", segments.join("/")))
}

proptest! {
    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_is_idempotent(text in title()) {
        let once = normalize(&text, '-');
        prop_assert_eq!(normalize(&once, '-'), once.clone());
    }

    /// Idempotence holds for other fallback characters too.
    #[test]
    fn normalize_is_idempotent_with_underscore(text in title()) {
        let once = normalize(&text, '_');
        prop_assert_eq!(normalize(&once, '_'), once.clone());
    }

    /// Idempotence holds for any fallback the config accepts.
    #[test]
    fn normalize_is_idempotent_for_accepted_fallbacks(
        text in title(),
        fallback in accepted_fallback(),
    ) {
        let once = normalize(&text, fallback);
        prop_assert_eq!(normalize(&once, fallback), once.clone());
    }

    /// Output is lowercase with no leading, trailing, or doubled separator.
    #[test]
    fn normalized_segment_shape(text in title()) {
        let out = normalize(&text, '-');
        let body = out.trim_end_matches('/');
        prop_assert!(!body.starts_with('-'));
        prop_assert!(!body.ends_with('-'));
        prop_assert!(!body.starts_with('/'));
        prop_assert!(!out.contains("--"));
        prop_assert_eq!(out.to_lowercase(), out.clone());
    }

    /// `combine(parent_path(s), last_segment(s)) == s`.
    #[test]
    fn compose_round_trip(s in slug()) {
        prop_assert_eq!(combine(&parent_path(&s), last_segment(&s)), s.clone());
    }

    /// A stale prefix on the child is always replaced by the parent.
    #[test]
    fn combine_replaces_stale_prefix(parent in slug(), stale in slug(), leaf in segment()) {
        let child = format!("{stale}/{leaf}");
        prop_assert_eq!(combine(&parent, &child), format!("{parent}/{leaf}"));
    }

    /// Anything below the locked prefix validates.
    #[test]
    fn edits_below_prefix_validate(prefix in slug(), rest in slug()) {
        let slug = format!("{prefix}{rest}");
        prop_assert!(validate_slug_change(&prefix, &slug));
        prop_assert!(validate_slug_change("", &slug));
    }

    /// Moving any ancestor segment of the prefix is rejected.
    #[test]
    fn edits_leaving_prefix_rejected(prefix in slug(), rest in slug()) {
        let moved = format!("/moved-{}", prefix.trim_start_matches('/'));
        let slug = format!("{moved}{rest}");
        prop_assert!(!validate_slug_change(&prefix, &slug));
    }

    /// A normalized manual slug is empty or rooted, without empty segments.
    #[test]
    fn normalized_paths_are_rooted(text in title()) {
        let generator = SlugGenerator::new(&Settings::default());
        let path = generator.normalize_path(&text);
        prop_assert!(path.is_empty() || path.starts_with('/'));
        prop_assert!(!path.contains("//"));
        prop_assert_eq!(generator.normalize_path(&path), path.clone());
    }
}
