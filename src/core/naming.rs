//! core::naming
//!
//! Segment normalization: free text to canonical path segment.
//!
//! # Pipeline
//!
//! [`SegmentNormalizer::normalize`] applies, in order:
//!
//! 1. Unicode lowercasing
//! 2. Markup tag stripping
//! 3. Separator runs (whitespace, NBSP, `-`, `+`, and `_` unless preserved)
//!    become a single fallback character
//! 4. NFC normalization (only when the text is not already NFC)
//! 5. The configured literal replacement table
//! 6. Removal of everything that is not a letter, mark, ASCII digit, `/`,
//!    the fallback character (or `_` when preserved)
//! 7. Collapsing runs of the fallback character
//! 8. Lowercasing again, re-composing to NFC if step 6 split a sequence
//! 9. Trimming leading/trailing fallback characters and slashes
//! 10. Re-appending a trailing `/` when the trimmed text ended with one
//!
//! The forward slash is structural and never replaced, so a "segment" may
//! itself describe a multi-part path.
//!
//! # Invariants
//!
//! - Deterministic and side-effect free
//! - Idempotent: `normalize(normalize(x)) == normalize(x)`
//!
//! # Example
//!
//! ```
//! use slugsync::core::naming::normalize;
//!
//! assert_eq!(normalize("Hello World", '-'), "hello-world");
//! assert_eq!(normalize("<b>Über</b> uns + mehr", '-'), "über-uns-mehr");
//! assert_eq!(normalize("  --  ", '-'), "");
//! ```

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::{is_nfc, UnicodeNormalization};

/// The fallback character used when none is configured.
pub const DEFAULT_FALLBACK: char = '-';

/// Options controlling [`SegmentNormalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerOptions {
    /// Character that replaces separator runs.
    pub fallback: char,
    /// Keep `_` as a literal character instead of treating it as a separator.
    pub preserve_underscore: bool,
    /// Literal replacements applied after NFC normalization, in order.
    pub replacements: Vec<(String, String)>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK,
            preserve_underscore: false,
            replacements: Vec::new(),
        }
    }
}

/// Turns free text into a canonical path segment.
///
/// # Example
///
/// ```
/// use slugsync::core::naming::{NormalizerOptions, SegmentNormalizer};
///
/// let normalizer = SegmentNormalizer::new(NormalizerOptions {
///     replacements: vec![("ä".into(), "ae".into())],
///     ..Default::default()
/// });
/// assert_eq!(normalizer.normalize("Über Bäume"), "über-baeume");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SegmentNormalizer {
    options: NormalizerOptions,
}

impl SegmentNormalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    /// Get the active options.
    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Get the fallback character.
    pub fn fallback(&self) -> char {
        self.options.fallback
    }

    /// Normalize free text into a segment.
    ///
    /// Returns an empty string when nothing survives normalization; the
    /// caller decides what default to use.
    pub fn normalize(&self, text: &str) -> String {
        let fallback = self.options.fallback;

        let lowered = text.to_lowercase();
        let untagged = strip_tags(&lowered);
        let separated = self.replace_separators(&untagged);

        let mut composed = if is_nfc(&separated) {
            separated
        } else {
            separated.nfc().collect()
        };

        for (from, to) in &self.options.replacements {
            if !from.is_empty() {
                composed = composed.replace(from.as_str(), to);
            }
        }

        let filtered: String = composed.chars().filter(|&c| self.keeps(c)).collect();
        let collapsed = collapse_runs(&filtered, fallback);

        let mut lowered = collapsed.to_lowercase();
        if !is_nfc(&lowered) {
            lowered = lowered.nfc().collect();
        }

        let trimmed = lowered.trim_matches(|c| c == fallback || c == '/');
        if !trimmed.is_empty() && lowered.ends_with('/') {
            format!("{trimmed}/")
        } else {
            trimmed.to_string()
        }
    }

    fn is_separator(&self, c: char) -> bool {
        c.is_whitespace()
            || c == '\u{00A0}'
            || c == '-'
            || c == '+'
            || (c == '_' && !self.options.preserve_underscore)
    }

    fn replace_separators(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut in_run = false;
        for c in text.chars() {
            if self.is_separator(c) {
                if !in_run {
                    result.push(self.options.fallback);
                    in_run = true;
                }
            } else {
                result.push(c);
                in_run = false;
            }
        }
        result
    }

    fn keeps(&self, c: char) -> bool {
        c.is_alphabetic()
            || is_combining_mark(c)
            || c.is_ascii_digit()
            || c == '/'
            || c == self.options.fallback
            || (c == '_' && self.options.preserve_underscore)
    }
}

/// Normalize text with default options and the given fallback character.
pub fn normalize(text: &str, fallback: char) -> String {
    SegmentNormalizer::new(NormalizerOptions {
        fallback,
        ..Default::default()
    })
    .normalize(text)
}

/// Remove `<...>` markup. An unclosed `<` swallows the rest of the input.
fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

fn collapse_runs(text: &str, ch: char) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous = None;
    for c in text.chars() {
        if c == ch && previous == Some(ch) {
            continue;
        }
        result.push(c);
        previous = Some(c);
    }
    result
}
