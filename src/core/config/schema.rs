//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the site-level file;
//! every field is optional so a site file can override a single value.
//!
//! # Validation
//!
//! Values are validated after parsing: the fallback character must be a
//! single punctuation character other than `/`, `<` or `>`, replacement keys
//! must be non-empty, and admin names must be non-empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::is_nfc;

use super::ConfigError;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// admins = ["alice"]
///
/// [normalize]
/// fallback_character = "-"
/// preserve_underscore = false
/// replacements = { "ä" = "ae", "&" = "and" }
///
/// [generator]
/// source_fields = ["nav_title", "title"]
/// prefix_parent_slug = true
///
/// [policy]
/// synchronize = true
/// lock = true
/// lock_descendants = false
/// exclude_types = ["spacer", "folder", "recycler"]
///
/// [redirects]
/// create = true
/// host = "*"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    /// Actor names holding the elevated capability.
    pub admins: Option<Vec<String>>,

    pub normalize: Option<NormalizeConfig>,

    pub generator: Option<GeneratorConfig>,

    pub policy: Option<PolicyConfig>,

    pub redirects: Option<RedirectConfig>,
}

impl SettingsFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(admins) = &self.admins {
            if admins.iter().any(|name| name.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "admin names cannot be empty".to_string(),
                ));
            }
        }

        if let Some(normalize) = &self.normalize {
            normalize.validate()?;
        }

        if let Some(generator) = &self.generator {
            generator.validate()?;
        }

        Ok(())
    }
}

/// Segment normalization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeConfig {
    /// Character replacing separator runs (default `-`)
    pub fallback_character: Option<String>,

    /// Keep `_` literally instead of treating it as a separator
    pub preserve_underscore: Option<bool>,

    /// Literal replacements applied after Unicode normalization
    pub replacements: Option<BTreeMap<String, String>>,
}

impl NormalizeConfig {
    /// Validate normalization settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(fallback) = &self.fallback_character {
            parse_fallback(fallback)?;
        }
        if let Some(replacements) = &self.replacements {
            if replacements.keys().any(String::is_empty) {
                return Err(ConfigError::InvalidValue(
                    "replacement keys cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Parse and check a configured fallback character.
///
/// The fallback is emitted mid-pipeline, so it must survive every earlier
/// normalization step unchanged: no markup delimiters, whitespace,
/// combining marks, or characters that NFC or lowercasing would rewrite.
pub fn parse_fallback(value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_stable_fallback(c) => Ok(c),
        _ => Err(ConfigError::InvalidValue(format!(
            "invalid fallback_character '{}': must be a single punctuation character \
             other than '/', '<' or '>'",
            value
        ))),
    }
}

fn is_stable_fallback(c: char) -> bool {
    !c.is_alphanumeric()
        && !c.is_whitespace()
        && !c.is_control()
        && !matches!(c, '/' | '<' | '>')
        && !is_combining_mark(c)
        && is_nfc(c.encode_utf8(&mut [0; 4]))
        && c.to_lowercase().eq(std::iter::once(c))
}

/// Slug generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Source fields, first non-empty wins (default `["nav_title", "title"]`)
    pub source_fields: Option<Vec<String>>,

    /// Put the parent's slug in front of the generated segment
    pub prefix_parent_slug: Option<bool>,
}

impl GeneratorConfig {
    /// Known node source fields.
    pub const VALID_FIELDS: &'static [&'static str] = &["nav_title", "title"];

    /// Validate generator settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(fields) = &self.source_fields {
            if fields.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "source_fields cannot be empty".to_string(),
                ));
            }
            for field in fields {
                if !Self::VALID_FIELDS.contains(&field.as_str()) {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid source field '{}', must be one of: {}",
                        field,
                        Self::VALID_FIELDS.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Synchronization policy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Regenerate segments from source fields (default `true`)
    pub synchronize: Option<bool>,

    /// Honour per-node lock flags (default `true`)
    pub lock: Option<bool>,

    /// A locked node also stops the walk into its subtree (default `false`)
    pub lock_descendants: Option<bool>,

    /// Type tags with no slug of their own
    pub exclude_types: Option<Vec<String>>,
}

/// Redirect bookkeeping settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectConfig {
    /// Create a redirect from the old slug on every change (default `true`)
    pub create: Option<bool>,

    /// Source host for created redirects (default `*`)
    pub host: Option<String>,
}
