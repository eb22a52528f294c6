//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! slugsync has two configuration scopes:
//! - **Global**: user-level settings
//! - **Site**: overrides stored next to a site document
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Site config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$SLUGSYNC_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/slugsync/config.toml`
//! 3. `~/.slugsync/config.toml` (canonical write location)
//!
//! # Site Config Locations
//!
//! Relative to the directory holding the site document:
//! 1. `.slugsync/config.toml` (canonical)
//! 2. `slugsync.toml` (compatibility, warns)
//!
//! # Example
//!
//! ```no_run
//! use slugsync::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/srv/site"))).unwrap();
//! let settings = result.config.settings();
//! println!("fallback: {}", settings.normalizer.fallback);
//! println!("redirect host: {}", settings.redirect_host);
//! ```

pub mod schema;

pub use schema::{GeneratorConfig, NormalizeConfig, PolicyConfig, RedirectConfig, SettingsFile};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::naming::{NormalizerOptions, DEFAULT_FALLBACK};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Every settable key, in listing order.
pub const KEYS: &[&str] = &[
    "admins",
    "normalize.fallback_character",
    "normalize.preserve_underscore",
    "normalize.replacements",
    "generator.source_fields",
    "generator.prefix_parent_slug",
    "policy.synchronize",
    "policy.lock",
    "policy.lock_descendants",
    "policy.exclude_types",
    "redirects.create",
    "redirects.host",
];

/// Fully resolved settings handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub normalizer: NormalizerOptions,
    pub source_fields: Vec<String>,
    pub prefix_parent_slug: bool,
    pub synchronize: bool,
    pub lock: bool,
    pub lock_descendants: bool,
    pub exclude_types: Vec<String>,
    pub create_redirects: bool,
    pub redirect_host: String,
    pub admins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: site overrides global overrides defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: SettingsFile,
    pub site: Option<SettingsFile>,
    global_path: Option<PathBuf>,
    site_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `site_dir` is provided, also loads the site-level file.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. Missing files are not an error.
    pub fn load(site_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), site_dir)
    }

    /// Load with an explicit global config file.
    pub fn load_from(
        global_path: Option<&Path>,
        site_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global = match global_path {
            Some(path) if path.exists() => Self::read_settings(path)?,
            _ => SettingsFile::default(),
        };

        let (site, site_path) = match site_dir {
            Some(dir) => Self::load_site(dir, &mut warnings)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref s) = site {
            s.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                site,
                global_path: global_path.filter(|p| p.exists()).map(Path::to_path_buf),
                site_path,
            },
            warnings,
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SLUGSYNC_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("slugsync/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".slugsync/config.toml"))
            .filter(|path| path.exists())
    }

    fn load_site(
        site_dir: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<SettingsFile>, Option<PathBuf>), ConfigError> {
        let canonical = Self::site_config_path(site_dir);
        if canonical.exists() {
            let config = Self::read_settings(&canonical)?;
            return Ok((Some(config), Some(canonical)));
        }

        let compat = site_dir.join("slugsync.toml");
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Using deprecated config location. Please move to '{}'",
                    canonical.display()
                ),
                path: compat.clone(),
            });
            let config = Self::read_settings(&compat)?;
            return Ok((Some(config), Some(compat)));
        }

        Ok((None, None))
    }

    fn read_settings(path: &Path) -> Result<SettingsFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical global config path: `~/.slugsync/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".slugsync/config.toml"))
    }

    /// Canonical site config path for a site directory.
    pub fn site_config_path(site_dir: &Path) -> PathBuf {
        site_dir.join(".slugsync/config.toml")
    }

    /// Write global config atomically.
    pub fn write_global(config: &SettingsFile) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write site config atomically.
    pub fn write_site(site_dir: &Path, config: &SettingsFile) -> Result<PathBuf, ConfigError> {
        let path = Self::site_config_path(site_dir);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically (temp file, then rename).
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// First value found in the site file, then the global file.
    fn pick<T>(&self, get: impl Fn(&SettingsFile) -> Option<T>) -> Option<T> {
        self.site.as_ref().and_then(&get).or_else(|| get(&self.global))
    }

    /// Separator fallback character. Defaults to `-`.
    pub fn fallback_character(&self) -> char {
        self.pick(|s| {
            s.normalize
                .as_ref()
                .and_then(|n| n.fallback_character.as_deref())
                .and_then(|f| schema::parse_fallback(f).ok())
        })
        .unwrap_or(DEFAULT_FALLBACK)
    }

    /// Defaults to `false`.
    pub fn preserve_underscore(&self) -> bool {
        self.pick(|s| s.normalize.as_ref().and_then(|n| n.preserve_underscore))
            .unwrap_or(false)
    }

    /// Replacement table, sorted by key. Defaults to empty.
    pub fn replacements(&self) -> Vec<(String, String)> {
        self.pick(|s| s.normalize.as_ref().and_then(|n| n.replacements.clone()))
            .map(|table| table.into_iter().collect())
            .unwrap_or_default()
    }

    /// Defaults to `["nav_title", "title"]`.
    pub fn source_fields(&self) -> Vec<String> {
        self.pick(|s| s.generator.as_ref().and_then(|g| g.source_fields.clone()))
            .unwrap_or_else(|| vec!["nav_title".to_string(), "title".to_string()])
    }

    /// Defaults to `true`.
    pub fn prefix_parent_slug(&self) -> bool {
        self.pick(|s| s.generator.as_ref().and_then(|g| g.prefix_parent_slug))
            .unwrap_or(true)
    }

    /// Defaults to `true`.
    pub fn synchronize(&self) -> bool {
        self.pick(|s| s.policy.as_ref().and_then(|p| p.synchronize))
            .unwrap_or(true)
    }

    /// Defaults to `true`.
    pub fn lock(&self) -> bool {
        self.pick(|s| s.policy.as_ref().and_then(|p| p.lock))
            .unwrap_or(true)
    }

    /// Defaults to `false`.
    pub fn lock_descendants(&self) -> bool {
        self.pick(|s| s.policy.as_ref().and_then(|p| p.lock_descendants))
            .unwrap_or(false)
    }

    /// Defaults to `["spacer", "folder", "recycler"]`.
    pub fn exclude_types(&self) -> Vec<String> {
        self.pick(|s| s.policy.as_ref().and_then(|p| p.exclude_types.clone()))
            .unwrap_or_else(|| {
                ["spacer", "folder", "recycler"]
                    .iter()
                    .map(|t| t.to_string())
                    .collect()
            })
    }

    /// Defaults to `true`.
    pub fn create_redirects(&self) -> bool {
        self.pick(|s| s.redirects.as_ref().and_then(|r| r.create))
            .unwrap_or(true)
    }

    /// Defaults to `*` (any host).
    pub fn redirect_host(&self) -> String {
        self.pick(|s| s.redirects.as_ref().and_then(|r| r.host.clone()))
            .unwrap_or_else(|| "*".to_string())
    }

    /// Defaults to nobody.
    pub fn admins(&self) -> Vec<String> {
        self.pick(|s| s.admins.clone()).unwrap_or_default()
    }

    /// Resolve everything into engine settings.
    pub fn settings(&self) -> Settings {
        Settings {
            normalizer: NormalizerOptions {
                fallback: self.fallback_character(),
                preserve_underscore: self.preserve_underscore(),
                replacements: self.replacements(),
            },
            source_fields: self.source_fields(),
            prefix_parent_slug: self.prefix_parent_slug(),
            synchronize: self.synchronize(),
            lock: self.lock(),
            lock_descendants: self.lock_descendants(),
            exclude_types: self.exclude_types(),
            create_redirects: self.create_redirects(),
            redirect_host: self.redirect_host(),
            admins: self.admins(),
        }
    }

    /// Effective value of a key, rendered for display.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "admins" => self.admins().join(","),
            "normalize.fallback_character" => self.fallback_character().to_string(),
            "normalize.preserve_underscore" => self.preserve_underscore().to_string(),
            "normalize.replacements" => self
                .replacements()
                .iter()
                .map(|(from, to)| format!("{from}={to}"))
                .collect::<Vec<_>>()
                .join(","),
            "generator.source_fields" => self.source_fields().join(","),
            "generator.prefix_parent_slug" => self.prefix_parent_slug().to_string(),
            "policy.synchronize" => self.synchronize().to_string(),
            "policy.lock" => self.lock().to_string(),
            "policy.lock_descendants" => self.lock_descendants().to_string(),
            "policy.exclude_types" => self.exclude_types().join(","),
            "redirects.create" => self.create_redirects().to_string(),
            "redirects.host" => self.redirect_host(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// All keys with their effective values.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).ok().map(|value| (*key, value)))
            .collect()
    }

    /// Path the global file was loaded from.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path the site file was loaded from.
    pub fn site_config_loaded_from(&self) -> Option<&Path> {
        self.site_path.as_deref()
    }
}

impl SettingsFile {
    /// Set one key from its string form, then re-validate.
    ///
    /// Lists are comma separated; `normalize.replacements` takes
    /// `from=to` pairs.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "admins" => self.admins = Some(split_list(value)),
            "normalize.fallback_character" => {
                schema::parse_fallback(value)?;
                self.normalize.get_or_insert_with(Default::default).fallback_character =
                    Some(value.to_string());
            }
            "normalize.preserve_underscore" => {
                self.normalize.get_or_insert_with(Default::default).preserve_underscore =
                    Some(parse_bool(key, value)?);
            }
            "normalize.replacements" => {
                let mut table = std::collections::BTreeMap::new();
                for pair in split_list(value) {
                    let (from, to) = pair.split_once('=').ok_or_else(|| {
                        ConfigError::InvalidValue(format!(
                            "replacement '{pair}' must look like 'from=to'"
                        ))
                    })?;
                    table.insert(from.to_string(), to.to_string());
                }
                self.normalize.get_or_insert_with(Default::default).replacements = Some(table);
            }
            "generator.source_fields" => {
                self.generator.get_or_insert_with(Default::default).source_fields =
                    Some(split_list(value));
            }
            "generator.prefix_parent_slug" => {
                self.generator.get_or_insert_with(Default::default).prefix_parent_slug =
                    Some(parse_bool(key, value)?);
            }
            "policy.synchronize" => {
                self.policy.get_or_insert_with(Default::default).synchronize =
                    Some(parse_bool(key, value)?);
            }
            "policy.lock" => {
                self.policy.get_or_insert_with(Default::default).lock =
                    Some(parse_bool(key, value)?);
            }
            "policy.lock_descendants" => {
                self.policy.get_or_insert_with(Default::default).lock_descendants =
                    Some(parse_bool(key, value)?);
            }
            "policy.exclude_types" => {
                self.policy.get_or_insert_with(Default::default).exclude_types =
                    Some(split_list(value));
            }
            "redirects.create" => {
                self.redirects.get_or_insert_with(Default::default).create =
                    Some(parse_bool(key, value)?);
            }
            "redirects.host" => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "redirects.host cannot be empty".to_string(),
                    ));
                }
                self.redirects.get_or_insert_with(Default::default).host =
                    Some(value.trim().to_string());
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        self.validate()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(ConfigError::InvalidValue(format!(
            "{key} expects true or false, got '{other}'"
        ))),
    }
}
