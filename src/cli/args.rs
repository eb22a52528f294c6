//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--site <file>`: Site document to operate on (default `site.json`)
//! - `--actor <name>`: Who is acting (default `$USER`)
//! - `--host <host>`: Host new redirects are filed under
//! - `--no-redirects`: Do not create redirects for this invocation
//! - `--json`: Machine-readable output
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// slugsync - Keep page slugs consistent with titles and hierarchy
#[derive(Parser, Debug)]
#[command(name = "slugsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Site document to operate on
    #[arg(long, global = true, default_value = "site.json")]
    pub site: PathBuf,

    /// Actor name; elevated actors are listed under `admins` in config
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Host new redirects are filed under
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Do not create redirects for this invocation
    #[arg(long, global = true)]
    pub no_redirects: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The acting user: `--actor`, then `$USER`.
    pub fn actor_name(&self) -> String {
        self.actor
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize text into a slug segment
    #[command(
        name = "normalize",
        long_about = "Normalize free text into a canonical slug segment.\n\n\
            Uses the configured fallback character, underscore handling, and \
            replacement table. Forward slashes are kept as path separators.",
        after_help = "\
EXAMPLES:
    slugsync normalize 'Über uns & Team'     # ueber-uns-team with a replacement table
    slugsync normalize --path 'Docs/API v2'  # /docs/api-v2"
    )]
    Normalize {
        /// Text to normalize
        text: String,

        /// Normalize each segment and print a full slug
        #[arg(long)]
        path: bool,
    },

    /// Re-synchronize every slug below a node
    #[command(
        name = "sync",
        long_about = "Regenerate the slugs of every descendant of a node.\n\n\
            Locked nodes and excluded node types are skipped. Every write of the \
            run is stamped with one correlation group, printed at the end, which \
            `slugsync revert` accepts. Requires an elevated actor.",
        after_help = "\
EXAMPLES:
    slugsync sync 1
    slugsync --json sync 12"
    )]
    Sync {
        /// Node whose subtree is synchronized
        node: u32,
    },

    /// Change a node's title and regenerate its slug and subtree
    Rename {
        /// Node to rename
        node: u32,
        /// New title
        title: String,
    },

    /// Set a node's slug by hand
    #[command(
        name = "edit",
        long_about = "Set a node's slug by hand and move its subtree along.\n\n\
            The slug is normalized segment by segment. Editors cannot change the \
            part of the slug above the pages they may edit (see `slugsync prefix`)."
    )]
    Edit {
        /// Node to edit
        node: u32,
        /// Requested slug
        slug: String,
    },

    /// Show the slug prefix the actor may not change
    Prefix {
        /// Node to inspect
        node: u32,
    },

    /// Lock a node's slug against regeneration
    Lock {
        /// Node to lock
        node: u32,
    },

    /// Unlock a node's slug
    Unlock {
        /// Node to unlock
        node: u32,
    },

    /// Undo a past run by its correlation subject
    #[command(
        name = "revert",
        after_help = "\
EXAMPLES:
    slugsync revert 3f9a0c1d2e4b5a67
    slugsync revert 3f9a0c1d2e4b5a67 --slug-only"
    )]
    Revert {
        /// Correlation subject (16 hex characters)
        subject: String,

        /// Restore slugs but keep the redirects the run created
        #[arg(long)]
        slug_only: bool,
    },

    /// Display the node tree with slugs
    Tree,

    /// List redirects
    Redirects {
        /// Include deleted redirects
        #[arg(long)]
        all: bool,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "View or modify slugsync configuration.\n\n\
            Site settings live in .slugsync/config.toml next to the site document \
            and override the global file (~/.slugsync/config.toml).",
        after_help = "\
EXAMPLES:
    slugsync config list
    slugsync config get policy.exclude_types
    slugsync config set admins ada,grace
    slugsync config set --global normalize.fallback_character _"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
        /// Write the global file instead of the site file
        #[arg(long)]
        global: bool,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "slugsync", "sync", "4", "--site", "other.json", "--json", "--host", "example.org",
        ])
        .unwrap();
        assert_eq!(cli.site, PathBuf::from("other.json"));
        assert!(cli.json);
        assert_eq!(cli.host.as_deref(), Some("example.org"));
        assert!(matches!(cli.command, Command::Sync { node: 4 }));
    }

    #[test]
    fn explicit_actor_wins() {
        let cli = Cli::try_parse_from(["slugsync", "--actor", "ada", "tree"]).unwrap();
        assert_eq!(cli.actor_name(), "ada");
    }

    #[test]
    fn revert_scope_flag() {
        let cli =
            Cli::try_parse_from(["slugsync", "revert", "0011223344556677", "--slug-only"]).unwrap();
        assert!(matches!(cli.command, Command::Revert { slug_only: true, .. }));
    }
}
