//! cli
//!
//! Command-line interface layer for slugsync.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, opens the site
//! through [`commands::Session`], and hands the work to [`crate::engine`].
//! Handlers never change slugs themselves.

pub mod args;
pub mod commands;
pub mod tracing_setup;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::Result;

use crate::ui::output::Verbosity;

/// Settings derived from global CLI flags.
#[derive(Debug, Clone)]
pub struct Globals {
    pub site: PathBuf,
    pub actor: String,
    pub host: Option<String>,
    pub no_redirects: bool,
    pub json: bool,
    pub verbosity: Verbosity,
}

impl Globals {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            site: cli.site.clone(),
            actor: cli.actor_name(),
            host: cli.host.clone(),
            no_redirects: cli.no_redirects,
            json: cli.json,
            verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        }
    }

    /// Directory holding the site document and its `.slugsync/` config.
    pub fn site_dir(&self) -> PathBuf {
        match self.site.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let globals = Globals::from_cli(&cli);
    tracing_setup::init(globals.verbosity);

    commands::dispatch(cli.command, &globals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn site_dir_of_bare_file_is_cwd() {
        let cli = Cli::try_parse_from(["slugsync", "tree"]).unwrap();
        assert_eq!(Globals::from_cli(&cli).site_dir(), PathBuf::from("."));
    }

    #[test]
    fn site_dir_of_nested_file() {
        let cli = Cli::try_parse_from(["slugsync", "--site", "sites/a/site.json", "tree"]).unwrap();
        assert_eq!(Globals::from_cli(&cli).site_dir(), PathBuf::from("sites/a"));
    }

    #[test]
    fn quiet_flag_sets_verbosity() {
        let cli = Cli::try_parse_from(["slugsync", "-q", "tree"]).unwrap();
        assert_eq!(Globals::from_cli(&cli).verbosity, Verbosity::Quiet);
    }
}
