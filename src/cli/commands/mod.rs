//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the site through [`Session`] (locking it for the command)
//! 2. Calls the engine to execute the command
//! 3. Flushes the site and formats the output
//!
//! Handlers do NOT change slugs directly.

mod completion;
mod config_cmd;
mod edit;
mod lock;
mod normalize;
mod prefix;
mod redirects;
mod rename;
mod revert;
mod session;
mod sync;
mod tree;

pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use edit::edit;
pub use lock::{lock, unlock};
pub use normalize::normalize;
pub use prefix::prefix;
pub use redirects::redirects;
pub use rename::rename;
pub use revert::revert;
pub use session::Session;
pub use sync::sync;
pub use tree::tree;

use super::args::{Command, ConfigAction};
use super::Globals;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, globals: &Globals) -> Result<()> {
    match command {
        Command::Normalize { text, path } => normalize::normalize(globals, &text, path),
        Command::Sync { node } => sync::sync(globals, node),
        Command::Rename { node, title } => rename::rename(globals, node, &title),
        Command::Edit { node, slug } => edit::edit(globals, node, &slug),
        Command::Prefix { node } => prefix::prefix(globals, node),
        Command::Lock { node } => lock::lock(globals, node),
        Command::Unlock { node } => lock::unlock(globals, node),
        Command::Revert { subject, slug_only } => revert::revert(globals, &subject, slug_only),
        Command::Tree => tree::tree(globals),
        Command::Redirects { all } => redirects::redirects(globals, all),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(globals, &key),
            ConfigAction::Set { key, value, global } => {
                config_cmd::set(globals, &key, &value, global)
            }
            ConfigAction::List => config_cmd::list(globals),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
