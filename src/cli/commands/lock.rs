//! lock and unlock commands - Protect a node's slug from regeneration

use super::Session;
use crate::cli::Globals;
use crate::core::permission::PermissionOracle;
use crate::core::types::NodeId;
use crate::ui::output;
use anyhow::{anyhow, bail, Result};

/// Lock the slug of `node`.
pub fn lock(globals: &Globals, node: u32) -> Result<()> {
    set_locked(globals, node, true)
}

/// Unlock the slug of `node`.
pub fn unlock(globals: &Globals, node: u32) -> Result<()> {
    set_locked(globals, node, false)
}

fn set_locked(globals: &Globals, node: u32, locked: bool) -> Result<()> {
    let session = Session::open(globals)?;
    let id = NodeId::new(node);
    let memory = session.store.memory();
    let record = memory
        .node(id)
        .ok_or_else(|| anyhow!("Node {id} does not exist"))?;

    if !session.ctx.actor.admin && !session.oracle.can_edit(&record) {
        bail!("Actor '{}' may not edit node {id}", session.ctx.actor.name);
    }

    let action = if locked { "Locked" } else { "Unlocked" };
    if record.locked == locked {
        output::print(format!("Node {id} already {}", action.to_lowercase()), globals.verbosity);
        return Ok(());
    }

    memory.set_locked(id, locked)?;
    session.save()?;
    output::print(format!("{action} node {id} ({})", output::format_slug(&record.slug)), globals.verbosity);
    Ok(())
}
