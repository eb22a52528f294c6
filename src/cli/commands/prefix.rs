//! prefix command - Show the part of a slug the actor may not change

use serde::Serialize;

use super::Session;
use crate::cli::Globals;
use crate::core::types::NodeId;
use crate::ui::output;
use anyhow::{anyhow, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrefixInfo<'a> {
    node: NodeId,
    slug: &'a str,
    locked_prefix: &'a str,
    admin: bool,
}

/// Print the locked prefix of `node` for the acting user.
pub fn prefix(globals: &Globals, node: u32) -> Result<()> {
    let session = Session::open(globals)?;
    let id = NodeId::new(node);
    let record = session
        .store
        .memory()
        .node(id)
        .ok_or_else(|| anyhow!("Node {id} does not exist"))?;

    // Elevated actors are never held to a prefix.
    let locked_prefix = if session.ctx.actor.admin {
        String::new()
    } else {
        session.synchronizer().prefix_for(&record, &session.oracle)?
    };

    if globals.json {
        output::print_json(&PrefixInfo {
            node: id,
            slug: &record.slug,
            locked_prefix: &locked_prefix,
            admin: session.ctx.actor.admin,
        })?;
    } else {
        output::print(output::format_slug(&locked_prefix), globals.verbosity);
    }
    Ok(())
}
