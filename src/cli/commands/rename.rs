//! rename command - Retitle a node and regenerate its slug

use super::Session;
use crate::cli::Globals;
use crate::core::types::NodeId;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Rename `node` to `title`.
pub fn rename(globals: &Globals, node: u32, title: &str) -> Result<()> {
    let session = Session::open(globals)?;
    let id = NodeId::new(node);
    let result = session
        .synchronizer()
        .rename(id, title, &session.ctx, &session.oracle);
    session.save()?;
    let report = result.with_context(|| format!("Failed to rename node {id}"))?;

    if globals.json {
        output::print_json(&super::edit::summary(&session, id, &report))?;
    } else {
        let slug = session
            .store
            .memory()
            .slug_of(node)
            .unwrap_or_default();
        output::print(
            format!(
                "Renamed node {id}; slug is {}\nUpdated {} slug(s), skipped {} node(s)\nRun: {}",
                output::format_slug(&slug),
                report.updated,
                report.skipped,
                report.correlation.subject()
            ),
            globals.verbosity,
        );
    }
    Ok(())
}
