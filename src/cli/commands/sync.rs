//! sync command - Re-synchronize the slugs below a node

use super::Session;
use crate::cli::Globals;
use crate::core::types::NodeId;
use crate::engine::TriggerResponse;
use crate::ui::output;
use anyhow::{bail, Result};

/// Synchronize every descendant of `node`.
///
/// The site is written back even when the run aborts, since earlier writes
/// of the run are kept and stay revertible.
pub fn sync(globals: &Globals, node: u32) -> Result<()> {
    let session = Session::open(globals)?;
    let result = session
        .synchronizer()
        .synchronize(NodeId::new(node), &session.ctx);
    session.save()?;

    if globals.json {
        let response = TriggerResponse::from_result(&result);
        output::print_json(&response)?;
        if let Some(message) = response.message {
            bail!(message);
        }
        return Ok(());
    }

    let report = result?;
    output::print(
        format!(
            "Updated {} slug(s), skipped {} node(s)\nRun: {}",
            report.updated,
            report.skipped,
            report.correlation.subject()
        ),
        globals.verbosity,
    );
    Ok(())
}
