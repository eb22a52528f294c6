//! edit command - Set a node's slug by hand

use serde::Serialize;

use super::Session;
use crate::cli::Globals;
use crate::core::types::NodeId;
use crate::engine::{Correlations, SyncReport};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// JSON body for rename and edit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EditSummary {
    node: NodeId,
    slug: String,
    updated: usize,
    skipped: usize,
    correlations: Correlations,
}

pub(super) fn summary(session: &Session, id: NodeId, report: &SyncReport) -> EditSummary {
    EditSummary {
        node: id,
        slug: session.store.memory().slug_of(id.get()).unwrap_or_default(),
        updated: report.updated,
        skipped: report.skipped,
        correlations: Correlations::from(&report.correlation),
    }
}

/// Set the slug of `node` to `slug`.
pub fn edit(globals: &Globals, node: u32, slug: &str) -> Result<()> {
    let session = Session::open(globals)?;
    let id = NodeId::new(node);
    let result = session
        .synchronizer()
        .edit_slug(id, slug, &session.ctx, &session.oracle);
    session.save()?;
    let report = result.with_context(|| format!("Failed to edit slug of node {id}"))?;

    let summary = summary(&session, id, &report);
    if globals.json {
        output::print_json(&summary)?;
    } else {
        output::print(
            format!(
                "Node {id} is now at {}\nUpdated {} slug(s), skipped {} node(s)\nRun: {}",
                summary.slug,
                report.updated,
                report.skipped,
                report.correlation.subject()
            ),
            globals.verbosity,
        );
    }
    Ok(())
}
