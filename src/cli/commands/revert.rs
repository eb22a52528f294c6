//! revert command - Undo a past run

use serde::Serialize;

use super::Session;
use crate::cli::Globals;
use crate::engine::RevertScope;
use crate::ui::output;
use anyhow::{Context as _, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RevertSummary {
    restored: usize,
    conflicts: usize,
    redirects_removed: usize,
    subject: String,
}

/// Revert the run recorded under `subject`.
pub fn revert(globals: &Globals, subject: &str, slug_only: bool) -> Result<()> {
    let session = Session::open(globals)?;
    let scope = if slug_only {
        RevertScope::SlugOnly
    } else {
        RevertScope::SlugAndRedirects
    };
    let result = session.synchronizer().revert(subject, scope, &session.ctx);
    session.save()?;
    let report = result.with_context(|| format!("Failed to revert run {subject}"))?;

    if globals.json {
        output::print_json(&RevertSummary {
            restored: report.restored,
            conflicts: report.conflicts,
            redirects_removed: report.redirects_removed,
            subject: report.correlation.subject().to_string(),
        })?;
        return Ok(());
    }

    output::print(
        format!(
            "Restored {} slug(s), removed {} redirect(s)\nRun: {}",
            report.restored,
            report.redirects_removed,
            report.correlation.subject()
        ),
        globals.verbosity,
    );
    if report.conflicts > 0 {
        output::warn(
            format!(
                "{} slug(s) changed since the run and were left alone",
                report.conflicts
            ),
            globals.verbosity,
        );
    }
    Ok(())
}
