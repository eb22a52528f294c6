//! redirects command - List redirects

use super::Session;
use crate::cli::Globals;
use crate::store::RedirectStore;
use crate::ui::output;
use anyhow::Result;

/// List live redirects, or every redirect with `all`.
pub fn redirects(globals: &Globals, all: bool) -> Result<()> {
    let session = Session::open(globals)?;
    let memory = session.store.memory();
    let redirects = if all {
        memory.all_redirects()
    } else {
        memory.active()?
    };

    if globals.json {
        output::print_json(&redirects)?;
        return Ok(());
    }

    if redirects.is_empty() {
        output::print("No redirects", globals.verbosity);
        return Ok(());
    }

    let lines: Vec<String> = redirects
        .iter()
        .map(|r| {
            let correlation = r
                .correlation
                .as_ref()
                .map(|c| format!(" [{}]", c.subject()))
                .unwrap_or_default();
            let deleted = if r.deleted { " (deleted)" } else { "" };
            format!(
                "{} {}{} -> node {}{}{}",
                r.id, r.source_host, r.source_path, r.target, correlation, deleted
            )
        })
        .collect();
    output::print(output::format_list(&lines, ""), globals.verbosity);
    Ok(())
}
