//! normalize command - Turn text into a slug segment

use crate::cli::Globals;
use crate::core::config::Config;
use crate::engine::SlugGenerator;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Normalize `text` with the effective settings.
///
/// Does not need (or lock) a site document; only its config directory.
pub fn normalize(globals: &Globals, text: &str, path: bool) -> Result<()> {
    let loaded = Config::load(Some(&globals.site_dir())).context("Failed to load config")?;
    let generator = SlugGenerator::new(&loaded.config.settings());

    let normalized = if path {
        generator.normalize_path(text)
    } else {
        generator.normalizer().normalize(text)
    };

    if globals.json {
        output::print_json(&serde_json::json!({ "input": text, "slug": normalized }))?;
    } else {
        // Printed even when empty so scripts see a line.
        println!("{normalized}");
    }
    Ok(())
}
