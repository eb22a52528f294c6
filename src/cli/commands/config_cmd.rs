//! config command - Get, set, or list configuration values

use crate::cli::Globals;
use crate::core::config::Config;
use crate::ui::output;
use anyhow::{Context as _, Result};

fn load(globals: &Globals) -> Result<Config> {
    let loaded = Config::load(Some(&globals.site_dir())).context("Failed to load config")?;
    for warning in &loaded.warnings {
        output::warn(&warning.message, globals.verbosity);
    }
    Ok(loaded.config)
}

/// Get a configuration value.
pub fn get(globals: &Globals, key: &str) -> Result<()> {
    let config = load(globals)?;
    let value = config.get(key)?;
    if globals.json {
        output::print_json(&serde_json::json!({ "key": key, "value": value }))?;
    } else if !value.is_empty() {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value in the site file, or the global file.
pub fn set(globals: &Globals, key: &str, value: &str, global: bool) -> Result<()> {
    let config = load(globals)?;

    let path = if global {
        let mut file = config.global;
        file.set(key, value)?;
        Config::write_global(&file).context("Failed to write global config")?
    } else {
        let mut file = config.site.unwrap_or_default();
        file.set(key, value)?;
        Config::write_site(&globals.site_dir(), &file).context("Failed to write site config")?
    };

    output::print(
        format!("Set {} = {} ({})", key, value, path.display()),
        globals.verbosity,
    );
    Ok(())
}

/// List all configuration values.
pub fn list(globals: &Globals) -> Result<()> {
    let config = load(globals)?;

    if globals.json {
        let entries: serde_json::Map<String, serde_json::Value> = config
            .entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
            .collect();
        output::print_json(&entries)?;
        return Ok(());
    }

    println!("# Effective configuration");
    if let Some(path) = config.global_config_loaded_from() {
        println!("# global: {}", path.display());
    }
    if let Some(path) = config.site_config_loaded_from() {
        println!("# site:   {}", path.display());
    }
    for (key, value) in config.entries() {
        println!("{} = {}", key, value);
    }
    Ok(())
}
