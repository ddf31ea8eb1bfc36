use anyhow::{Context, Result};
use std::path::Path;

use crate::settings::{Settings, SettingsStore};

/// Print the effective settings (file, environment and flags applied).
pub fn run_config_show(settings: &Settings, cache_dir: &Path) -> Result<()> {
    let store = SettingsStore::new(cache_dir);
    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    println!("# {}", store.path().display());
    println!("{}", json);
    Ok(())
}

/// Persist one setting. Environment overrides are not written back.
pub fn run_config_set(cache_dir: &Path, key: &str, value: &str) -> Result<()> {
    let store = SettingsStore::new(cache_dir);
    let mut settings = store.read()?;
    settings.set(key, value)?;
    store.write(&settings)?;
    println!("✅ {} updated", key);
    Ok(())
}
