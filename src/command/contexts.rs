use anyhow::Result;
use chrono::{DateTime, Local};

use crate::environment::Environment;

pub async fn run_contexts(env: &Environment, limit: usize) -> Result<()> {
    let store = env.artifact_store();
    let contexts = store.list_contexts().await;

    if contexts.is_empty() {
        println!("No artifact contexts under {}", store.root().display());
        return Ok(());
    }

    for context in contexts.iter().take(limit) {
        let modified = DateTime::from_timestamp_millis(context.last_modified as i64)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{}  {}  {}", context.id, modified, context.title);
    }
    if contexts.len() > limit {
        println!("... and {} more", contexts.len() - limit);
    }
    Ok(())
}
