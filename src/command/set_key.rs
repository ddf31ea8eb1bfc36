use anyhow::Result;

use super::common::{ask, is_yes};
use crate::credentials::{ApiKey, FileSecretStore, KeySource, SecretStore, API_KEY_ENV, API_KEY_SECRET};

pub async fn run_set_key(secrets: &FileSecretStore, key: Option<String>) -> Result<()> {
    let raw = match key {
        Some(key) => key,
        None => {
            if secrets.key_source().await? == Some(KeySource::File) {
                println!("⚠️  An API key is already stored.");
                if !is_yes(&ask("Replace it? [y/N]: ")?) {
                    println!("Cancelled. The stored key is unchanged.");
                    return Ok(());
                }
            }
            ask("Jules API key: ")?
        }
    };
    let api_key = ApiKey::parse(&raw)?;

    secrets.set(API_KEY_SECRET, api_key.expose()).await?;
    println!("✅ API key stored in {}", secrets.path().display());

    if secrets.has_env_override() {
        println!("   Note: {} is set and takes precedence over the stored key.", API_KEY_ENV);
    }
    Ok(())
}
