use anyhow::Result;

use crate::credentials::{FileSecretStore, SecretStore, API_KEY_ENV, API_KEY_SECRET};

pub async fn run_clear_key(secrets: &FileSecretStore) -> Result<()> {
    secrets.delete(API_KEY_SECRET).await?;
    println!("✅ Stored API key removed.");

    if secrets.has_env_override() {
        println!("   {} is still set in the environment.", API_KEY_ENV);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clear_key_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let secrets = FileSecretStore::without_env(tmp.path());
        secrets.set(API_KEY_SECRET, "abcdefghijkl").await.unwrap();

        run_clear_key(&secrets).await.unwrap();
        assert!(secrets.get(API_KEY_SECRET).await.unwrap().is_none());

        run_clear_key(&secrets).await.unwrap();
    }
}
