//! Resolved paths and settings shared by CLI commands and MCP tools.

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::context::ArtifactStore;
use crate::credentials::FileSecretStore;
use crate::drafts::DraftStore;
use crate::error::HandoffResult;
use crate::settings::Settings;
use crate::vcs::GitCli;

#[derive(Debug, Clone)]
pub struct Environment {
    pub workspace_root: PathBuf,
    pub cache_dir: PathBuf,
    pub settings: Settings,
}

impl Environment {
    pub fn git(&self) -> GitCli {
        GitCli::new(self.workspace_root.clone())
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(self.settings.artifact_root.clone())
            .with_title_prefix_bytes(self.settings.title_prefix_bytes)
    }

    pub fn drafts(&self) -> DraftStore {
        DraftStore::new(&self.cache_dir)
    }

    pub fn secrets(&self) -> FileSecretStore {
        FileSecretStore::new(&self.cache_dir)
    }

    pub fn api_client(&self) -> HandoffResult<ApiClient> {
        ApiClient::new(&self.settings.api_base_url, self.settings.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_environment_wiring() {
        let mut settings = Settings::default();
        settings.artifact_root = PathBuf::from("/brain");
        let env = Environment {
            workspace_root: PathBuf::from("/repo"),
            cache_dir: PathBuf::from("/cache"),
            settings,
        };

        assert_eq!(env.artifact_store().root(), Path::new("/brain"));
        assert_eq!(env.drafts().dir(), Path::new("/cache/drafts"));
        assert_eq!(env.secrets().path(), Path::new("/cache/credentials.json"));
        assert_eq!(
            env.api_client().unwrap().base_url().as_str(),
            "https://jules.googleapis.com/v1alpha/"
        );
    }
}
