//! User settings persisted in `~/.jules-handoff/settings.json`.
//!
//! Precedence, lowest first: built-in defaults, the settings file,
//! `HANDOFF_*` environment variables, command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{HandoffError, HandoffResult};
use crate::prompt::{
    assemble, PromptBudget, PromptInputs, DEFAULT_MAX_PROMPT_LENGTH,
    DEFAULT_TRUNCATION_THRESHOLD,
};

pub const CACHE_DIR_NAME: &str = ".jules-handoff";
pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_API_BASE_URL: &str = "https://jules.googleapis.com/v1alpha/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TITLE_PREFIX_BYTES: usize = 2048;

/// Keys accepted by `handoff config set`.
pub const SETTING_KEYS: &[&str] = &[
    "autoSync",
    "maxPromptLength",
    "truncationThreshold",
    "artifactRoot",
    "apiBaseUrl",
    "requestTimeoutSecs",
    "titlePrefixBytes",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Sync a dirty tree without asking.
    pub auto_sync: bool,
    pub max_prompt_length: usize,
    pub truncation_threshold: usize,
    pub artifact_root: PathBuf,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Bytes read from each artifact when deriving a context title.
    pub title_prefix_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_sync: false,
            max_prompt_length: DEFAULT_MAX_PROMPT_LENGTH,
            truncation_threshold: DEFAULT_TRUNCATION_THRESHOLD,
            artifact_root: default_artifact_root(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            title_prefix_bytes: DEFAULT_TITLE_PREFIX_BYTES,
        }
    }
}

fn default_artifact_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".gemini")
        .join("antigravity")
        .join("brain")
}

/// Parse into the field's own integer type; out-of-range values are errors.
fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> HandoffResult<T> {
    value.trim().parse().map_err(|_| {
        HandoffError::validation(field, format!("{:?} is not a valid number", value))
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Settings {
    pub fn budget(&self) -> PromptBudget {
        PromptBudget {
            max_length: self.max_prompt_length,
            truncation_threshold: self.truncation_threshold,
        }
    }

    /// Apply `HANDOFF_*` overrides read through `lookup`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HANDOFF_AUTO_SYNC") {
            match parse_bool(&v) {
                Some(b) => self.auto_sync = b,
                None => warn!("Ignoring HANDOFF_AUTO_SYNC={:?}", v),
            }
        }
        if let Some(v) = lookup("HANDOFF_MAX_PROMPT_LENGTH") {
            match v.trim().parse() {
                Ok(n) => self.max_prompt_length = n,
                Err(_) => warn!("Ignoring HANDOFF_MAX_PROMPT_LENGTH={:?}", v),
            }
        }
        if let Some(v) = lookup("HANDOFF_ARTIFACT_ROOT").filter(|v| !v.is_empty()) {
            self.artifact_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("HANDOFF_API_BASE_URL").filter(|v| !v.is_empty()) {
            self.api_base_url = v;
        }
    }

    /// Set one field by its JSON key. Leaves `self` untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> HandoffResult<()> {
        let mut next = self.clone();
        next.assign(key, value)?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn assign(&mut self, key: &str, value: &str) -> HandoffResult<()> {
        match key {
            "autoSync" => {
                self.auto_sync = parse_bool(value).ok_or_else(|| {
                    HandoffError::validation(key, format!("{:?} is not a boolean", value))
                })?
            }
            "maxPromptLength" => self.max_prompt_length = parse_number(key, value)?,
            "truncationThreshold" => self.truncation_threshold = parse_number(key, value)?,
            "artifactRoot" => self.artifact_root = PathBuf::from(value),
            "apiBaseUrl" => self.api_base_url = value.to_string(),
            "requestTimeoutSecs" => self.request_timeout_secs = parse_number(key, value)?,
            "titlePrefixBytes" => self.title_prefix_bytes = parse_number(key, value)?,
            other => {
                return Err(HandoffError::validation(
                    "setting",
                    format!("unknown key {:?}, expected one of {}", other, SETTING_KEYS.join(", ")),
                ))
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> HandoffResult<()> {
        let skeleton = assemble(&PromptInputs::default(), &PromptBudget::default()).char_len();
        if self.max_prompt_length <= skeleton {
            return Err(HandoffError::validation(
                "maxPromptLength",
                format!("must be larger than the {}-character prompt skeleton", skeleton),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(HandoffError::validation(
                "requestTimeoutSecs",
                "must be greater than zero",
            ));
        }
        if self.title_prefix_bytes == 0 {
            return Err(HandoffError::validation(
                "titlePrefixBytes",
                "must be greater than zero",
            ));
        }

        let url = url::Url::parse(&self.api_base_url)
            .map_err(|e| HandoffError::validation("apiBaseUrl", e.to_string()))?;
        if url.scheme() != "https" {
            return Err(HandoffError::validation("apiBaseUrl", "must use https"));
        }
        Ok(())
    }
}

/// Resolve the cache directory, creating it if needed.
pub fn resolve_cache_dir(cache_dir: Option<&str>) -> Result<PathBuf> {
    let base_dir = match cache_dir {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Could not determine home directory")?
            .join(CACHE_DIR_NAME),
    };

    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("Failed to create cache directory: {:?}", base_dir))?;
    Ok(base_dir)
}

/// Reads and writes `settings.json`.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings from disk, or defaults when the file does not exist.
    pub fn read(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file: {:?}", self.path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings JSON: {:?}", self.path))
    }

    pub fn write(&self, settings: &Settings) -> Result<()> {
        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings file: {:?}", self.path))?;

        debug!("Settings saved to {:?}", self.path);
        Ok(())
    }

    /// File settings with environment overrides applied.
    pub fn load_effective(&self) -> Result<Settings> {
        let mut settings = self.read()?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempdir().unwrap();
        let store = SettingsStore::new(tmp.path());
        let settings = store.read().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_prompt_length, 50_000);
        assert_eq!(settings.truncation_threshold, 50);
        assert!(settings.artifact_root.ends_with(".gemini/antigravity/brain"));
    }

    #[test]
    fn test_write_and_read_partial_file() {
        let tmp = tempdir().unwrap();
        let store = SettingsStore::new(tmp.path());
        std::fs::write(store.path(), r#"{"autoSync": true, "maxPromptLength": 20000}"#).unwrap();

        let settings = store.read().unwrap();
        assert!(settings.auto_sync);
        assert_eq!(settings.max_prompt_length, 20_000);
        assert_eq!(settings.request_timeout_secs, 30);

        store.write(&settings).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"maxPromptLength\": 20000"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("HANDOFF_AUTO_SYNC", "yes"),
            ("HANDOFF_MAX_PROMPT_LENGTH", "not-a-number"),
            ("HANDOFF_ARTIFACT_ROOT", "/tmp/brain"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert!(settings.auto_sync);
        assert_eq!(settings.max_prompt_length, DEFAULT_MAX_PROMPT_LENGTH);
        assert_eq!(settings.artifact_root, PathBuf::from("/tmp/brain"));
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_set_validates() {
        let mut settings = Settings::default();
        settings.set("autoSync", "on").unwrap();
        assert!(settings.auto_sync);

        assert!(settings.set("maxPromptLength", "10").is_err());
        assert_eq!(settings.max_prompt_length, DEFAULT_MAX_PROMPT_LENGTH);
        assert!(settings.set("requestTimeoutSecs", "0").is_err());
        assert!(settings.set("apiBaseUrl", "http://insecure.example/").is_err());
        assert!(settings.set("colour", "blue").is_err());

        let mut fresh = Settings::default();
        fresh.set("titlePrefixBytes", "4096").unwrap();
        assert_eq!(fresh.title_prefix_bytes, 4096);
    }

    #[test]
    fn test_set_rejects_out_of_range_numbers() {
        let mut settings = Settings::default();
        for (key, value) in [
            ("maxPromptLength", "-1"),
            ("maxPromptLength", "99999999999999999999999"),
            ("truncationThreshold", "1e3"),
            ("titlePrefixBytes", "lots"),
            ("requestTimeoutSecs", "18446744073709551616"),
        ] {
            match settings.set(key, value) {
                Err(HandoffError::Validation { field, .. }) => assert_eq!(field, key),
                other => panic!("{}={} should be rejected, got {:?}", key, value, other),
            }
        }
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }
}
