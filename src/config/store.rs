use super::merge::merge_config;
use super::types::{ConfigFile, Credentials, UserConfigUpdate};
use crate::{Error, Result, fs_utils};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory under the user's home holding configuration and credentials
pub const CONFIG_DIR_NAME: &str = ".filmstash";
pub const CONFIG_FILE: &str = "config.json";
pub const CREDENTIALS_FILE: &str = "credentials.json";
/// Environment variable consulted when no stored API key exists
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Single authority for reading and persisting configuration and credentials.
///
/// The root directory is injected so that callers (and tests) decide where
/// state lives; the environment fallback for the API key is captured once at
/// construction.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
    env_api_key: Option<String>,
}

impl ConfigStore {
    /// Create a store rooted at `root`, capturing `TMDB_API_KEY` from the environment
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            env_api_key: std::env::var(API_KEY_ENV).ok(),
        }
    }

    /// Create a store rooted at `~/.filmstash`
    pub fn from_home() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::config("Could not determine the home directory"))?;
        Ok(Self::new(home.join(CONFIG_DIR_NAME)))
    }

    /// Override the environment fallback
    #[must_use]
    pub fn with_env_api_key(mut self, api_key: Option<String>) -> Self {
        self.env_api_key = api_key;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILE)
    }

    /// Default configuration for this root
    pub fn defaults(&self) -> ConfigFile {
        ConfigFile::with_root(&self.root)
    }

    /// Return the configuration directory, creating it with owner-only permissions
    pub fn resolve_config_directory(&self) -> Result<PathBuf> {
        if !self.root.is_dir() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                Error::config(format!(
                    "Failed to create configuration directory {}: {e}",
                    self.root.display()
                ))
            })?;
            fs_utils::set_owner_only(&self.root, true)
                .map_err(|e| Error::config(e.to_string()))?;
            debug!("Created configuration directory {:?}", self.root);
        }

        Ok(self.root.clone())
    }

    /// Load the configuration, merging every field against defaults.
    ///
    /// A missing file yields fresh defaults (not persisted). Malformed JSON is
    /// an error; individual invalid fields are not.
    pub fn load_config(&self) -> Result<ConfigFile> {
        let path = self.config_path();
        if !path.exists() {
            debug!("No configuration at {:?}, using defaults", path);
            return Ok(self.defaults());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let document: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse {}: {e}", path.display()))
        })?;

        Ok(merge_config(&document, self.defaults()))
    }

    /// Persist the whole document, stamping `lastUpdated`
    pub fn save_config(&self, config: &mut ConfigFile) -> Result<()> {
        self.resolve_config_directory()?;
        config.last_updated = Utc::now();

        let json = serde_json::to_vec_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize configuration: {e}")))?;
        let path = self.config_path();
        fs_utils::write_atomic(&path, &json)
            .map_err(|e| Error::config(format!("Failed to save configuration: {e}")))?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load, apply `update`, save. Last writer wins.
    pub fn update_user_config(&self, update: UserConfigUpdate) -> Result<ConfigFile> {
        let mut config = self.load_config()?;
        update.apply(&mut config.user);
        self.save_config(&mut config)?;
        Ok(config)
    }

    /// Overwrite the configuration with defaults
    pub fn reset_config(&self) -> Result<ConfigFile> {
        let mut config = self.defaults();
        self.save_config(&mut config)?;
        Ok(config)
    }

    /// Load stored credentials; a missing or unreadable file means "none"
    pub fn load_credentials(&self) -> Option<Credentials> {
        let path = self.credentials_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read credentials {:?}: {}", path, e);
                }
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&content) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!("Ignoring corrupt credentials file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Store `api_key` as the active credentials
    pub fn save_credentials(&self, api_key: &str) -> Result<Credentials> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::validation("api key", "must not be empty"));
        }

        let credentials = Credentials {
            api_key: api_key.to_string(),
            encrypted: false,
            last_used: Utc::now(),
        };
        self.write_credentials(&credentials)?;

        info!("Saved credentials to {:?}", self.credentials_path());
        Ok(credentials)
    }

    /// Refresh `lastUsed` on the stored credentials, if any
    pub fn mark_credentials_used(&self) -> Result<()> {
        if let Some(mut credentials) = self.load_credentials() {
            credentials.last_used = Utc::now();
            self.write_credentials(&credentials)?;
        }
        Ok(())
    }

    /// Remove stored credentials; absent credentials are a no-op
    pub fn clear_credentials(&self) -> Result<()> {
        let path = self.credentials_path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed credentials {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::config(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    fn write_credentials(&self, credentials: &Credentials) -> Result<()> {
        self.resolve_config_directory()?;

        let json = serde_json::to_vec_pretty(credentials)
            .map_err(|e| Error::config(format!("Failed to serialize credentials: {e}")))?;
        fs_utils::write_atomic(&self.credentials_path(), &json)
            .map_err(|e| Error::config(format!("Failed to save credentials: {e}")))
    }

    /// Resolve the API key: credentials file, then the environment variable,
    /// then the legacy `user.apiKey` field.
    pub fn get_api_key(&self) -> Option<String> {
        let non_empty = |key: &String| !key.trim().is_empty();

        if let Some(key) = self.load_credentials().map(|c| c.api_key).filter(non_empty) {
            return Some(key);
        }

        if let Some(key) = self.env_api_key.clone().filter(non_empty) {
            return Some(key);
        }

        if !self.config_path().exists() {
            return None;
        }
        match self.load_config() {
            Ok(config) => config.user.api_key.filter(non_empty),
            Err(e) => {
                debug!("Skipping legacy API key lookup: {}", e);
                None
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.get_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageQuality, MaxImageSize};
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> ConfigStore {
        ConfigStore::new(temp_dir.path().join(CONFIG_DIR_NAME)).with_env_api_key(None)
    }

    #[test]
    fn test_load_without_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let config = store.load_config().unwrap();

        assert_eq!(config.user.image_quality, ImageQuality::Medium);
        assert_eq!(config.user.default_output_dir, store.root().join("films"));
        assert!(!store.config_path().exists());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let mut config = store.load_config().unwrap();
        config.user.language = "de-DE".to_string();
        config.user.max_image_size = MaxImageSize::W500;
        store.save_config(&mut config).unwrap();

        let reloaded = store.load_config().unwrap();
        assert_eq!(reloaded.user, config.user);
        assert_eq!(reloaded.last_updated, config.last_updated);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let dir_mode = std::fs::metadata(store.root()).unwrap().permissions().mode();
            assert_eq!(dir_mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_invalid_image_quality_becomes_medium() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.resolve_config_directory().unwrap();

        std::fs::write(
            store.config_path(),
            r#"{"user": {"imageQuality": "gigantic", "language": "ja-JP"}, "app": {}}"#,
        )
        .unwrap();

        let config = store.load_config().unwrap();
        assert_eq!(config.user.image_quality, ImageQuality::Medium);
        assert_eq!(config.user.language, "ja-JP");
    }

    #[test]
    fn test_malformed_config_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.resolve_config_directory().unwrap();
        std::fs::write(store.config_path(), "{ not json").unwrap();

        let err = store.load_config().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_update_user_config() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .update_user_config(UserConfigUpdate {
                image_quality: Some(ImageQuality::Low),
                ..Default::default()
            })
            .unwrap();
        let config = store
            .update_user_config(UserConfigUpdate {
                include_adult: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(config.user.image_quality, ImageQuality::Low);
        assert!(config.user.include_adult);
        assert_eq!(store.load_config().unwrap().user, config.user);
    }

    #[test]
    fn test_reset_config() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .update_user_config(UserConfigUpdate {
                download_images: Some(false),
                ..Default::default()
            })
            .unwrap();
        let config = store.reset_config().unwrap();

        assert!(config.user.download_images);
        assert!(store.load_config().unwrap().user.download_images);
    }

    #[test]
    fn test_api_key_from_environment() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir).with_env_api_key(Some("xyz".to_string()));

        assert_eq!(store.get_api_key().as_deref(), Some("xyz"));
        assert!(store.is_configured());
    }

    #[test]
    fn test_credentials_take_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir).with_env_api_key(Some("from-env".to_string()));

        let credentials = store.save_credentials("  from-file  ").unwrap();
        assert_eq!(credentials.api_key, "from-file");
        assert!(!credentials.encrypted);

        assert_eq!(store.get_api_key().as_deref(), Some("from-file"));
    }

    #[test]
    fn test_legacy_config_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.resolve_config_directory().unwrap();
        std::fs::write(store.config_path(), r#"{"user": {"apiKey": "legacy"}}"#).unwrap();

        assert_eq!(store.get_api_key().as_deref(), Some("legacy"));
    }

    #[test]
    fn test_environment_beats_legacy_config_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir).with_env_api_key(Some("xyz".to_string()));
        store.resolve_config_directory().unwrap();
        std::fs::write(store.config_path(), r#"{"user": {"apiKey": "stale-legacy"}}"#).unwrap();

        assert_eq!(store.get_api_key().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_hand_written_credentials_without_last_used() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir).with_env_api_key(Some("from-env".to_string()));
        store.resolve_config_directory().unwrap();
        std::fs::write(store.credentials_path(), r#"{"apiKey": "file-key"}"#).unwrap();

        let credentials = store.load_credentials().unwrap();
        assert_eq!(credentials.api_key, "file-key");
        assert!(!credentials.encrypted);
        assert_eq!(store.get_api_key().as_deref(), Some("file-key"));
    }

    #[test]
    fn test_corrupt_credentials_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.resolve_config_directory().unwrap();
        std::fs::write(store.credentials_path(), "garbage").unwrap();

        assert!(store.load_credentials().is_none());
        assert!(store.get_api_key().is_none());
        assert!(!store.is_configured());
    }

    #[test]
    fn test_clear_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.clear_credentials().unwrap();
        store.save_credentials("secret").unwrap();
        store.clear_credentials().unwrap();

        assert!(store.load_credentials().is_none());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let err = store.save_credentials("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_mark_credentials_used() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let saved = store.save_credentials("secret").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.mark_credentials_used().unwrap();

        let reloaded = store.load_credentials().unwrap();
        assert_eq!(reloaded.api_key, "secret");
        assert!(reloaded.last_used > saved.last_used);
    }
}
