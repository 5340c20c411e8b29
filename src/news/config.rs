use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where reports are emailed, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub to:      String,
}

/// The user-editable news job configuration.
///
/// Keys missing from the file stay missing: lists read as empty and
/// `language`/`email` as `None`. Nothing is filled in from
/// [`NewsConfig::builtin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default)]
    pub topics:         Vec<String>,
    #[serde(default)]
    pub schedule_times: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language:       Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email:          Option<EmailSettings>,
}

impl NewsConfig {
    /// Written to disk the first time the job runs.
    pub fn builtin() -> Self {
        Self {
            topics: vec![
                "Top news in Japan".to_string(),
                "Top news in the United States".to_string(),
            ],
            schedule_times: vec!["09:00".to_string(), "18:00".to_string()],
            language:       Some("Japanese".to_string()),
            email: Some(EmailSettings {
                enabled: true,
                to:      "you@example.com".to_string(),
            }),
        }
    }

    pub fn language(&self) -> Result<&str, ConfigError> {
        self.language.as_deref().ok_or(ConfigError::MissingKey("language"))
    }

    /// Recipient address when mailing is switched on and an address is set.
    pub fn email_recipient(&self) -> Option<&str> {
        self.email.as_ref()
            .filter(|e| e.enabled && !e.to.trim().is_empty())
            .map(|e| e.to.as_str())
    }
}

/// Loads the config file, creating it with [`NewsConfig::builtin`] when absent.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<NewsConfig, ConfigError> {
        if self.path.exists() {
            let data = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;
            return serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            });
        }

        let config = NewsConfig::builtin();
        self.write(&config)?;
        tracing::info!(path = %self.path.display(), "created default news config");
        Ok(config)
    }

    fn write(&self, config: &NewsConfig) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        // serde_json writes non-ASCII text as-is.
        let data = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, data).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_default_file_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));

        let loaded = store.load().unwrap();
        assert_eq!(loaded, NewsConfig::builtin());
        assert!(store.path().exists());

        let on_disk: NewsConfig =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, loaded);
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn subset_file_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "topics": ["経済ニュース"] }"#).unwrap();

        let loaded = ConfigStore::new(&path).load().unwrap();
        assert_eq!(loaded.topics, vec!["経済ニュース"]);
        assert!(loaded.schedule_times.is_empty());
        assert_eq!(loaded.language, None);
        assert_eq!(loaded.email, None);
        assert!(matches!(loaded.language(), Err(ConfigError::MissingKey("language"))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ topics: ").unwrap();

        let err = ConfigStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn recipient_requires_enabled_and_address() {
        let mut config = NewsConfig::builtin();
        assert_eq!(config.email_recipient(), Some("you@example.com"));

        config.email = Some(EmailSettings { enabled: false, to: "a@b.c".into() });
        assert_eq!(config.email_recipient(), None);

        config.email = Some(EmailSettings { enabled: true, to: " ".into() });
        assert_eq!(config.email_recipient(), None);
    }
}
