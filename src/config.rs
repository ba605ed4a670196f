use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::{command::lifecycle::DEFAULT_KEYWORD, keys::DictionaryLoader, model::KEYS_ACTOR_PREFIX};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    #[serde(default)]
    pub command: CommandConfig,

    #[serde(default)]
    pub hub: SessionConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Directories holding `<actor>.json` definitions, searched in order.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

impl DictionaryConfig {
    /// Configured paths followed by those of the environment.
    pub fn loader(&self) -> DictionaryLoader {
        DictionaryLoader::new(self.search_paths.clone()).with_env_paths()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default, with = "option_duration_ms")]
    pub default_timeout: Option<Duration>,

    #[serde(default = "default_keyword")]
    pub default_keyword: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            default_timeout: None,
            default_keyword: default_keyword(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_commander")]
    pub commander: String,

    #[serde(default = "default_keys_prefix")]
    pub keys_prefix: String,

    /// Actors whose models are tracked.
    #[serde(default)]
    pub models: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            commander: default_commander(),
            keys_prefix: default_keys_prefix(),
            models: Vec::new(),
        }
    }
}

impl HubConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        from_file(path)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        from_str(s)
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, ConfigError> {
    Ok(serde_json::from_str(s)?)
}

fn default_keyword() -> String {
    DEFAULT_KEYWORD.to_string()
}

fn default_commander() -> String {
    "hub.hub".to_string()
}

fn default_keys_prefix() -> String {
    KEYS_ACTOR_PREFIX.to_string()
}

mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HubConfig::from_str("{}").unwrap();
        assert_eq!(config, HubConfig::default());
        assert_eq!(config.hub.commander, "hub.hub");
        assert_eq!(config.hub.keys_prefix, "keys_");
        assert_eq!(config.command.default_keyword, "text");
        assert_eq!(config.command.default_timeout, None);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "dictionary": {"search_paths": ["/opt/keys"]},
            "command": {"default_timeout": 1500},
            "hub": {"commander": "tron.tron", "models": ["alerts", "tcc"]}
        }"#;
        let config = HubConfig::from_str(json).unwrap();
        assert_eq!(config.dictionary.search_paths, vec![PathBuf::from("/opt/keys")]);
        assert_eq!(config.command.default_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.command.default_keyword, "text");
        assert_eq!(config.hub.commander, "tron.tron");
        assert_eq!(config.hub.models, vec!["alerts", "tcc"]);
        assert_eq!(config.dictionary.loader().search_paths()[0], PathBuf::from("/opt/keys"));

        let round_trip: HubConfig =
            from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hub": {{"keys_prefix": "k_"}}}}"#).unwrap();
        let config = HubConfig::from_file(file.path()).unwrap();
        assert_eq!(config.hub.keys_prefix, "k_");

        assert!(matches!(
            HubConfig::from_file("/nonexistent/hub.json"),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(
            HubConfig::from_str("{\"hub\": 3}"),
            Err(ConfigError::Format(_))
        ));
    }
}
