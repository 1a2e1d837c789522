//! Bot configuration read from the environment.
//!
//! Values come through a lookup closure so tests never touch the process
//! environment. Blank values count as unset.

use std::path::PathBuf;
use std::str::FromStr;

use quote_core::{GeneratorSettings, DEFAULT_HISTORY_CAPACITY};
use quote_engine::{GraphSettings, OpenAiSettings, TwitterSettings, DEFAULT_IMAGE_SIZE};
use thiserror::Error;

pub const DEFAULT_TWITTER_USERNAME: &str = "DevWisdomDaily";
pub const DEFAULT_HISTORY_PATH: &str = "./quote_history.ron";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name}={value:?} is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{set} is set but {missing} is not")]
    Incomplete {
        set: &'static str,
        missing: &'static str,
    },
    #[error("no publishing platform configured; set Twitter, Instagram or Threads credentials")]
    NoPlatform,
    #[error("BOT_HISTORY=timeline needs TWITTER_BEARER_TOKEN")]
    TimelineWithoutTwitter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    File,
    Timeline,
    Memory,
}

impl FromStr for HistoryBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "file" => Ok(HistoryBackend::File),
            "timeline" => Ok(HistoryBackend::Timeline),
            "memory" => Ok(HistoryBackend::Memory),
            _ => Err("expected file, timeline or memory".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub openai: OpenAiSettings,
    pub image_size: String,
    pub twitter: Option<TwitterSettings>,
    pub twitter_username: String,
    pub instagram: Option<GraphSettings>,
    pub threads: Option<GraphSettings>,
    pub history: HistoryBackend,
    pub history_path: PathBuf,
    pub history_capacity: usize,
    pub generator: GeneratorSettings,
    pub dry_run: bool,
}

impl BotConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let mut openai = OpenAiSettings::new(env.required("OPENAI_API_KEY")?);
        if let Some(base_url) = env.get("OPENAI_BASE_URL") {
            openai.base_url = base_url;
        }
        if let Some(model) = env.get("OPENAI_MODEL") {
            openai.chat_model = model;
        }

        let twitter = env.get("TWITTER_BEARER_TOKEN").map(TwitterSettings::new);
        let instagram = env
            .pair("INSTAGRAM_USER_ID", "INSTAGRAM_ACCESS_TOKEN")?
            .map(|(user, token)| GraphSettings::instagram(user, token));
        let threads = env
            .pair("THREADS_USER_ID", "THREADS_ACCESS_TOKEN")?
            .map(|(user, token)| GraphSettings::threads(user, token));

        let history = env.parsed("BOT_HISTORY", HistoryBackend::File)?;
        if history == HistoryBackend::Timeline && twitter.is_none() {
            return Err(ConfigError::TimelineWithoutTwitter);
        }

        let history_capacity = env.parsed("BOT_HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY)?;
        if history_capacity == 0 {
            return Err(invalid("BOT_HISTORY_CAPACITY", "0", "must be at least 1"));
        }

        let defaults = GeneratorSettings::default();
        let similarity_threshold =
            env.parsed("BOT_SIMILARITY_THRESHOLD", defaults.similarity_threshold)?;
        if similarity_threshold > 100 {
            return Err(invalid(
                "BOT_SIMILARITY_THRESHOLD",
                &similarity_threshold.to_string(),
                "must be within 0..=100",
            ));
        }
        let max_attempts = env.parsed("BOT_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(invalid("BOT_MAX_ATTEMPTS", "0", "must be at least 1"));
        }

        let dry_run = env.flag("BOT_DRY_RUN")?;
        if !dry_run && twitter.is_none() && instagram.is_none() && threads.is_none() {
            return Err(ConfigError::NoPlatform);
        }

        Ok(Self {
            openai,
            image_size: env
                .get("OPENAI_IMAGE_SIZE")
                .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
            twitter,
            twitter_username: env
                .get("TWITTER_USERNAME")
                .unwrap_or_else(|| DEFAULT_TWITTER_USERNAME.to_string()),
            instagram,
            threads,
            history,
            history_path: env
                .get("BOT_HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH)),
            history_capacity,
            generator: GeneratorSettings {
                similarity_threshold,
                max_attempts,
                ..defaults
            },
            dry_run,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|err: T::Err| invalid(name, &raw, &err.to_string())),
        }
    }

    fn flag(&self, name: &'static str) -> Result<bool, ConfigError> {
        let Some(raw) = self.get(name) else {
            return Ok(false);
        };
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, &raw, "expected true or false")),
        }
    }

    /// Both or neither of two credentials.
    fn pair(
        &self,
        first: &'static str,
        second: &'static str,
    ) -> Result<Option<(String, String)>, ConfigError> {
        match (self.get(first), self.get(second)) {
            (Some(a), Some(b)) => Ok(Some((a, b))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::Incomplete {
                set: first,
                missing: second,
            }),
            (None, Some(_)) => Err(ConfigError::Incomplete {
                set: second,
                missing: first,
            }),
        }
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_with_minimal_environment() {
        let config = config(&[("OPENAI_API_KEY", "sk-1"), ("TWITTER_BEARER_TOKEN", "tw")]).unwrap();

        assert_eq!(config.openai.api_key, "sk-1");
        assert_eq!(config.openai.chat_model, "gpt-4");
        assert_eq!(config.image_size, "1024x1024");
        assert_eq!(config.twitter_username, "DevWisdomDaily");
        assert_eq!(config.history, HistoryBackend::File);
        assert_eq!(config.history_path, PathBuf::from("./quote_history.ron"));
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.generator, GeneratorSettings::default());
        assert!(config.instagram.is_none());
        assert!(config.threads.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn api_key_is_required() {
        let err = config(&[("TWITTER_BEARER_TOKEN", "tw")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("OPENAI_API_KEY"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let err = config(&[("OPENAI_API_KEY", "  "), ("TWITTER_BEARER_TOKEN", "tw")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("OPENAI_API_KEY"));
    }

    #[test]
    fn some_platform_is_required_unless_dry_run() {
        assert_eq!(
            config(&[("OPENAI_API_KEY", "sk")]).unwrap_err(),
            ConfigError::NoPlatform
        );

        let dry = config(&[("OPENAI_API_KEY", "sk"), ("BOT_DRY_RUN", "true")]).unwrap();
        assert!(dry.dry_run);
    }

    #[test]
    fn graph_credentials_come_in_pairs() {
        let err = config(&[("OPENAI_API_KEY", "sk"), ("INSTAGRAM_USER_ID", "178")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Incomplete {
                set: "INSTAGRAM_USER_ID",
                missing: "INSTAGRAM_ACCESS_TOKEN"
            }
        );

        let config = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("THREADS_USER_ID", "42"),
            ("THREADS_ACCESS_TOKEN", "th-token"),
        ])
        .unwrap();
        let threads = config.threads.unwrap();
        assert_eq!(threads.user_id, "42");
        assert_eq!(threads.access_token, "th-token");
    }

    #[test]
    fn generator_overrides_are_validated() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("BOT_DRY_RUN", "1"),
            ("BOT_SIMILARITY_THRESHOLD", "75"),
            ("BOT_MAX_ATTEMPTS", "3"),
        ])
        .unwrap();
        assert_eq!(config.generator.similarity_threshold, 75);
        assert_eq!(config.generator.max_attempts, 3);

        let too_high = super::BotConfig::from_lookup(|name| match name {
            "OPENAI_API_KEY" => Some("sk".into()),
            "BOT_DRY_RUN" => Some("1".into()),
            "BOT_SIMILARITY_THRESHOLD" => Some("101".into()),
            _ => None,
        });
        assert!(matches!(
            too_high,
            Err(ConfigError::Invalid {
                name: "BOT_SIMILARITY_THRESHOLD",
                ..
            })
        ));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let err = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("BOT_DRY_RUN", "1"),
            ("BOT_MAX_ATTEMPTS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BOT_MAX_ATTEMPTS", .. }));
    }

    #[test]
    fn timeline_history_needs_twitter_credentials() {
        let err = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("BOT_DRY_RUN", "1"),
            ("BOT_HISTORY", "timeline"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::TimelineWithoutTwitter);

        let config = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("TWITTER_BEARER_TOKEN", "tw"),
            ("BOT_HISTORY", "Timeline"),
            ("TWITTER_USERNAME", "@someone"),
        ])
        .unwrap();
        assert_eq!(config.history, HistoryBackend::Timeline);
        assert_eq!(config.twitter_username, "@someone");
    }

    #[test]
    fn unknown_values_are_reported() {
        let err = config(&[("OPENAI_API_KEY", "sk"), ("BOT_DRY_RUN", "maybe")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "BOT_DRY_RUN",
                value: "maybe".into(),
                reason: "expected true or false".into()
            }
        );

        let err = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("BOT_DRY_RUN", "1"),
            ("BOT_HISTORY", "mongo"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BOT_HISTORY", .. }));
    }
}
