//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::Path, sync::Arc, time::Duration};

use serde::Deserialize;

use crate::base::{
    error::ConfigError,
    profile::{BotKind, BotProfile},
};

use super::types::Res;

/// Default hosted model for both bots.
fn default_model() -> String {
    "tiiuae/falcon-7b-instruct".to_string()
}

/// Default base URL of the Hugging Face inference API.
fn default_inference_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

/// Default upper bound on a single inference call, in seconds.
fn default_inference_timeout_secs() -> u64 {
    120
}

/// Configuration for a mention bot.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Which bot this configuration is for (set from the command line).
    #[serde(default)]
    pub bot: BotKind,
    /// Slack bot token (`SLACK_<BOT>_BOT_TOKEN`).
    #[serde(default)]
    pub bot_token: String,
    /// Slack request signing secret (`SLACK_<BOT>_SIGNING_SECRET`).
    #[serde(default)]
    pub signing_secret: String,
    /// The bot's own Slack user ID (`SLACK_<BOT>_BOT_USER_ID`).
    #[serde(default)]
    pub bot_user_id: String,
    /// Hugging Face inference API token (`HUGGINGFACEHUB_API_TOKEN`).
    #[serde(default)]
    pub huggingfacehub_api_token: String,
    /// Hosted model identifier (`SLACK_<BOT>_MODEL`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the inference API (`SLACK_<BOT>_INFERENCE_ENDPOINT`).
    #[serde(default = "default_inference_endpoint")]
    pub inference_endpoint: String,
    /// Timeout for one inference call (`SLACK_<BOT>_INFERENCE_TIMEOUT_SECS`).
    #[serde(default = "default_inference_timeout_secs")]
    pub inference_timeout_secs: u64,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            bot: BotKind::default(),
            bot_token: String::new(),
            signing_secret: String::new(),
            bot_user_id: String::new(),
            huggingfacehub_api_token: String::new(),
            model: default_model(),
            inference_endpoint: default_inference_endpoint(),
            inference_timeout_secs: default_inference_timeout_secs(),
        }
    }
}

impl ConfigInner {
    /// The static profile of the configured bot.
    pub fn profile(&self) -> &'static BotProfile {
        self.bot.profile()
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}

impl Config {
    /// Load the configuration for `bot` from an optional TOML file and the process environment.
    pub fn load(bot: BotKind, explicit_path: Option<&Path>) -> Res<Self> {
        Ok(Self::load_with_env(bot, explicit_path, None)?)
    }

    /// Load the configuration, reading variables from `env` instead of the process environment when given.
    pub fn load_with_env(bot: BotKind, explicit_path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let profile = bot.profile();
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        cfg = cfg
            .add_source(config::Environment::with_prefix(profile.env_prefix).source(env.clone()))
            .add_source(config::Environment::with_prefix("HUGGINGFACEHUB").keep_prefix(true).source(env))
            .set_override("bot", bot.as_str())?;

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("bot_token", &self.bot_token),
            ("signing_secret", &self.signing_secret),
            ("bot_user_id", &self.bot_user_id),
            ("huggingfacehub_api_token", &self.huggingfacehub_api_token),
            ("model", &self.model),
            ("inference_endpoint", &self.inference_endpoint),
        ];

        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Missing(*key));
        }

        if self.inference_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "inference_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

// Tests.
