use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::oauth::DEFAULT_VERSION;
use crate::secrets::Credentials;

/// File looked up in the working directory by [`Config::load`].
pub const CONFIG_PATH: &str = "TwOauthKeys.json";
/// Overrides [`CONFIG_PATH`].
pub const ENV_CONFIG_PATH: &str = "TWOAUTH_CONFIG";
pub const ENV_CONSUMER_KEY: &str = "TWOAUTH_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "TWOAUTH_CONSUMER_SECRET";
pub const ENV_CALLBACK: &str = "TWOAUTH_CALLBACK";

pub const REQUEST_TOKEN_URL: &str = "https://twitter.com/oauth/request_token";
pub const AUTHORIZE_URL: &str = "https://api.twitter.com/oauth/authorize";
pub const ACCESS_TOKEN_URL: &str = "https://api.twitter.com/oauth/access_token";

/// Service endpoints taking part in the three-legged flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub request_token_url: String,
    pub authorize_url: String,
    pub access_token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            request_token_url: REQUEST_TOKEN_URL.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            access_token_url: ACCESS_TOKEN_URL.to_string(),
        }
    }
}

/// Contents of the keys file.
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub oauth_callback: Option<String>,
    #[serde(default)]
    pub session_oauth_token_name: Option<String>,
    #[serde(default)]
    pub session_oauth_token_secret_name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    /// Verify the peer's TLS certificate.
    #[serde(default = "default_verify_peer")]
    pub verify_peer: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(flatten)]
    pub endpoints: Endpoints,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("oauth_callback", &self.oauth_callback)
            .field("session_oauth_token_name", &self.session_oauth_token_name)
            .field(
                "session_oauth_token_secret_name",
                &self.session_oauth_token_secret_name,
            )
            .field("version", &self.version)
            .field("verify_peer", &self.verify_peer)
            .field("timeout_secs", &self.timeout_secs)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_verify_peer() -> bool {
    true
}

impl Config {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Config {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            oauth_callback: None,
            session_oauth_token_name: None,
            session_oauth_token_secret_name: None,
            version: default_version(),
            verify_peer: default_verify_peer(),
            timeout_secs: None,
            endpoints: Endpoints::default(),
        }
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("loading keys file from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Config::from_json(&content)
    }

    /// Reads the file named by `TWOAUTH_CONFIG`, or `TwOauthKeys.json`.
    pub fn load() -> ConfigResult<Self> {
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| CONFIG_PATH.to_string());
        Config::from_path(path)
    }

    /// Builds a config from `TWOAUTH_CONSUMER_KEY`, `TWOAUTH_CONSUMER_SECRET`
    /// and the optional `TWOAUTH_CALLBACK`.
    pub fn from_env() -> ConfigResult<Self> {
        let consumer_key =
            env::var(ENV_CONSUMER_KEY).map_err(|_| ConfigError::MissingKey("consumer_key"))?;
        let consumer_secret = env::var(ENV_CONSUMER_SECRET)
            .map_err(|_| ConfigError::MissingKey("consumer_secret"))?;
        let mut config = Config::new(consumer_key, consumer_secret);
        config.oauth_callback = env::var(ENV_CALLBACK).ok();
        config.credentials()?;
        Ok(config)
    }

    pub fn callback<T: Into<String>>(mut self, callback: T) -> Self {
        self.oauth_callback = Some(callback.into());
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn verify_peer(mut self, verify_peer: bool) -> Self {
        self.verify_peer = verify_peer;
        self
    }

    /// Validated consumer credentials.
    pub fn credentials(&self) -> ConfigResult<Credentials> {
        Credentials::new(self.consumer_key.as_str(), self.consumer_secret.as_str())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
