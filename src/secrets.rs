use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{ConfigError, ConfigResult};

pub trait SecretsProvider {
    fn get_consumer_key_pair(&self) -> (&str, &str);

    fn get_token_pair_option(&self) -> Option<(&str, &str)>;

    fn get_token_option_pair(&self) -> (Option<&str>, Option<&str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or((None, None))
    }
}

/// Consumer key and secret identifying the client application.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
}

impl Credentials {
    /// Both values must be non-empty.
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> ConfigResult<Self>
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        let consumer_key = consumer_key.into();
        let consumer_secret = consumer_secret.into();
        if consumer_key.is_empty() {
            return Err(ConfigError::MissingKey("consumer_key"));
        }
        if consumer_secret.is_empty() {
            return Err(ConfigError::MissingKey("consumer_secret"));
        }
        Ok(Credentials {
            consumer_key,
            consumer_secret,
        })
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

/// `oauth_token` and `oauth_token_secret`, either half possibly unknown.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    pub token: Option<String>,
    pub token_secret: Option<String>,
}

impl TokenPair {
    pub fn new<TKey, TSecret>(token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        TokenPair {
            token: Some(token.into()),
            token_secret: Some(token_secret.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.as_deref().map_or(true, str::is_empty)
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Keyed lookup of previously stored tokens, e.g. a web session.
///
/// The client queries it once, at construction, and only for values that were
/// not supplied explicitly.
pub trait TokenSource {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl TokenSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl TokenSource for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Signing material of one client: credentials plus the current token pair.
#[derive(Debug, Clone)]
pub struct Secrets {
    credentials: Credentials,
    tokens: TokenPair,
}

impl Secrets {
    pub fn new(credentials: Credentials) -> Self {
        Secrets {
            credentials,
            tokens: TokenPair::default(),
        }
    }

    pub fn token(self, tokens: TokenPair) -> Self {
        Secrets { tokens, ..self }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn tokens(&self) -> &TokenPair {
        &self.tokens
    }

    pub(crate) fn set_tokens(&mut self, tokens: TokenPair) {
        self.tokens = tokens;
    }
}

impl SecretsProvider for Secrets {
    fn get_consumer_key_pair(&self) -> (&str, &str) {
        (
            self.credentials.consumer_key(),
            self.credentials.consumer_secret(),
        )
    }

    fn get_token_pair_option(&self) -> Option<(&str, &str)> {
        match (&self.tokens.token, &self.tokens.token_secret) {
            (Some(t), Some(s)) => Some((t.as_str(), s.as_str())),
            _ => None,
        }
    }

    fn get_token_option_pair(&self) -> (Option<&str>, Option<&str>) {
        (
            self.tokens.token.as_deref(),
            self.tokens.token_secret.as_deref(),
        )
    }
}
