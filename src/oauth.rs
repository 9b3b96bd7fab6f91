use std::borrow::Cow;

use chrono::Utc;
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::params::ParameterSet;
use crate::SecretsProvider;
use crate::{
    OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY,
    OAUTH_TOKEN_KEY, OAUTH_VERSION_KEY,
};

/// The only signature method this crate speaks.
pub const HMAC_SHA1: &str = "HMAC-SHA1";
/// Value of `oauth_version` unless configured otherwise.
pub const DEFAULT_VERSION: &str = "1.0a";

/// Assembles the OAuth protocol parameters of a single request.
///
/// Holds what stays constant between calls (optionally a pinned version,
/// nonce or timestamp for reproducible signatures); consumer key and token
/// come from the [`SecretsProvider`] on every build. An unpinned version
/// falls back to [`DEFAULT_VERSION`].
#[derive(Debug, Clone)]
pub struct OAuthParameters<'a> {
    nonce: Option<Cow<'a, str>>,
    timestamp: Option<i64>,
    version: Option<Cow<'a, str>>,
}

impl Default for OAuthParameters<'static> {
    fn default() -> Self {
        OAuthParameters {
            nonce: None,
            timestamp: None,
            version: None,
        }
    }
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> OAuthParameters<'static> {
        Default::default()
    }

    /// pin the oauth_nonce value
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// pin the oauth_timestamp value
    pub fn timestamp(self, timestamp: i64) -> Self {
        OAuthParameters {
            timestamp: Some(timestamp),
            ..self
        }
    }

    /// set the oauth_version value
    pub fn version<T>(self, version: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            version: Some(version.into()),
            ..self
        }
    }

    /// set the oauth_version value unless one is already pinned
    pub fn default_version<T>(self, version: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        match self.version {
            Some(_) => self,
            None => self.version(version),
        }
    }

    pub fn get_version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Builds the parameter set for one request.
    ///
    /// Base parameters (consumer key, signature method, version, token when the
    /// secrets hold one) are written first, `extra` is laid over them, and
    /// `oauth_nonce`/`oauth_timestamp` are written last.
    pub fn build<S, I, K, V>(&self, secrets: &S, extra: I) -> ParameterSet
    where
        S: SecretsProvider + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (consumer_key, _) = secrets.get_consumer_key_pair();
        let (token, _) = secrets.get_token_option_pair();

        let mut params = ParameterSet::new();
        params.insert(OAUTH_CONSUMER_KEY, consumer_key);
        params.insert(OAUTH_VERSION_KEY, self.get_version());
        params.insert(OAUTH_SIGNATURE_METHOD_KEY, HMAC_SHA1);
        if let Some(token) = token {
            params.insert(OAUTH_TOKEN_KEY, token);
        }

        params.overlay(extra);

        let timestamp = self.timestamp.unwrap_or_else(|| Utc::now().timestamp());
        let nonce = match self.nonce {
            Some(ref nonce) => nonce.to_string(),
            None => generate_nonce(timestamp),
        };
        params.insert(OAUTH_NONCE_KEY, nonce);
        params.insert(OAUTH_TIMESTAMP_KEY, timestamp.to_string());
        params
    }
}

/// Hex SHA-1 of the timestamp followed by a fresh UUID.
pub fn generate_nonce(timestamp: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(Uuid::new_v4().simple().to_string().as_bytes());
    hex::encode(hasher.finalize())
}
