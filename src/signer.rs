use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use http::Method;
use log::debug;
use sha1::Sha1;

use crate::encode::{percent_encode, PercentEncode};
use crate::params::ParameterSet;
use crate::SecretsProvider;

type HmacSha1 = Hmac<Sha1>;

/// Normalizes `params` into the OAuth signature base string.
///
/// Keys and values are encoded independently, re-sorted by encoded key and
/// joined as `key=value&...`; the result is
/// `METHOD&encode(url)&encode(normalized)`. `url` must not carry a query.
pub fn base_string(method: &Method, params: &ParameterSet, url: &str) -> String {
    let normalized = params.encoded().to_pair_string();
    format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

/// HMAC-SHA1 signer over the secrets of one client.
#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider) -> Self {
        Signer { secrets }
    }

    /// `encode(consumer_secret)&encode(token_secret)`, an absent token secret
    /// encoding to the empty string.
    fn signing_key(&self) -> String {
        let (_, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (_, token_secret) = self.secrets.get_token_option_pair();
        format!(
            "{}&{}",
            percent_encode(consumer_secret),
            token_secret.percent_encode()
        )
    }

    /// Generates the percent-encoded `oauth_signature` for a fully assembled
    /// parameter set.
    pub fn sign(&self, method: &Method, params: &ParameterSet, url: &str) -> String {
        let base = base_string(method, params, url);
        debug!("calculated signature base string: {base}");

        let mut mac = HmacSha1::new_from_slice(self.signing_key().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(base.as_bytes());
        let digest = mac.finalize().into_bytes();

        percent_encode(&STANDARD.encode(digest))
    }
}
