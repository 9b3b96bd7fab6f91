use std::collections::HashMap;

use serde::Deserialize;
use url::form_urlencoded;

use crate::transport::TransportResponse;
use crate::{TokenPair, TokenReaderError, TokenReaderResult, OAUTH_TOKEN_KEY};

pub(crate) const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents, e.g. `oauth_callback_confirmed`, `user_id`, `screen_name`
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

impl TokenResponse {
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.oauth_token.as_str(), self.oauth_token_secret.as_str())
    }
}

impl From<TokenResponse> for TokenPair {
    fn from(resp: TokenResponse) -> Self {
        TokenPair::new(resp.oauth_token, resp.oauth_token_secret)
    }
}

/// Add parse_oauth_token feature to [`TransportResponse`].
// this trait is sealed
pub trait TokenReader: private::Sealed {
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse>;
}

impl TokenReader for TransportResponse {
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse> {
        read_oauth_token(&self.body)
    }
}

/// Parses the query-encoded body returned by the request/access token endpoints.
pub fn read_oauth_token(text: &str) -> TokenReaderResult<TokenResponse> {
    let mut destructured = form_urlencoded::parse(text.as_bytes())
        .into_owned()
        .collect::<HashMap<String, String>>();
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_KEY,
            text.to_string(),
        )),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text.to_string(),
        )),
    }
}

mod private {
    use crate::transport::TransportResponse;

    pub trait Sealed {}
    impl Sealed for TransportResponse {}
}
