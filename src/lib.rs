/*!
twoauth: OAuth 1.0a three-legged flow and HMAC-SHA1 signing over reqwest.

# Overview

This library walks a consumer application through the three-legged OAuth 1.0a
flow (request token, user authorization, access token) of a Twitter-style
service and signs arbitrary `GET`/`POST` resource calls afterwards.

Consumer credentials come from a JSON keys file (`TwOauthKeys.json` by
default, see [`Config`]). Every call gets a fresh nonce and timestamp; the
raw response is handed back whatever its status.

# How to use

## Acquiring an access token

```rust,no_run
use std::io;
use twoauth::{Client, Config};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let config = Config::load()?;
let mut client = Client::new(config)?;

// step 1: acquire request token & token secret
client.fetch_request_token(Some("oob"))?;

// step 2: let the user authorize it
println!("please access to: {}", client.authorize_url().unwrap_or_default());
println!("input pin: ");
let mut user_input = String::new();
io::stdin().read_line(&mut user_input)?;

// step 3: exchange it for the access token
let resp = client.fetch_access_token(user_input.trim())?;
println!(
    "your token and secret is: \n token: {}\n secret: {}",
    resp.oauth_token, resp.oauth_token_secret
);
println!("other attributes: {:#?}", resp.remain);
# Ok(())
# }
```

## Calling a resource

```rust,no_run
use twoauth::{Client, Config};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let mut client = Client::new(Config::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]"))?;
client.set_tokens("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let resp = client.post(
    "https://api.twitter.com/1.1/statuses/update.json",
    [("status", "Hello, Twitter!")],
)?;
println!("{} {}", resp.status, resp.body);
# Ok(())
# }
```
*/
mod client;
mod config;
mod encode;
mod error;
mod oauth;
mod params;
mod request;
mod secrets;
mod signer;
mod token_reader;
mod transport;

// exposed to external program
pub use client::{Client, ClientBuilder, FlowState};
pub use config::{Config, Endpoints};
pub use encode::{percent_encode, percent_encode_all, PercentEncode};
pub use error::{
    ConfigError, ConfigResult, Error, Result, TokenReaderError, TokenReaderResult,
};
pub use oauth::{generate_nonce, OAuthParameters, DEFAULT_VERSION, HMAC_SHA1};
pub use params::ParameterSet;
pub use request::{authorization_header, prepare_url, SignedRequest};
pub use secrets::{Credentials, Secrets, SecretsProvider, TokenPair, TokenSource};
pub use signer::{base_string, Signer};
pub use token_reader::{read_oauth_token, TokenReader, TokenResponse};
pub use transport::{ReqwestTransport, Transport, TransportResponse};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";

// crate-private constant variables
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_KEY: &str = "oauth_token";
