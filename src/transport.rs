use http::header::EXPECT;
use http::StatusCode;
use log::{debug, warn};
use reqwest::blocking::Client as ReqwestClient;

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::request::SignedRequest;
use crate::Result;

/// What the server said, untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
    /// Url after redirects.
    pub url: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Executes signed requests.
///
/// Network failures are errors; every HTTP status, including 4xx and 5xx, is
/// an ordinary response.
pub trait Transport {
    fn execute(&self, request: SignedRequest) -> Result<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: SignedRequest) -> Result<TransportResponse> {
        (**self).execute(request)
    }
}

/// Blocking [`reqwest`] transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: ReqwestClient,
}

impl ReqwestTransport {
    /// Default client, peer certificates verified.
    pub fn new() -> ConfigResult<Self> {
        let inner = ReqwestClient::builder()
            .build()
            .map_err(ConfigError::Transport)?;
        Ok(ReqwestTransport { inner })
    }

    /// Applies `verify_peer` and `timeout_secs`.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let mut builder = ReqwestClient::builder();
        #[cfg(any(feature = "rustls-tls", feature = "native-tls"))]
        {
            builder = builder.danger_accept_invalid_certs(!config.verify_peer);
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let inner = builder.build().map_err(ConfigError::Transport)?;
        Ok(ReqwestTransport { inner })
    }

    /// Constructs a new `ReqwestTransport` with specifying inner `reqwest::blocking::Client`.
    pub fn new_with_client(client: ReqwestClient) -> Self {
        ReqwestTransport { inner: client }
    }
}

impl From<ReqwestClient> for ReqwestTransport {
    fn from(client: ReqwestClient) -> Self {
        ReqwestTransport::new_with_client(client)
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: SignedRequest) -> Result<TransportResponse> {
        let SignedRequest {
            method,
            url,
            mut headers,
            body,
        } = request;
        // reqwest never sends `Expect: 100-continue`, an empty marker only
        // has to be kept off the wire.
        if headers.get(EXPECT).map_or(false, |v| v.is_empty()) {
            headers.remove(EXPECT);
        }

        debug!("sending {} {}", method, url);
        let mut builder = self.inner.request(method, url.as_str()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let resp = builder.send()?;

        let status = resp.status();
        let url = resp.url().to_string();
        let body = resp.text()?;
        if status.is_success() {
            debug!("got response {} from {}", status, url);
        } else {
            warn!("got non-success response {} from {}", status, url);
        }
        Ok(TransportResponse { status, body, url })
    }
}
