use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, EXPECT};
use http::Method;
use url::form_urlencoded;

use crate::params::ParameterSet;
use crate::{Result, OAUTH_SIGNATURE_KEY};

/// Scheme word of the `Authorization` header, spelled the way the service
/// has always received it.
pub const OAUTH_HEADER_SCHEME: &str = "Oauth";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Appends `params` to `url` as a query string.
///
/// Entries are emitted in key order, keys untouched and values form-encoded.
/// `oauth_signature` is already percent-encoded by the signer and is copied
/// as-is. An empty set leaves `url` unchanged.
pub fn prepare_url(params: &ParameterSet, url: &str) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| {
            if k == OAUTH_SIGNATURE_KEY {
                format!("{}={}", k, v)
            } else {
                let value = form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>();
                format!("{}={}", k, value)
            }
        })
        .collect::<Vec<String>>()
        .join("&");
    format!("{}?{}", url, query)
}

/// Renders `params` as the value of the `Authorization` header.
///
/// Every entry becomes `key="value", ` in key order, the trailing separator
/// included.
pub fn authorization_header(params: &ParameterSet) -> String {
    let pairs = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\", ", k, v))
        .collect::<String>();
    format!("{} {}", OAUTH_HEADER_SCHEME, pairs)
}

/// `Authorization` plus an empty `Expect`, which tells the transport not to
/// use `Expect: 100-continue`.
pub fn oauth_headers(params: &ParameterSet) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&authorization_header(params)).map_err(http::Error::from)?;
    headers.insert(AUTHORIZATION, value);
    headers.insert(EXPECT, HeaderValue::from_static(""));
    Ok(headers)
}

/// `application/x-www-form-urlencoded` body of `data`, in key order.
pub fn form_body(data: &ParameterSet) -> Result<String> {
    let pairs = data.iter().collect::<Vec<(&str, &str)>>();
    Ok(serde_urlencoded::to_string(pairs)?)
}

/// A fully signed request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl SignedRequest {
    pub fn new<U: Into<String>>(method: Method, url: U) -> Self {
        SignedRequest {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Attaches the `Authorization` header built from the signed `params`.
    pub fn authorization(mut self, params: &ParameterSet) -> Result<Self> {
        self.headers.extend(oauth_headers(params)?);
        Ok(self)
    }

    /// Sends `data` as a form body; an empty set sends no body at all.
    pub fn form(mut self, data: &ParameterSet) -> Result<Self> {
        if data.is_empty() {
            return Ok(self);
        }
        self.body = Some(form_body(data)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        Ok(self)
    }

    /// Value of the `Authorization` header, if one is attached.
    pub fn authorization_value(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Whether the transport must suppress `Expect: 100-continue`.
    pub fn expect_disabled(&self) -> bool {
        self.headers
            .get(EXPECT)
            .map_or(false, |v| v.as_bytes().is_empty())
    }
}
