use http::Method;
use log::debug;
use url::form_urlencoded;

use crate::config::{Config, Endpoints};
use crate::oauth::OAuthParameters;
use crate::params::ParameterSet;
use crate::request::{prepare_url, SignedRequest};
use crate::secrets::{Secrets, TokenPair, TokenSource};
use crate::signer::Signer;
use crate::token_reader::{TokenReader, TokenResponse};
use crate::transport::{ReqwestTransport, Transport, TransportResponse};
use crate::{
    Error, Result, OAUTH_CALLBACK_KEY, OAUTH_SIGNATURE_KEY, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY,
};

/// Where a client stands in the three-legged flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// No token yet.
    Unauthenticated,
    /// Holds a request token; the user still has to authorize it.
    RequestTokenObtained,
    /// Holds an access token; signed resource calls can be made.
    AccessTokenObtained,
}

/// Collects everything a [`Client`] is built from.
///
/// Tokens given through [`token`](ClientBuilder::token) and
/// [`token_secret`](ClientBuilder::token_secret) win over those found in a
/// [`TokenSource`], whatever the call order.
#[derive(Debug)]
pub struct ClientBuilder {
    config: Config,
    explicit: TokenPair,
    session: TokenPair,
    parameters: OAuthParameters<'static>,
}

impl ClientBuilder {
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.explicit.token = Some(token.into());
        self
    }

    pub fn token_secret<T: Into<String>>(mut self, token_secret: T) -> Self {
        self.explicit.token_secret = Some(token_secret.into());
        self
    }

    pub fn tokens(self, tokens: TokenPair) -> Self {
        ClientBuilder {
            explicit: tokens,
            ..self
        }
    }

    /// Looks up the session token names of the config in `source`, once.
    pub fn token_source<S: TokenSource + ?Sized>(mut self, source: &S) -> Self {
        let lookup = |name: &Option<String>| {
            name.as_deref()
                .filter(|n| !n.is_empty())
                .and_then(|n| source.lookup(n))
        };
        self.session = TokenPair {
            token: lookup(&self.config.session_oauth_token_name),
            token_secret: lookup(&self.config.session_oauth_token_secret_name),
        };
        self
    }

    /// Replaces the protocol parameter template, e.g. to pin nonce and timestamp.
    pub fn parameters(mut self, parameters: OAuthParameters<'static>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Builds a client over the blocking reqwest transport.
    pub fn build(self) -> Result<Client<ReqwestTransport>> {
        self.config.credentials()?;
        let transport = ReqwestTransport::from_config(&self.config)?;
        self.build_with(transport)
    }

    /// Builds a client over `transport`; the transport is not used here.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let credentials = self.config.credentials()?;
        let tokens = TokenPair {
            token: self.explicit.token.or(self.session.token),
            token_secret: self.explicit.token_secret.or(self.session.token_secret),
        };
        let state = if tokens.is_empty() {
            FlowState::Unauthenticated
        } else {
            FlowState::AccessTokenObtained
        };
        let parameters = self.parameters.default_version(self.config.version);

        Ok(Client {
            transport,
            secrets: Secrets::new(credentials).token(tokens),
            parameters,
            callback: self.config.oauth_callback,
            endpoints: self.config.endpoints,
            state,
        })
    }
}

/// OAuth 1.0a client: runs the three-legged flow and signs resource calls.
///
/// Every call assembles a fresh parameter set (new nonce and timestamp) and
/// hands back whatever the transport returned. Nothing is retried.
#[derive(Debug)]
pub struct Client<T = ReqwestTransport> {
    transport: T,
    secrets: Secrets,
    parameters: OAuthParameters<'static>,
    callback: Option<String>,
    endpoints: Endpoints,
    state: FlowState,
}

impl Client<ReqwestTransport> {
    /// Client over the blocking reqwest transport, without tokens.
    pub fn new(config: Config) -> Result<Self> {
        Client::builder(config).build()
    }

    /// Reads the keys file (see [`Config::load`]) and builds a client from it.
    pub fn from_keys_file() -> Result<Self> {
        Client::new(Config::load()?)
    }
}

impl Client<()> {
    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder {
            config,
            explicit: TokenPair::default(),
            session: TokenPair::default(),
            parameters: OAuthParameters::new(),
        }
    }
}

impl<T: Transport> Client<T> {
    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn tokens(&self) -> &TokenPair {
        self.secrets.tokens()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Installs a token pair, typically the access token, from any state.
    pub fn set_tokens<TKey, TSecret>(
        &mut self,
        token: TKey,
        token_secret: TSecret,
    ) -> &mut Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        self.secrets.set_tokens(TokenPair::new(token, token_secret));
        self.state = FlowState::AccessTokenObtained;
        self
    }

    /// Installs a request token, to be exchanged by [`get_access_key`](Client::get_access_key).
    pub fn set_request_token<TKey, TSecret>(
        &mut self,
        token: TKey,
        token_secret: TSecret,
    ) -> &mut Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        self.secrets.set_tokens(TokenPair::new(token, token_secret));
        self.state = FlowState::RequestTokenObtained;
        self
    }

    fn sign_into(
        &self,
        signer_secrets: &Secrets,
        method: &Method,
        params: &mut ParameterSet,
        url: &str,
    ) {
        let signature = Signer::new(signer_secrets).sign(method, params, url);
        params.insert(OAUTH_SIGNATURE_KEY, signature);
    }

    /// Signed request for a request token, not yet sent.
    ///
    /// `callback` falls back to the configured one; with neither, no
    /// `oauth_callback` is sent. No token takes part in the signature.
    pub fn request_token_request(&self, callback: Option<&str>) -> Result<SignedRequest> {
        let secrets = Secrets::new(self.secrets.credentials().clone());
        let mut params = self.parameters.build(&secrets, ParameterSet::new());

        let callback = callback
            .filter(|c| !c.is_empty())
            .or_else(|| self.callback.as_deref())
            .filter(|c| !c.is_empty());
        if let Some(callback) = callback {
            params.insert(OAUTH_CALLBACK_KEY, callback);
        }
        params.remove(OAUTH_TOKEN_KEY);

        let endpoint = self.endpoints.request_token_url.as_str();
        self.sign_into(&secrets, &Method::GET, &mut params, endpoint);
        Ok(SignedRequest::new(Method::GET, prepare_url(&params, endpoint)))
    }

    /// Asks the service for a request token and returns its raw answer.
    pub fn get_request_token(&self, callback: Option<&str>) -> Result<TransportResponse> {
        let request = self.request_token_request(callback)?;
        debug!("requesting request token");
        self.transport.execute(request)
    }

    /// Signed exchange of the current request token for an access token.
    ///
    /// `oauth_verifier` travels in the form body and is not part of the
    /// signature.
    pub fn access_token_request(&self, verifier: &str) -> Result<SignedRequest> {
        if self.secrets.tokens().is_empty() {
            return Err(Error::MissingRequestToken);
        }
        let mut params = self.parameters.build(&self.secrets, ParameterSet::new());

        let endpoint = self.endpoints.access_token_url.as_str();
        self.sign_into(&self.secrets, &Method::POST, &mut params, endpoint);

        let data = ParameterSet::from([(OAUTH_VERIFIER_KEY, verifier)]);
        SignedRequest::new(Method::POST, prepare_url(&params, endpoint))
            .authorization(&params)?
            .form(&data)
    }

    /// Exchanges the request token for an access token and returns the raw
    /// answer.
    pub fn get_access_key(&self, verifier: &str) -> Result<TransportResponse> {
        let request = self.access_token_request(verifier)?;
        debug!("requesting access token");
        self.transport.execute(request)
    }

    /// Signed `GET`: `data` is signed and sent as the query of `url`.
    ///
    /// `url` is signed as given and must not carry a query of its own.
    pub fn get_request<I, K, V>(&self, url: &str, data: I) -> Result<SignedRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = data.into_iter().collect::<ParameterSet>();
        let mut params = self.parameters.build(&self.secrets, data.clone());
        self.sign_into(&self.secrets, &Method::GET, &mut params, url);
        SignedRequest::new(Method::GET, prepare_url(&data, url)).authorization(&params)
    }

    pub fn get<I, K, V>(&self, url: &str, data: I) -> Result<TransportResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.get_request(url, data)?;
        self.transport.execute(request)
    }

    /// Signed `POST`: `data` is signed and sent as a form body.
    pub fn post_request<I, K, V>(&self, url: &str, data: I) -> Result<SignedRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = data.into_iter().collect::<ParameterSet>();
        let mut params = self.parameters.build(&self.secrets, data.clone());
        self.sign_into(&self.secrets, &Method::POST, &mut params, url);
        SignedRequest::new(Method::POST, url)
            .authorization(&params)?
            .form(&data)
    }

    pub fn post<I, K, V>(&self, url: &str, data: I) -> Result<TransportResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.post_request(url, data)?;
        self.transport.execute(request)
    }

    /// [`get_request_token`](Client::get_request_token), parsed and installed
    /// as the current request token.
    pub fn fetch_request_token(&mut self, callback: Option<&str>) -> Result<TokenResponse> {
        let resp = self.get_request_token(callback)?;
        let token = resp.parse_oauth_token()?;
        self.set_request_token(token.oauth_token.as_str(), token.oauth_token_secret.as_str());
        Ok(token)
    }

    /// Url the user has to visit to authorize the current request token.
    pub fn authorize_url(&self) -> Option<String> {
        let token = self.secrets.tokens().token.as_deref()?;
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(OAUTH_TOKEN_KEY, token)
            .finish();
        Some(format!("{}?{}", self.endpoints.authorize_url, query))
    }

    /// [`get_access_key`](Client::get_access_key), parsed and installed as
    /// the access token.
    pub fn fetch_access_token(&mut self, verifier: &str) -> Result<TokenResponse> {
        let resp = self.get_access_key(verifier)?;
        let token = resp.parse_oauth_token()?;
        self.set_tokens(token.oauth_token.as_str(), token.oauth_token_secret.as_str());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    use http::header::{AUTHORIZATION, CONTENT_TYPE};
    use http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ConfigError;

    #[derive(Default)]
    struct RecordingTransport {
        requests: RefCell<Vec<SignedRequest>>,
        responses: RefCell<VecDeque<TransportResponse>>,
    }

    impl RecordingTransport {
        fn respond(&self, status: StatusCode, body: &str) {
            self.responses.borrow_mut().push_back(TransportResponse {
                status,
                body: body.to_string(),
                url: String::new(),
            });
        }

        fn last(&self) -> SignedRequest {
            self.requests.borrow().last().cloned().unwrap()
        }
    }

    impl Transport for RecordingTransport {
        fn execute(&self, request: SignedRequest) -> Result<TransportResponse> {
            let url = request.url.clone();
            self.requests.borrow_mut().push(request);
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(TransportResponse {
                    status: StatusCode::OK,
                    body: String::new(),
                    url,
                }))
        }
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config() -> Config {
        Config::new("ck", "cs").callback("oob")
    }

    fn pinned() -> OAuthParameters<'static> {
        OAuthParameters::new().nonce("n").timestamp(1_318_622_958)
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        let (_, query) = url.split_once('?').unwrap();
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    fn header_pairs(header: &str) -> Vec<(String, String)> {
        header
            .strip_prefix("Oauth ")
            .unwrap()
            .split(", ")
            .filter(|s| !s.is_empty())
            .map(|item| {
                let (k, v) = item.split_once('=').unwrap();
                (k.to_string(), v.trim_matches('"').to_string())
            })
            .collect()
    }

    #[test]
    fn missing_credentials_abort_before_network() {
        let transport = RecordingTransport::default();
        let result = Client::builder(Config::new("", "cs")).build_with(&transport);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingKey("consumer_key")))
        ));
        let result = Client::builder(Config::new("ck", "")).build_with(&transport);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingKey("consumer_secret")))
        ));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn request_token_pinned_vector() {
        init_logger();
        let transport = RecordingTransport::default();
        let client = Client::builder(config())
            .parameters(pinned())
            .build_with(&transport)
            .unwrap();
        client.get_request_token(None).unwrap();

        let req = transport.last();
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.url,
            "https://twitter.com/oauth/request_token?oauth_callback=oob&oauth_consumer_key=ck&oauth_nonce=n&oauth_signature=A9yuQ%2Bk4R0wmvIePnVtOSL9a1XA%3D&oauth_signature_method=HMAC-SHA1&oauth_timestamp=1318622958&oauth_version=1.0a"
        );
        assert!(req.headers.get(AUTHORIZATION).is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn pinned_version_survives_config_default() {
        let transport = RecordingTransport::default();
        let parameters = OAuthParameters::new()
            .nonce("n")
            .timestamp(1)
            .version("1.0");
        let client = Client::builder(config())
            .parameters(parameters)
            .build_with(&transport)
            .unwrap();
        let req = client.request_token_request(None).unwrap();
        assert_eq!(query_of(&req.url)["oauth_version"], "1.0");

        let mut config = config();
        config.version = "1.0".to_string();
        let client = Client::builder(config)
            .parameters(pinned())
            .build_with(&transport)
            .unwrap();
        let req = client.request_token_request(None).unwrap();
        assert_eq!(query_of(&req.url)["oauth_version"], "1.0");
    }

    #[test]
    fn request_token_never_carries_token() {
        let transport = RecordingTransport::default();
        let client = Client::builder(config())
            .token("tok")
            .token_secret("ts")
            .parameters(pinned())
            .build_with(&transport)
            .unwrap();
        client.get_request_token(None).unwrap();
        let query = query_of(&transport.last().url);
        assert!(!query.contains_key("oauth_token"));
        // token secret does not enter the signing key either
        assert_eq!(query["oauth_signature"], "A9yuQ+k4R0wmvIePnVtOSL9a1XA=");
    }

    #[test]
    fn request_token_callback_resolution() {
        let transport = RecordingTransport::default();
        let client = Client::builder(config()).build_with(&transport).unwrap();
        client.get_request_token(Some("http://localhost/cb")).unwrap();
        assert_eq!(
            query_of(&transport.last().url)["oauth_callback"],
            "http://localhost/cb"
        );
        client.get_request_token(Some("")).unwrap();
        assert_eq!(query_of(&transport.last().url)["oauth_callback"], "oob");

        let client = Client::builder(Config::new("ck", "cs"))
            .build_with(&transport)
            .unwrap();
        client.get_request_token(None).unwrap();
        assert!(!query_of(&transport.last().url).contains_key("oauth_callback"));
    }

    #[test]
    fn request_tokens_are_fresh_each_call() {
        let transport = RecordingTransport::default();
        let client = Client::builder(config()).build_with(&transport).unwrap();
        client.get_request_token(None).unwrap();
        client.get_request_token(None).unwrap();
        let requests = transport.requests.borrow();
        let first = query_of(&requests[0].url);
        let second = query_of(&requests[1].url);
        assert_ne!(first["oauth_nonce"], second["oauth_nonce"]);
        assert_ne!(first["oauth_signature"], second["oauth_signature"]);
    }

    #[test]
    fn get_signs_data_and_token_once() {
        let transport = RecordingTransport::default();
        let mut client = Client::builder(config())
            .parameters(pinned())
            .build_with(&transport)
            .unwrap();
        client.set_tokens("tok", "ts");
        assert_eq!(client.state(), FlowState::AccessTokenObtained);

        let url = "https://api.twitter.com/1.1/statuses/user_timeline.json";
        client
            .get(url, [("screen_name", "twitterapi"), ("count", "2")])
            .unwrap();

        let req = transport.last();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, format!("{}?count=2&screen_name=twitterapi", url));
        assert!(req.expect_disabled());

        let pairs = header_pairs(req.authorization_value().unwrap());
        let tokens = pairs.iter().filter(|(k, _)| k == "oauth_token").count();
        assert_eq!(tokens, 1);
        let signature = pairs
            .iter()
            .find(|(k, _)| k == "oauth_signature")
            .map(|(_, v)| v.as_str());
        assert_eq!(signature, Some("D8sJ1Nh1VFtwSMXGNwrCWZMAu8c%3D"));
        assert_eq!(
            pairs.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            vec![
                "count",
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_token",
                "oauth_version",
                "screen_name",
            ]
        );
    }

    #[test]
    fn post_sends_form_body() {
        let transport = RecordingTransport::default();
        let mut client = Client::builder(config()).build_with(&transport).unwrap();
        client.set_tokens("tok", "ts");
        client
            .post(
                "https://api.twitter.com/1.1/statuses/update.json",
                [("status", "Hello Ladies + Gentlemen, a signed OAuth request!")],
            )
            .unwrap();

        let req = transport.last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "https://api.twitter.com/1.1/statuses/update.json");
        assert_eq!(
            req.body.as_deref(),
            Some("status=Hello+Ladies+%2B+Gentlemen%2C+a+signed+OAuth+request%21")
        );
        assert_eq!(req.headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
        let header = req.authorization_value().unwrap();
        assert!(header.contains("oauth_token=\"tok\", "));
        assert!(header.contains("oauth_signature=\""));
    }

    #[test]
    fn access_key_needs_request_token() {
        let transport = RecordingTransport::default();
        let client = Client::builder(config()).build_with(&transport).unwrap();
        assert!(matches!(
            client.get_access_key("verifier"),
            Err(Error::MissingRequestToken)
        ));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn access_key_posts_verifier() {
        let transport = RecordingTransport::default();
        let mut client = Client::builder(config()).build_with(&transport).unwrap();
        client.set_request_token("reqtok", "reqsecret");
        client.get_access_key("1234567").unwrap();

        let req = transport.last();
        assert_eq!(req.method, Method::POST);
        assert!(req
            .url
            .starts_with("https://api.twitter.com/oauth/access_token?"));
        let query = query_of(&req.url);
        assert_eq!(query["oauth_token"], "reqtok");
        assert!(!query.contains_key("oauth_verifier"));
        assert_eq!(req.body.as_deref(), Some("oauth_verifier=1234567"));
        assert!(req
            .authorization_value()
            .unwrap()
            .contains("oauth_token=\"reqtok\", "));
    }

    #[test]
    fn full_flow() {
        init_logger();
        let transport = RecordingTransport::default();
        transport.respond(
            StatusCode::OK,
            "oauth_token=reqtok&oauth_token_secret=reqsecret&oauth_callback_confirmed=true",
        );
        transport.respond(
            StatusCode::OK,
            "oauth_token=acctok&oauth_token_secret=accsecret&user_id=6253282&screen_name=twitterapi",
        );
        let mut client = Client::builder(config()).build_with(&transport).unwrap();
        assert_eq!(client.state(), FlowState::Unauthenticated);
        assert_eq!(client.authorize_url(), None);

        let request_token = client.fetch_request_token(None).unwrap();
        assert_eq!(request_token.remain["oauth_callback_confirmed"], "true");
        assert_eq!(client.state(), FlowState::RequestTokenObtained);
        assert_eq!(
            client.authorize_url().as_deref(),
            Some("https://api.twitter.com/oauth/authorize?oauth_token=reqtok")
        );

        let access_token = client.fetch_access_token("verifier").unwrap();
        assert_eq!(access_token.remain["screen_name"], "twitterapi");
        assert_eq!(client.state(), FlowState::AccessTokenObtained);
        assert_eq!(client.tokens(), &TokenPair::new("acctok", "accsecret"));
    }

    #[test]
    fn failures_are_returned_not_raised() {
        let transport = RecordingTransport::default();
        transport.respond(StatusCode::UNAUTHORIZED, "Failed to validate oauth signature and token");
        let client = Client::builder(config()).build_with(&transport).unwrap();
        let resp = client.get_request_token(None).unwrap();
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert!(!resp.is_success());
        assert_eq!(resp.body, "Failed to validate oauth signature and token");
        assert_eq!(client.state(), FlowState::Unauthenticated);
    }

    #[test]
    fn token_source_fills_only_missing_values() {
        let mut session = HashMap::new();
        session.insert("tw_token".to_string(), "session-token".to_string());
        session.insert("tw_secret".to_string(), "session-secret".to_string());
        let mut config = config();
        config.session_oauth_token_name = Some("tw_token".into());
        config.session_oauth_token_secret_name = Some("tw_secret".into());

        let transport = RecordingTransport::default();
        let client = Client::builder(config.clone())
            .token_source(&session)
            .build_with(&transport)
            .unwrap();
        assert_eq!(
            client.tokens(),
            &TokenPair::new("session-token", "session-secret")
        );
        assert_eq!(client.state(), FlowState::AccessTokenObtained);

        let client = Client::builder(config)
            .token("explicit-token")
            .token_source(&session)
            .build_with(&transport)
            .unwrap();
        assert_eq!(client.tokens().token.as_deref(), Some("explicit-token"));
        assert_eq!(client.tokens().token_secret.as_deref(), Some("session-secret"));
    }

    #[test]
    fn token_source_ignored_without_names() {
        let mut session = HashMap::new();
        session.insert("tw_token".to_string(), "session-token".to_string());
        let transport = RecordingTransport::default();
        let client = Client::builder(config())
            .token_source(&session)
            .build_with(&transport)
            .unwrap();
        assert_eq!(client.tokens(), &TokenPair::default());
    }
}
