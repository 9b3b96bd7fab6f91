use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration : {0}")]
    Config(#[from] ConfigError),
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("could not encode form body : {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
    #[error("invalid request header : {0}")]
    Header(#[from] http::Error),
    #[error("no request token is set, call get_request_token first")]
    MissingRequestToken,
}

/// Errors raised while loading or validating the credential source.
///
/// All of them are fatal: a client is never constructed from a config that
/// produced one.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required key {0} is missing or empty, please add it to the keys file")]
    MissingKey(&'static str),
    #[error("could not read keys file at {path} : {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("keys file is not valid JSON : {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("could not build the HTTP transport : {0}")]
    Transport(#[source] reqwest::Error),
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}
