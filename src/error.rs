use std::str::Utf8Error;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("paste with id '{id}' does not exist")]
    NotFound { id: String },
    #[error("unexpected server response: {status} (this is not a client bug; is the server up?)")]
    UnexpectedStatus { status: StatusCode },
    #[error("transport error")]
    Transport {
        #[from]
        source: reqwest::Error,
    },
    #[error("malformed JSON response")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("malformed timestamp '{value}'")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
    #[error("response body is not valid UTF-8")]
    Body {
        #[from]
        source: Utf8Error,
    },
    #[error("could not extract a paste id from redirect target '{url}'")]
    Redirect { url: String },
    #[error("unknown paste service '{name}' (expected haste, ghostbin, ivanbin or sourcebin)")]
    UnknownService { name: String },
    #[error("invalid base URL '{url}'")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid header value")]
    InvalidHeader {
        #[from]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("failed to start the transport runtime")]
    Runtime { source: std::io::Error },
    #[error("success handler failed")]
    Handler {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    /// Whether the remote service reported the requested paste as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, Error::UnexpectedStatus { .. })
    }
}

/// Failure of a blocking execution, carrying the request that produced it.
#[derive(Error, Debug)]
#[error("error while processing request {request}")]
pub struct RequestError {
    request: String,
    #[source]
    source: Error,
}

impl RequestError {
    pub(crate) fn new(request: impl Into<String>, source: Error) -> Self {
        RequestError {
            request: request.into(),
            source,
        }
    }

    /// The `METHOD url` line of the failed request.
    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn cause(&self) -> &Error {
        &self.source
    }

    pub fn into_cause(self) -> Error {
        self.source
    }
}
