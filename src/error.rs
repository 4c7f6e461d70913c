use thiserror::Error;

use crate::path::EndpointKey;
use crate::signature::{Signature, SignatureError};

/// Result of registering interfaces or calling a remote method.
pub type RniResult<T> = Result<T, RniError>;

/// Errors surfaced to code that registers interfaces or calls them through a client.
#[derive(Debug, Error)]
pub enum RniError {
    /// Registration was given an interface or method the registry cannot accept.
    #[error("invalid registration: {0}")]
    Config(String),

    /// A method signature could not be built from its parameter types.
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    /// The implementation of a remote method failed.
    #[error("invocation failed: {0}")]
    Invocation(#[source] anyhow::Error),

    /// The client could not build the endpoint URL.
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    /// The request never produced a response.
    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server responded with status {status} for '{endpoint}'")]
    Status { endpoint: String, status: u16 },

    /// The server answered with success but no body where a value was expected.
    #[error("empty response body for '{0}'")]
    EmptyResponse(String),

    /// Arguments could not be encoded, or the response could not be decoded into the
    /// declared return type.
    #[error("json error")]
    Json(#[from] serde_json::Error),
}

impl RniError {
    /// Wrap a failure raised by a method implementation.
    pub fn invocation(err: impl Into<anyhow::Error>) -> Self {
        Self::Invocation(err.into())
    }

    /// True when the server was reached and rejected the call with `status`.
    pub fn is_status(&self, status: u16) -> bool {
        matches!(self, Self::Status { status: s, .. } if *s == status)
    }
}

/// Per-request failures on the server side.
///
/// Each variant maps to an HTTP status through [`status`](Self::status). The messages are for
/// server logs only and never reach the response body.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The `X-RNI-Params` header was absent.
    #[error("missing signature header")]
    MissingSignature,

    /// No method is registered under this endpoint for any signature.
    #[error("no endpoint registered at '{0}'")]
    NotFound(String),

    /// The endpoint exists but has no overload with this signature.
    #[error("no overload of '{key}' matches {signature}")]
    UnresolvedOverload {
        key: EndpointKey,
        signature: Signature,
    },

    /// The signature header named a type identifier that cannot be resolved.
    #[error("unknown type in signature '{token}'")]
    UnknownType {
        token: String,
        #[source]
        source: SignatureError,
    },

    /// The request body did not carry decodable arguments for the signature.
    #[error("invalid argument {index}: {reason}")]
    InvalidArguments { index: usize, reason: String },

    /// The bound method failed.
    #[error("invocation of '{key}' failed")]
    Invocation {
        key: EndpointKey,
        #[source]
        source: RniError,
    },

    /// The method returned a value that could not be encoded as JSON.
    #[error("failed to encode result")]
    ResultEncoding(#[source] serde_json::Error),
}

impl DispatchError {
    /// HTTP status answered for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingSignature | Self::InvalidArguments { .. } => 400,
            Self::NotFound(_) => 404,
            Self::UnresolvedOverload { .. }
            | Self::UnknownType { .. }
            | Self::Invocation { .. }
            | Self::ResultEncoding(_) => 500,
        }
    }
}
