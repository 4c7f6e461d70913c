use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::arguments::ParamReader;
use crate::error::DispatchError;
use crate::path::{EndpointKey, normalize_request_path};
use crate::server::config::DispatcherConfig;
use crate::server::registry::EndpointRegistry;
use crate::signature::Signature;

/// An incoming call, independent of the HTTP stack that received it.
#[derive(Debug, Clone, Default)]
pub struct RniRequest {
    /// Raw request path, e.g. `/rni/PersonInterface/getPerson`.
    pub path: String,
    /// Value of the `X-RNI-Params` header, if present.
    pub signature: Option<String>,
    /// Request body; a JSON object of `param-<index>` members when the call has arguments.
    pub body: Bytes,
}

/// The outcome of a call, ready to be written by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RniResponse {
    pub status: u16,
    /// JSON-encoded return value. Always `None` for errors and for calls returning nothing.
    pub body: Option<Bytes>,
}

impl RniResponse {
    pub const NO_CONTENT: u16 = 204;

    fn json(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            body: Some(Bytes::from(body)),
        }
    }

    fn no_content() -> Self {
        Self {
            status: Self::NO_CONTENT,
            body: None,
        }
    }

    fn error(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Serves calls against an [`EndpointRegistry`].
///
/// Each request moves through path resolution, signature resolution, argument decoding and
/// invocation; a failure at any step answers with the status of the matching
/// [`DispatchError`] and an empty body. Details are only logged.
///
/// The dispatcher keeps no per-request state, so one instance serves any number of concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    registry: Arc<EndpointRegistry>,
    config: DispatcherConfig,
}

impl RequestDispatcher {
    pub fn new(registry: Arc<EndpointRegistry>, config: DispatcherConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Dispatch one request and build its response.
    ///
    /// A result that serializes to JSON `null` answers `204` with no body, so the client
    /// decodes it from `null` again. Values whose encoding is `null` do not survive the trip:
    /// `Some(())` arrives as `None`, and a non-finite `f64` (encoded as `null`) fails to decode
    /// on the client.
    pub async fn dispatch(&self, request: RniRequest) -> RniResponse {
        match self.try_dispatch(&request).await {
            Ok(Value::Null) => {
                debug!(path = %request.path, "Call returned nothing");
                RniResponse::no_content()
            }

            Ok(value) => match serde_json::to_vec(&value) {
                Ok(body) => RniResponse::json(body),
                Err(err) => {
                    error!(path = %request.path, error = %err, "Failed to encode result");
                    RniResponse::error(500)
                }
            },

            Err(err) => {
                let status = err.status();
                match &err {
                    DispatchError::Invocation { .. } | DispatchError::ResultEncoding(_) => {
                        error!(path = %request.path, status, error = ?err, "Call failed");
                    }
                    DispatchError::UnknownType { .. } => {
                        warn!(path = %request.path, status, error = %err, "Unresolvable signature");
                    }
                    _ => {
                        debug!(path = %request.path, status, error = %err, "Rejected call");
                    }
                }
                RniResponse::error(status)
            }
        }
    }

    async fn try_dispatch(&self, request: &RniRequest) -> Result<Value, DispatchError> {
        let path = normalize_request_path(
            &request.path,
            &self.config.path_prefix,
            &self.config.session_marker,
        );

        let token = request
            .signature
            .as_deref()
            .ok_or(DispatchError::MissingSignature)?;

        let key = EndpointKey::parse(path)
            .filter(|key| self.registry.contains_endpoint(key))
            .ok_or_else(|| DispatchError::NotFound(path.to_string()))?;

        let signature =
            Signature::decode(token).map_err(|source| DispatchError::UnknownType {
                token: token.to_string(),
                source,
            })?;

        let handler = self.registry.resolve(&key, &signature)?;
        let params = ParamReader::from_body(&request.body, signature.arity())?;

        debug!(endpoint = %key, signature = %signature, "Invoking method");
        handler.invoke(params).await
    }
}
