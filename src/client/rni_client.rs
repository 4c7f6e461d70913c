use std::time::Instant;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::PARAMS_HEADER;
use crate::arguments::{Arguments, ParamWriter};
use crate::client::config::{RniClientConfig, VerbPolicy};
use crate::error::{RniError, RniResult};

/// An HTTP client for remote interfaces.
///
/// The client handles:
/// - Computing the signature of a call from its static parameter types
/// - Building the endpoint URL and picking the verb
/// - Encoding arguments as `param-<index>` body members
/// - Decoding the response into the declared return type
///
/// Generated stubs forward every method to [`call`](Self::call); it can also be used directly.
///
/// # Example
///
/// ```ignore
/// use rni::client::{RniClient, RniClientConfig};
///
/// let config = RniClientConfig::builder()
///     .host("localhost")
///     .port(8080)
///     .context("rni")
///     .build();
///
/// let client = RniClient::new(config)?;
/// let id: Option<String> = client
///     .call("PersonInterface", "createPerson", (person,))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct RniClient {
    http: reqwest::Client,
    config: RniClientConfig,
}

impl RniClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(config: RniClientConfig) -> RniResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_http_client(http, config))
    }

    /// Create a client on top of an existing [`reqwest::Client`].
    ///
    /// `config.timeout` is ignored; the given client's own policy applies.
    pub fn with_http_client(http: reqwest::Client, config: RniClientConfig) -> Self {
        Self { http, config }
    }

    /// Call `method` of `interface` with positional `args`.
    ///
    /// A method that legitimately returned nothing answers `204`; its result is decoded from
    /// JSON `null`, so `Option` return types yield `Ok(None)` and `()` yields `Ok(())`.
    ///
    /// # Errors
    ///
    /// * [`RniError::Signature`] if a parameter type identifier is invalid
    /// * [`RniError::Transport`] if no response was received
    /// * [`RniError::Status`] if the server answered with a non-success status
    /// * [`RniError::EmptyResponse`] if a success response other than `204` had no body
    /// * [`RniError::Json`] if arguments could not be encoded or the result decoded
    pub async fn call<A, R>(&self, interface: &str, method: &str, args: A) -> RniResult<R>
    where
        A: Arguments,
        R: DeserializeOwned,
    {
        let signature = A::signature()?;
        let url = self.config.endpoint_url(interface, method)?;
        let endpoint = format!("{interface}/{method}");

        let use_get = signature.arity() == 0 && self.config.verb_policy == VerbPolicy::ByArity;
        let mut request = if use_get {
            self.http.get(url.clone())
        } else {
            self.http.post(url.clone())
        };
        request = request.header(PARAMS_HEADER, signature.encode());

        if signature.arity() > 0 {
            let mut writer = ParamWriter::new();
            args.encode(&mut writer)?;
            let body = serde_json::to_vec(&writer.into_value())?;
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        debug!(
            endpoint = %endpoint,
            url = %url,
            signature = %signature,
            "Invoking remote method"
        );

        let started = Instant::now();
        let response = request.send().await.map_err(|err| {
            warn!(endpoint = %endpoint, error = %err, "Remote call failed");
            RniError::Transport(err)
        })?;
        let status = response.status();

        debug!(
            endpoint = %endpoint,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Remote call completed"
        );

        if !status.is_success() {
            warn!(endpoint = %endpoint, status = status.as_u16(), "Remote call rejected");
            return Err(RniError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(serde_json::from_value(Value::Null)?);
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(RniError::EmptyResponse(endpoint));
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &RniClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let config = RniClientConfig::builder()
            .host("127.0.0.1")
            .port(port)
            .context("rni")
            .build();
        let client = RniClient::new(config).unwrap();

        let result: RniResult<Option<String>> =
            client.call("Greeter", "greet", ("rni".to_string(),)).await;
        assert!(matches!(result, Err(RniError::Transport(_))));
    }
}
