//! HTTP transport for the dispatcher, built on axum.
//!
//! Every verb and path is handed to the [`RequestDispatcher`]; routing to an endpoint happens
//! there, from the path and the `X-RNI-Params` header.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tracing::info;

use crate::PARAMS_HEADER;
use crate::server::dispatcher::{RequestDispatcher, RniRequest, RniResponse};

/// Build an axum router that serves every request through `dispatcher`.
///
/// The router can be served on its own or nested into a larger application.
pub fn router(dispatcher: Arc<RequestDispatcher>) -> Router {
    Router::new().fallback(handle).with_state(dispatcher)
}

/// Serve `dispatcher` on `listener` until the server stops.
pub async fn serve(listener: TcpListener, dispatcher: Arc<RequestDispatcher>) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "RNI server listening");
    axum::serve(listener, router(dispatcher)).await
}

async fn handle(
    State(dispatcher): State<Arc<RequestDispatcher>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> RniResponse {
    let signature = headers
        .get(PARAMS_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let request = RniRequest {
        path: uri.path().to_string(),
        signature,
        body,
    };

    dispatcher.dispatch(request).await
}

impl IntoResponse for RniResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.body {
            Some(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
            None => status.into_response(),
        }
    }
}
