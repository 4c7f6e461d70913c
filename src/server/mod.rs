//! Server-side types.
//!
//! Interfaces are registered into an [`EndpointRegistry`]; a [`RequestDispatcher`] serves calls
//! against it and [`http::router`] exposes the dispatcher over HTTP.
//!
//! ```ignore
//! use std::sync::Arc;
//! use rni::server::{DispatcherConfig, EndpointRegistry, RequestDispatcher};
//!
//! let registry = Arc::new(EndpointRegistry::new());
//! registry.register(PersonInterface::export(Arc::new(PersonStore::default())))?;
//!
//! let dispatcher = Arc::new(RequestDispatcher::new(registry, DispatcherConfig::default()));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! rni::server::http::serve(listener, dispatcher).await?;
//! ```

mod config;
mod dispatcher;
mod handler;
pub mod http;
mod registry;

pub use config::DispatcherConfig;
pub use dispatcher::{RequestDispatcher, RniRequest, RniResponse};
pub use handler::{ExportedInterface, MethodBinding};
pub use registry::{EndpointInfo, EndpointRegistry, RegisteredHandler};
