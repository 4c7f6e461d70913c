//! Client-side types.
//!
//! [`RniClient`] performs calls; stubs generated by [`rni_interface!`](crate::rni_interface)
//! wrap it so that a remote interface is used like a local value.
//!
//! # Example
//!
//! ```ignore
//! use rni::client::create_client;
//!
//! let people: PersonInterfaceClient = create_client("localhost", 8080, "rni")?;
//! let id = people.create_person(person).await?;
//! ```

mod config;
mod rni_client;

pub use config::{RniClientConfig, VerbPolicy};
pub use rni_client::RniClient;

use crate::error::RniResult;

/// A generated client stub for one remote interface.
pub trait RemoteStub: Sized {
    /// Identifier of the interface the stub calls.
    const INTERFACE: &'static str;

    fn from_client(client: RniClient) -> Self;

    fn client(&self) -> &RniClient;
}

/// Create a stub for interface `S` served at `host:port` under `context`.
pub fn create_client<S: RemoteStub>(
    host: impl Into<String>,
    port: u16,
    context: impl Into<String>,
) -> RniResult<S> {
    let config = RniClientConfig::builder()
        .host(host)
        .port(port)
        .context(context)
        .build();

    Ok(S::from_client(RniClient::new(config)?))
}
