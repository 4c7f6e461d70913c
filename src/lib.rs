//! # rni
//!
//! RPC negotiable interfaces: expose a trait implementation over HTTP and call it through a
//! generated client, with no schema compilation step.
//!
//! ## Declaring an interface
//!
//! [`rni_interface!`] turns a list of method signatures into an async trait, a server-side
//! `export` and a client stub. Methods may share a remote name (overloads); calls are routed
//! by the parameter type identifiers of the method.
//!
//! ```ignore
//! rni_interface! {
//!     pub trait PersonInterface(PersonInterfaceClient) {
//!         fn create_person(&self, person: Person) -> Option<String>;
//!         fn get_person(&self, id: String) -> Option<Person>;
//!         #[rni(name = "get_person")]
//!         fn get_person_by_record(&self, person: Person) -> Option<Person>;
//!     }
//! }
//! ```
//!
//! ## Server Side
//!
//! Register implementations in an [`EndpointRegistry`](server::EndpointRegistry) and serve it
//! with a [`RequestDispatcher`](server::RequestDispatcher):
//!
//! ```ignore
//! let registry = Arc::new(EndpointRegistry::new());
//! registry.register(PersonInterface::export(Arc::new(PersonStore::default())))?;
//!
//! let dispatcher = Arc::new(RequestDispatcher::new(registry, DispatcherConfig::default()));
//! rni::server::http::serve(listener, dispatcher).await?;
//! ```
//!
//! ## Client Side
//!
//! ```ignore
//! let people = PersonInterfaceClient::connect("localhost", 8080, "rni")?;
//! let id = people.create_person(person).await?;
//! ```
//!
//! ## Wire Format
//!
//! - Path: `/{context}/{Interface}/{method}`, optionally followed by `;jsessionid=...`
//! - Header `X-RNI-Params`: comma-joined parameter type identifiers, empty for no parameters
//! - Body (only with parameters): `{"param-0": ..., "param-1": ...}`
//! - Verb: `GET` without parameters, `POST` otherwise
//! - Response: the JSON return value, `204` with no body for a null result, or a bare error
//!   status (`400` missing header or bad arguments, `404` unknown endpoint, `500` otherwise)

mod arguments;
mod error;
mod macros;
mod path;
mod signature;

pub mod client;
pub mod server;

pub use arguments::{Arguments, ParamReader, ParamWriter, RniType, param_key};
pub use error::{DispatchError, RniError, RniResult};
pub use path::{EndpointKey, normalize_request_path};
pub use signature::{Signature, SignatureError, arity_of};

/// Header carrying the encoded [`Signature`] of a call.
pub const PARAMS_HEADER: &str = "X-RNI-Params";
