//! Macros for declaring remote interfaces.
//!
//! - [`rni_interface!`]: declare an interface trait, its server export and its client stub
//! - [`rni_types!`]: name user types so they can appear in signatures
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rni::{RniResult, rni_interface, rni_types};
//!
//! #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
//! pub struct Point {
//!     pub x: i64,
//!     pub y: i64,
//! }
//!
//! rni_types! {
//!     Point = "geometry.Point",
//! }
//!
//! rni_interface! {
//!     /// Geometry helpers.
//!     pub trait Geometry(GeometryClient) {
//!         /// Distance of a point from the origin, squared.
//!         fn norm(&self, point: Point) -> i64;
//!         /// Same operation on raw coordinates.
//!         #[rni(name = "norm")]
//!         fn norm_of(&self, x: i64, y: i64) -> i64;
//!     }
//! }
//!
//! struct Local;
//!
//! impl Geometry for Local {
//!     async fn norm(&self, point: Point) -> RniResult<i64> {
//!         Ok(point.x * point.x + point.y * point.y)
//!     }
//!
//!     async fn norm_of(&self, x: i64, y: i64) -> RniResult<i64> {
//!         Ok(x * x + y * y)
//!     }
//! }
//!
//! let exported = Geometry::export(Arc::new(Local));
//! assert_eq!(exported.interface(), "Geometry");
//! assert_eq!(exported.methods().len(), 2);
//! ```

/// Name user types for use as remote method parameters.
///
/// Implements [`RniType`](crate::RniType) with the given identifier, which must be the same on
/// client and server and may only contain visible ASCII characters other than `,`.
///
/// ```
/// use rni::{RniType, rni_types};
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Person {
///     name: String,
/// }
///
/// rni_types! {
///     Person = "demo.Person",
/// }
///
/// assert_eq!(Person::type_name(), "demo.Person");
/// ```
#[macro_export]
macro_rules! rni_types {
    ($($ty:ty = $name:literal),* $(,)?) => {
        $(
            impl $crate::RniType for $ty {
                fn type_name() -> ::std::borrow::Cow<'static, str> {
                    ::std::borrow::Cow::Borrowed($name)
                }
            }
        )*
    };
}

/// Declare a remote interface.
///
/// This macro generates:
/// - A trait with the interface name whose methods are async and return
///   [`RniResult`](crate::RniResult); implement it with `async fn`
/// - A provided `export` method binding every method of an `Arc`'d implementation, ready for
///   [`EndpointRegistry::register`](crate::server::EndpointRegistry::register)
/// - A client stub type, named in parentheses, implementing the trait by forwarding each call
///   through an [`RniClient`](crate::client::RniClient)
///
/// The interface identifier on the wire is the trait name. Method names default to the Rust
/// name; `#[rni(name = "...")]` overrides it, which is how overloads are declared: several
/// methods sharing a remote name and differing in parameter types. Parameter types must
/// implement [`RniType`](crate::RniType) and return types `Serialize + DeserializeOwned`.
///
/// Interface and remote method names may only use ASCII letters, digits, `-`, `.`, `_` and
/// `~`; registering the export fails with [`RniError::Config`](crate::RniError::Config)
/// otherwise. Use
/// `#[rni(name = "...")]` to give a non-ASCII Rust method an ASCII remote name.
///
/// A method accepts `///` doc comments followed by at most one `#[rni(name = "...")]`, in that
/// order. Other attributes such as `#[allow(...)]` are not accepted on methods and make the
/// invocation fail to match; put them on the trait instead.
///
/// A return value that serializes to JSON `null` is sent as `204 No Content` and decoded from
/// `null` by the client, so `Option<()>` cannot tell `Some(())` from `None` and non-finite
/// floats cannot be returned.
///
/// `export` is reserved and cannot be used as a method name.
#[macro_export]
macro_rules! rni_interface {
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident ($client:ident) {
            $(
                $(#[doc = $doc:literal])*
                $(#[rni(name = $remote:literal)])?
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) -> $ret:ty;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $name: Send + Sync + 'static {
            $(
                $(#[doc = $doc])*
                fn $method(&self $(, $arg: $arg_ty)*)
                    -> impl ::std::future::Future<Output = $crate::RniResult<$ret>> + Send;
            )*

            /// Bind every method of this interface to `self` for registration.
            fn export(self: ::std::sync::Arc<Self>) -> $crate::server::ExportedInterface
            where
                Self: Sized,
            {
                $crate::server::ExportedInterface::new(stringify!($name))
                $(
                    .bind({
                        let instance = ::std::sync::Arc::clone(&self);
                        $crate::server::MethodBinding::new(
                            $crate::__rni_remote_name!($method $(, $remote)?),
                            move |($($arg,)*): ($($arg_ty,)*)| {
                                let instance = ::std::sync::Arc::clone(&instance);
                                async move {
                                    <Self as $name>::$method(&*instance $(, $arg)*).await
                                }
                            },
                        )
                    })
                )*
            }
        }

        #[doc = concat!("Client stub calling a remote [`", stringify!($name), "`].")]
        #[derive(Debug, Clone)]
        $vis struct $client {
            client: $crate::client::RniClient,
        }

        impl $client {
            pub fn new(client: $crate::client::RniClient) -> Self {
                Self { client }
            }

            /// Create a stub for the interface served at `host:port` under `context`.
            pub fn connect(
                host: impl Into<String>,
                port: u16,
                context: impl Into<String>,
            ) -> $crate::RniResult<Self> {
                $crate::client::create_client(host, port, context)
            }
        }

        impl $crate::client::RemoteStub for $client {
            const INTERFACE: &'static str = stringify!($name);

            fn from_client(client: $crate::client::RniClient) -> Self {
                Self { client }
            }

            fn client(&self) -> &$crate::client::RniClient {
                &self.client
            }
        }

        impl $name for $client {
            $(
                fn $method(&self $(, $arg: $arg_ty)*)
                    -> impl ::std::future::Future<Output = $crate::RniResult<$ret>> + Send
                {
                    self.client.call::<($($arg_ty,)*), $ret>(
                        stringify!($name),
                        $crate::__rni_remote_name!($method $(, $remote)?),
                        ($($arg,)*),
                    )
                }
            )*
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rni_remote_name {
    ($method:ident) => {
        stringify!($method)
    };
    ($method:ident, $remote:literal) => {
        $remote
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use bytes::Bytes;
    use serde_json::{Value, json};

    use crate::client::RemoteStub;
    use crate::path::EndpointKey;
    use crate::server::{DispatcherConfig, EndpointRegistry, RequestDispatcher, RniRequest};
    use crate::{RniError, RniResult, Signature};

    rni_interface! {
        /// Test calculator
        pub trait Calculator(CalculatorClient) {
            /// Add two numbers
            fn add(&self, a: i64, b: i64) -> i64;
            /// Add any amount of numbers
            #[rni(name = "add")]
            fn add_all(&self, values: Vec<i64>) -> i64;
            fn total(&self) -> Option<i64>;
            fn divide(&self, a: i64, b: i64) -> i64;
        }
    }

    #[derive(Default)]
    struct Accumulator {
        total: AtomicI64,
    }

    impl Calculator for Accumulator {
        async fn add(&self, a: i64, b: i64) -> RniResult<i64> {
            self.total.fetch_add(a + b, Ordering::SeqCst);
            Ok(a + b)
        }

        async fn add_all(&self, values: Vec<i64>) -> RniResult<i64> {
            let sum: i64 = values.iter().sum();
            self.total.fetch_add(sum, Ordering::SeqCst);
            Ok(sum)
        }

        async fn total(&self) -> RniResult<Option<i64>> {
            let total = self.total.load(Ordering::SeqCst);
            Ok((total != 0).then_some(total))
        }

        async fn divide(&self, a: i64, b: i64) -> RniResult<i64> {
            a.checked_div(b)
                .ok_or_else(|| RniError::invocation(anyhow::anyhow!("division by zero")))
        }
    }

    fn dispatcher() -> RequestDispatcher {
        let registry = Arc::new(EndpointRegistry::new());
        let registered = registry
            .register(Calculator::export(Arc::new(Accumulator::default())))
            .unwrap();
        assert!(registered);
        RequestDispatcher::new(registry, DispatcherConfig::default())
    }

    fn call(path: &str, signature: &str, body: Value) -> RniRequest {
        RniRequest {
            path: path.to_string(),
            signature: Some(signature.to_string()),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_export_binds_every_method() {
        let exported = Calculator::export(Arc::new(Accumulator::default()));

        assert_eq!(exported.interface(), "Calculator");
        let names: Vec<&str> = exported.methods().iter().map(|m| m.method()).collect();
        assert_eq!(names, vec!["add", "add", "total", "divide"]);
    }

    #[test]
    fn test_overloads_share_remote_name() {
        let dispatcher = dispatcher();
        let key = EndpointKey::new("Calculator", "add");

        assert_eq!(
            dispatcher.registry().overloads(&key),
            vec![
                Signature::new(["Vec<i64>"]).unwrap(),
                Signature::new(["i64", "i64"]).unwrap(),
            ]
        );
    }

    #[test]
    fn test_stub_interface_name() {
        assert_eq!(CalculatorClient::INTERFACE, "Calculator");
    }

    #[tokio::test]
    async fn test_exported_methods_dispatch() {
        let dispatcher = dispatcher();

        let empty = dispatcher
            .dispatch(call("/rni/Calculator/total", "", json!(null)))
            .await;
        assert_eq!(empty.status, 204);

        let pair = dispatcher
            .dispatch(call(
                "/rni/Calculator/add",
                "i64,i64",
                json!({ "param-0": 2, "param-1": 3 }),
            ))
            .await;
        assert_eq!(pair.body, Some(Bytes::from("5")));

        let list = dispatcher
            .dispatch(call(
                "/rni/Calculator/add",
                "Vec<i64>",
                json!({ "param-0": [1, 2, 3] }),
            ))
            .await;
        assert_eq!(list.body, Some(Bytes::from("6")));

        let total = dispatcher
            .dispatch(call("/rni/Calculator/total", "", json!(null)))
            .await;
        assert_eq!(total.body, Some(Bytes::from("11")));
    }

    #[tokio::test]
    async fn test_implementation_error_is_server_error() {
        let response = dispatcher()
            .dispatch(call(
                "/rni/Calculator/divide",
                "i64,i64",
                json!({ "param-0": 1, "param-1": 0 }),
            ))
            .await;

        assert_eq!(response.status, 500);
        assert_eq!(response.body, None);
    }
}
