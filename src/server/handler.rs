use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::arguments::{Arguments, ParamReader};
use crate::error::{DispatchError, RniResult};
use crate::path::EndpointKey;

/// A type-erased method: decodes arguments, invokes, and encodes the result.
pub(crate) trait ErasedHandler: Send + Sync {
    /// Collect the parameter type identifiers of the method.
    fn type_names(&self) -> Vec<String>;

    fn invoke(
        &self,
        key: EndpointKey,
        params: ParamReader,
    ) -> BoxFuture<'static, Result<Value, DispatchError>>;
}

/// Binds a typed closure to the [`ErasedHandler`] interface.
struct TypedHandler<A, R, F> {
    method: F,
    _types: PhantomData<fn(A) -> R>,
}

impl<A, R, F, Fut> ErasedHandler for TypedHandler<A, R, F>
where
    A: Arguments,
    R: Serialize + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RniResult<R>> + Send + 'static,
{
    fn type_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        A::type_names(&mut names);
        names
    }

    fn invoke(
        &self,
        key: EndpointKey,
        mut params: ParamReader,
    ) -> BoxFuture<'static, Result<Value, DispatchError>> {
        let args = match A::decode(&mut params) {
            Ok(args) => args,
            Err(err) => return futures::future::ready(Err(err)).boxed(),
        };

        let call = (self.method)(args);
        async move {
            let result = call
                .await
                .map_err(|source| DispatchError::Invocation { key, source })?;
            serde_json::to_value(result).map_err(DispatchError::ResultEncoding)
        }
        .boxed()
    }
}

/// One remotely callable method: its remote name and the closure that serves it.
///
/// The signature is derived from the closure's argument tuple `A`, the same way the client
/// derives it from the stub's declared parameter types.
///
/// # Example
///
/// ```
/// use rni::RniError;
/// use rni::server::MethodBinding;
///
/// let binding = MethodBinding::new("greet", |(name,): (String,)| async move {
///     Ok::<_, RniError>(format!("hello {name}"))
/// });
/// assert_eq!(binding.method(), "greet");
/// ```
#[derive(Clone)]
pub struct MethodBinding {
    method: String,
    handler: Arc<dyn ErasedHandler>,
}

impl MethodBinding {
    pub fn new<A, R, F, Fut>(method: impl Into<String>, handler: F) -> Self
    where
        A: Arguments,
        R: Serialize + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RniResult<R>> + Send + 'static,
    {
        Self {
            method: method.into(),
            handler: Arc::new(TypedHandler {
                method: handler,
                _types: PhantomData,
            }),
        }
    }

    /// Remote method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn type_names(&self) -> Vec<String> {
        self.handler.type_names()
    }

    pub(crate) fn handler(&self) -> Arc<dyn ErasedHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for MethodBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBinding")
            .field("method", &self.method)
            .field("params", &self.type_names())
            .finish()
    }
}

/// An interface ready to be registered: its identifier and the methods it exposes.
///
/// Interfaces declared with [`rni_interface!`](crate::rni_interface) build this through their
/// generated `export` method. It can also be assembled by hand.
#[derive(Debug, Clone)]
pub struct ExportedInterface {
    interface: String,
    methods: Vec<MethodBinding>,
}

impl ExportedInterface {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            methods: Vec::new(),
        }
    }

    /// Add a method binding.
    pub fn bind(mut self, binding: MethodBinding) -> Self {
        self.methods.push(binding);
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn methods(&self) -> &[MethodBinding] {
        &self.methods
    }
}
