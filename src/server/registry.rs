use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, info};

use crate::arguments::ParamReader;
use crate::error::{DispatchError, RniError, RniResult};
use crate::path::EndpointKey;
use crate::server::handler::{ErasedHandler, ExportedInterface};
use crate::signature::Signature;

type Overloads = HashMap<Signature, Arc<RegisteredHandler>, ahash::RandomState>;

/// A method bound to the instance that serves it, under one endpoint and signature.
pub struct RegisteredHandler {
    key: EndpointKey,
    signature: Signature,
    handler: Arc<dyn ErasedHandler>,
}

impl RegisteredHandler {
    pub fn key(&self) -> &EndpointKey {
        &self.key
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Decode `params`, call the bound method and encode what it returns.
    pub fn invoke(&self, params: ParamReader) -> BoxFuture<'static, Result<Value, DispatchError>> {
        self.handler.invoke(self.key.clone(), params)
    }
}

impl fmt::Debug for RegisteredHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("key", &self.key)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// An entry of [`EndpointRegistry::endpoints`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EndpointInfo {
    pub key: EndpointKey,
    pub signature: Signature,
}

/// Table of every remotely callable method, keyed by endpoint then signature.
///
/// Registration and lookup may run concurrently from any number of threads. Handlers are
/// inserted fully built behind an [`Arc`], so a lookup either sees a complete handler or none.
///
/// For a given endpoint and signature at most one handler is active: registering the same pair
/// again silently replaces the earlier handler. Overloads with different signatures coexist.
#[derive(Default)]
pub struct EndpointRegistry {
    endpoints: DashMap<EndpointKey, Overloads, ahash::RandomState>,
}

impl EndpointRegistry {
    /// Construct a new empty [`EndpointRegistry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every method of `interface`.
    ///
    /// Returns `Ok(false)` and registers nothing when the interface has no methods. All names and
    /// signatures are validated before the table is touched, so a rejected interface leaves no
    /// partial registration behind.
    ///
    /// # Errors
    ///
    /// [`RniError::Config`] when the interface identifier or a method name is empty or contains
    /// anything but ASCII letters, digits, `-`, `.`, `_` and `~` (names must reach the server
    /// unchanged in a URL path), or when a parameter type identifier is not valid in a signature.
    pub fn register(&self, interface: ExportedInterface) -> RniResult<bool> {
        let interface_id = interface.interface();
        validate_name(interface_id, "interface")?;

        if interface.methods().is_empty() {
            info!(interface = %interface_id, "No methods in interface, nothing to register");
            return Ok(false);
        }

        let mut prepared = Vec::with_capacity(interface.methods().len());
        for binding in interface.methods() {
            validate_name(binding.method(), "method")?;

            let signature = Signature::new(binding.type_names()).map_err(|err| {
                RniError::Config(format!(
                    "method '{}' of '{interface_id}' has an invalid signature: {err}",
                    binding.method()
                ))
            })?;

            prepared.push(RegisteredHandler {
                key: EndpointKey::new(interface_id, binding.method()),
                signature,
                handler: binding.handler(),
            });
        }

        let count = prepared.len();
        for handler in prepared {
            let key = handler.key.clone();
            let signature = handler.signature.clone();

            let replaced = self
                .endpoints
                .entry(key.clone())
                .or_default()
                .insert(signature.clone(), Arc::new(handler));

            if replaced.is_some() {
                debug!(endpoint = %key, signature = %signature, "Replaced existing handler");
            } else {
                debug!(endpoint = %key, signature = %signature, "Added method for receiving calls");
            }
        }

        info!(interface = %interface_id, methods = count, "Registered interface");
        Ok(true)
    }

    /// Remove every endpoint of `interface`, returning the number of handlers dropped.
    pub fn unregister(&self, interface: &str) -> usize {
        let mut removed = 0;
        self.endpoints.retain(|key, overloads| {
            if key.interface() == interface {
                removed += overloads.len();
                false
            } else {
                true
            }
        });

        if removed > 0 {
            info!(interface = %interface, handlers = removed, "Unregistered interface");
        }
        removed
    }

    /// Whether any overload is registered under `key`.
    pub fn contains_endpoint(&self, key: &EndpointKey) -> bool {
        self.endpoints.contains_key(key)
    }

    /// Find the handler for an exact endpoint and signature.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotFound`] when nothing is registered under `key`, and
    /// [`DispatchError::UnresolvedOverload`] when `key` is known but no overload has `signature`.
    /// There is never a fallback to a different overload.
    pub fn resolve(
        &self,
        key: &EndpointKey,
        signature: &Signature,
    ) -> Result<Arc<RegisteredHandler>, DispatchError> {
        let overloads = self
            .endpoints
            .get(key)
            .ok_or_else(|| DispatchError::NotFound(key.path()))?;

        overloads
            .get(signature)
            .cloned()
            .ok_or_else(|| DispatchError::UnresolvedOverload {
                key: key.clone(),
                signature: signature.clone(),
            })
    }

    /// Signatures registered under `key`, sorted.
    pub fn overloads(&self, key: &EndpointKey) -> Vec<Signature> {
        let mut signatures: Vec<Signature> = self
            .endpoints
            .get(key)
            .map(|overloads| overloads.keys().cloned().collect())
            .unwrap_or_default();
        signatures.sort();
        signatures
    }

    /// Every registered endpoint and signature, sorted.
    pub fn endpoints(&self) -> Vec<EndpointInfo> {
        let mut endpoints: Vec<EndpointInfo> = self
            .endpoints
            .iter()
            .flat_map(|entry| {
                let key = entry.key().clone();
                entry
                    .value()
                    .keys()
                    .map(|signature| EndpointInfo {
                        key: key.clone(),
                        signature: signature.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        endpoints.sort();
        endpoints
    }

    /// Number of registered handlers across all endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("endpoints", &self.endpoints.len())
            .field("handlers", &self.len())
            .finish()
    }
}

fn validate_name(name: &str, what: &str) -> RniResult<()> {
    if name.is_empty() {
        return Err(RniError::Config(format!("{what} name cannot be empty")));
    }
    if !name.chars().all(is_unreserved) {
        return Err(RniError::Config(format!(
            "{what} name '{name}' must only contain ASCII letters, digits, '-', '.', '_' or '~'"
        )));
    }
    Ok(())
}

/// Characters that appear unchanged in a URL path segment.
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}
