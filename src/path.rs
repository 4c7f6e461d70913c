use std::fmt;
use std::sync::Arc;

/// Identifies a remote method by interface and name.
///
/// Overloads share an [`EndpointKey`] and are told apart by their
/// [`Signature`](crate::Signature).
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct EndpointKey {
    interface: Arc<str>,
    method: Arc<str>,
}

impl EndpointKey {
    pub fn new(interface: impl Into<Arc<str>>, method: impl Into<Arc<str>>) -> Self {
        Self {
            interface: interface.into(),
            method: method.into(),
        }
    }

    /// Parse a normalized `Interface/method` path.
    ///
    /// Returns `None` unless the path has exactly two non-empty segments.
    pub fn parse(path: &str) -> Option<Self> {
        let (interface, method) = path.split_once('/')?;
        if interface.is_empty() || method.is_empty() || method.contains('/') {
            return None;
        }
        Some(Self::new(interface, method))
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The `Interface/method` form used on the wire.
    pub fn path(&self) -> String {
        format!("{}/{}", self.interface, self.method)
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.interface, self.method)
    }
}

/// Reduce a raw request path to `Interface/method`.
///
/// Strips `prefix` when it is a whole leading segment of the path, drops everything from the
/// first `session_marker` on (servlet-style `;jsessionid=...` suffixes), then a single leading
/// `/`. A prefix of `/rni` is removed from `/rni/Store/name` but not from `/rniStore/name`.
pub fn normalize_request_path<'a>(path: &'a str, prefix: &str, session_marker: &str) -> &'a str {
    let mut path = path;

    let prefix = prefix.trim_end_matches('/');
    if !prefix.is_empty() {
        if let Some(rest) = path.strip_prefix(prefix) {
            let on_boundary = rest.is_empty()
                || rest.starts_with('/')
                || (!session_marker.is_empty() && rest.starts_with(session_marker));
            if on_boundary {
                path = rest;
            }
        }
    }

    if !session_marker.is_empty() {
        if let Some(index) = path.find(session_marker) {
            path = &path[..index];
        }
    }

    path.strip_prefix('/').unwrap_or(path)
}
