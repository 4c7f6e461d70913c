use bon::Builder;

/// Configuration for the request dispatcher.
#[derive(Debug, Clone, Builder)]
pub struct DispatcherConfig {
    /// Routing prefix stripped from request paths when present (e.g. "/rni").
    /// Requests without the prefix are resolved as-is.
    #[builder(default = "/rni".to_string())]
    pub path_prefix: String,

    /// Marker starting a session-identifier suffix to drop from request paths,
    /// as in `/rni/Service/method;jsessionid=...`.
    #[builder(default = ";".to_string())]
    pub session_marker: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
