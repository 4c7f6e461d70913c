use std::time::Duration;

use bon::Builder;
use url::Url;

/// How the client picks the HTTP verb of a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerbPolicy {
    /// `GET` for methods without parameters, `POST` otherwise.
    ///
    /// Responses to `GET` may be cached by intermediaries, which breaks calls whose result
    /// changes between identical invocations.
    #[default]
    ByArity,

    /// `POST` for every call. Servers accept any verb, so this stays compatible with them.
    AlwaysPost,
}

/// Configuration for the RPC client.
#[derive(Debug, Clone, Builder)]
pub struct RniClientConfig {
    /// Server host name or address.
    #[builder(into)]
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Optional context path the dispatcher is mounted under (e.g. "rni").
    /// Calls go to `{scheme}://{host}:{port}/{context}/{interface}/{method}`.
    #[builder(into)]
    pub context: Option<String>,

    /// URL scheme.
    #[builder(default = "http".to_string())]
    pub scheme: String,

    /// Timeout applied by the HTTP client to each call.
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,

    #[builder(default)]
    pub verb_policy: VerbPolicy,
}

impl RniClientConfig {
    /// Base URL every endpoint is resolved against; always ends with `/`.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        let mut base = format!("{}://{}:{}/", self.scheme, self.host, self.port);

        let context = self
            .context
            .as_deref()
            .map(|context| context.trim_matches('/'))
            .filter(|context| !context.is_empty());
        if let Some(context) = context {
            base.push_str(context);
            base.push('/');
        }

        Url::parse(&base)
    }

    /// URL of one remote method.
    pub fn endpoint_url(&self, interface: &str, method: &str) -> Result<Url, url::ParseError> {
        self.base_url()?.join(&format!("{interface}/{method}"))
    }
}
