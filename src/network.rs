//! HTTP-backed EPSG lookup, so definitions outside the built-in set can be fetched from a
//! PROJJSON registry such as spatialreference.org.
//!
//! Requests carry independent connect and read timeouts and are never retried: a timeout
//! or an unreachable host is reported straight back as [`CrsError::Transport`].
use std::time::Duration;

use ureq::Agent;

use crate::epsg::{EpsgLookup, LookupResponse};
use crate::error::{CrsError, Result};

const CLIENT: &str = concat!("proj-crs/", env!("CARGO_PKG_VERSION"));
const DEFAULT_BASE_URL: &str = "https://spatialreference.org/ref/epsg";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches `{base_url}/{code}/projjson.json`.
///
/// ```no_run
/// use std::time::Duration;
/// use proj_crs::{EpsgCache, HttpLookup};
///
/// let lookup = HttpLookup::builder()
///     .base_url("https://spatialreference.org/ref/epsg")
///     .connect_timeout(Duration::from_secs(2))
///     .read_timeout(Duration::from_secs(10))
///     .build();
/// let cache = EpsgCache::new(lookup);
/// let lambert93 = cache.resolve("EPSG:2154").unwrap();
/// ```
#[derive(Clone)]
pub struct HttpLookup {
    agent: Agent,
    base_url: String,
}

impl std::fmt::Debug for HttpLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLookup")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Default for HttpLookup {
    fn default() -> Self {
        HttpLookup::builder().build()
    }
}

impl HttpLookup {
    pub fn builder() -> HttpLookupBuilder {
        HttpLookupBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, code: &str) -> String {
        format!("{}/{code}/projjson.json", self.base_url)
    }
}

impl EpsgLookup for HttpLookup {
    fn fetch(&self, code: &str) -> Result<LookupResponse> {
        let url = self.url(code);
        log::debug!("GET {url}");
        let transport = |cause: String| CrsError::Transport {
            code: code.to_string(),
            cause,
        };
        let mut response = request(&self.agent, &url).map_err(|e| transport(e.to_string()))?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(LookupResponse::status(status));
        }
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| transport(e.to_string()))?;
        Ok(LookupResponse { status, body })
    }
}

fn request(agent: &Agent, url: &str) -> std::result::Result<http::Response<ureq::Body>, ureq::Error> {
    agent.get(url).header("Client", CLIENT).call()
}

/// Configures an [`HttpLookup`].
///
/// Defaults: base URL `https://spatialreference.org/ref/epsg`, a 10 s connect timeout and a
/// 30 s read timeout.
#[derive(Debug, Clone)]
pub struct HttpLookupBuilder {
    base_url: String,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Default for HttpLookupBuilder {
    fn default() -> Self {
        HttpLookupBuilder::new()
    }
}

impl HttpLookupBuilder {
    pub fn new() -> Self {
        HttpLookupBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the registry root. A trailing slash is ignored.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound on waiting for the response head and, separately, for its body.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn build(self) -> HttpLookup {
        let config = Agent::config_builder()
            .timeout_connect(Some(self.connect_timeout))
            .timeout_recv_response(Some(self.read_timeout))
            .timeout_recv_body(Some(self.read_timeout))
            .http_status_as_error(false)
            .build();
        HttpLookup {
            agent: Agent::new_with_config(config),
            base_url: self.base_url,
        }
    }
}
