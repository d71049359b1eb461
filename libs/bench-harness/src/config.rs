use std::time::Duration;

use common_errors::{BenchError, BenchResult};
use typed_builder::TypedBuilder;
use url::Url;

/// Endpoint every strategy hits unless a config says otherwise.
pub const DEFAULT_TARGET_URL: &str = "https://schleising.net/football/api/";

/// Number of requests each strategy issues by default.
pub const DEFAULT_REQUEST_COUNT: usize = 1000;

/// Inputs shared by all three strategies of a run.
///
/// `request_timeout` defaults to `None`, in which case a request that never
/// answers stalls its strategy forever.
#[derive(Debug, Clone, TypedBuilder)]
pub struct BenchConfig {
    #[builder(default = DEFAULT_TARGET_URL.to_string(), setter(into))]
    pub target_url: String,
    #[builder(default = DEFAULT_REQUEST_COUNT)]
    pub request_count: usize,
    #[builder(default, setter(strip_option))]
    pub request_timeout: Option<Duration>,
}

impl Default for BenchConfig {
    fn default() -> Self { Self::builder().build() }
}

impl BenchConfig {
    /// Parse the target URL, rejecting anything that is not http(s).
    pub fn target(&self) -> BenchResult<Url> {
        let url = Url::parse(&self.target_url).map_err(|source| {
            BenchError::InvalidUrl {
                url: self.target_url.clone(),
                source,
            }
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => {
                Err(BenchError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                })
            }
        }
    }

    /// Client for the no-session strategy: idle pool disabled so every
    /// request opens its own connection.
    pub fn fresh_blocking_client(
        &self,
    ) -> BenchResult<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(self.request_timeout)
            .build()
            .map_err(BenchError::ClientBuild)
    }

    /// Client for the session strategy: default keep-alive pool.
    pub fn blocking_session(&self) -> BenchResult<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(BenchError::ClientBuild)
    }

    /// Shared session for the concurrent strategy.
    pub fn async_session(&self) -> BenchResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(BenchError::ClientBuild)
    }
}
