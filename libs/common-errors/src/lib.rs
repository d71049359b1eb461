use thiserror::Error;

/// Errors that end a benchmark run.
///
/// Per-request failures of the concurrent strategy are not represented here:
/// they are recorded on the task outcome and never abort the batch.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid target URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported target URL scheme '{scheme}', expected http or https")]
    UnsupportedScheme { scheme: String },
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("{strategy}: request #{index} failed: {source}")]
    Transport {
        strategy: &'static str,
        index: usize,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl BenchError {
    pub fn transport(
        strategy: &'static str, index: usize, source: reqwest::Error,
    ) -> Self {
        Self::Transport {
            strategy,
            index,
            source,
        }
    }

    /// True when the underlying request hit the configured timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Short machine-readable code, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::UnsupportedScheme { .. } => "UNSUPPORTED_SCHEME",
            Self::ClientBuild(_) => "CLIENT_BUILD",
            Self::Transport { .. } if self.is_timeout() => "TIMEOUT",
            Self::Transport { .. } => "TRANSPORT",
            Self::Runtime(_) => "RUNTIME",
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
