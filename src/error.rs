use std::path::PathBuf;

/// Failure of a single remote conversion. Never escapes the converter.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Conversion service timed out after {0}ms")]
    Timeout(u128),

    #[error("Malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl RemoteError {
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        RemoteError::Malformed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// True for the malformed-body case, false for transport-level failures.
    pub fn is_malformed(&self) -> bool {
        matches!(self, RemoteError::Malformed { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
