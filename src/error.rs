use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Fetch Errors (absorbed inside the feeds)
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected response status {status} from {url}")]
    ResponseFailure {
        status: u16,
        url: String,
    },

    #[error("Payload did not match the expected schema: {0}")]
    ParseFailure(String),

    #[error("No usable records extracted from {0}")]
    EmptyResult(&'static str),

    #[error("Missing credential for {0}")]
    MissingCredential(&'static str),

    #[error("Circuit breaker open for {0}")]
    CircuitOpen(&'static str),

    // Aggregation Errors
    #[error("Unexpected defect in {source_name}: {details}")]
    UnexpectedDefect {
        source_name: &'static str,
        details: String,
    },

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure taxonomy used for logging and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    Network,
    Response,
    Parse,
    EmptyResult,
    Defect,
    Config,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Network => "network",
            FailureCategory::Response => "response",
            FailureCategory::Parse => "parse",
            FailureCategory::EmptyResult => "empty_result",
            FailureCategory::Defect => "defect",
            FailureCategory::Config => "config",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn category(&self) -> FailureCategory {
        match self {
            Error::NetworkFailure(_) | Error::Timeout(_) => FailureCategory::Network,
            Error::ResponseFailure { .. }
            | Error::MissingCredential(_)
            | Error::CircuitOpen(_) => FailureCategory::Response,
            Error::ParseFailure(_) => FailureCategory::Parse,
            Error::EmptyResult(_) => FailureCategory::EmptyResult,
            Error::UnexpectedDefect { .. } | Error::TaskFailed(_) => FailureCategory::Defect,
            Error::ConfigError(_) | Error::MetricsError(_) => FailureCategory::Config,
        }
    }

    /// Whether another attempt within the same fetch could succeed. Of the
    /// status failures only 5xx and 429 qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NetworkFailure(_) | Error::Timeout(_) => true,
            Error::ResponseFailure { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::ParseFailure(e.to_string())
        } else if let Some(status) = e.status() {
            Error::ResponseFailure {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            Error::NetworkFailure(e.to_string())
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(e: prometheus::Error) -> Self {
        Error::MetricsError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_network_failures() {
        let err = Error::Timeout(Duration::from_secs(10));
        assert_eq!(err.category(), FailureCategory::Network);
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_credential_is_not_retried() {
        let err = Error::MissingCredential("weather");
        assert_eq!(err.category(), FailureCategory::Response);
        assert!(!err.is_retryable());
    }

    #[test]
    fn only_server_errors_and_throttling_are_retried() {
        let status = |status| Error::ResponseFailure { status, url: "http://upstream".into() };
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(404).is_retryable());
        assert_eq!(status(401).category(), FailureCategory::Response);
    }

    #[test]
    fn empty_and_parse_failures_keep_their_category() {
        assert_eq!(Error::EmptyResult("news").category(), FailureCategory::EmptyResult);
        assert_eq!(
            Error::ParseFailure("missing field".into()).category(),
            FailureCategory::Parse
        );
        assert_eq!(FailureCategory::EmptyResult.to_string(), "empty_result");
    }
}
