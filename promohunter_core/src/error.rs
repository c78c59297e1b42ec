// src/error.rs

/// Failure of a single source client call.
///
/// None of these ever escape the aggregator: they are logged and the
/// failing store contributes zero products.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    pub fn code_str(&self) -> &'static str {
        match self {
            SourceError::Unavailable(_) => "unavailable",
            SourceError::Timeout(_) => "timeout",
            SourceError::Http(e) if e.is_timeout() => "timeout",
            SourceError::Http(e) if e.is_decode() => "malformed_response",
            SourceError::Http(_) => "unavailable",
            SourceError::MalformedResponse(_) | SourceError::Json(_) => "malformed_response",
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.code_str() == "timeout"
    }

    /// HTTP success with a payload we could not make sense of.
    pub fn is_malformed(&self) -> bool {
        self.code_str() == "malformed_response"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chat API error: {0}")]
    Api(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings() {
        assert_eq!(SourceError::Unavailable("dns".into()).code_str(), "unavailable");
        assert_eq!(SourceError::Timeout(30_000).code_str(), "timeout");
        assert!(SourceError::Timeout(10).is_timeout());
        assert!(SourceError::MalformedResponse("not an array".into()).is_malformed());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(SourceError::from(json_err).is_malformed());
    }
}
