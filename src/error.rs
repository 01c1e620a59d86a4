//! Error types for the OceanStor exporter
//!
//! Provides structured error types for the session client, the resource
//! collectors, the value maps and the configuration layer.

use thiserror::Error;

/// Unified error type for the exporter
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    // =========================================================================
    // Array Errors
    // =========================================================================
    #[error("Authentication rejected by array (code {code}): {description} {suggestion}")]
    Authentication {
        code: i64,
        description: String,
        suggestion: String,
    },

    #[error("Malformed response from {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    // =========================================================================
    // Value Map Errors
    // =========================================================================
    #[error("Unknown {namespace} code: {code:?}")]
    UnknownCode {
        namespace: &'static str,
        code: String,
    },

    #[error("Internal mapping error: {0}")]
    InternalMapping(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a reqwest error with the operation it interrupted
    pub fn transport(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Transport {
            operation: operation.into(),
            source,
        }
    }

    /// Build a malformed response error
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedResponse {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error
    ///
    /// Each error class maps to a distinct non-zero status so that wrappers
    /// (cron, expect scripts, node_exporter textfile jobs) can tell them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Configuration(_) | Error::YamlParse(_) => 2,
            Error::Authentication { .. } => 3,
            Error::Transport { .. } => 4,
            Error::MalformedResponse { .. } => 5,
            Error::UnknownCode { .. } => 6,
            Error::InternalMapping(_) | Error::Internal(_) => 70,
            Error::Io(_) => 74,
        }
    }
}

/// Result type alias for the exporter
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            Error::Configuration("bad config".into()),
            Error::Authentication {
                code: 1,
                description: "bad credentials".into(),
                suggestion: "retry".into(),
            },
            Error::malformed("disk", "missing field `ID`"),
            Error::UnknownCode {
                namespace: "health_status",
                code: "4".into(),
            },
            Error::InternalMapping("no counter id for foo".into()),
            Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom")),
        ];

        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::Authentication {
            code: 1,
            description: "bad credentials".into(),
            suggestion: "retry".into(),
        };
        assert_eq!(
            err.to_string(),
            "Authentication rejected by array (code 1): bad credentials retry"
        );

        let err = Error::UnknownCode {
            namespace: "running_status",
            code: "99".into(),
        };
        assert_eq!(err.to_string(), "Unknown running_status code: \"99\"");
    }
}
