//! Error types for the docking engine.
//!
//! Geometric and identity problems are never errors: they are clamped or
//! skipped. Only decoding persisted state and loading configuration can fail.

use std::path::PathBuf;

/// Result type alias for state decoding.
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors produced while decoding a persisted toolbar layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The byte stream ended before a complete value could be read.
    #[error("toolbar state truncated: needed {needed} more byte(s) while reading {context}")]
    Truncated { context: &'static str, needed: usize },

    /// The leading version tag is not one this build understands.
    #[error("unsupported toolbar state version {found} (expected {expected})")]
    VersionMismatch { found: i32, expected: i32 },

    /// A count field is negative or larger than the remaining data allows.
    #[error("invalid {context} count {count}")]
    InvalidCount { context: &'static str, count: i32 },

    /// A string field does not hold valid UTF-8.
    #[error("invalid UTF-8 in toolbar state string")]
    InvalidString,

    /// The header toolbar count disagrees with the decoded tray items.
    #[error("toolbar count mismatch: header says {expected}, trays hold {found}")]
    CountMismatch { expected: i32, found: i32 },
}

impl StateError {
    /// Create a truncation error.
    pub fn truncated(context: &'static str, needed: usize) -> Self {
        Self::Truncated { context, needed }
    }
}

/// Errors that can occur while loading a [`DockConfig`](crate::DockConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read dock configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("failed to parse dock configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-value error.
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_display() {
        let err = StateError::VersionMismatch {
            found: 7,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "unsupported toolbar state version 7 (expected 1)"
        );

        let err = StateError::truncated("row count", 4);
        assert!(err.to_string().contains("row count"));
    }

    #[test]
    fn test_config_error_from_toml() {
        let parse = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
