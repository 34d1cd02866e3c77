use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Result type used across the library
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Api,
    Validation,
    FileSystem,
    Network,
    UserInput,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Api => write!(f, "api"),
            Self::Validation => write!(f, "validation"),
            Self::FileSystem => write!(f, "filesystem"),
            Self::Network => write!(f, "network"),
            Self::UserInput => write!(f, "user_input"),
        }
    }
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// `status == 0` means no HTTP response was received
    #[error("API error ({endpoint}): {status} - {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("File system error during {operation} of {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    UserInput(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn api(status: u16, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn fs(path: impl AsRef<Path>, operation: &'static str, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.as_ref().to_path_buf(),
            operation,
            source,
        }
    }

    /// Malformed JSON read back from disk is reported as a file system failure
    pub fn parse(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::fs(
            path,
            "parse",
            std::io::Error::new(std::io::ErrorKind::InvalidData, source),
        )
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Api { .. } => ErrorKind::Api,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::FileSystem { .. } => ErrorKind::FileSystem,
            Self::Network(_) => ErrorKind::Network,
            Self::UserInput(_) => ErrorKind::UserInput,
        }
    }

    /// A file system error caused by a missing file or directory
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileSystem { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Structured payload for logging
    #[must_use]
    pub fn details(&self) -> BTreeMap<&'static str, String> {
        let mut details = BTreeMap::new();
        details.insert("kind", self.kind().to_string());

        match self {
            Self::Configuration { message } | Self::UserInput(message) => {
                details.insert("message", message.clone());
            }
            Self::Api {
                status,
                endpoint,
                message,
            } => {
                details.insert("status", status.to_string());
                details.insert("endpoint", endpoint.clone());
                details.insert("message", message.clone());
            }
            Self::Validation { field, message } => {
                details.insert("field", (*field).to_string());
                details.insert("message", message.clone());
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                details.insert("path", path.display().to_string());
                details.insert("operation", (*operation).to_string());
                details.insert("message", source.to_string());
            }
            Self::Network(e) => {
                if let Some(url) = e.url() {
                    details.insert("url", url.to_string());
                }
                details.insert("message", e.to_string());
            }
        }

        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::config("x").kind(), ErrorKind::Configuration);
        assert_eq!(Error::api(404, "search", "nope").kind(), ErrorKind::Api);
        assert_eq!(Error::validation("query", "short").kind(), ErrorKind::Validation);
        assert_eq!(
            Error::UserInput("aborted".to_string()).kind(),
            ErrorKind::UserInput
        );
    }

    #[test]
    fn test_fs_error_details() {
        let err = Error::fs(
            "/tmp/films/603-The-Matrix",
            "create_dir",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );

        let details = err.details();
        assert_eq!(details["kind"], "filesystem");
        assert_eq!(details["operation"], "create_dir");
        assert_eq!(details["path"], "/tmp/films/603-The-Matrix");
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::api(401, "search/movie", "Invalid API key");
        assert_eq!(
            err.to_string(),
            "API error (search/movie): 401 - Invalid API key"
        );
        assert_eq!(err.details()["status"], "401");
    }

    #[test]
    fn test_parse_error_is_filesystem() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::parse("data.json", json_err);
        assert_eq!(err.kind(), ErrorKind::FileSystem);
        assert_eq!(err.details()["operation"], "parse");
    }
}
