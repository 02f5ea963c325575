// Error type shared by the client, the configuration loader and the UI.
// Every failure is reported once, tagged with its kind, so the CLI can
// pick a message and an exit code without parsing strings.

use std::fmt;

use thiserror::Error;

/// A single shape mismatch found while validating a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the offending value, e.g. `content[2].type`.
    /// Empty when the root value itself is wrong.
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Fieldless tag for [`ApiError`], handy for matching in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Network,
    Http,
    Parse,
    Validation,
    Logical,
    Precondition,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("invalid JSON in response: {0}")]
    Parse(String),

    #[error("unexpected response shape ({} issue(s)): {}", .0.len(), join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("API returned an error: {message}")]
    Logical { message: String },

    #[error("invalid argument: {0}")]
    Precondition(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Config(_) => ErrorKind::Config,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Parse(_) => ErrorKind::Parse,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Logical { .. } => ErrorKind::Logical,
            ApiError::Precondition(_) => ErrorKind::Precondition,
        }
    }

    /// Offending paths of a validation failure; empty for other kinds.
    pub fn issue_paths(&self) -> Vec<&str> {
        match self {
            ApiError::Validation(issues) => issues.iter().map(|i| i.path.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_issue() {
        let err = ApiError::Validation(vec![
            ValidationIssue::new("status", "required field is missing"),
            ValidationIssue::new("", "expected object, got array"),
        ]);
        let text = err.to_string();
        assert!(text.contains("2 issue(s)"));
        assert!(text.contains("status: required field is missing"));
        assert!(text.contains("(root): expected object, got array"));
        assert_eq!(err.issue_paths(), vec!["status", ""]);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn http_error_carries_status() {
        let err = ApiError::Http {
            status: 502,
            status_text: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway");
        assert_eq!(err.kind(), ErrorKind::Http);
        assert!(err.issue_paths().is_empty());
    }
}
