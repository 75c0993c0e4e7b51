//! Domain-level error types.
//!
//! These errors are transport agnostic. The CLI renders them as text and the
//! orchestrator turns them into error toasts; every one of them is
//! recoverable by retrying the user action.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request never produced a response (transport failure or timeout).
    Network,
    /// The server answered with a 4xx or 5xx status.
    Http,
    /// Form input failed required-field or format rules.
    Validation,
    /// An unexpected error occurred inside the data layer.
    Internal,
}

/// Domain error payload.
///
/// # Examples
/// ```
/// use dashboard::domain::{Error, ErrorCode};
///
/// let err = Error::http(404, "user 9 not found");
/// assert_eq!(err.code(), ErrorCode::Http);
/// assert_eq!(err.status(), Some(404));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    status: Option<u16>,
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP status for [`ErrorCode::Http`] errors.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Supplementary error details, such as per-field validation messages.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::validation("invalid form").with_details(json!({ "name": "Name is required" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, message)
    }

    /// Convenience constructor for [`ErrorCode::Http`] carrying the status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorCode::Http, message)
        }
    }

    /// Convenience constructor for [`ErrorCode::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for error construction.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::network(Error::network("offline"), ErrorCode::Network, None)]
    #[case::http(Error::http(500, "boom"), ErrorCode::Http, Some(500))]
    #[case::validation(Error::validation("bad"), ErrorCode::Validation, None)]
    #[case::internal(Error::internal("oops"), ErrorCode::Internal, None)]
    fn constructors_set_code_and_status(
        #[case] err: Error,
        #[case] code: ErrorCode,
        #[case] status: Option<u16>,
    ) {
        assert_eq!(err.code(), code);
        assert_eq!(err.status(), status);
        assert!(err.details().is_none());
    }

    #[rstest]
    fn display_uses_message() {
        let err = Error::http(503, "service unavailable");
        assert_eq!(err.to_string(), "service unavailable");
    }

    #[rstest]
    fn details_survive_cloning() {
        let err = Error::validation("invalid").with_details(json!({ "email": "Please enter a valid email" }));
        let cloned = err.clone();
        assert_eq!(cloned.details(), Some(&json!({ "email": "Please enter a valid email" })));
    }

    #[rstest]
    fn error_code_serialises_as_snake_case() {
        let value = serde_json::to_value(ErrorCode::Validation).expect("serialise");
        assert_eq!(value, json!("validation"));
    }
}
