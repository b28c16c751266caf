//! Error types for the querent client.
//!
//! Every failure the API client, the session store, or the views can observe is
//! normalized into [`Error`].  Views never show raw transport text; they show
//! [`Error::user_message`].

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Message shown whenever no response reached the client.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again later.";

/// Message shown when a response arrived without the expected payload.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from server.";

/// The main error type for querent.
#[derive(Clone, Debug)]
pub enum Error {
    /// The backend explicitly rejected the supplied credentials.
    Authentication {
        /// Human-readable message, taken verbatim from the response body when present.
        message: String,
    },

    /// No response reached the client.
    Network {
        /// The underlying transport failure.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A response was received but it lacked an expected field or could not be decoded.
    UnexpectedResponse {
        /// Description of what was missing.
        message: String,
    },

    /// A non-auth endpoint answered with a non-success status.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Human-readable error message.
        message: String,
    },

    /// A required input was missing.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field that failed validation.
        param: Option<String>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// HTTP client construction error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or joining error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new network error.
    pub fn network(source: Option<Box<dyn error::Error + Send + Sync>>) -> Self {
        Error::Network {
            source: source.map(Arc::from),
        }
    }

    /// Creates a new unexpected-response error.
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Error::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if the backend rejected the credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if no response reached the client.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// Returns true if the response was missing an expected field.
    pub fn is_unexpected_response(&self) -> bool {
        matches!(self, Error::UnexpectedResponse { .. })
    }

    /// Returns true if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// The text a view displays for this error.
    ///
    /// Authentication failures carry the backend's message verbatim.  Network
    /// failures always map to [`NETWORK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Error::Authentication { message } => message.clone(),
            Error::Network { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            Error::UnexpectedResponse { .. } => UNEXPECTED_RESPONSE_MESSAGE.to_string(),
            Error::Api { message, .. } => message.clone(),
            Error::Validation { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::Network { .. } => {
                write!(f, "{NETWORK_ERROR_MESSAGE}")
            }
            Error::UnexpectedResponse { message } => {
                write!(f, "Unexpected response: {message}")
            }
            Error::Api {
                status_code,
                message,
            } => {
                write!(f, "API error ({status_code}): {message}")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Network { source } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for querent operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_hides_transport_text() {
        let cause = io::Error::new(io::ErrorKind::ConnectionRefused, "tcp connect refused");
        let err = Error::network(Some(Box::new(cause)));
        assert!(err.is_network());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
        assert!(!err.user_message().contains("refused"));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn authentication_message_is_verbatim() {
        let err = Error::authentication("Invalid email or password!");
        assert!(err.is_authentication());
        assert_eq!(err.user_message(), "Invalid email or password!");
        assert_eq!(
            err.to_string(),
            "Authentication error: Invalid email or password!"
        );
    }

    #[test]
    fn unexpected_response_uses_fixed_message() {
        let err = Error::unexpected_response("no token in login response");
        assert!(err.is_unexpected_response());
        assert_eq!(err.user_message(), UNEXPECTED_RESPONSE_MESSAGE);
        assert!(err.to_string().contains("no token"));
    }

    #[test]
    fn api_error_carries_status() {
        let err = Error::api(503, "backend asleep");
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.user_message(), "backend asleep");
        assert_eq!(Error::authentication("x").status_code(), None);
    }

    #[test]
    fn validation_display_names_param() {
        let err = Error::validation("email is required", Some("email".to_string()));
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Validation error: email is required (parameter: email)"
        );
        assert_eq!(err.user_message(), "email is required");
    }

    #[test]
    fn from_conversions() {
        let err: Error = io::Error::other("disk full").into();
        assert!(matches!(err, Error::Io { .. }));

        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Serialization { .. }));

        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::Url { .. }));
    }
}
