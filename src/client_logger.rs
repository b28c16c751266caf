//! Logging trait for querent client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! the outcome of every exchange passing through the [`Client`](crate::Client).
//! Request bodies carry credentials and are never handed to the logger.

use serde_json::Value;

use crate::Endpoint;
use crate::error::Error;

/// A trait for logging API client exchanges.
///
/// # Example
///
/// ```rust,ignore
/// use querent::{ClientLogger, Endpoint, Error};
/// use std::sync::Mutex;
///
/// struct Recorder {
///     lines: Mutex<Vec<String>>,
/// }
///
/// impl ClientLogger for Recorder {
///     fn log_response(&self, endpoint: Endpoint, status: u16, body: &serde_json::Value) {
///         self.lines.lock().unwrap().push(format!("{endpoint} {status} {body}"));
///     }
///
///     fn log_failure(&self, endpoint: Endpoint, error: &Error) {
///         self.lines.lock().unwrap().push(format!("{endpoint} failed: {error}"));
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a response that reached the client, successful or not.
    ///
    /// `body` is the decoded JSON body, or [`Value::Null`] when the body was not
    /// JSON.  Auth responses have their `token` field replaced before this is called.
    fn log_response(&self, endpoint: Endpoint, status: u16, body: &Value);

    /// Log a call that ended in an error, after normalization.
    fn log_failure(&self, endpoint: Endpoint, error: &Error);
}
