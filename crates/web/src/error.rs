//! Errors a typed handler can return, and how they are classified.
//!
//! [`HandlerError`] is the only thing the adapter looks at after invoking a
//! handler: [`HandlerError::BadRequest`] becomes a `400` whose message is shown
//! to the client, anything else becomes a `500`.

use std::error::Error;
use std::io;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Signals that the request itself was wrong.
///
/// Serializes as a JSON object with a single `err` entry holding the message,
/// which is the body a bad request response carries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BadRequestError {
    message: String,
}

impl BadRequestError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Serialize for BadRequestError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("err", &self.message)?;
        map.end()
    }
}

/// The error half of a typed handler's result.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    BadRequest(#[from] BadRequestError),

    #[error("{0}")]
    Internal(#[source] Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(BadRequestError::new(message))
    }

    pub fn internal<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::Internal(e.into())
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }
}

impl From<io::Error> for HandlerError {
    fn from(e: io::Error) -> Self {
        Self::internal(e)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(e)
    }
}

/// Builds a [`HandlerError::BadRequest`] with `format!` syntax.
///
/// ```
/// use murphy_web::{HandlerError, bad_request};
///
/// let err: HandlerError = bad_request!("{} {} {}", "a", "b", "c");
/// assert!(err.is_bad_request());
/// assert_eq!(err.to_string(), "a b c");
/// ```
#[macro_export]
macro_rules! bad_request {
    ($($arg:tt)*) => {
        $crate::HandlerError::bad_request(::std::format!($($arg)*))
    };
}
