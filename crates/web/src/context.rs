//! The per-invocation context handed to typed handlers.

use chrono::{DateTime, Utc};
use murphy_http::protocol::{RequestHeader, ResponseWriter};

/// What a typed handler can see of the request it is serving.
///
/// A context lives for a single invocation. It gives access to the response
/// sink, for handlers which write their own response, the inbound request
/// head, and the wall clock time at which the context was created.
pub struct HttpContext<'a> {
    writer: &'a mut dyn ResponseWriter,
    request: &'a RequestHeader,
    now: DateTime<Utc>,
}

impl<'a> HttpContext<'a> {
    pub fn new(writer: &'a mut dyn ResponseWriter, request: &'a RequestHeader) -> Self {
        Self::at(writer, request, Utc::now())
    }

    /// Creates a context with a fixed timestamp.
    pub fn at(writer: &'a mut dyn ResponseWriter, request: &'a RequestHeader, now: DateTime<Utc>) -> Self {
        Self { writer, request, now }
    }

    /// The response sink.
    ///
    /// Writing a status other than `200 OK` through it tells the adapter the
    /// handler produced its own response, so its payload won't be encoded.
    pub fn writer(&mut self) -> &mut dyn ResponseWriter {
        &mut *self.writer
    }

    pub fn request(&self) -> &RequestHeader {
        self.request
    }

    /// When this invocation started.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

impl std::fmt::Debug for HttpContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContext").field("request", &self.request).field("now", &self.now).finish_non_exhaustive()
    }
}
