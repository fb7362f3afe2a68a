//! A response sink decorator that remembers whether the handler took over.

use std::io;

use http::{HeaderMap, StatusCode};
use murphy_http::protocol::ResponseWriter;

/// Wraps the sink of one request and records whether a status other than
/// `200 OK` was ever written through it.
///
/// Once set, the flag stays set. The adapter reads it after the handler
/// returns, and skips encoding the response payload when it is set.
/// Everything else passes straight through to the wrapped sink.
#[derive(Debug)]
pub struct TrackedWriter<W> {
    inner: W,
    skip_response: bool,
}

impl<W: ResponseWriter> TrackedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, skip_response: false }
    }

    /// Whether a non-`200` status has been written.
    #[inline]
    pub fn skip_response(&self) -> bool {
        self.skip_response
    }
}

impl<W: ResponseWriter> ResponseWriter for TrackedWriter<W> {
    #[inline]
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        self.inner.write_status(status);
        if status != StatusCode::OK {
            self.skip_response = true;
        }
    }

    #[inline]
    fn status(&self) -> Option<StatusCode> {
        self.inner.status()
    }
}

impl<W: ResponseWriter> io::Write for TrackedWriter<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::TrackedWriter;
    use http::{HeaderValue, StatusCode};
    use murphy_http::protocol::{BufferedResponse, ResponseWriter};
    use std::io::Write;

    #[test]
    fn starts_cleared() {
        let mut sink = BufferedResponse::new();
        let w = TrackedWriter::new(&mut sink);
        assert!(!w.skip_response());
    }

    #[test]
    fn ok_status_does_not_flip() {
        let mut sink = BufferedResponse::new();
        let mut w = TrackedWriter::new(&mut sink);
        w.write_status(StatusCode::OK);
        assert!(!w.skip_response());
    }

    #[test]
    fn non_ok_status_flips() {
        let mut sink = BufferedResponse::new();
        let mut w = TrackedWriter::new(&mut sink);
        w.write_status(StatusCode::UNAUTHORIZED);
        assert!(w.skip_response());
        assert_eq!(sink.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn flag_never_clears() {
        let mut sink = BufferedResponse::new();
        let mut w = TrackedWriter::new(&mut sink);
        w.write_status(StatusCode::NO_CONTENT);
        w.write_status(StatusCode::OK);
        assert!(w.skip_response());
    }

    #[test]
    fn body_and_headers_pass_through() {
        let mut sink = BufferedResponse::new();
        let mut w = TrackedWriter::new(&mut sink);
        w.headers_mut().insert("x-custom", HeaderValue::from_static("1"));
        w.write_all(b"raw").unwrap();
        assert!(!w.skip_response());

        assert_eq!(sink.body(), b"raw");
        assert_eq!(sink.headers().get("x-custom").unwrap(), "1");
    }
}
