//! The outbound response sink.
//!
//! A [`ResponseWriter`] accumulates one response: headers first, then a status
//! line, then body bytes. The status is committed by the first call to
//! [`ResponseWriter::write_status`], or implicitly as `200 OK` by the first
//! body write. Once committed it never changes.

use std::io;

use bytes::{BufMut, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use tracing::warn;

use crate::protocol::ResponseBody;

/// A sink for exactly one HTTP response.
///
/// Body bytes go through the [`io::Write`] supertrait, so encoders can write
/// straight into the sink.
pub trait ResponseWriter: io::Write {
    /// The headers which will be sent with the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commits the response status.
    ///
    /// Only the first status write takes effect; later ones are ignored.
    fn write_status(&mut self, status: StatusCode);

    /// The committed status, if any.
    fn status(&self) -> Option<StatusCode>;
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    #[inline]
    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    #[inline]
    fn write_status(&mut self, status: StatusCode) {
        (**self).write_status(status);
    }

    #[inline]
    fn status(&self) -> Option<StatusCode> {
        (**self).status()
    }
}

/// Buffers a response in memory until it's turned into an [`http::Response`].
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Converts the buffered state into a response.
    ///
    /// A response nobody wrote a status for is a `200 OK`.
    pub fn into_response(self) -> Response<ResponseBody> {
        let mut response = Response::new(ResponseBody::from(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            Some(current) => {
                warn!(current = %current, ignored = %status, "superfluous write_status call");
            }
            None => self.status = Some(status),
        }
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl io::Write for BufferedResponse {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
