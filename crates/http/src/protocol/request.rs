//! HTTP request header handling.
//!
//! Wraps the standard `http::Request` type without its body, so handlers can
//! inspect the request while the body is decoded separately.

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, header};

/// Represents an HTTP request header.
///
/// This struct wraps a `http::Request<()>` to provide:
/// - Access to standard HTTP header fields
/// - The host the request was addressed to
/// - Conversion from request parts
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl RequestHeader {
    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the host name the request was addressed to, without any port.
    ///
    /// An absolute request URI takes precedence over the `Host` header, the
    /// same way HTTP/1.1 origin servers resolve it.
    pub fn host(&self) -> Option<&str> {
        if let Some(host) = self.uri().host() {
            return Some(host);
        }

        let host = self.headers().get(header::HOST)?.to_str().ok()?;
        Some(strip_port(host))
    }
}

fn strip_port(host: &str) -> &str {
    // bracketed ipv6 literal, e.g. `[::1]:8080`
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(host, |(addr, _)| addr);
    }

    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Converts request parts into a RequestHeader.
impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

/// Converts a bodyless request into a RequestHeader.
impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}
