//! Who gets to see error details.

use murphy_http::protocol::RequestHeader;

/// Decides whether error text may be echoed back to the caller of a request.
///
/// Any `Fn(&RequestHeader) -> bool` is a policy:
///
/// ```
/// use murphy_web::JsonConfig;
///
/// let config = JsonConfig::builder()
///     .trust_policy(|req: &murphy_web::RequestHeader| req.headers().contains_key("x-debug"))
///     .build();
/// # let _ = config;
/// ```
pub trait TrustPolicy: Send + Sync {
    fn can_show_err(&self, req: &RequestHeader) -> bool;
}

impl<F> TrustPolicy for F
where
    F: Fn(&RequestHeader) -> bool + Send + Sync,
{
    #[inline]
    fn can_show_err(&self, req: &RequestHeader) -> bool {
        (self)(req)
    }
}

/// Trusts requests addressed to `localhost`, whatever the port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalhostOnly;

impl TrustPolicy for LocalhostOnly {
    fn can_show_err(&self, req: &RequestHeader) -> bool {
        req.host().is_some_and(|host| host.eq_ignore_ascii_case("localhost"))
    }
}

/// Trusts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustAll;

impl TrustPolicy for TrustAll {
    fn can_show_err(&self, _req: &RequestHeader) -> bool {
        true
    }
}

/// Trusts no request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustNone;

impl TrustPolicy for TrustNone {
    fn can_show_err(&self, _req: &RequestHeader) -> bool {
        false
    }
}
