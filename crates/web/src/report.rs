//! The two ways a request can fail, and how each is reported.
//!
//! Every failure gets a fresh correlation id. The id goes out in the
//! `X-Errid` response header and into the [`ErrorLog`] together with the full
//! error, so an operator can always find the detail a client was not shown.

use std::error::Error;

use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, StatusCode};
use murphy_http::protocol::{RequestHeader, ResponseWriter};
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::{BadRequestBody, JsonConfig};
use crate::error::BadRequestError;
use crate::payload;

/// Carries the correlation id of a failed request.
pub const ERROR_ID_HEADER: HeaderName = HeaderName::from_static("x-errid");

pub(crate) const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");
const TEXT_PLAIN_UTF_8: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");

/// Where failed requests are recorded server side.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorLog: Send + Sync {
    fn record(&self, err_id: Uuid, status: StatusCode, detail: &str);
}

/// Records failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLog;

impl ErrorLog for TracingErrorLog {
    fn record(&self, err_id: Uuid, status: StatusCode, detail: &str) {
        error!(err_id = %err_id, status = status.as_u16(), err = detail, "request failed");
    }
}

/// Answers `400 Bad Request`.
///
/// The body is `{"err": message}` unless the config only shows bad request
/// messages to trusted callers and this one isn't.
pub(crate) fn bad_request<W>(config: &JsonConfig, w: &mut W, req: &RequestHeader, err: &BadRequestError)
where
    W: ResponseWriter + ?Sized,
{
    let err_id = start_failure(w, StatusCode::BAD_REQUEST);

    let show_body = match config.bad_request_body() {
        BadRequestBody::Always => true,
        BadRequestBody::TrustedOnly => config.trust_policy().can_show_err(req),
    };
    if show_body {
        match payload::encode(err) {
            Ok(body) => write_body(w, APPLICATION_JSON, &body),
            Err(e) => warn!(err_id = %err_id, cause = %e, "failed to encode bad request body"),
        }
    }

    config.error_log().record(err_id, StatusCode::BAD_REQUEST, err.message());
}

/// Answers `500 Internal Server Error`.
///
/// The error text is only written to the body when the trust policy allows
/// it for this request.
pub(crate) fn internal_error<W>(config: &JsonConfig, w: &mut W, req: &RequestHeader, err: &(dyn Error + '_))
where
    W: ResponseWriter + ?Sized,
{
    let err_id = start_failure(w, StatusCode::INTERNAL_SERVER_ERROR);

    let detail = err.to_string();
    if config.trust_policy().can_show_err(req) {
        write_body(w, TEXT_PLAIN_UTF_8, detail.as_bytes());
    }

    config.error_log().record(err_id, StatusCode::INTERNAL_SERVER_ERROR, &detail);
}

fn start_failure<W>(w: &mut W, status: StatusCode) -> Uuid
where
    W: ResponseWriter + ?Sized,
{
    let err_id = Uuid::new_v4();
    match HeaderValue::try_from(err_id.hyphenated().to_string()) {
        Ok(value) => {
            w.headers_mut().insert(ERROR_ID_HEADER, value);
        }
        Err(e) => warn!(err_id = %err_id, cause = %e, "invalid error id header value"),
    }
    w.write_status(status);
    err_id
}

fn write_body<W>(w: &mut W, content_type: HeaderValue, body: &[u8])
where
    W: ResponseWriter + ?Sized,
{
    w.headers_mut().insert(CONTENT_TYPE, content_type);
    if let Err(e) = w.write_all(body) {
        warn!(cause = %e, "failed to write error body");
    }
}
