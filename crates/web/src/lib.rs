//! Typed JSON handlers for HTTP.
//!
//! Write endpoints as plain functions over typed payloads, and let the
//! adapter do the rest: decoding the request body, encoding the response, and
//! mapping errors onto status codes.
//!
//! ```
//! use murphy_web::{HandlerError, HttpContext, bad_request, json_handler};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Deserialize, Serialize)]
//! struct Transfer { amount: u64 }
//!
//! #[derive(Default, Deserialize, Serialize)]
//! struct Receipt { accepted_at: String }
//!
//! fn transfer(ctx: &mut HttpContext<'_>, req: &Transfer, resp: &mut Receipt) -> Result<(), HandlerError> {
//!     if req.amount == 0 {
//!         return Err(bad_request!("amount must be positive"));
//!     }
//!     resp.accepted_at = ctx.now().to_rfc3339();
//!     Ok(())
//! }
//!
//! let handler = json_handler(transfer);
//! # let _ = handler;
//! ```
//!
//! # Status codes
//!
//! - `200` with the encoded response when the handler returns `Ok(())`
//! - `400` with `{"err": message}` when the body can't be decoded, or the
//!   handler returns [`HandlerError::BadRequest`]
//! - `500` when the handler returns [`HandlerError::Internal`] or the response
//!   can't be encoded, the error text is only shown to trusted callers
//! - whatever the handler wrote itself through [`HttpContext::writer`], in
//!   which case nothing is encoded
//!
//! Failures carry an `X-Errid` header whose id is also logged with the full
//! error, see [`ErrorLog`].

mod config;
mod context;
mod error;
mod handler;
mod policy;
mod report;
mod writer;

pub mod payload;

pub use config::BadRequestBody;
pub use config::JsonConfig;
pub use config::JsonConfigBuilder;
pub use context::HttpContext;
pub use error::BadRequestError;
pub use error::HandlerError;
pub use handler::JsonFn;
pub use handler::JsonHandler;
pub use handler::json_handler;
pub use payload::Empty;
pub use payload::Payload;
pub use policy::LocalhostOnly;
pub use policy::TrustAll;
pub use policy::TrustNone;
pub use policy::TrustPolicy;
pub use report::ERROR_ID_HEADER;
pub use report::ErrorLog;
pub use report::TracingErrorLog;
pub use writer::TrackedWriter;

pub use murphy_http::protocol::RequestHeader;
pub use murphy_http::protocol::ResponseWriter;
