//! Request, response sink and handler primitives for the murphy JSON adapter.
//!
//! This crate holds the narrow interfaces a typed handler adapter needs from the
//! surrounding serving stack, and nothing more:
//!
//! - [`protocol::RequestHeader`]: the inbound request object, without its body
//! - [`protocol::ResponseWriter`]: the outbound response sink handlers write to
//! - [`protocol::BufferedResponse`]: an in-memory sink that turns into an [`http::Response`]
//! - [`protocol::ResponseBody`]: the body type of those responses
//! - [`handler::Handler`]: the async seam a serving stack drives requests through
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use http::StatusCode;
//! use murphy_http::protocol::{BufferedResponse, ResponseWriter};
//!
//! let mut w = BufferedResponse::new();
//! w.write_status(StatusCode::ACCEPTED);
//! w.write_all(b"queued").unwrap();
//!
//! let response = w.into_response();
//! assert_eq!(response.status(), StatusCode::ACCEPTED);
//! ```
//!
//! # Limitations
//!
//! - Socket listening, routing and TLS belong to the host serving stack
//! - Response bodies are buffered, there is no streaming sink

pub mod handler;
pub mod protocol;
