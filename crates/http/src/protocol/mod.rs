//! Request and response abstractions shared by the serving stack and handlers.
//!
//! - **Request** ([`request`]): [`RequestHeader`] wraps the inbound request head
//! - **Response sink** ([`response`]): [`ResponseWriter`] is what handlers write to,
//!   [`BufferedResponse`] is the in-memory implementation used by the adapter
//! - **Body** ([`body`]): [`ResponseBody`] is the outbound `http_body::Body`

mod request;
pub use request::RequestHeader;

mod response;
pub use response::BufferedResponse;
pub use response::ResponseWriter;

mod body;
pub use body::ResponseBody;
