//! Turns typed JSON functions into HTTP handlers.
//!
//! A typed handler has the shape
//! `Fn(&mut HttpContext<'_>, &Req, &mut Resp) -> Result<(), HandlerError>`, where
//! `Req` and `Resp` are [`Payload`]s. The shape is checked once, by the
//! compiler, when the function is registered:
//!
//! ```compile_fail
//! use murphy_web::json_handler;
//!
//! // the response must be taken by `&mut`, so this is rejected at registration
//! fn wrong(_: &mut murphy_web::HttpContext<'_>, _: &murphy_web::Empty, _: murphy_web::Empty) {}
//!
//! let _ = json_handler(wrong);
//! ```
//!
//! Every request routed to a [`JsonHandler`] then goes through the same steps:
//! decode the body into a fresh `Req`, invoke the function with a fresh
//! `Resp`, and either encode `Resp` or report the error it returned.

use std::convert::Infallible;
use std::error::Error;
use std::fmt;
use std::io::Write;
use std::marker::PhantomData;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use murphy_http::handler::Handler;
use murphy_http::protocol::{BufferedResponse, RequestHeader, ResponseBody, ResponseWriter};
use tracing::{trace, warn};

use crate::config::JsonConfig;
use crate::context::HttpContext;
use crate::error::{BadRequestError, HandlerError};
use crate::payload::{self, Payload, is_empty_record};
use crate::report::{self, APPLICATION_JSON};
use crate::writer::TrackedWriter;

const EMPTY_BODY_MESSAGE: &str = "unable to parse request; did not expect empty body";
const PARSE_MESSAGE: &str = "unable to parse request";

/// A function with the shape of a typed JSON handler.
pub trait JsonFn<Req, Resp>: Send + Sync {
    fn call(&self, ctx: &mut HttpContext<'_>, req: &Req, resp: &mut Resp) -> Result<(), HandlerError>;
}

impl<F, Req, Resp> JsonFn<Req, Resp> for F
where
    F: Fn(&mut HttpContext<'_>, &Req, &mut Resp) -> Result<(), HandlerError> + Send + Sync,
{
    #[inline]
    fn call(&self, ctx: &mut HttpContext<'_>, req: &Req, resp: &mut Resp) -> Result<(), HandlerError> {
        (self)(ctx, req, resp)
    }
}

/// A typed function registered as an HTTP handler.
///
/// The request and response payload types are fixed by the type parameters.
/// Each request gets its own freshly created `Req` and `Resp`, nothing is
/// shared between requests but the function and the config.
pub struct JsonHandler<F, Req, Resp> {
    f: F,
    config: JsonConfig,
    _phantom: PhantomData<fn(Req) -> Resp>,
}

/// Registers `f` with the default [`JsonConfig`].
///
/// ```
/// use murphy_web::{HandlerError, HttpContext, json_handler};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Deserialize, Serialize)]
/// struct Greet { name: String }
///
/// #[derive(Default, Deserialize, Serialize)]
/// struct Greeting { text: String }
///
/// fn greet(_ctx: &mut HttpContext<'_>, req: &Greet, resp: &mut Greeting) -> Result<(), HandlerError> {
///     resp.text = format!("hello {}", req.name);
///     Ok(())
/// }
///
/// let handler = json_handler(greet);
/// # let _ = handler;
/// ```
pub fn json_handler<F, Req, Resp>(f: F) -> JsonHandler<F, Req, Resp>
where
    F: Fn(&mut HttpContext<'_>, &Req, &mut Resp) -> Result<(), HandlerError> + Send + Sync,
    Req: Payload,
    Resp: Payload,
{
    JsonHandler::new(f, JsonConfig::default())
}

impl<F, Req, Resp> JsonHandler<F, Req, Resp>
where
    F: JsonFn<Req, Resp>,
    Req: Payload,
    Resp: Payload,
{
    pub(crate) fn new(f: F, config: JsonConfig) -> Self {
        Self { f, config, _phantom: PhantomData }
    }

    pub fn config(&self) -> &JsonConfig {
        &self.config
    }

    /// Serves one request whose body has already been read.
    ///
    /// The complete response, including any failure, is written to `w`.
    pub fn serve<W>(&self, w: W, req: &RequestHeader, body: &[u8])
    where
        W: ResponseWriter,
    {
        let mut w = TrackedWriter::new(w);

        let request = match self.decode_request(body) {
            Ok(request) => request,
            Err(e) => {
                report::bad_request(&self.config, &mut w, req, &e);
                return;
            }
        };

        let mut response = Resp::default();
        let result = {
            let mut ctx = HttpContext::new(&mut w, req);
            self.f.call(&mut ctx, &request, &mut response)
        };

        match result {
            Ok(()) => {}
            Err(HandlerError::BadRequest(e)) => {
                report::bad_request(&self.config, &mut w, req, &e);
                return;
            }
            Err(HandlerError::Internal(e)) => {
                report::internal_error(&self.config, &mut w, req, &*e);
                return;
            }
        }

        if w.skip_response() {
            trace!("handler wrote its own status, skip encoding response");
            return;
        }

        let encoded = match payload::encode(&response) {
            Ok(encoded) => encoded,
            Err(e) => {
                report::internal_error(&self.config, &mut w, req, &e);
                return;
            }
        };

        w.headers_mut().insert(CONTENT_TYPE, APPLICATION_JSON);
        if let Err(e) = w.write_all(&encoded) {
            report::internal_error(&self.config, &mut w, req, &e);
        }
    }

    fn decode_request(&self, body: &[u8]) -> Result<Req, BadRequestError> {
        match payload::decode::<Req>(body) {
            Ok(request) => Ok(request),
            Err(e) if e.is_empty_body() => {
                if is_empty_record::<Req>() {
                    Ok(Req::default())
                } else {
                    Err(BadRequestError::new(EMPTY_BODY_MESSAGE))
                }
            }
            Err(e) => {
                trace!(cause = %e, "unable to decode request body");
                Err(BadRequestError::new(PARSE_MESSAGE))
            }
        }
    }
}

#[async_trait]
impl<F, Req, Resp, B> Handler<B> for JsonHandler<F, Req, Resp>
where
    F: JsonFn<Req, Resp>,
    Req: Payload,
    Resp: Payload,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    type RespBody = ResponseBody;
    type Error = Infallible;

    async fn call(&self, req: Request<B>) -> Result<Response<Self::RespBody>, Self::Error> {
        let (parts, body) = req.into_parts();
        let header = RequestHeader::from(parts);
        let mut w = BufferedResponse::new();

        match body.collect().await {
            Ok(collected) => {
                let bytes: Bytes = collected.to_bytes();
                self.serve(&mut w, &header, &bytes);
            }
            Err(e) => {
                let e: Box<dyn Error + Send + Sync> = e.into();
                warn!(cause = %e, "failed to read request body");
                report::bad_request(&self.config, &mut w, &header, &BadRequestError::new(PARSE_MESSAGE));
            }
        }

        Ok(w.into_response())
    }
}

impl<F, Req, Resp> fmt::Debug for JsonHandler<F, Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonHandler")
            .field("request", &std::any::type_name::<Req>())
            .field("response", &std::any::type_name::<Resp>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonHandler, json_handler};
    use crate::config::JsonConfig;
    use crate::payload::{Empty, Payload};
    use crate::policy::TrustAll;
    use crate::report::{ERROR_ID_HEADER, MockErrorLog};
    use crate::{HandlerError, HttpContext, bad_request};
    use bytes::Bytes;
    use http::{Method, Request, StatusCode};
    use http_body::Frame;
    use http_body_util::{BodyExt, Full, StreamBody};
    use murphy_http::handler::Handler;
    use murphy_http::protocol::{BufferedResponse, RequestHeader, ResponseWriter};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct SampleRequest {
        foo: String,
        bar: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Unencodable {
        by_bytes: BTreeMap<Vec<u8>, u8>,
    }

    fn correct(_ctx: &mut HttpContext<'_>, _req: &SampleRequest, _resp: &mut Empty) -> Result<(), HandlerError> {
        Ok(())
    }

    fn correct_empty_request(_ctx: &mut HttpContext<'_>, _req: &Empty, _resp: &mut Empty) -> Result<(), HandlerError> {
        Ok(())
    }

    fn fails(_ctx: &mut HttpContext<'_>, _req: &SampleRequest, _resp: &mut Empty) -> Result<(), HandlerError> {
        Err(HandlerError::internal("a b c"))
    }

    fn bad_request_within_handler(
        _ctx: &mut HttpContext<'_>,
        _req: &SampleRequest,
        _resp: &mut Empty,
    ) -> Result<(), HandlerError> {
        Err(bad_request!("{} {} {}", "a", "b", "c"))
    }

    fn mark_as_unauthorized(ctx: &mut HttpContext<'_>, _req: &SampleRequest, _resp: &mut Empty) -> Result<(), HandlerError> {
        ctx.writer().write_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    fn echo(_ctx: &mut HttpContext<'_>, req: &SampleRequest, resp: &mut SampleRequest) -> Result<(), HandlerError> {
        resp.clone_from(req);
        resp.bar += 1;
        Ok(())
    }

    fn unencodable(_ctx: &mut HttpContext<'_>, _req: &Empty, resp: &mut Unencodable) -> Result<(), HandlerError> {
        resp.by_bytes.insert(vec![1, 2], 3);
        Ok(())
    }

    fn request_header() -> RequestHeader {
        Request::builder().method(Method::POST).uri("/").header("host", "example.com").body(()).unwrap().into()
    }

    fn serve<F, Req, Resp>(handler: &JsonHandler<F, Req, Resp>, body: &str) -> BufferedResponse
    where
        F: super::JsonFn<Req, Resp>,
        Req: Payload,
        Resp: Payload,
    {
        let mut w = BufferedResponse::new();
        handler.serve(&mut w, &request_header(), body.as_bytes());
        w
    }

    fn assert_is_handler<T: Handler<Full<Bytes>>>(_handler: &T) {
        // no op
    }

    #[test]
    fn typed_fn_is_http_handler() {
        assert_is_handler(&json_handler(correct));
        assert_is_handler(&json_handler(correct_empty_request));
        assert_is_handler(&Arc::new(json_handler(echo)));
    }

    #[test]
    fn malformed_body() {
        let w = serve(&json_handler(correct), r#"{"foo": not-a-string}"#);

        assert_eq!(w.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(w.body(), b"{\"err\":\"unable to parse request\"}\n");
        assert!(w.headers().contains_key(ERROR_ID_HEADER));
    }

    #[test]
    fn bad_request_never_invokes_handler() {
        let invoked = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&invoked);
        let handler = json_handler(move |_ctx: &mut HttpContext<'_>, _req: &SampleRequest, _resp: &mut Empty| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        let w = serve(&handler, r#"{"foo": not-a-string}"#);

        assert_eq!(w.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[test]
    fn good() {
        let w = serve(&json_handler(correct), "{}");

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), b"{}\n");
        assert_eq!(w.headers().get(http::header::CONTENT_TYPE).unwrap(), mime::APPLICATION_JSON.as_ref());
        assert!(!w.headers().contains_key(ERROR_ID_HEADER));
    }

    #[test]
    fn expected_empty_request() {
        let w = serve(&json_handler(correct_empty_request), "");

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), b"{}\n");
    }

    #[test]
    fn unexpected_empty_request() {
        let w = serve(&json_handler(correct), "");

        assert_eq!(w.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(w.body(), b"{\"err\":\"unable to parse request; did not expect empty body\"}\n");
    }

    #[test]
    fn handler_observes_decoded_fields() {
        let seen = Arc::new(Mutex::new(None));
        let seen_in = Arc::clone(&seen);
        let handler = json_handler(move |_ctx: &mut HttpContext<'_>, req: &SampleRequest, _resp: &mut Empty| {
            *seen_in.lock().unwrap() = Some(req.clone());
            Ok(())
        });

        let w = serve(&handler, r#"{"foo":"hihihi","bar":2014}"#);

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(*seen.lock().unwrap(), Some(SampleRequest { foo: "hihihi".into(), bar: 2014 }));
    }

    #[test]
    fn response_is_encoded() {
        let w = serve(&json_handler(echo), r#"{"foo":"x","bar":1}"#);

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), b"{\"foo\":\"x\",\"bar\":2}\n");
    }

    #[test]
    fn handler_fails() {
        let w = serve(&json_handler(fails), "{}");

        assert_eq!(w.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(w.body().is_empty());
        assert!(w.headers().contains_key(ERROR_ID_HEADER));
    }

    #[test]
    fn fails_shows_error_to_trusted() {
        let config = JsonConfig::builder().trust_policy(TrustAll).build();
        let w = serve(&config.json_handler(fails), "{}");

        assert_eq!(w.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(w.body(), b"a b c");
    }

    #[test]
    fn bad_request_within_handler_is_400() {
        let w = serve(&json_handler(bad_request_within_handler), "{}");

        assert_eq!(w.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(w.body(), b"{\"err\":\"a b c\"}\n");
    }

    #[test]
    fn handler_marks_request_as_unauthorized() {
        let w = serve(&json_handler(mark_as_unauthorized), "{}");

        assert_eq!(w.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(w.body().is_empty());
        assert!(!w.headers().contains_key(http::header::CONTENT_TYPE));
    }

    #[test]
    fn explicit_ok_status_still_encodes() {
        let handler = json_handler(|ctx: &mut HttpContext<'_>, _req: &Empty, resp: &mut SampleRequest| {
            ctx.writer().write_status(StatusCode::OK);
            resp.foo = "done".into();
            Ok(())
        });

        let w = serve(&handler, "");

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), b"{\"foo\":\"done\",\"bar\":0}\n");
    }

    #[test]
    fn encode_failure_is_internal_error() {
        let w = serve(&json_handler(unencodable), "");

        assert_eq!(w.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(w.body().is_empty());
    }

    #[test]
    fn every_request_gets_fresh_payloads() {
        let handler = json_handler(|_ctx: &mut HttpContext<'_>, req: &SampleRequest, resp: &mut SampleRequest| {
            assert!(resp.foo.is_empty());
            resp.foo.push_str(&req.foo);
            Ok(())
        });

        let first = serve(&handler, r#"{"foo":"a"}"#);
        let second = serve(&handler, r#"{"foo":"b"}"#);

        assert_eq!(first.body(), b"{\"foo\":\"a\",\"bar\":0}\n");
        assert_eq!(second.body(), b"{\"foo\":\"b\",\"bar\":0}\n");
    }

    fn observed_request(body: &str) -> (BufferedResponse, Option<SampleRequest>) {
        let seen = Arc::new(Mutex::new(None));
        let seen_in = Arc::clone(&seen);
        let handler = json_handler(move |_ctx: &mut HttpContext<'_>, req: &SampleRequest, _resp: &mut Empty| {
            *seen_in.lock().unwrap() = Some(req.clone());
            Ok(())
        });

        let w = serve(&handler, body);
        let seen = seen.lock().unwrap().take();
        (w, seen)
    }

    #[test]
    fn empty_object_decodes_to_zero_values() {
        let (w, seen) = observed_request("{}");

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), b"{}\n");
        assert_eq!(seen, Some(SampleRequest::default()));
    }

    #[test]
    fn partial_body_keeps_zero_values() {
        let (w, seen) = observed_request(r#"{"foo":"x"}"#);

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), b"{}\n");
        assert_eq!(seen, Some(SampleRequest { foo: "x".into(), bar: 0 }));
    }

    #[test]
    fn null_body_decodes_to_zero_values() {
        let (w, seen) = observed_request("null");

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), b"{}\n");
        assert_eq!(seen, Some(SampleRequest::default()));
    }

    #[test]
    fn failures_reach_the_error_log() {
        let mut log = MockErrorLog::new();
        log.expect_record()
            .withf(|_, status, detail| *status == StatusCode::BAD_REQUEST && detail.contains("did not expect empty body"))
            .times(1)
            .return_const(());

        let config = JsonConfig::builder().error_log(log).build();
        let w = serve(&config.json_handler(correct), "");

        assert_eq!(w.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn call_through_handler_trait() {
        let handler = json_handler(echo);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(Full::new(Bytes::from_static(br#"{"foo":"hihihi","bar":2014}"#)))
            .unwrap();

        let response = handler.call(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(http::header::CONTENT_TYPE).unwrap(), "application/json");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"{\"foo\":\"hihihi\",\"bar\":2015}\n");
    }

    #[tokio::test]
    async fn call_with_unreadable_body() {
        let frames = futures::stream::iter(vec![Err::<Frame<Bytes>, io::Error>(io::Error::other("connection reset"))]);
        let req = Request::builder().method(Method::POST).uri("/").body(StreamBody::new(frames)).unwrap();

        let response = json_handler(correct_empty_request).call(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key(ERROR_ID_HEADER));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"{\"err\":\"unable to parse request\"}\n");
    }

    #[tokio::test]
    async fn shared_handler_serves_concurrent_requests() {
        let handler = Arc::new(json_handler(echo));

        let tasks = (0..8).map(|i| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let body = format!(r#"{{"foo":"req-{i}","bar":{i}}}"#);
                let req = Request::builder().method(Method::POST).uri("/").body(Full::new(Bytes::from(body))).unwrap();
                let response = handler.call(req).await.unwrap();
                response.into_body().collect().await.unwrap().to_bytes()
            })
        });
        let tasks = tasks.collect::<Vec<_>>();

        for (i, task) in tasks.into_iter().enumerate() {
            let body = task.await.unwrap();
            let expected = format!("{{\"foo\":\"req-{i}\",\"bar\":{}}}\n", i + 1);
            assert_eq!(&body[..], expected.as_bytes());
        }
    }
}
