//! The async seam between a serving stack and a request handler.

use std::error::Error;

use async_trait::async_trait;
use http::{Request, Response};
use http_body::Body;

/// A request handler as seen by the serving stack.
///
/// The stack hands over the full inbound request and receives the complete
/// response. Handlers which report every failure through the response itself
/// use [`std::convert::Infallible`] as their error type.
#[async_trait]
pub trait Handler<ReqBody>: Send + Sync {
    type RespBody: Body;
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Self::RespBody>, Self::Error>;
}

#[async_trait]
impl<ReqBody, H> Handler<ReqBody> for std::sync::Arc<H>
where
    ReqBody: Send + 'static,
    H: Handler<ReqBody> + ?Sized,
{
    type RespBody = H::RespBody;
    type Error = H::Error;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Self::RespBody>, Self::Error> {
        (**self).call(req).await
    }
}
