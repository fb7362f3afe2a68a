use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use murphy_http::handler::Handler;
use murphy_web::{BadRequestBody, Empty, HandlerError, HttpContext, JsonConfig, LocalhostOnly, bad_request};
use serde::{Deserialize, Serialize};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct User {
    name: String,
    zip: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Created {
    id: u64,
    created_at: String,
}

fn create_user(ctx: &mut HttpContext<'_>, user: &User, created: &mut Created) -> Result<(), HandlerError> {
    if user.name.is_empty() {
        return Err(bad_request!("name must not be empty"));
    }
    if user.zip == "00000" {
        return Err(HandlerError::internal("zip lookup service unavailable"));
    }

    created.id = 42;
    created.created_at = ctx.now().to_rfc3339();
    Ok(())
}

fn health(ctx: &mut HttpContext<'_>, _req: &Empty, _resp: &mut Empty) -> Result<(), HandlerError> {
    if ctx.request().headers().contains_key("x-maintenance") {
        ctx.writer().write_status(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(())
}

async fn send<H>(handler: &H, host: &str, payload: &'static str)
where
    H: Handler<Full<Bytes>>,
    <H::RespBody as http_body::Body>::Error: std::fmt::Debug,
    H::Error: std::fmt::Debug,
{
    let req = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(http::header::HOST, host)
        .body(Full::new(Bytes::from_static(payload.as_bytes())))
        .expect("request should be valid");

    let response = handler.call(req).await.expect("json handlers never fail");
    let status = response.status();
    let err_id = response.headers().get(murphy_web::ERROR_ID_HEADER).cloned();
    let body = response.into_body().collect().await.expect("buffered body").to_bytes();

    info!(%status, ?err_id, body = %String::from_utf8_lossy(&body), "sent {payload:?} to {host}");
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = JsonConfig::builder().trust_policy(LocalhostOnly).bad_request_body(BadRequestBody::Always).build();

    let create_user = config.json_handler(create_user);
    send(&create_user, "example.com", r#"{"name":"hello","zip":"world"}"#).await;
    send(&create_user, "example.com", r#"{"name":""}"#).await;
    send(&create_user, "example.com", r#"{"name": not-a-string}"#).await;
    send(&create_user, "example.com", "").await;
    send(&create_user, "example.com", r#"{"name":"hello","zip":"00000"}"#).await;
    send(&create_user, "localhost:8080", r#"{"name":"hello","zip":"00000"}"#).await;

    let health = config.json_handler(health);
    send(&health, "example.com", "").await;
}
