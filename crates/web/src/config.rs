//! Settings shared by every handler registered through one [`JsonConfig`].

use std::fmt;
use std::sync::Arc;

use crate::handler::JsonHandler;
use crate::payload::Payload;
use crate::policy::{LocalhostOnly, TrustPolicy};
use crate::report::{ErrorLog, TracingErrorLog};
use crate::{HandlerError, HttpContext};

/// When a bad request response carries its `{"err": ...}` body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadRequestBody {
    /// Every caller sees why its request was rejected.
    #[default]
    Always,
    /// Only callers the [`TrustPolicy`] trusts see it, others get an empty body.
    TrustedOnly,
}

/// How registered handlers report failures.
///
/// Cloning is cheap, the policy and the log are shared.
#[derive(Clone)]
pub struct JsonConfig {
    trust_policy: Arc<dyn TrustPolicy>,
    bad_request_body: BadRequestBody,
    error_log: Arc<dyn ErrorLog>,
}

impl JsonConfig {
    pub fn builder() -> JsonConfigBuilder {
        JsonConfigBuilder::new()
    }

    pub fn trust_policy(&self) -> &dyn TrustPolicy {
        self.trust_policy.as_ref()
    }

    pub fn bad_request_body(&self) -> BadRequestBody {
        self.bad_request_body
    }

    pub fn error_log(&self) -> &dyn ErrorLog {
        self.error_log.as_ref()
    }

    /// Registers `f` as a handler reporting through this config.
    pub fn json_handler<F, Req, Resp>(&self, f: F) -> JsonHandler<F, Req, Resp>
    where
        F: Fn(&mut HttpContext<'_>, &Req, &mut Resp) -> Result<(), HandlerError> + Send + Sync,
        Req: Payload,
        Resp: Payload,
    {
        JsonHandler::new(f, self.clone())
    }
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for JsonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonConfig").field("bad_request_body", &self.bad_request_body).finish_non_exhaustive()
    }
}

pub struct JsonConfigBuilder {
    trust_policy: Option<Arc<dyn TrustPolicy>>,
    bad_request_body: BadRequestBody,
    error_log: Option<Arc<dyn ErrorLog>>,
}

impl JsonConfigBuilder {
    fn new() -> Self {
        Self { trust_policy: None, bad_request_body: BadRequestBody::default(), error_log: None }
    }

    /// Who may see error details. Defaults to [`LocalhostOnly`].
    pub fn trust_policy(mut self, trust_policy: impl TrustPolicy + 'static) -> Self {
        self.trust_policy = Some(Arc::new(trust_policy));
        self
    }

    /// Defaults to [`BadRequestBody::Always`].
    pub fn bad_request_body(mut self, bad_request_body: BadRequestBody) -> Self {
        self.bad_request_body = bad_request_body;
        self
    }

    /// Where failures are recorded. Defaults to [`TracingErrorLog`].
    pub fn error_log(mut self, error_log: impl ErrorLog + 'static) -> Self {
        self.error_log = Some(Arc::new(error_log));
        self
    }

    pub fn build(self) -> JsonConfig {
        JsonConfig {
            trust_policy: self.trust_policy.unwrap_or_else(|| Arc::new(LocalhostOnly)),
            bad_request_body: self.bad_request_body,
            error_log: self.error_log.unwrap_or_else(|| Arc::new(TracingErrorLog)),
        }
    }
}

impl fmt::Debug for JsonConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonConfigBuilder").field("bad_request_body", &self.bad_request_body).finish_non_exhaustive()
    }
}
