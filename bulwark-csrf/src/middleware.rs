use crate::config::CsrfConfig;
use crate::error::Result;
use crate::gate::CsrfGate;
use crate::logging::debug;
use crate::request::{HttpRequest, HttpResponse, ResponseHeaders};
use crate::session::SessionData;
use async_trait::async_trait;
use std::future::Future;

/// Downstream request handler protected by the gate
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: HttpRequest) -> HttpResponse;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResponse> + Send + 'static,
{
    async fn call(&self, request: HttpRequest) -> HttpResponse {
        (self)(request).await
    }
}

/// CSRF protection middleware
///
/// Runs the gate before the handler. A rejected request never reaches the
/// handler; an accepted one gets the freshly issued token header on the
/// handler's response.
#[derive(Debug, Clone, Default)]
pub struct CsrfMiddleware {
    gate: CsrfGate,
}

impl CsrfMiddleware {
    /// Create new CSRF middleware
    pub fn new(config: CsrfConfig) -> Result<Self> {
        Ok(Self::from_gate(CsrfGate::new(config)?))
    }

    pub fn from_gate(gate: CsrfGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &CsrfGate {
        &self.gate
    }

    /// Gate the request, then run `handler`
    pub async fn handle<S, H>(
        &self,
        session: &mut S,
        request: HttpRequest,
        handler: &H,
    ) -> Result<HttpResponse>
    where
        S: SessionData + ?Sized,
        H: Handler + ?Sized,
    {
        let mut pending = HttpResponse::ok();
        self.gate.guard(session, &request, &mut pending)?;

        debug!(method = %request.method, "CSRF check passed, calling handler");
        let mut response = handler.call(request).await;

        for (name, value) in &pending.headers {
            response.set_header(name, value)?;
        }

        Ok(response)
    }

    /// Like [`handle`](Self::handle), but rejections become a response
    pub async fn respond<S, H>(
        &self,
        session: &mut S,
        request: HttpRequest,
        handler: &H,
    ) -> HttpResponse
    where
        S: SessionData + ?Sized,
        H: Handler + ?Sized,
    {
        match self.handle(session, request, handler).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }
}
