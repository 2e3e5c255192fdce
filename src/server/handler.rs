// src/server/handler.rs
use hyper::{Body, Method, Request, Response, Uri};
use tower::Service;

use crate::routes::{self, Route};

/// Dispatches each request to its [`Route`].
#[derive(Clone, Debug)]
pub struct RequestHandler {
    port: u16,
}

impl RequestHandler {
    /// `port` is the port the listener is bound to.
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Box<dyn std::error::Error + Send + Sync>;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let port = self.port;
        let method = req.method().clone();
        let target = request_target(req.uri());

        Box::pin(async move {
            let answered = if method == Method::GET {
                Route::resolve(&target).respond(port).await
            } else {
                routes::unsupported_method(&method)
            };
            match answered {
                Ok(resp) => {
                    tracing::debug!(%method, %target, status = %resp.status(), "served");
                    Ok(resp)
                }
                Err(e) => {
                    tracing::error!(%method, %target, %e, "route failed");
                    Err(Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
                }
            }
        })
    }
}

/// The target as it appeared on the request line. Absolute-form targets keep
/// their scheme and authority, so they never match a route.
fn request_target(uri: &Uri) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    uri.path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned())
}
