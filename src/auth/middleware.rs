use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tower::Layer;
use tower::Service;

use crate::oidc::resource_server::ResourceServer;

/// Middleware layer that requires a verified bearer token granting a permission
///
/// An empty permission only requires a verified token.
#[derive(Clone)]
pub struct RequireAuthorization {
    resource_server: ResourceServer,
    permission: Arc<str>,
}

impl RequireAuthorization {
    pub fn new(resource_server: ResourceServer, permission: &str) -> Self {
        Self {
            resource_server,
            permission: Arc::from(permission),
        }
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }
}

impl<S> Layer<S> for RequireAuthorization {
    type Service = RequireAuthorizationMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireAuthorizationMiddleware {
            inner,
            resource_server: self.resource_server.clone(),
            permission: self.permission.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequireAuthorizationMiddleware<S> {
    inner: S,
    resource_server: ResourceServer,
    permission: Arc<str>,
}

impl<S> Service<Request> for RequireAuthorizationMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        // Swap in the clone so the instance that was polled ready serves this request
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resource_server = self.resource_server.clone();
        let permission = self.permission.clone();

        Box::pin(async move {
            match resource_server.authorize(request.headers(), &permission).await {
                Ok(claims) => {
                    request.extensions_mut().insert(claims);
                    inner.call(request).await
                }
                Err(err) => {
                    tracing::warn!(
                        kind = ?err.kind(),
                        permission = %permission,
                        method = %request.method(),
                        path = %request.uri().path(),
                        "request rejected: {}",
                        err
                    );
                    Ok(err.into_response())
                }
            }
        })
    }
}
