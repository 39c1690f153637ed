/// HTTP middleware for quill-api
///
/// Cookie-based session authentication. The middleware only ever ATTACHES
/// identity: a missing, malformed, expired, or otherwise rejected cookie
/// degrades the request to anonymous instead of failing it. Handlers that
/// require a caller extract [`Principal`] and get a 401 when none was
/// attached.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::error::AppError;
use crate::security::identity::{self, Principal};

/// Name of the session cookie set at signin and cleared at signout.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

// =====================================================================
// Cookie authentication
// =====================================================================

/// Actix middleware that resolves the `access_token` cookie into a live
/// [`Principal`] stored in request extensions.
///
/// The cookie is the only accepted token transport. `Authorization`
/// headers are ignored.
pub struct CookieAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for CookieAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CookieAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CookieAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct CookieAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for CookieAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let token = req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());

            if let Some(token) = token {
                match req.app_data::<web::Data<PgPool>>() {
                    Some(pool) => {
                        if let Some(principal) = identity::resolve(pool, &token).await {
                            req.extensions_mut().insert(principal);
                        }
                    }
                    None => {
                        tracing::error!("Database pool missing from app data; treating request as anonymous");
                    }
                }
            }

            service.call(req).await
        })
    }
}

/// Required-identity extractor. Handlers that take a `Principal` argument
/// fail with 401 when the middleware attached none.
impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .copied()
                .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()).into()),
        )
    }
}
