use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::token::{TokenError, TokenKeys};
use crate::error::AppError;

pub const MISSING_HEADER: &str = "Missing Authorization header";
pub const INVALID_FORMAT: &str = "Invalid Authorization format";
pub const INVALID_SIGNING_METHOD: &str = "Invalid signing method";
pub const INVALID_OR_EXPIRED: &str = "Invalid or expired token";

/// Rejects any request without a valid `Authorization: Bearer <token>` header.
///
/// The keys are built once at startup and shared by every worker; nothing is re-read
/// per request. Verified claims are stored in the request extensions.
#[derive(Clone)]
pub struct AuthMiddleware {
    keys: Arc<TokenKeys>,
}

impl AuthMiddleware {
    pub fn new(keys: Arc<TokenKeys>) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            keys: Arc::clone(&self.keys),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<TokenKeys>,
}

/// Runs the header through extraction, format and token checks.
pub fn authenticate(
    authorization: Option<&header::HeaderValue>,
    keys: &TokenKeys,
) -> Result<crate::auth::Claims, AppError> {
    let value = authorization.ok_or_else(|| AppError::Unauthorized(MISSING_HEADER.into()))?;
    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized(INVALID_FORMAT.into()))?;

    let parts: Vec<&str> = value.split(' ').collect();
    let token = match parts.as_slice() {
        ["Bearer", token] => *token,
        _ => return Err(AppError::Unauthorized(INVALID_FORMAT.into())),
    };

    keys.verify(token).map_err(|e| match e {
        TokenError::InvalidSigningMethod => AppError::Unauthorized(INVALID_SIGNING_METHOD.into()),
        TokenError::Invalid(_) => AppError::Unauthorized(INVALID_OR_EXPIRED.into()),
    })
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(req.headers().get(header::AUTHORIZATION), &self.keys) {
            Ok(claims) => {
                log::debug!("authenticated account {} for {}", claims.sub, req.path());
                req.extensions_mut().insert(claims);
                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(app_err) => {
                log::warn!("rejected {} {}: {}", req.method(), req.path(), app_err);
                // Answer here so the protected handler never runs.
                let res = req.error_response(app_err).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
