//! Bearer token middleware.
//!
//! Wraps the whole app. When a request carries an `Authorization: Bearer` header, the token is verified and the
//! resulting [`JwtClaims`] are stored in the request extensions. A token that fails verification is recorded as a
//! [`TokenRejection`] instead. Requests are never refused here: public routes ignore the extensions, and routes that
//! need a user are guarded by the [ACL middleware](super::AclMiddlewareFactory).

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::auth::{bearer_token, JwtClaims, TokenRejection, TokenVerifier};

pub struct JwtMiddlewareFactory {
    verifier: TokenVerifier,
}

impl JwtMiddlewareFactory {
    pub fn new(verifier: TokenVerifier) -> Self {
        JwtMiddlewareFactory { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService { verifier: self.verifier.clone(), service: Rc::new(service) }))
    }
}

pub struct JwtMiddlewareService<S> {
    verifier: TokenVerifier,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = bearer_token(req.headers()).map(|token| token.and_then(|t| self.verifier.verify(t)));
        match verified {
            None => trace!("🔐️ No bearer token on request to {}", req.path()),
            Some(Ok(claims)) => {
                trace!("🔐️ Bearer token verified for user #{}", claims.sub);
                req.extensions_mut().insert::<JwtClaims>(claims);
            },
            Some(Err(e)) => {
                debug!("🔐️ Bearer token on request to {} was rejected. {e}", req.path());
                req.extensions_mut().insert(TokenRejection(e));
            },
        }
        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await })
    }
}
