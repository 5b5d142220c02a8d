//! Access control list middleware.
//!
//! This middleware can be placed on any route or service. It reads the claims left by the
//! [JWT middleware](super::JwtMiddlewareFactory) and lets the request through if the caller's role is one of the
//! allowed roles for the route. A missing or rejected token yields 401 Unauthorized, a role outside the list yields
//! 403 Forbidden.

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
use vinyl_market_engine::db_types::Role;

use crate::{
    auth::{JwtClaims, TokenRejection},
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    allowed_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(allowed_roles: &[Role]) -> Self {
        AclMiddlewareFactory { allowed_roles: allowed_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AclMiddlewareService { allowed_roles: self.allowed_roles.clone(), service: Rc::new(service) }))
    }
}

pub struct AclMiddlewareService<S> {
    allowed_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S> AclMiddlewareService<S> {
    fn check(&self, req: &ServiceRequest) -> Result<(), AuthError> {
        let extensions = req.extensions();
        if let Some(claims) = extensions.get::<JwtClaims>() {
            return if self.allowed_roles.contains(&claims.role) {
                Ok(())
            } else {
                warn!("🔐️ User #{} ({}) may not access {}", claims.sub, claims.role, req.path());
                Err(AuthError::InsufficientPermissions(format!("{} role cannot access this resource", claims.role)))
            };
        }
        match extensions.get::<TokenRejection>() {
            Some(TokenRejection(e)) => Err(e.clone()),
            None => Err(AuthError::MissingToken),
        }
    }
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
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
        let access = self.check(&req);
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            match access {
                Ok(()) => service.call(req).await,
                Err(e) => Err(ServerError::AuthenticationError(e).into()),
            }
        })
    }
}
