//! Staff-token middleware for the storefront server.
//! This middleware can be placed on any route or service.
//!
//! It compares the `sf_admin_token` request header against the configured staff token. Requests without a matching
//! token get a 403 Forbidden response, and so does every request when no token has been configured.

use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    web,
    Error,
};
use futures::future::{ok, Ready};
use log::*;

use crate::{config::StaffAccess, errors::ServerError, helpers::get_remote_ip};

pub const STAFF_TOKEN_HEADER: &str = "sf_admin_token";

#[derive(Default)]
pub struct StaffTokenMiddlewareFactory;

impl StaffTokenMiddlewareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for StaffTokenMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = StaffTokenMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(StaffTokenMiddlewareService { service: Rc::new(service) })
    }
}

pub struct StaffTokenMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for StaffTokenMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let access = req
                .app_data::<web::Data<StaffAccess>>()
                .ok_or_else(|| {
                    warn!("💻️ No staff access configuration found in app data");
                    ErrorInternalServerError("No staff access configuration found in app data")
                })?
                .clone();
            let candidate = req.headers().get(STAFF_TOKEN_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();
            if access.admin_token.matches(candidate) {
                service.call(req).await
            } else {
                let ip = get_remote_ip(req.request(), access.use_x_forwarded_for, access.use_forwarded);
                warn!("💻️ Refused staff request to {} from {ip:?}", req.path());
                Err(ServerError::Forbidden("A valid staff token is required.".into()).into())
            }
        })
    }
}
