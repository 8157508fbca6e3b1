use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header::HeaderMap,
    middleware::Next,
    web, Error, HttpMessage, HttpRequest, ResponseError,
};

use crate::{api::error, utils::Claims};

pub mod guard;

pub use guard::Caller;

/// Turns a bearer token into a caller identity.
pub trait AuthProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Caller, error::SystemError>;

    fn issue(&self, caller: &Caller) -> Result<String, error::SystemError>;
}

pub struct JwtAuthProvider {
    secret: String,
    expiration: u64,
}

impl JwtAuthProvider {
    pub fn new(secret: impl Into<String>, expiration: u64) -> Self {
        JwtAuthProvider { secret: secret.into(), expiration }
    }
}

impl AuthProvider for JwtAuthProvider {
    fn authenticate(&self, token: &str) -> Result<Caller, error::SystemError> {
        let claims = Claims::decode(token, self.secret.as_bytes())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;
        Ok(Caller::from(&claims))
    }

    fn issue(&self, caller: &Caller) -> Result<String, error::SystemError> {
        Claims::new(&caller.id, caller.is_admin, self.expiration).encode(self.secret.as_bytes())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn auth_provider(req: &HttpRequest) -> Result<web::Data<dyn AuthProvider>, error::SystemError> {
    req.app_data::<web::Data<dyn AuthProvider>>()
        .cloned()
        .ok_or_else(|| error::SystemError::config("Auth provider is not registered"))
}

fn resolve_caller(req: &HttpRequest) -> Result<Caller, error::SystemError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| error::SystemError::unauthorized("Token Invalid or Expired"))?;
    auth_provider(req)?.authenticate(token)
}

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    match resolve_caller(req.request()) {
        Ok(caller) => {
            req.extensions_mut().insert(caller);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(err) => {
            let response = error::Error::from(err).error_response();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}

pub fn get_caller(req: &HttpRequest) -> Result<Caller, error::Error> {
    req.extensions()
        .get::<Caller>()
        .copied()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))
}

/// Caller on a public route: absent header is anonymous, a bad token is not.
pub fn optional_caller(req: &HttpRequest) -> Result<Option<Caller>, error::Error> {
    if bearer_token(req.headers()).is_none() {
        return Ok(None);
    }
    Ok(Some(resolve_caller(req)?))
}
