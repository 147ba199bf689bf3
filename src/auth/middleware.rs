use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::models::TokenType;

fn reject(req: ServiceRequest, err: AppError) -> Result<ServiceResponse<BoxBody>, Error> {
    Ok(req.into_response(err.error_response()))
}

/// Requires a valid access token. Missing credentials are 403, bad ones 401.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let secret = match req.app_data::<Data<Config>>() {
        Some(config) => config.jwt_secret.clone(),
        None => return reject(req, AppError::Internal("App config missing".into())),
    };

    let header_value = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or_default().to_string(),
        None => return reject(req, AppError::Forbidden("Token required".into())),
    };

    let token = match header_value.split_whitespace().nth(1) {
        Some(t) => t,
        None => return reject(req, AppError::Forbidden("Token missing".into())),
    };

    let claims = match verify_token(token, &secret) {
        Ok(c) if c.token_type == TokenType::Access => c,
        Ok(_) => return reject(req, AppError::Unauthorized("Invalid token".into())),
        Err(e) => {
            debug!(error = %e, path = %req.path(), "Rejected token");
            return reject(req, AppError::Unauthorized("Invalid token".into()));
        }
    };

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        name: claims.name,
    });

    next.call(req).await
}
