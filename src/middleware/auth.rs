use actix_web::{Error, HttpMessage, HttpRequest, dev::ServiceRequest, http::header};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::database::DataStore;
use crate::user::model::Caller;
use crate::utils::error::CustomError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string())
}

/// Verify the bearer token on routes that require a login, stashing the
/// claims in the request extensions for the handlers.
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let token = credentials.token();

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => {
            req.extensions_mut().insert(data.claims);
            Ok(req)
        }
        Err(_) => Err((actix_web::error::ErrorUnauthorized("Invalid token"), req)),
    }
}

/// Create a JWT for an account. Tokens expire in 24 hours.
pub fn create_token(user_id: u64) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(24))
        .ok_or_else(|| CustomError::InternalServerError("Token expiry overflow".into()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_string(),
        exp: expiration,
    };

    encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map_err(|_| CustomError::InternalServerError("Token generation failed".into()))
}

/// Resolve the caller on routes that accept anonymous traffic. A missing
/// Authorization header means an anonymous caller; a present but invalid
/// token is rejected rather than downgraded.
pub fn resolve_caller(req: &HttpRequest, store: &DataStore) -> Result<Caller, CustomError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(Caller::Anonymous);
    };

    let value = value
        .to_str()
        .map_err(|_| CustomError::UnauthorizedError("Invalid authorization header".into()))?;

    let Some(token) = value.strip_prefix("Bearer ") else {
        return Err(CustomError::UnauthorizedError(
            "Expected a bearer token".into(),
        ));
    };

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| CustomError::UnauthorizedError("Invalid or expired token".into()))?;

    let user_id = data
        .claims
        .id
        .parse::<u64>()
        .map_err(|_| CustomError::UnauthorizedError("Invalid user id in token".into()))?;

    let user = store
        .find_user(user_id)
        .ok_or_else(|| CustomError::UnauthorizedError("Unknown user".into()))?;

    Ok(Caller::User {
        id: user.id,
        role: user.role,
    })
}
