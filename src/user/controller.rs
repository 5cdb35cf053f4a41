use crate::middleware::auth::create_token;
use crate::user::model::RegisterUserRequest;
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use actix_web::{HttpResponse, web};
use serde_json::json;

/// Register a new subscriber account and hand back a bearer token
/// POST /auth/user/register
pub async fn register_user(
    user_service: web::Data<UserService>,
    body: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.register_user(&body.username, &body.email)?;
    let token = create_token(user.id)?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User registered successfully",
        "httpStatusCode": 201,
        "data": {
            "user": user,
            "token": token,
        }
    })))
}
