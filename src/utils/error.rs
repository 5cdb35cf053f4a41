use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Forbidden context: {0}")]
    ForbiddenContext(String),

    #[error("Cannot read: {0}")]
    CannotRead(String),

    #[error("Cannot edit: {0}")]
    CannotEdit(String),

    #[error("Forbidden status change: {0}")]
    ForbiddenStatusChange(String),

    #[error("Comments closed: {0}")]
    CommentsClosed(String),

    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl CustomError {
    /// Stable machine-readable code carried in every error response.
    pub fn code(&self) -> &'static str {
        match *self {
            CustomError::CommentNotFound(..) => "COMMENT_INVALID_ID",
            CustomError::PostNotFound(..) => "POST_INVALID_ID",
            CustomError::ForbiddenContext(..) => "FORBIDDEN_CONTEXT",
            CustomError::CannotRead(..) => "CANNOT_READ",
            CustomError::CannotEdit(..) => "CANNOT_EDIT",
            CustomError::ForbiddenStatusChange(..) => "FORBIDDEN_STATUS_CHANGE",
            CustomError::CommentsClosed(..) => "COMMENTS_CLOSED",
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::CommentNotFound(..) => StatusCode::NOT_FOUND,
            CustomError::PostNotFound(..) => StatusCode::NOT_FOUND,
            CustomError::ForbiddenContext(..) => StatusCode::FORBIDDEN,
            CustomError::CannotRead(..) => StatusCode::FORBIDDEN,
            CustomError::CannotEdit(..) => StatusCode::FORBIDDEN,
            CustomError::ForbiddenStatusChange(..) => StatusCode::FORBIDDEN,
            CustomError::CommentsClosed(..) => StatusCode::FORBIDDEN,
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.code(),
            "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        }))
    }
}
