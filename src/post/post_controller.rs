use crate::middleware::auth::Claims;
use crate::post::post_model::CreatePostRequest;
use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};

pub async fn create_post(
    post_service: web::Data<PostService>,
    post: web::Json<CreatePostRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    // Author comes from the verified token, never from the body
    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| CustomError::UnauthorizedError("No claims found".into()))?;

    let author_id = claims
        .id
        .parse::<u64>()
        .map_err(|_| CustomError::UnauthorizedError("Invalid user id in token".into()))?;

    let created = post_service.create_post(
        &post.title,
        &post.content,
        author_id,
        post.comments_open.unwrap_or(true),
    )?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "post": created
    })))
}

pub async fn get_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let raw = post_id.into_inner();
    let id = raw
        .parse::<u64>()
        .map_err(|_| CustomError::PostNotFound(format!("No post found with id `{}`", raw)))?;

    match post_service.get_post(id) {
        Some(p) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Post fetched successfully",
            "httpStatusCode": 200,
            "post": p
        }))),
        None => Err(CustomError::PostNotFound(format!(
            "No post found with id `{}`",
            id
        ))),
    }
}

pub async fn delete_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let raw = post_id.into_inner();
    let id = raw
        .parse::<u64>()
        .map_err(|_| CustomError::PostNotFound(format!("No post found with id `{}`", raw)))?;

    if post_service.delete_post(id) {
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Post deleted successfully",
            "httpStatusCode": 200,
        })))
    } else {
        Err(CustomError::PostNotFound(format!(
            "No post found with id `{}`",
            id
        )))
    }
}
