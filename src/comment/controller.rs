use crate::comment::model::{CreateCommentRequest, UpdateCommentRequest};
use crate::comment::policy::Projection;
use crate::comment::query::ListParams;
use crate::comment::service::CommentService;
use crate::database::DataStore;
use crate::middleware::auth::resolve_caller;
use crate::utils::error::CustomError;
use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct ContextParams {
    pub context: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub force: Option<String>,
}

/// List comments visible to the caller
/// GET /comments
pub async fn list_comments(
    req: HttpRequest,
    store: web::Data<DataStore>,
    comment_service: web::Data<CommentService>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, CustomError> {
    let caller = resolve_caller(&req, &store)?;
    let projection = Projection::parse(params.context.as_deref())?;

    let comments = comment_service.list(&caller, &params, projection)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "count": comments.len(),
        "data": comments
    })))
}

/// Get a single comment by ID
/// GET /comments/{comment_id}
pub async fn get_comment(
    req: HttpRequest,
    store: web::Data<DataStore>,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    params: web::Query<ContextParams>,
) -> Result<HttpResponse, CustomError> {
    let caller = resolve_caller(&req, &store)?;
    let id = parse_comment_id(&path.into_inner())?;
    let projection = Projection::parse(params.context.as_deref())?;

    let comment = comment_service.get(&caller, id, projection)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment retrieved successfully",
        "httpStatusCode": 200,
        "data": comment
    })))
}

/// Create a new comment on a post
/// POST /comments
pub async fn create_comment(
    req: HttpRequest,
    store: web::Data<DataStore>,
    comment_service: web::Data<CommentService>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let caller = resolve_caller(&req, &store)?;

    let client_ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("")
        .to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let comment = comment_service.create(&caller, &body, &client_ip, &user_agent)?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "data": comment
    })))
}

/// Update a comment
/// PUT/PATCH /comments/{comment_id}
pub async fn update_comment(
    req: HttpRequest,
    store: web::Data<DataStore>,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let caller = resolve_caller(&req, &store)?;
    let id = parse_comment_id(&path.into_inner())?;

    let comment = comment_service.update(&caller, id, &body)?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment updated successfully",
        "httpStatusCode": 201,
        "data": comment
    })))
}

/// Trash or permanently delete a comment
/// DELETE /comments/{comment_id}
pub async fn delete_comment(
    req: HttpRequest,
    store: web::Data<DataStore>,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, CustomError> {
    let caller = resolve_caller(&req, &store)?;
    let id = parse_comment_id(&path.into_inner())?;
    let force = parse_force(params.force.as_deref())?;

    let outcome = comment_service.delete(&caller, id, force)?;

    let message = if outcome.deleted {
        "Comment deleted permanently"
    } else {
        "Comment moved to trash"
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": 200,
        "deleted": outcome.deleted,
        "data": outcome.comment
    })))
}

fn parse_comment_id(raw: &str) -> Result<u64, CustomError> {
    raw.parse::<u64>()
        .map_err(|_| CustomError::CommentNotFound(format!("No comment found with id `{}`", raw)))
}

fn parse_force(raw: Option<&str>) -> Result<bool, CustomError> {
    match raw {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(CustomError::ValidationError(format!(
            "invalid value for parameter `force`: `{}`",
            other
        ))),
    }
}
