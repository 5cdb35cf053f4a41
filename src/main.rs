use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use env_logger::Env;
use log::info;
use serde_json::json;

use comments_backend::comment::service::CommentService;
use comments_backend::database::DataStore;
use comments_backend::middleware::not_found::not_found;
use comments_backend::post::post_service::PostService;
use comments_backend::router::index::routes;
use comments_backend::user::model::Role;
use comments_backend::user::service::UserService;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments API is up",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting server on http://localhost:8000");

    let store = Arc::new(DataStore::new());

    // A fresh instance needs at least one account that can moderate.
    let admin = store.insert_user("admin", "admin@example.com", Role::Administrator);
    info!("Seeded administrator account with id {}", admin.id);

    let comment_service = web::Data::new(CommentService::new(store.clone()));
    let post_service = web::Data::new(PostService::new(store.clone()));
    let user_service = web::Data::new(UserService::new(store.clone()));
    let store_data = web::Data::from(store);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store_data.clone())
            .app_data(comment_service.clone())
            .app_data(post_service.clone())
            .app_data(user_service.clone())
            .configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
    })
    .bind(("localhost", 8000))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
