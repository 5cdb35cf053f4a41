use super::controller::register_user;
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth/user").route("/register", web::post().to(register_user)));
}
