use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::SameSite, error::JsonPayloadError, get, web, HttpResponse};

use crate::{config::AppConfig, errors::ApiError, models::response::MessageResponse};

pub mod admin;
pub mod auth;
pub mod registrations;

pub const SESSION_COOKIE_NAME: &str = "health-registry-session";

#[get("/api/")]
pub async fn api_root_handler() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "Registration API".to_string(),
    })
}

/// Malformed JSON bodies become a 400 with a `detail` like every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = match &err {
            JsonPayloadError::Deserialize(e) => e.to_string(),
            other => other.to_string(),
        };
        ApiError::ValidationError(format!("Invalid request body: {}", detail)).into()
    })
}

pub fn session_middleware(config: &AppConfig) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), config.session_key.clone())
        .cookie_secure(config.cookie_secure)
        .cookie_path("/".to_string())
        .cookie_name(SESSION_COOKIE_NAME.to_string())
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Registers every API route. Static paths go before `{id}` matches.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(api_root_handler)
        .service(admin::get_admin_handler)
        .service(admin::register_admin_handler)
        .service(admin::verify_password_handler)
        .service(admin::update_additional_emails_handler)
        .service(admin::delete_admin_handler)
        .service(registrations::list_registrations_handler)
        .service(registrations::create_registration_handler)
        .service(registrations::export_all_handler)
        .service(registrations::export_one_handler)
        .service(registrations::get_registration_handler)
        .service(registrations::update_registration_handler)
        .service(registrations::delete_registration_handler);
}
