use actix_session::Session;
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Local;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::{
    db::registration_repository::SaveOutcome,
    errors::ApiError,
    export::{format_all_registrations, format_registration},
    models::{
        registration::{PasswordRequest, RegistrationPayload, RegistrationUpdateRequest},
        response::DeleteResponse,
    },
    routes::auth::authorize,
    state::AppState,
};

fn parse_registration_id(raw: &str) -> Result<String, ApiError> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| ApiError::ValidationError("Invalid registration ID".to_string()))
}

#[get("/api/registrations")]
pub async fn list_registrations_handler(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let registrations = state.registrations()?.get_all_registrations()?;
    Ok(HttpResponse::Ok().json(registrations))
}

#[post("/api/registrations")]
pub async fn create_registration_handler(
    state: web::Data<AppState>,
    body: web::Json<RegistrationPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    payload.validate_for_create()?;

    let outcome = state.registrations()?.save_registration(&payload)?;
    let registration = match outcome {
        SaveOutcome::Created(reg) => {
            info!("Registration created: {}", reg.id);
            reg
        }
        SaveOutcome::Updated(reg) => {
            info!("Registration {} refreshed by a repeat submission", reg.id);
            reg
        }
    };

    log_notification_recipients(&state, &registration.id);

    Ok(HttpResponse::Ok().json(registration))
}

/// The registration is already stored; a failed lookup here must not fail the request.
fn log_notification_recipients(state: &AppState, registration_id: &str) {
    match state.admins().and_then(|repo| repo.get_admin()) {
        Ok(Some(record)) => info!(
            "Registration {} to be notified to {:?}",
            registration_id,
            record.admin.notification_recipients()
        ),
        Ok(None) => debug!("No admin set up; registration {} has no recipients", registration_id),
        Err(e) => warn!(
            "Could not look up notification recipients for registration {}: {}",
            registration_id, e
        ),
    }
}

#[get("/api/registrations/export")]
pub async fn export_all_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let registrations = state.registrations()?.get_all_registrations()?;
    let text = format_all_registrations(&registrations, Local::now().date_naive())?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(text))
}

#[get("/api/registrations/{id}")]
pub async fn get_registration_handler(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_registration_id(&id)?;
    let registration = state.registrations()?.get_registration_by_id(&id)?;
    Ok(HttpResponse::Ok().json(registration))
}

#[get("/api/registrations/{id}/export")]
pub async fn export_one_handler(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_registration_id(&id)?;
    let registration = state.registrations()?.get_registration_by_id(&id)?;
    let text = format_registration(&registration, Local::now().date_naive())?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(text))
}

#[put("/api/registrations/{id}")]
pub async fn update_registration_handler(
    session: Session,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<RegistrationUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_registration_id(&id)?;
    let request = body.into_inner();

    authorize(&session, &state, request.password.as_deref()).await?;
    request.payload.validate_for_update()?;

    let registration = state
        .registrations()?
        .update_registration(&id, &request.payload)?;
    info!("Registration updated by admin: {}", id);

    Ok(HttpResponse::Ok().json(registration))
}

#[delete("/api/registrations/{id}")]
pub async fn delete_registration_handler(
    session: Session,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: Option<web::Json<PasswordRequest>>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_registration_id(&id)?;
    let password = body.and_then(|b| b.into_inner().password);
    debug!("Attempting to delete registration with ID: {}", id);

    authorize(&session, &state, password.as_deref()).await?;
    state.registrations()?.delete_registration_by_id(&id)?;
    info!("Registration deleted by admin: {}", id);

    Ok(HttpResponse::Ok().json(DeleteResponse {
        message: "Registration deleted successfully".to_string(),
        deleted_id: id,
    }))
}
