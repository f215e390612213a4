use actix_session::Session;
use actix_web::{delete, get, post, put, web, HttpResponse};
use log::{info, warn};

use crate::{
    errors::ApiError,
    models::{
        admin::{
            AdditionalEmailsRequest, AdminRegisterRequest, DeleteAdminRequest,
            VerifyPasswordRequest, MAX_ADDITIONAL_EMAILS,
        },
        response::{MessageResponse, VerifyResponse},
    },
    routes::auth::{authorize, clear_verification, load_admin, mark_verified, password_matches},
    state::AppState,
    utils::{is_valid_email, security::hash_password},
};

#[get("/api/admin")]
pub async fn get_admin_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let admin = state.admins()?.get_admin()?.map(|record| record.admin);
    Ok(HttpResponse::Ok().json(admin))
}

#[post("/api/admin/register")]
pub async fn register_admin_handler(
    state: web::Data<AppState>,
    body: web::Json<AdminRegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let repo = state.admins()?;
    // An existing admin wins over anything wrong with the submitted fields.
    if repo.get_admin()?.is_some() {
        warn!("Rejected admin setup: an admin already exists");
        return Err(ApiError::Conflict("Admin already exists".to_string()));
    }

    let request = body.into_inner().trimmed();
    request.check().map_err(ApiError::ValidationError)?;

    let password = request.password.clone();
    let cost = state.config.bcrypt_cost;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    let admin = repo.create_admin(&request.name, &request.phone, &request.email, &password_hash)?;
    info!("Admin registered: {}", admin.email);

    Ok(HttpResponse::Ok().json(admin))
}

#[post("/api/admin/verify-password")]
pub async fn verify_password_handler(
    session: Session,
    state: web::Data<AppState>,
    body: web::Json<VerifyPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let record = load_admin(&state)?;

    if !password_matches(&record, &body.password).await? {
        warn!("Admin password verification failed");
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    mark_verified(&session, &record)?;
    info!("Admin password verified");
    Ok(HttpResponse::Ok().json(VerifyResponse { verified: true }))
}

#[put("/api/admin/additional-emails")]
pub async fn update_additional_emails_handler(
    session: Session,
    state: web::Data<AppState>,
    body: web::Json<AdditionalEmailsRequest>,
) -> Result<HttpResponse, ApiError> {
    let emails = body.filtered();

    if emails.len() > MAX_ADDITIONAL_EMAILS {
        return Err(ApiError::ValidationError(
            "Maximum 2 additional emails allowed".to_string(),
        ));
    }
    if let Some(bad) = emails.iter().find(|email| !is_valid_email(email)) {
        return Err(ApiError::ValidationError(format!(
            "Invalid additional email: {}",
            bad
        )));
    }

    authorize(&session, &state, body.password.as_deref()).await?;

    let admin = state.admins()?.update_additional_emails(&emails)?;
    info!("Additional notification emails updated ({} set)", emails.len());
    Ok(HttpResponse::Ok().json(admin))
}

#[delete("/api/admin/delete")]
pub async fn delete_admin_handler(
    session: Session,
    state: web::Data<AppState>,
    body: web::Json<DeleteAdminRequest>,
) -> Result<HttpResponse, ApiError> {
    let record = load_admin(&state)?;

    if !record.admin.email_matches(&body.email) {
        warn!("Rejected admin deletion: email did not match");
        return Err(ApiError::ValidationError(
            "Email does not match admin email".to_string(),
        ));
    }

    authorize(&session, &state, body.password.as_deref()).await?;

    state.admins()?.delete_admin()?;
    clear_verification(&session);
    info!("Admin deleted: {}", record.admin.email);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Admin deleted successfully".to_string(),
    }))
}
