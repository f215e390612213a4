use actix_session::Session;
use actix_web::web;
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    errors::ApiError, models::admin::AdminRecord, state::AppState,
    utils::security::verify_password,
};

const VERIFICATION_KEY: &str = "admin_verification";

/// Recorded in the signed session cookie after a successful password check.
#[derive(Debug, Serialize, Deserialize)]
struct Verification {
    admin_id: String,
    verified_at: i64,
}

pub fn load_admin(state: &AppState) -> Result<AdminRecord, ApiError> {
    state
        .admins()?
        .get_admin()?
        .ok_or_else(|| ApiError::NotFound("No admin found".to_string()))
}

/// Checks `password` against the stored hash on the blocking pool.
pub async fn password_matches(record: &AdminRecord, password: &str) -> Result<bool, ApiError> {
    let password = password.to_string();
    let stored_hash = record.password_hash.clone();
    let matched = web::block(move || verify_password(&password, &stored_hash)).await??;
    Ok(matched)
}

pub fn mark_verified(session: &Session, record: &AdminRecord) -> Result<(), ApiError> {
    session
        .insert(
            VERIFICATION_KEY,
            Verification {
                admin_id: record.admin.id.clone(),
                verified_at: Utc::now().timestamp(),
            },
        )
        .map_err(|e| ApiError::InternalError(format!("Session insert error: {}", e)))?;
    session.renew();
    Ok(())
}

pub fn clear_verification(session: &Session) {
    session.purge();
}

fn recently_verified(session: &Session, state: &AppState, record: &AdminRecord) -> bool {
    let ttl = state.config.verification_ttl.as_secs() as i64;
    match session.get::<Verification>(VERIFICATION_KEY) {
        Ok(Some(v)) => v.admin_id == record.admin.id && Utc::now().timestamp() - v.verified_at <= ttl,
        Ok(None) => false,
        Err(e) => {
            warn!("Unreadable admin verification in session: {}", e);
            false
        }
    }
}

/// Gate for destructive admin actions. A supplied password is always checked;
/// without one, a recent `verify-password` in this session is accepted.
pub async fn authorize(
    session: &Session,
    state: &AppState,
    password: Option<&str>,
) -> Result<AdminRecord, ApiError> {
    let record = load_admin(state)?;

    match password.filter(|p| !p.is_empty()) {
        Some(password) => {
            if password_matches(&record, password).await? {
                mark_verified(session, &record)?;
                Ok(record)
            } else {
                warn!("Rejected admin action: wrong password");
                Err(ApiError::Unauthorized("Invalid admin password".to_string()))
            }
        }
        None if recently_verified(session, state, &record) => {
            info!("Admin action authorized by session verification");
            Ok(record)
        }
        None => Err(ApiError::Unauthorized(
            "Admin password required".to_string(),
        )),
    }
}
