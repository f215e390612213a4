use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{
    admin_repository::AdminRepository, registration_repository::RegistrationRepository,
    schema::init_db,
};
use crate::errors::ApiError;

/// Shared by every worker; each request opens its own connection.
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn connect(&self) -> Result<Connection, ApiError> {
        init_db(&self.config.database_path).map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    pub fn admins(&self) -> Result<AdminRepository, ApiError> {
        self.connect().map(AdminRepository::new)
    }

    pub fn registrations(&self) -> Result<RegistrationRepository, ApiError> {
        self.connect().map(RegistrationRepository::new)
    }
}
