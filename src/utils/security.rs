use crate::errors::ApiError;
use bcrypt::{hash, verify, BcryptError};

pub use bcrypt::DEFAULT_COST;

// Hashes a password using bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
    verify(password, hash)
}

impl From<BcryptError> for ApiError {
    fn from(err: BcryptError) -> Self {
        ApiError::HashingError(format!("bcrypt error: {}", err))
    }
}
