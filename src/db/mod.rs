pub mod admin_repository;
pub mod registration_repository;
pub mod schema;
