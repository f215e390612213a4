pub mod admin;
pub mod registration;
pub mod response;
